use anyhow::{Context, Result, bail};
use clap::Parser;
use std::{env, fmt, str::FromStr};

pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// A configuration value that must never show up in logs.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(****)")
    }
}

/// Centralized application configuration.
/// Combines environment variables and CLI arguments; read-only once built.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub name: String,
    pub version: String,
    pub api_version: String,
    pub description: String,
    pub log_level: String,
    pub file_storage_provider: String,
    pub host: String,
    pub port: u16,
    /// Bucket every picture is uploaded to.
    pub upload_bucket: String,
    pub max_upload_bytes: usize,
    pub minio: MinioConfig,
    pub mongo: MongoConfig,
}

/// Connection settings for a MinIO (S3-compatible) backend.
#[derive(Debug, Clone)]
pub struct MinioConfig {
    pub endpoint: String,
    pub access_key: Option<Secret>,
    pub secret_key: Option<Secret>,
    pub use_ssl: bool,
    pub region: String,
}

/// Metadata database settings. Not used by the upload path yet.
#[derive(Debug, Clone, Default)]
pub struct MongoConfig {
    pub uri: Option<Secret>,
    pub db_name: Option<Secret>,
    pub collection_name: Option<Secret>,
}

/// Command-line + environment configuration.
#[derive(Parser, Debug, Default)]
#[command(author, version, about = "REST API Service for Pictures")]
pub struct Args {
    /// Host to bind to (overrides PICTURE_SERVICE_HOST)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to (overrides PICTURE_SERVICE_PORT)
    #[arg(long)]
    pub port: Option<u16>,

    /// Log level used when RUST_LOG is unset (overrides LOG_LEVEL)
    #[arg(long)]
    pub log_level: Option<String>,
}

impl AppConfig {
    /// Parse environment variables + CLI args into AppConfig.
    pub fn from_env_and_args() -> Result<Self> {
        let args = Args::parse();
        Self::from_sources(args, |key| env::var(key).ok())
    }

    /// Build the configuration from parsed CLI args and a variable lookup.
    ///
    /// Variable names are matched as given (upper case); CLI args win over
    /// the environment, the environment wins over defaults.
    pub fn from_sources<F>(args: Args, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let text = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());
        let secret = |key: &str| lookup(key).filter(|v| !v.is_empty()).map(Secret::new);

        let env_port = parse_var(&lookup, "PICTURE_SERVICE_PORT", 5000u16)?;
        let max_upload_bytes = parse_var(&lookup, "MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?;
        let use_ssl = match lookup("MINIO_USE_SSL") {
            Some(raw) => parse_bool("MINIO_USE_SSL", &raw)?,
            None => false,
        };

        let cfg = Self {
            name: text("NAME", "picture-service"),
            version: text("VERSION", env!("CARGO_PKG_VERSION")),
            api_version: text("API_VERSION", "v1"),
            description: text("DESCRIPTION", "REST API Service for Pictures"),
            log_level: args
                .log_level
                .unwrap_or_else(|| text("LOG_LEVEL", "info"))
                .to_lowercase(),
            file_storage_provider: text("FILE_STORAGE_PROVIDER", "minio").to_lowercase(),
            host: args
                .host
                .unwrap_or_else(|| text("PICTURE_SERVICE_HOST", "0.0.0.0")),
            port: args.port.unwrap_or(env_port),
            upload_bucket: text("UPLOAD_BUCKET", "pictures"),
            max_upload_bytes,
            minio: MinioConfig {
                endpoint: text("MINIO_ENDPOINT", "http://localhost:9000"),
                access_key: secret("MINIO_ACCESS_KEY"),
                secret_key: secret("MINIO_SECRET_KEY"),
                use_ssl,
                region: text("MINIO_REGION", "us-east-1"),
            },
            mongo: MongoConfig {
                uri: secret("MONGO_URI"),
                db_name: secret("MONGO_DB_NAME"),
                collection_name: secret("MONGO_COLLECTION_NAME"),
            },
        };

        for (key, value) in [
            ("NAME", &cfg.name),
            ("VERSION", &cfg.version),
            ("API_VERSION", &cfg.api_version),
            ("UPLOAD_BUCKET", &cfg.upload_bucket),
        ] {
            ensure_not_blank(key, value)?;
        }

        Ok(cfg)
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl MongoConfig {
    /// True when URI, database and collection are all set.
    pub fn is_configured(&self) -> bool {
        self.uri.is_some() && self.db_name.is_some() && self.collection_name.is_some()
    }
}

impl MinioConfig {
    /// Endpoint with a scheme; a bare `host:port` gets one based on `use_ssl`.
    pub fn endpoint_url(&self) -> String {
        let endpoint = self.endpoint.trim_end_matches('/');
        if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
            endpoint.to_string()
        } else if self.use_ssl {
            format!("https://{}", endpoint)
        } else {
            format!("http://{}", endpoint)
        }
    }
}

fn parse_var<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(value) => value
            .trim()
            .parse::<T>()
            .with_context(|| format!("parsing {} value `{}`", key, value)),
        None => Ok(default),
    }
}

fn parse_bool(key: &str, raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => bail!("parsing {} value `{}`: expected a boolean", key, raw),
    }
}

fn ensure_not_blank(key: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        bail!("{} cannot be empty or consist only of whitespace", key);
    }
    Ok(())
}
