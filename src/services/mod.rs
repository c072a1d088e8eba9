pub mod minio_storage;
pub mod picture_service;
pub mod storage_service;
