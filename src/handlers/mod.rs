pub mod general_handlers;
pub mod picture_handlers;
