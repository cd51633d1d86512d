pub mod config_logger;
pub mod format;
pub mod logger;
pub mod retry;
