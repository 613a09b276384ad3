/// Database configuration and connection management
pub mod database;

/// Storage settings loaded from config.toml
pub mod settings;

pub use settings::{AppConfig, DriveConfig, StorageConfig};
