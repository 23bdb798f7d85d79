/// Database connection and table creation
pub mod database;

/// Layered application settings (defaults, TOML file, environment)
pub mod settings;

pub use settings::{AppConfig, StorageBackend, load_app_configuration};
