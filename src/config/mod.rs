/// Database connection settings, connection and table bootstrap
pub mod database;

/// Generation volumes and knobs from generation.toml
pub mod generation;

pub use database::DatabaseConfig;
pub use generation::GenerationConfig;
