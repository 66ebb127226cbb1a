//! Configuration infrastructure

pub mod file_config;
pub mod loader;

pub use file_config::{FileBehaviorConfig, FileConfig, FileModelConfig, FileWeatherConfig};
pub use loader::ConfigLoader;
