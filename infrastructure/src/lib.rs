//! Infrastructure layer for agri-advisor
//!
//! External adapters behind the application ports: the Gemini
//! generative-language gateway, the built-in specialists, the in-memory
//! session cache, and file configuration loading.

pub mod cache;
pub mod config;
pub mod providers;
pub mod specialists;

pub use cache::memory::InMemorySessionCache;
pub use config::{ConfigLoader, FileConfig};
pub use providers::gemini::GeminiLanguageModel;
pub use specialists::{
    crop::CropSpecialist, finance::FinanceSpecialist, policy::PolicySpecialist,
    weather::WeatherSpecialist,
};
