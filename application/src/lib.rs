//! Application layer for agri-advisor
//!
//! This crate contains use cases, port definitions, the specialist registry,
//! and the conversation session store. It depends only on the domain layer.
//!
//! The single call surface for transports is
//! [`use_cases::process_query::AdvisorService`]: it decides between the
//! continuation fast path and the full analyze/route/synthesize/validate
//! pipeline, and guarantees a well-formed reply under any collaborator
//! failure.

pub mod config;
pub mod ports;
pub mod registry;
pub mod session_store;
pub mod use_cases;

// Re-export commonly used types
pub use config::BehaviorConfig;
pub use ports::{
    language_model::{LanguageModel, LanguageModelError},
    session_cache::{CacheError, SessionCache},
    specialist::{SessionAwareSpecialist, Specialist, SpecialistError},
};
pub use registry::{RegistryError, SpecialistRegistry};
pub use session_store::SessionStore;
pub use use_cases::analyze_intent::IntentAnalyzer;
pub use use_cases::process_query::AdvisorService;
pub use use_cases::run_workflow::RunWorkflow;
