//! Specialist adviser ports
//!
//! Two explicit interface variants instead of runtime signature inspection:
//! [`Specialist`] for stateless advisers and [`SessionAwareSpecialist`] for
//! those that accumulate per-session state (e.g. a data-collection form).
//! The registry selects the variant at registration, so stateless advisers
//! keep the simpler contract and never see a session id.

use advisor_domain::{SpecialistProfile, SpecialistResult};
use async_trait::async_trait;
use thiserror::Error;

/// Errors from specialist execution
#[derive(Error, Debug)]
pub enum SpecialistError {
    #[error("Specialist execution failed: {0}")]
    ExecutionFailed(String),

    #[error("Required data unavailable: {0}")]
    DataUnavailable(String),
}

/// A stateless specialist adviser
#[async_trait]
pub trait Specialist: Send + Sync {
    /// Catalog entry describing this specialist for routing
    fn profile(&self) -> SpecialistProfile;

    async fn process(
        &self,
        query: &str,
        location: Option<&str>,
        crop: Option<&str>,
    ) -> Result<SpecialistResult, SpecialistError>;
}

/// A specialist adviser that keeps per-session state
#[async_trait]
pub trait SessionAwareSpecialist: Send + Sync {
    /// Catalog entry describing this specialist for routing
    fn profile(&self) -> SpecialistProfile;

    async fn process(
        &self,
        query: &str,
        location: Option<&str>,
        crop: Option<&str>,
        session_id: &str,
    ) -> Result<SpecialistResult, SpecialistError>;
}
