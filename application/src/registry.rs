//! Specialist registry and dispatch
//!
//! Aggregates the pluggable specialist advisers behind one uniform
//! invocation surface. Registration order defines default execution
//! precedence; the first registered specialist doubles as the
//! general-purpose default for the fallback classifier.

use crate::ports::specialist::{SessionAwareSpecialist, Specialist, SpecialistError};
use advisor_domain::workflow::strip_specialist_suffix;
use advisor_domain::{SpecialistProfile, SpecialistResult};
use std::sync::Arc;
use thiserror::Error;

/// Errors from registry dispatch
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("Unknown specialist: {0}")]
    UnknownSpecialist(String),

    #[error(transparent)]
    Specialist(#[from] SpecialistError),
}

/// A registered specialist, wrapped per interface variant
enum SpecialistHandle {
    Stateless(Arc<dyn Specialist>),
    SessionAware(Arc<dyn SessionAwareSpecialist>),
}

impl SpecialistHandle {
    fn profile(&self) -> SpecialistProfile {
        match self {
            SpecialistHandle::Stateless(s) => s.profile(),
            SpecialistHandle::SessionAware(s) => s.profile(),
        }
    }
}

/// Registry of specialist advisers.
///
/// Constructed once at application start and passed by reference into the
/// orchestrator and entry point — there is no global registry.
#[derive(Default)]
pub struct SpecialistRegistry {
    handles: Vec<(String, SpecialistHandle)>,
}

impl SpecialistRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a stateless specialist
    pub fn register<S: Specialist + 'static>(mut self, specialist: S) -> Self {
        let id = specialist.profile().id;
        self.handles
            .push((id, SpecialistHandle::Stateless(Arc::new(specialist))));
        self
    }

    /// Register a session-aware specialist; only these receive session ids
    pub fn register_session_aware<S: SessionAwareSpecialist + 'static>(
        mut self,
        specialist: S,
    ) -> Self {
        let id = specialist.profile().id;
        self.handles
            .push((id, SpecialistHandle::SessionAware(Arc::new(specialist))));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Registered specialist ids in registration (precedence) order
    pub fn ids(&self) -> Vec<String> {
        self.handles.iter().map(|(id, _)| id.clone()).collect()
    }

    /// Catalog profiles for the intent-analysis prompt
    pub fn profiles(&self) -> Vec<SpecialistProfile> {
        self.handles.iter().map(|(_, h)| h.profile()).collect()
    }

    /// The general-purpose default: the first registered specialist
    pub fn default_specialist(&self) -> Option<&str> {
        self.handles.first().map(|(id, _)| id.as_str())
    }

    /// True when `name` (suffix-stripped) resolves to a registered specialist
    pub fn contains(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }

    fn lookup(&self, name: &str) -> Option<&SpecialistHandle> {
        let wanted = strip_specialist_suffix(name);
        self.handles
            .iter()
            .find(|(id, _)| strip_specialist_suffix(id) == wanted)
            .map(|(_, h)| h)
    }

    /// Invoke a specialist by name.
    ///
    /// The session id is forwarded only to session-aware specialists;
    /// stateless ones never see it.
    pub async fn dispatch(
        &self,
        name: &str,
        query: &str,
        location: Option<&str>,
        crop: Option<&str>,
        session_id: Option<&str>,
    ) -> Result<SpecialistResult, RegistryError> {
        let handle = self
            .lookup(name)
            .ok_or_else(|| RegistryError::UnknownSpecialist(name.to_string()))?;

        let result = match handle {
            SpecialistHandle::Stateless(s) => s.process(query, location, crop).await?,
            SpecialistHandle::SessionAware(s) => {
                // A session-aware specialist without a session still runs,
                // keyed on a throwaway id, so dispatch never fails on that.
                let sid = session_id.unwrap_or("anonymous");
                s.process(query, location, crop, sid).await?
            }
        };

        Ok(result)
    }
}
