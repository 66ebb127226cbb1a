//! Intent analysis value objects

use crate::advice::Urgency;
use serde::{Deserialize, Serialize};

/// Maximum number of specialists one query may be routed to
pub const MAX_SPECIALISTS: usize = 2;

/// Classification of a query: intent label, urgency, and which specialists
/// should handle it, most relevant first (Value Object).
///
/// Produced fresh for every full-pipeline request and discarded when the
/// workflow returns; never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntentAnalysis {
    pub intent: String,
    pub urgency: Urgency,
    /// Ordered, length 1..=2 after clamping
    pub required_specialists: Vec<String>,
    /// Confidence in [0, 1]
    pub confidence: f64,
    pub reasoning: String,
    pub needs_realtime: bool,
}

impl IntentAnalysis {
    pub fn new(intent: impl Into<String>, required_specialists: Vec<String>, confidence: f64) -> Self {
        let mut analysis = Self {
            intent: intent.into(),
            urgency: Urgency::Medium,
            required_specialists,
            confidence: confidence.clamp(0.0, 1.0),
            reasoning: String::new(),
            needs_realtime: false,
        };
        analysis.clamp_specialists();
        analysis
    }

    pub fn with_reasoning(mut self, reasoning: impl Into<String>) -> Self {
        self.reasoning = reasoning.into();
        self
    }

    pub fn with_urgency(mut self, urgency: Urgency) -> Self {
        self.urgency = urgency;
        self
    }

    pub fn with_realtime(mut self, needs_realtime: bool) -> Self {
        self.needs_realtime = needs_realtime;
        self
    }

    /// Enforce the at-most-two rule, keeping the most relevant (first) entries
    pub fn clamp_specialists(&mut self) {
        self.required_specialists.truncate(MAX_SPECIALISTS);
    }
}
