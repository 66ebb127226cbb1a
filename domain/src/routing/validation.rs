//! Validation-pass value objects

use serde::{Deserialize, Serialize};

/// Outcome of the quality/safety review over a synthesized answer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationReport {
    pub is_valid: bool,
    pub issues: Vec<String>,
    pub suggested_improvements: Vec<String>,
    /// Reviewer's confidence override; `None` keeps the pre-validation value
    pub final_confidence: Option<f64>,
}

impl ValidationReport {
    /// Permissive default used when the reviewer's output is unusable
    pub fn pass_through() -> Self {
        Self {
            is_valid: true,
            issues: Vec::new(),
            suggested_improvements: Vec::new(),
            final_confidence: None,
        }
    }
}
