//! Specialist catalog entries
//!
//! Each registered specialist describes itself with a [`SpecialistProfile`].
//! The profiles feed the intent-analysis prompt, so the language model learns
//! the responsibilities from registration rather than from hardcoded text.

use serde::{Deserialize, Serialize};

/// Self-description of a specialist adviser (Value Object)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpecialistProfile {
    /// Stable identifier used in routing decisions (e.g. "finance")
    pub id: String,
    /// One-sentence responsibility statement
    pub description: String,
    /// Example queries this specialist handles well
    pub examples: Vec<String>,
}

impl SpecialistProfile {
    pub fn new(id: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
            examples: Vec::new(),
        }
    }

    pub fn with_example(mut self, example: impl Into<String>) -> Self {
        self.examples.push(example.into());
        self
    }

    /// Render the profile as a prompt fragment
    pub fn prompt_fragment(&self) -> String {
        if self.examples.is_empty() {
            format!("- {}: {}", self.id, self.description)
        } else {
            format!(
                "- {}: {} (e.g. {})",
                self.id,
                self.description,
                self.examples.join("; ")
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_fragment_with_examples() {
        let profile = SpecialistProfile::new("weather", "Forecasts and irrigation timing")
            .with_example("Will it rain this week?");
        assert_eq!(
            profile.prompt_fragment(),
            "- weather: Forecasts and irrigation timing (e.g. Will it rain this week?)"
        );
    }
}
