//! Specialist advice value objects
//!
//! A [`SpecialistResult`] is the uniform payload every specialist adviser
//! returns: the advice text, supporting [`Evidence`], a confidence score, and
//! optionally an [`IncompleteData`] request when the specialist needs more
//! input before it can answer properly.

use serde::{Deserialize, Serialize};

/// Urgency attached to a query or a piece of advice
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

impl Urgency {
    /// Lenient parse used on LLM output; unknown labels fall back to Medium.
    pub fn parse_lenient(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "low" => Urgency::Low,
            "high" => Urgency::High,
            "urgent" | "critical" => Urgency::Urgent,
            _ => Urgency::Medium,
        }
    }
}

impl std::fmt::Display for Urgency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Urgency::Low => "low",
            Urgency::Medium => "medium",
            Urgency::High => "high",
            Urgency::Urgent => "urgent",
        };
        write!(f, "{}", s)
    }
}

/// A supporting excerpt attached to an answer (Value Object)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Evidence {
    pub source: String,
    pub excerpt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crop: Option<String>,
}

impl Evidence {
    pub fn new(source: impl Into<String>, excerpt: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            excerpt: excerpt.into(),
            date: None,
            geo: None,
            crop: None,
        }
    }

    pub fn with_crop(mut self, crop: impl Into<String>) -> Self {
        self.crop = Some(crop.into());
        self
    }

    pub fn with_geo(mut self, geo: impl Into<String>) -> Self {
        self.geo = Some(geo.into());
        self
    }
}

/// Structured request for missing input.
///
/// When a specialist cannot answer without more data it returns its best
/// partial advice plus this payload. The session store uses its presence to
/// mark the specialist as awaiting a reply.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IncompleteData {
    /// Field names the specialist still needs (e.g. "land_size", "crop")
    pub missing: Vec<String>,
    /// Human-readable request shown to the user
    pub prompt: String,
}

/// Result of one specialist invocation (Value Object)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpecialistResult {
    /// Id of the specialist that produced this result
    pub specialist: String,
    /// Advice text; may be empty when the specialist had nothing useful
    pub advice: String,
    pub evidence: Vec<Evidence>,
    /// Confidence in [0, 1]
    pub confidence: f64,
    pub urgency: Urgency,
    /// Present when the specialist wants more input before a full answer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub incomplete_data: Option<IncompleteData>,
}

impl SpecialistResult {
    pub fn new(specialist: impl Into<String>, advice: impl Into<String>, confidence: f64) -> Self {
        Self {
            specialist: specialist.into(),
            advice: advice.into(),
            evidence: Vec::new(),
            confidence: confidence.clamp(0.0, 1.0),
            urgency: Urgency::Medium,
            incomplete_data: None,
        }
    }

    pub fn with_evidence(mut self, evidence: Vec<Evidence>) -> Self {
        self.evidence = evidence;
        self
    }

    pub fn with_urgency(mut self, urgency: Urgency) -> Self {
        self.urgency = urgency;
        self
    }

    pub fn needs_input(mut self, missing: Vec<String>, prompt: impl Into<String>) -> Self {
        self.incomplete_data = Some(IncompleteData {
            missing,
            prompt: prompt.into(),
        });
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confidence_clamped() {
        assert_eq!(SpecialistResult::new("crop", "advice", 1.4).confidence, 1.0);
        assert_eq!(SpecialistResult::new("crop", "advice", -0.2).confidence, 0.0);
    }

    #[test]
    fn test_urgency_lenient_parse() {
        assert_eq!(Urgency::parse_lenient("HIGH"), Urgency::High);
        assert_eq!(Urgency::parse_lenient("critical"), Urgency::Urgent);
        assert_eq!(Urgency::parse_lenient("whatever"), Urgency::Medium);
    }

    #[test]
    fn test_incomplete_data_round_trip() {
        let result = SpecialistResult::new("finance", "Need more info", 0.5)
            .needs_input(vec!["land_size".into()], "What is your farm size?");
        let json = serde_json::to_string(&result).unwrap();
        let back: SpecialistResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back.incomplete_data, result.incomplete_data);
    }
}
