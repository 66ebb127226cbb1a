//! Defensive parsing of LLM output
//!
//! Language models asked for strict JSON still wrap it in markdown fences,
//! prepend prose, or drift from the schema. These functions extract what they
//! can and return `None` on anything unusable; callers substitute a
//! rule-based default of the same shape instead of failing the pipeline.

use crate::advice::Urgency;
use crate::routing::intent::IntentAnalysis;
use crate::routing::validation::ValidationReport;
use serde_json::Value;

/// Locate and parse the outermost JSON object in free-form text.
///
/// Strips markdown code fences first, then takes the span from the first `{`
/// to the last `}`.
pub fn extract_json_object(text: &str) -> Option<Value> {
    let cleaned = strip_code_fences(text);
    let start = cleaned.find('{')?;
    let end = cleaned.rfind('}')?;
    if end < start {
        return None;
    }
    serde_json::from_str(&cleaned[start..=end]).ok()
}

fn strip_code_fences(text: &str) -> String {
    text.lines()
        .filter(|line| !line.trim_start().starts_with("```"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn string_field(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(Value::as_str).map(str::to_string)
}

fn string_list(value: &Value, key: &str) -> Option<Vec<String>> {
    let items = value.get(key)?.as_array()?;
    Some(
        items
            .iter()
            .filter_map(Value::as_str)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),
    )
}

fn specialist_list(value: &Value, key: &str) -> Option<Vec<String>> {
    string_list(value, key).map(|v| v.into_iter().map(|s| s.to_lowercase()).collect())
}

/// Parse an intent-analysis response.
///
/// Accepts both `required_specialists` and the legacy `required_agents` key.
/// Returns `None` when there is no JSON object or no specialist list at all;
/// missing scalar fields get defaults. The specialist list is clamped to two.
pub fn parse_intent_response(text: &str) -> Option<IntentAnalysis> {
    let value = extract_json_object(text)?;

    let specialists = specialist_list(&value, "required_specialists")
        .or_else(|| specialist_list(&value, "required_agents"))?;
    if specialists.is_empty() {
        return None;
    }

    let intent = string_field(&value, "intent").unwrap_or_else(|| "general".to_string());
    let urgency = string_field(&value, "urgency")
        .map(|s| Urgency::parse_lenient(&s))
        .unwrap_or_default();
    let confidence = value
        .get("confidence")
        .and_then(Value::as_f64)
        .unwrap_or(0.7);
    let needs_realtime = value
        .get("needs_realtime")
        .and_then(Value::as_bool)
        .unwrap_or(false);
    let reasoning = string_field(&value, "reasoning")
        .or_else(|| string_field(&value, "constraints"))
        .unwrap_or_default();

    Some(
        IntentAnalysis::new(intent, specialists, confidence)
            .with_urgency(urgency)
            .with_realtime(needs_realtime)
            .with_reasoning(reasoning),
    )
}

/// Parse a validation-pass response.
///
/// Returns `None` when no JSON object can be located; individual missing
/// fields default to the permissive side (`is_valid: true`, no issues).
pub fn parse_validation_response(text: &str) -> Option<ValidationReport> {
    let value = extract_json_object(text)?;

    Some(ValidationReport {
        is_valid: value.get("is_valid").and_then(Value::as_bool).unwrap_or(true),
        issues: string_list(&value, "issues").unwrap_or_default(),
        suggested_improvements: string_list(&value, "suggested_improvements").unwrap_or_default(),
        final_confidence: value.get("final_confidence").and_then(Value::as_f64),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_plain_object() {
        let value = extract_json_object(r#"{"intent": "weather"}"#).unwrap();
        assert_eq!(value["intent"], "weather");
    }

    #[test]
    fn test_extract_fenced_object() {
        let text = "Here is the analysis:\n```json\n{\"intent\": \"finance\"}\n```\nDone.";
        let value = extract_json_object(text).unwrap();
        assert_eq!(value["intent"], "finance");
    }

    #[test]
    fn test_extract_rejects_braceless_text() {
        assert!(extract_json_object("no json here").is_none());
    }

    #[test]
    fn test_parse_intent_full_shape() {
        let text = r#"{
            "intent": "weather",
            "urgency": "high",
            "required_agents": ["weather", "crop"],
            "needs_realtime": true,
            "confidence": 0.9
        }"#;
        let analysis = parse_intent_response(text).unwrap();
        assert_eq!(analysis.intent, "weather");
        assert_eq!(analysis.urgency, Urgency::High);
        assert_eq!(analysis.required_specialists, vec!["weather", "crop"]);
        assert!(analysis.needs_realtime);
        assert_eq!(analysis.confidence, 0.9);
    }

    #[test]
    fn test_parse_intent_clamps_to_two_specialists() {
        let text = r#"{"required_specialists": ["a", "b", "c"], "confidence": 0.8}"#;
        let analysis = parse_intent_response(text).unwrap();
        assert_eq!(analysis.required_specialists.len(), 2);
    }

    #[test]
    fn test_parse_intent_rejects_missing_specialists() {
        assert!(parse_intent_response(r#"{"intent": "weather"}"#).is_none());
        assert!(parse_intent_response("not json at all").is_none());
        assert!(parse_intent_response(r#"{"required_agents": []}"#).is_none());
    }

    #[test]
    fn test_parse_validation_full_shape() {
        let text = r#"{
            "is_valid": false,
            "issues": ["too vague"],
            "suggested_improvements": ["add dosage"],
            "final_confidence": 0.55
        }"#;
        let report = parse_validation_response(text).unwrap();
        assert!(!report.is_valid);
        assert_eq!(report.issues, vec!["too vague"]);
        assert_eq!(report.final_confidence, Some(0.55));
    }

    #[test]
    fn test_parse_validation_defaults_permissive() {
        let report = parse_validation_response("{}").unwrap();
        assert!(report.is_valid);
        assert!(report.issues.is_empty());
        assert!(report.final_confidence.is_none());
    }
}
