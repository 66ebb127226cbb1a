//! Deterministic fallback classifier
//!
//! Always-available routing when the language model is absent or returns
//! garbage. Keyword tables map domain vocabulary to one specialist; the first
//! matching category wins, checked most-specific first (policy vocabulary
//! overlaps everything else, so it goes first). Confidence is capped at 0.6
//! to signal lower trust than an LLM classification.

use crate::advice::Urgency;
use crate::routing::intent::IntentAnalysis;

/// Confidence assigned to fallback classifications
pub const FALLBACK_CONFIDENCE: f64 = 0.6;

const POLICY_KEYWORDS: &[&str] = &[
    "subsidy", "subsidies", "scheme", "schemes", "policy", "policies", "government", "benefit",
    "grant", "allowance", "pm kisan", "pm-kisan", "pmkisan", "pradhan mantri", "nabard",
    "eligible", "eligibility", "apply", "application", "registration", "enroll", "kisan credit",
    "crop insurance", "fasal bima", "pension", "msp", "minimum support",
];

const WEATHER_KEYWORDS: &[&str] = &[
    "weather", "rain", "rainfall", "drought", "temperature", "forecast", "storm", "cyclone",
    "humidity", "wind", "climate", "monsoon", "precipitation", "heat", "cold", "irrigation",
    "irrigate", "alert", "warning",
];

const FINANCE_KEYWORDS: &[&str] = &[
    "price", "prices", "market", "mandi", "rate", "rates", "cost", "costs", "loan", "credit",
    "bank", "finance", "finances", "financial", "money", "investment", "profit", "selling",
    "income", "expense", "budget",
];

const CROP_KEYWORDS: &[&str] = &[
    "fertilizer", "fertiliser", "npk", "urea", "pest", "pests", "disease", "diseases", "plant",
    "planting", "sow", "sowing", "transplant", "spacing", "growth", "harvest", "seed", "seeds",
    "variety", "soil",
];

/// Categories in priority order, with the intent label each maps to
const CATEGORIES: &[(&str, &str, &[&str])] = &[
    ("policy", "policy", POLICY_KEYWORDS),
    ("weather", "weather", WEATHER_KEYWORDS),
    ("finance", "finance", FINANCE_KEYWORDS),
    ("crop", "crop_management", CROP_KEYWORDS),
];

/// Classify a query by keyword tables alone.
///
/// `available` is the set of registered specialist ids; categories without a
/// registered specialist are skipped. `default_specialist` (normally the
/// first registered, general-purpose one) is used when nothing matches, so
/// the result always names at least one specialist.
pub fn fallback_analysis(
    query: &str,
    available: &[String],
    default_specialist: &str,
) -> IntentAnalysis {
    let lower = query.to_lowercase();

    for (specialist, intent, keywords) in CATEGORIES {
        if !available.iter().any(|a| a == specialist) {
            continue;
        }
        if keywords.iter().any(|k| lower.contains(k)) {
            return IntentAnalysis::new(*intent, vec![specialist.to_string()], FALLBACK_CONFIDENCE)
                .with_urgency(Urgency::Medium)
                .with_realtime(*specialist == "weather")
                .with_reasoning(format!("keyword match for {} vocabulary", specialist));
        }
    }

    IntentAnalysis::new(
        "general",
        vec![default_specialist.to_string()],
        FALLBACK_CONFIDENCE,
    )
    .with_reasoning("no category matched; using general-purpose specialist")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all() -> Vec<String> {
        ["finance", "weather", "crop", "policy"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    #[test]
    fn test_finance_vocabulary_routes_to_finance() {
        let analysis = fallback_analysis("I need help with my farm finances", &all(), "crop");
        assert_eq!(analysis.required_specialists, vec!["finance"]);
        assert!(analysis.confidence <= FALLBACK_CONFIDENCE);
    }

    #[test]
    fn test_weather_vocabulary_routes_to_weather() {
        let analysis = fallback_analysis("Will it rain this week?", &all(), "crop");
        assert_eq!(analysis.required_specialists, vec!["weather"]);
        assert!(analysis.needs_realtime);
    }

    #[test]
    fn test_policy_beats_finance_on_overlap() {
        // "loan" is finance vocabulary but "subsidy scheme" is policy; policy
        // is checked first as the more specific category.
        let analysis = fallback_analysis("subsidy scheme for a tractor loan", &all(), "crop");
        assert_eq!(analysis.required_specialists, vec!["policy"]);
    }

    #[test]
    fn test_no_match_uses_default_specialist() {
        let analysis = fallback_analysis("hello there", &all(), "crop");
        assert_eq!(analysis.required_specialists, vec!["crop"]);
        assert_eq!(analysis.intent, "general");
    }

    #[test]
    fn test_unregistered_category_is_skipped() {
        let available = vec!["finance".to_string()];
        let analysis = fallback_analysis("will it rain on my market stall", &available, "finance");
        assert_eq!(analysis.required_specialists, vec!["finance"]);
    }

    #[test]
    fn test_result_is_never_empty() {
        let analysis = fallback_analysis("", &all(), "crop");
        assert!(!analysis.required_specialists.is_empty());
    }
}
