//! Prompt templates for the orchestration flow

use crate::advice::SpecialistResult;
use crate::routing::catalog::SpecialistProfile;

/// Templates for the prompts sent to the generative-language collaborator
pub struct PromptTemplate;

impl PromptTemplate {
    /// Intent-analysis prompt: names the available specialists and their
    /// responsibilities and requests a strict JSON object.
    pub fn intent_analysis(
        query: &str,
        location: Option<&str>,
        crop: Option<&str>,
        session_context: Option<&str>,
        profiles: &[SpecialistProfile],
    ) -> String {
        let specialists = profiles
            .iter()
            .map(SpecialistProfile::prompt_fragment)
            .collect::<Vec<_>>()
            .join("\n");
        let ids = profiles
            .iter()
            .map(|p| p.id.as_str())
            .collect::<Vec<_>>()
            .join("|");

        let mut prompt = format!(
            r#"Analyze this agricultural query and decide which specialists should handle it.

Query: {}
Location: {}
Crop: {}

Available specialists:
{}
"#,
            query,
            location.unwrap_or("not specified"),
            crop.unwrap_or("not specified"),
            specialists,
        );

        if let Some(context) = session_context {
            prompt.push_str(&format!("\nConversation so far:\n{}\n", context));
        }

        prompt.push_str(&format!(
            r#"
Determine:
1. Primary intent
2. Urgency level (low, medium, high, urgent)
3. Required specialists, at most two, most relevant first
4. Whether this needs real-time data

Respond with ONLY a JSON object:
{{
    "intent": "short label",
    "urgency": "low|medium|high|urgent",
    "required_specialists": ["{}"],
    "needs_realtime": true/false,
    "reasoning": "one sentence",
    "confidence": 0.0-1.0
}}"#,
            ids
        ));

        prompt
    }

    /// Generic-advice prompt used when no specialist produced a result
    pub fn generic_advice(query: &str, location: Option<&str>, crop: Option<&str>) -> String {
        format!(
            r#"The user asked: {}
Location: {}
Crop: {}

No specialist advice was available. Provide helpful, general agricultural guidance."#,
            query,
            location.unwrap_or("not specified"),
            crop.unwrap_or("not specified"),
        )
    }

    /// Synthesis prompt combining multiple specialist results into one answer
    pub fn synthesis(
        query: &str,
        location: Option<&str>,
        crop: Option<&str>,
        results: &[SpecialistResult],
    ) -> String {
        let mut prompt = format!(
            r#"Synthesize the following specialist responses into one coherent, helpful answer.

Original query: {}
Location: {}
Crop: {}

Specialist responses:
"#,
            query,
            location.unwrap_or("not specified"),
            crop.unwrap_or("not specified"),
        );

        for result in results {
            prompt.push_str(&format!(
                "\n--- {} (confidence {:.2}) ---\n{}\n",
                result.specialist, result.confidence, result.advice
            ));
        }

        prompt.push_str(
            r#"
Create an answer that addresses the query directly, combines the insights,
prioritizes the most relevant information, and gives actionable advice in a
natural tone."#,
        );

        prompt
    }

    /// Validation prompt reviewing the final answer, requesting strict JSON
    pub fn validation(query: &str, answer: &str, confidence: f64) -> String {
        format!(
            r#"Validate this agricultural advice response.

Query: {}
Answer: {}
Confidence: {:.2}

Check for relevance to the query, safety of the recommendations, and
completeness. Respond with ONLY a JSON object:
{{
    "is_valid": true/false,
    "issues": ["list of issues if any"],
    "suggested_improvements": ["list of improvements"],
    "final_confidence": 0.0-1.0
}}"#,
            query, answer, confidence
        )
    }

    /// Improvement prompt used when validation rejected the answer
    pub fn improvement(query: &str, answer: &str, issues: &[String]) -> String {
        format!(
            r#"Improve this agricultural advice response.

Original query: {}
Current answer: {}
Issues found: {}

Provide an improved, safer, and more relevant response."#,
            query,
            answer,
            issues.join("; "),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intent_prompt_names_specialists() {
        let profiles = vec![
            SpecialistProfile::new("weather", "Forecasts"),
            SpecialistProfile::new("crop", "Cultivation"),
        ];
        let prompt = PromptTemplate::intent_analysis("will it rain", None, None, None, &profiles);
        assert!(prompt.contains("- weather: Forecasts"));
        assert!(prompt.contains("weather|crop"));
    }

    #[test]
    fn test_intent_prompt_includes_session_context() {
        let profiles = vec![SpecialistProfile::new("finance", "Money")];
        let prompt = PromptTemplate::intent_analysis(
            "and my costs?",
            None,
            None,
            Some("[active=finance]"),
            &profiles,
        );
        assert!(prompt.contains("Conversation so far"));
        assert!(prompt.contains("[active=finance]"));
    }
}
