//! Follow-up question detection on specialist responses
//!
//! A specialist that needs more input either attaches a structured
//! incomplete-data payload or phrases a request inside its advice text.
//! Either form marks it as the active specialist awaiting a reply.

use crate::advice::SpecialistResult;
use regex::Regex;

/// Phrases that indicate a specialist is asking the user for information
const REQUEST_INDICATORS: &[&str] = &[
    "please share",
    "please provide",
    "need more",
    "can you tell",
    "what is your",
    "how much",
    "how many",
    "which type",
    "provide details",
    "information:",
    "details:",
    "questions:",
];

/// True when the response asks the user for more input.
///
/// An [`crate::advice::IncompleteData`] payload is authoritative; otherwise
/// the advice text is scanned for request-for-information phrasing.
pub fn response_requests_information(result: &SpecialistResult) -> bool {
    if result.incomplete_data.is_some() {
        return true;
    }
    let lower = result.advice.to_lowercase();
    REQUEST_INDICATORS.iter().any(|p| lower.contains(p))
}

/// Extract the individual questions a specialist is asking from its advice
/// text: numbered lines, bullet points, and bare lines ending in `?`.
pub fn extract_pending_questions(advice: &str) -> Vec<String> {
    // Numbered ("1. ...") and bulleted ("• ..." / "- ...") lines
    let patterns = [
        Regex::new(r"(?m)^\s*\d+\.\s*(.+)$").unwrap(),
        Regex::new(r"(?m)^\s*[•\-]\s*(.+)$").unwrap(),
    ];

    let mut questions = Vec::new();
    for pattern in &patterns {
        for cap in pattern.captures_iter(advice) {
            let q = cap[1].trim().trim_matches('*').trim().to_string();
            if !q.is_empty() && !questions.contains(&q) {
                questions.push(q);
            }
        }
    }

    // Bare interrogative lines not already captured
    for line in advice.lines() {
        let line = line.trim();
        if line.ends_with('?') && !questions.iter().any(|q| line.contains(q.as_str())) {
            questions.push(line.to_string());
        }
    }

    questions
}
