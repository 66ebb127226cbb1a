//! Rolling conversation summary
//!
//! A cheap continuity signal for the intent analyzer: a metadata header plus
//! truncated snippets of the last few turns, capped to a fixed budget so the
//! analyzer prompt never grows with conversation length.

use crate::session::entities::Session;
use crate::session::extraction::EntityKind;

/// Character budget for the rolling summary
pub const SUMMARY_BUDGET: usize = 800;

/// Number of recent turns included in the summary
const SUMMARY_TURNS: usize = 5;

const QUERY_SNIPPET: usize = 120;
const ANSWER_SNIPPET: usize = 160;

fn snippet(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        text.to_string()
    } else {
        text.chars().take(limit).collect()
    }
}

/// Build the summary from the last [`SUMMARY_TURNS`] interactions.
///
/// Format: `[active=finance, pendingQ=2, crop=wheat, land=5 acres]` header
/// followed by alternating `U:`/`A:` snippet lines, trimmed from the front to
/// [`SUMMARY_BUDGET`] characters so the most recent turns always survive.
pub fn build_rolling_summary(session: &Session) -> String {
    let mut meta = Vec::new();
    if let Some(active) = session.active_specialist() {
        meta.push(format!("active={}", active));
    }
    if !session.pending_questions().is_empty() {
        meta.push(format!("pendingQ={}", session.pending_questions().len()));
    }
    if let Some(crop) = session.last_profile_value(EntityKind::Crop) {
        meta.push(format!("crop={}", crop));
    }
    if let Some(location) = session.last_profile_value(EntityKind::Location) {
        meta.push(format!("location={}", location));
    }
    if let Some(land) = session.last_profile_value(EntityKind::LandSize) {
        meta.push(format!("land={}", land));
    }

    let mut lines = Vec::new();
    if !meta.is_empty() {
        lines.push(format!("[{}]", meta.join(", ")));
    }

    let history = session.history();
    let start = history.len().saturating_sub(SUMMARY_TURNS);
    for turn in &history[start..] {
        if !turn.query.is_empty() {
            lines.push(format!("U: {}", snippet(&turn.query, QUERY_SNIPPET)));
        }
        if !turn.response.advice.is_empty() {
            lines.push(format!("A: {}", snippet(&turn.response.advice, ANSWER_SNIPPET)));
        }
    }

    let text = lines.join("\n");
    let count = text.chars().count();
    if count > SUMMARY_BUDGET {
        text.chars().skip(count - SUMMARY_BUDGET).collect()
    } else {
        text
    }
}
