//! Query routing domain
//!
//! Classification of a query into an [`intent::IntentAnalysis`]: which
//! specialists to consult and in what order. The LLM-backed path lives in the
//! application layer; this module holds the value objects, the deterministic
//! keyword fallback, and the defensive parsing of LLM output.

pub mod catalog;
pub mod fallback;
pub mod intent;
pub mod parsing;
pub mod validation;
