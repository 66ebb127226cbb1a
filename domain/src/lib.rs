//! Domain layer for agri-advisor
//!
//! This crate contains the core business logic, entities, and value objects.
//! It has no dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Sessions
//!
//! A [`Session`] carries conversational state across turns: the interaction
//! history, the specialist currently awaiting a reply, the questions it asked,
//! and an accumulated profile of everything the user has told us. The
//! continuation heuristics in [`session`] decide whether a new message answers
//! a pending question or opens a new topic.
//!
//! ## Routing and workflow
//!
//! [`routing`] classifies a query into an [`IntentAnalysis`] (which specialists
//! to consult, in what order). [`workflow`] holds the transient per-request
//! [`WorkflowState`] that the orchestrator threads through analysis, specialist
//! execution, synthesis, and validation.

pub mod advice;
pub mod prompt;
pub mod routing;
pub mod session;
pub mod workflow;

// Re-export commonly used types
pub use advice::{Evidence, IncompleteData, SpecialistResult, Urgency};
pub use prompt::PromptTemplate;
pub use routing::{
    catalog::SpecialistProfile,
    fallback::fallback_analysis,
    intent::IntentAnalysis,
    parsing::{extract_json_object, parse_intent_response, parse_validation_response},
    validation::ValidationReport,
};
pub use session::{
    continuation::{
        ContinuationClassifier, ContinuationDecision, HeuristicContinuationClassifier,
    },
    entities::{Interaction, Session},
    extraction::{EntityExtractor, EntityKind, ExtractedEntities, RegexEntityExtractor},
    followup::{extract_pending_questions, response_requests_information},
    summary::build_rolling_summary,
};
pub use workflow::{
    AdvisorReply, ConversationSnapshot, QueryRequest, WorkflowState, WorkflowStep,
    strip_specialist_suffix,
};
