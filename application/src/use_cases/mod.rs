//! Use Cases (application services)

pub mod analyze_intent;
pub mod process_query;
pub mod run_workflow;
