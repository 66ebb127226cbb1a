//! Built-in specialist advisers
//!
//! Four advisers cover the routing catalog: crop cultivation, weather,
//! farm finance, and government schemes. All are deterministic knowledge-base
//! adapters except weather's optional realtime fetch and finance's optional
//! model-written summary; the orchestrator treats them uniformly through the
//! registry.

pub mod crop;
pub mod finance;
pub mod policy;
pub mod weather;
