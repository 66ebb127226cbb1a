//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure adapters must implement.

pub mod language_model;
pub mod session_cache;
pub mod specialist;
