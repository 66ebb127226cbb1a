//! Conversation session domain
//!
//! State that survives across turns: the [`entities::Session`] aggregate, the
//! pure heuristics that extract entities from queries
//! ([`extraction`]), decide whether a message continues a pending conversation
//! ([`continuation`]), detect when a specialist is asking for more input
//! ([`followup`]), and maintain the rolling context summary ([`summary`]).

pub mod continuation;
pub mod entities;
pub mod extraction;
pub mod followup;
pub mod summary;
