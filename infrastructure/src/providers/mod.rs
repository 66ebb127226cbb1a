//! Generative-language provider adapters

pub mod gemini;
