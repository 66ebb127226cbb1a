//! Session cache adapters

pub mod memory;
