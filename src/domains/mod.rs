//! Domains module containing business logic organized by bounded contexts.
//!
//! - **tools**: the tool catalog, validation and dispatch
//! - **backend**: the remote backlog API the tools forward to

pub mod backend;
pub mod tools;
