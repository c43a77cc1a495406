//! Security module for caller authentication.
//!
//! This module gates every tool invocation behind a shared secret presented
//! in a request header. Discovery endpoints are exempt; the transports decide
//! which requests reach the gate.

pub mod auth;

pub use auth::{AuthError, AuthGate};
