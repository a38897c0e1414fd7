//! Modules layer - Infrastructure components for external integrations
//!
//! Contains clients for object storage, secret storage, Google auth and Gemini.

pub mod gemini;
pub mod google_auth;
pub mod secrets;
pub mod storage;
