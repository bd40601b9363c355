//! Acolhe connects volunteer psychologists with patients looking for care.
//!
//! The crate hosts the request review workflow (a psychologist triaging the
//! pending patient requests), the collaborator contracts it orchestrates, and
//! the ambient config/telemetry plumbing shared with the API service.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
