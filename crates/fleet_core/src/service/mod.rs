//! Fleet use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into caller-facing operations.
//! - Translate affected-row counts into domain errors.

pub mod fleet_service;
