//! Repository layer: one repository per table.
//!
//! # Responsibility
//! - Keep SQL and row mapping inside the persistence boundary.
//! - Report affected-row counts instead of deciding not-found semantics.
//!
//! # Invariants
//! - Write paths validate input before SQL mutations.
//! - Read paths reject corrupt persisted state instead of masking it.

pub mod audit_repo;
pub mod booking_repo;
pub mod vehicle_repo;
