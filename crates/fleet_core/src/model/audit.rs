//! Audit trail entries.
//!
//! # Invariants
//! - Entries are append-only and never mutated after creation.
//! - `vehicle_id` is a plain reference; entries outlive deleted vehicles.

use super::vehicle::{VehicleField, VehicleId};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Storage-assigned audit entry identifier.
pub type AuditEntryId = i64;

/// One recorded field-level change to one vehicle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub id: AuditEntryId,
    pub vehicle_id: VehicleId,
    pub field: VehicleField,
    pub old_value: String,
    pub new_value: String,
    /// Free-form actor label.
    pub updated_by: String,
    pub timestamp: DateTime<Utc>,
}

/// Formats a timestamp the way `audit_log.timestamp` stores it.
///
/// Fixed microsecond precision with a `Z` suffix keeps lexical and
/// chronological order identical.
pub fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Micros, true)
}
