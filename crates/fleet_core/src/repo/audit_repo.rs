//! Append-only audit trail over the `audit_log` table.
//!
//! # Invariants
//! - Rows are only ever inserted; nothing here updates or deletes them.
//! - One `append_changes` call writes all of its rows or none, and every row
//!   of the call shares one captured timestamp.

use crate::model::audit::{format_timestamp, AuditEntry};
use crate::model::vehicle::{FieldChange, VehicleField, VehicleId};
use crate::repo::vehicle_repo::{RepoError, RepoResult};
use chrono::{DateTime, Utc};
use log::error;
use rusqlite::{params, Connection, Row, Transaction, TransactionBehavior};

const AUDIT_SELECT_SQL: &str = "SELECT
    id,
    vehicle_id,
    field,
    old_value,
    new_value,
    updated_by,
    timestamp
FROM audit_log";

/// Writer and readers for vehicle change history.
pub trait AuditRepository {
    /// Records one row per change.
    ///
    /// Failures are logged and reported as `false`; they never propagate, so
    /// auditing cannot break the caller's primary write.
    fn append_changes(
        &self,
        vehicle_id: VehicleId,
        updated_by: &str,
        changes: &[FieldChange],
    ) -> bool;
    /// Latest entry by timestamp, ties broken by highest id.
    fn get_most_recent(&self) -> RepoResult<Option<AuditEntry>>;
    /// History of one vehicle, oldest first. Works for deleted vehicles too.
    fn list_for_vehicle(&self, vehicle_id: VehicleId) -> RepoResult<Vec<AuditEntry>>;
}

/// SQLite-backed audit repository.
pub struct SqliteAuditRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteAuditRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn insert_all(
        &self,
        vehicle_id: VehicleId,
        updated_by: &str,
        changes: &[FieldChange],
        timestamp: DateTime<Utc>,
    ) -> RepoResult<()> {
        let timestamp = format_timestamp(timestamp);
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO audit_log (
                    vehicle_id,
                    field,
                    old_value,
                    new_value,
                    updated_by,
                    timestamp
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            )?;
            for change in changes {
                stmt.execute(params![
                    vehicle_id,
                    change.field.as_str(),
                    change.old_value.as_str(),
                    change.new_value.as_str(),
                    updated_by,
                    timestamp.as_str(),
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }
}

impl AuditRepository for SqliteAuditRepository<'_> {
    fn append_changes(
        &self,
        vehicle_id: VehicleId,
        updated_by: &str,
        changes: &[FieldChange],
    ) -> bool {
        if changes.is_empty() {
            return true;
        }

        match self.insert_all(vehicle_id, updated_by, changes, Utc::now()) {
            Ok(()) => true,
            Err(err) => {
                error!(
                    "event=audit_append module=repo status=error vehicle_id={} entries={} error={}",
                    vehicle_id,
                    changes.len(),
                    err
                );
                false
            }
        }
    }

    fn get_most_recent(&self) -> RepoResult<Option<AuditEntry>> {
        let mut stmt = self.conn.prepare(&format!(
            "{AUDIT_SELECT_SQL} ORDER BY timestamp DESC, id DESC LIMIT 1;"
        ))?;
        let mut rows = stmt.query([])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_audit_row(row)?));
        }

        Ok(None)
    }

    fn list_for_vehicle(&self, vehicle_id: VehicleId) -> RepoResult<Vec<AuditEntry>> {
        let mut stmt = self.conn.prepare(&format!(
            "{AUDIT_SELECT_SQL} WHERE vehicle_id = ?1 ORDER BY timestamp ASC, id ASC;"
        ))?;
        let mut rows = stmt.query([vehicle_id])?;
        let mut entries = Vec::new();

        while let Some(row) = rows.next()? {
            entries.push(parse_audit_row(row)?);
        }

        Ok(entries)
    }
}

fn parse_audit_row(row: &Row<'_>) -> RepoResult<AuditEntry> {
    let field_text: String = row.get("field")?;
    let field = VehicleField::parse(&field_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid field `{field_text}` in audit_log.field"))
    })?;

    let timestamp_text: String = row.get("timestamp")?;
    let timestamp = DateTime::parse_from_rfc3339(&timestamp_text)
        .map_err(|_| {
            RepoError::InvalidData(format!(
                "invalid timestamp `{timestamp_text}` in audit_log.timestamp"
            ))
        })?
        .with_timezone(&Utc);

    Ok(AuditEntry {
        id: row.get("id")?,
        vehicle_id: row.get("vehicle_id")?,
        field,
        old_value: row.get("old_value")?,
        new_value: row.get("new_value")?,
        updated_by: row.get("updated_by")?,
        timestamp,
    })
}
