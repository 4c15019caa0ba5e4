//! Fleet orchestration service.
//!
//! # Responsibility
//! - Enforce identity and existence rules for vehicles.
//! - Diff vehicle updates and record them in the audit trail.
//! - Expose booking writes and rental analytics.
//!
//! # Invariants
//! - Never touches storage directly; every call goes through a repository.
//! - Every operation ensures the schema exists before doing anything else.
//! - A primary write that committed is reported as success even when its
//!   audit rows could not be written; `AuditStatus::Failed` carries that fact.
//! - Update re-checks the affected row count, so a row deleted between the
//!   read and the write yields `NotFound` instead of a silent no-op.

use crate::model::audit::AuditEntry;
use crate::model::booking::{Booking, BookingDraft, TopCustomer, TopModel};
use crate::model::vehicle::{FieldChange, Vehicle, VehicleDraft, VehicleId};
use crate::model::ValidationError;
use crate::repo::audit_repo::{AuditRepository, SqliteAuditRepository};
use crate::repo::booking_repo::{BookingRepository, SqliteBookingRepository};
use crate::repo::vehicle_repo::{RepoError, SqliteVehicleRepository, VehicleRepository};
use log::{info, warn};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Actor label recorded for changes computed by `update_vehicle`.
pub const DEFAULT_AUDIT_ACTOR: &str = "system";

pub type FleetResult<T> = Result<T, FleetError>;

/// Caller-facing error for fleet operations.
#[derive(Debug)]
pub enum FleetError {
    /// A vehicle with the requested id already exists.
    Conflict(VehicleId),
    /// Target vehicle does not exist (or vanished mid-update).
    NotFound(VehicleId),
    /// Input rejected before persistence.
    Validation(ValidationError),
    /// Explicit audit write could not be recorded.
    Internal(String),
    /// Storage failure, passed through unchanged.
    Repo(RepoError),
}

impl Display for FleetError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Conflict(id) => write!(f, "vehicle already exists: {id}"),
            Self::NotFound(id) => write!(f, "vehicle not found: {id}"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::Internal(message) => write!(f, "internal error: {message}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for FleetError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for FleetError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Validation(err) => Self::Validation(err),
            other => Self::Repo(other),
        }
    }
}

impl From<ValidationError> for FleetError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

/// What happened to the audit side effect of an update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "entries", rename_all = "snake_case")]
pub enum AuditStatus {
    /// Replacement matched the stored row; nothing to record.
    NoChanges,
    /// This many audit rows were written.
    Recorded(usize),
    /// The update committed but its audit rows were not written.
    Failed,
}

/// Result of a successful `update_vehicle` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleUpdate {
    pub vehicle: Vehicle,
    pub changes: Vec<FieldChange>,
    pub audit: AuditStatus,
}

impl VehicleUpdate {
    pub fn audit_failed(&self) -> bool {
        self.audit == AuditStatus::Failed
    }
}

/// Confirmation of a successful delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleDeleted {
    pub id: VehicleId,
}

impl Display for VehicleDeleted {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "vehicle with id {} deleted successfully", self.id)
    }
}

/// Most recent audit entry joined with the vehicle it points to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LastUpdate {
    Found { vehicle: Vehicle, change: AuditEntry },
    /// The entry outlived its vehicle.
    VehicleGone { change: AuditEntry },
    /// No vehicle has ever been updated.
    NoHistory,
}

/// Orchestrates vehicle, audit and booking repositories.
pub struct FleetService<V, A, B>
where
    V: VehicleRepository,
    A: AuditRepository,
    B: BookingRepository,
{
    vehicles: V,
    audit: A,
    bookings: B,
    audit_actor: String,
}

impl<'conn>
    FleetService<
        SqliteVehicleRepository<'conn>,
        SqliteAuditRepository<'conn>,
        SqliteBookingRepository<'conn>,
    >
{
    /// Builds the SQLite repository trio over one connection.
    pub fn from_connection(conn: &'conn Connection) -> Self {
        Self::new(
            SqliteVehicleRepository::new(conn),
            SqliteAuditRepository::new(conn),
            SqliteBookingRepository::new(conn),
        )
    }
}

impl<V, A, B> FleetService<V, A, B>
where
    V: VehicleRepository,
    A: AuditRepository,
    B: BookingRepository,
{
    pub fn new(vehicles: V, audit: A, bookings: B) -> Self {
        Self {
            vehicles,
            audit,
            bookings,
            audit_actor: DEFAULT_AUDIT_ACTOR.to_string(),
        }
    }

    /// Overrides the actor label recorded by `update_vehicle`.
    pub fn with_audit_actor(mut self, actor: impl Into<String>) -> Self {
        self.audit_actor = actor.into();
        self
    }

    pub fn audit_actor(&self) -> &str {
        &self.audit_actor
    }

    /// Creates a vehicle.
    ///
    /// `requested_id` is only probed for duplicates; storage assigns the id
    /// of the new row.
    pub fn create_vehicle(
        &self,
        requested_id: Option<VehicleId>,
        draft: &VehicleDraft,
    ) -> FleetResult<Vehicle> {
        self.vehicles.ensure_schema()?;
        draft.validate()?;

        if let Some(id) = requested_id {
            if self.vehicles.get_by_id(id)?.is_some() {
                warn!("event=vehicle_create module=service status=conflict vehicle_id={id}");
                return Err(FleetError::Conflict(id));
            }
        }

        let vehicle = self.vehicles.create(draft)?;
        info!(
            "event=vehicle_create module=service status=ok vehicle_id={}",
            vehicle.id
        );
        Ok(vehicle)
    }

    pub fn get_all_vehicles(&self) -> FleetResult<Vec<Vehicle>> {
        self.vehicles.ensure_schema()?;
        Ok(self.vehicles.list()?)
    }

    pub fn get_vehicle(&self, id: VehicleId) -> FleetResult<Vehicle> {
        self.vehicles.ensure_schema()?;
        self.vehicles.get_by_id(id)?.ok_or(FleetError::NotFound(id))
    }

    /// Replaces every attribute of vehicle `id` and audits the differences.
    ///
    /// # Contract
    /// - Missing vehicle: `NotFound`, no audit rows.
    /// - Row removed between read and write: `NotFound`, no audit rows.
    /// - No differing fields: success with `AuditStatus::NoChanges`.
    /// - Audit write failure: success with `AuditStatus::Failed`.
    pub fn update_vehicle(
        &self,
        id: VehicleId,
        draft: &VehicleDraft,
    ) -> FleetResult<VehicleUpdate> {
        self.vehicles.ensure_schema()?;
        draft.validate()?;

        let current = self
            .vehicles
            .get_by_id(id)?
            .ok_or(FleetError::NotFound(id))?;
        let replacement = Vehicle::from_draft(id, draft.clone());
        let changes = current.diff(&replacement);

        if !self.vehicles.update(&replacement)? {
            warn!("event=vehicle_update module=service status=lost_race vehicle_id={id}");
            return Err(FleetError::NotFound(id));
        }

        let audit = if changes.is_empty() {
            AuditStatus::NoChanges
        } else if self.audit.append_changes(id, &self.audit_actor, &changes) {
            AuditStatus::Recorded(changes.len())
        } else {
            warn!(
                "event=vehicle_update module=service status=audit_failed vehicle_id={id} changes={}",
                changes.len()
            );
            AuditStatus::Failed
        };

        info!(
            "event=vehicle_update module=service status=ok vehicle_id={id} changes={}",
            changes.len()
        );
        Ok(VehicleUpdate {
            vehicle: replacement,
            changes,
            audit,
        })
    }

    pub fn delete_vehicle(&self, id: VehicleId) -> FleetResult<VehicleDeleted> {
        self.vehicles.ensure_schema()?;

        if self.vehicles.delete(id)? == 0 {
            return Err(FleetError::NotFound(id));
        }

        info!("event=vehicle_delete module=service status=ok vehicle_id={id}");
        Ok(VehicleDeleted { id })
    }

    /// Joins the latest audit entry with a fresh read of its vehicle.
    pub fn get_last_updated_vehicle(&self) -> FleetResult<LastUpdate> {
        self.vehicles.ensure_schema()?;

        let Some(change) = self.audit.get_most_recent()? else {
            return Ok(LastUpdate::NoHistory);
        };

        match self.vehicles.get_by_id(change.vehicle_id)? {
            Some(vehicle) => Ok(LastUpdate::Found { vehicle, change }),
            None => Ok(LastUpdate::VehicleGone { change }),
        }
    }

    /// Audit history of one vehicle, oldest first. Deleted vehicles keep theirs.
    pub fn vehicle_history(&self, id: VehicleId) -> FleetResult<Vec<AuditEntry>> {
        self.vehicles.ensure_schema()?;
        Ok(self.audit.list_for_vehicle(id)?)
    }

    /// Records caller-computed changes directly.
    ///
    /// Unlike `update_vehicle`, an audit failure here is an error. Returns the
    /// number of entries written.
    pub fn log_update(
        &self,
        id: VehicleId,
        actor: &str,
        changes: &[FieldChange],
    ) -> FleetResult<usize> {
        self.vehicles.ensure_schema()?;

        if !self.audit.append_changes(id, actor, changes) {
            return Err(FleetError::Internal(format!(
                "failed to record {} audit entries for vehicle {id}",
                changes.len()
            )));
        }

        Ok(changes.len())
    }

    /// Stores a booking.
    ///
    /// The referenced vehicle is neither required to exist nor to be
    /// available; callers that need those checks make them first.
    pub fn create_booking(&self, draft: &BookingDraft) -> FleetResult<Booking> {
        self.vehicles.ensure_schema()?;
        draft.validate()?;

        let booking = self.bookings.insert(draft)?;
        info!(
            "event=booking_create module=service status=ok booking_id={} vehicle_id={}",
            booking.id, booking.vehicle_id
        );
        Ok(booking)
    }

    pub fn list_bookings(&self) -> FleetResult<Vec<Booking>> {
        self.vehicles.ensure_schema()?;
        Ok(self.bookings.list()?)
    }

    /// `None` means there are no bookings yet.
    pub fn customer_with_most_rentals(&self) -> FleetResult<Option<TopCustomer>> {
        self.vehicles.ensure_schema()?;
        Ok(self.bookings.customer_with_most_bookings()?)
    }

    /// `None` means no booking references an existing vehicle.
    pub fn most_rented_model(&self) -> FleetResult<Option<TopModel>> {
        self.vehicles.ensure_schema()?;
        Ok(self.bookings.model_with_most_bookings()?)
    }
}
