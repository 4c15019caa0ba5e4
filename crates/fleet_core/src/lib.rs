//! Fleet data-and-audit core.
//!
//! Owns vehicle records, their append-only change history, rental bookings
//! and the aggregate queries over them. Transport and conversational layers
//! live elsewhere and call into `FleetService`.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::{ConfigError, FleetConfig};
pub use logging::{default_log_level, init_logging, logging_status, LogSettings, LoggingError};
pub use model::audit::{AuditEntry, AuditEntryId};
pub use model::booking::{Booking, BookingDraft, BookingId, CustomerId, TopCustomer, TopModel};
pub use model::vehicle::{FieldChange, Vehicle, VehicleDraft, VehicleField, VehicleId};
pub use model::ValidationError;
pub use repo::audit_repo::{AuditRepository, SqliteAuditRepository};
pub use repo::booking_repo::{BookingRepository, SqliteBookingRepository};
pub use repo::vehicle_repo::{RepoError, RepoResult, SqliteVehicleRepository, VehicleRepository};
pub use service::fleet_service::{
    AuditStatus, FleetError, FleetResult, FleetService, LastUpdate, VehicleDeleted, VehicleUpdate,
    DEFAULT_AUDIT_ACTOR,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
