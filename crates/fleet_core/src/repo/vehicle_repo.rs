//! Vehicle repository contract and SQLite implementation.
//!
//! Also owns schema bootstrap for the whole fleet store.

use crate::db::{ensure_schema, DbError};
use crate::model::vehicle::{Vehicle, VehicleDraft, VehicleId};
use crate::model::ValidationError;
use rusqlite::{params, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

const VEHICLE_SELECT_SQL: &str = "SELECT
    id,
    company,
    model,
    kms,
    year,
    color,
    available
FROM vehicles";

pub type RepoResult<T> = Result<T, RepoError>;

/// Error shared by all fleet repositories.
#[derive(Debug)]
pub enum RepoError {
    Validation(ValidationError),
    Db(DbError),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted fleet data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::InvalidData(_) => None,
        }
    }
}

impl From<ValidationError> for RepoError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// CRUD primitives over the `vehicles` table.
pub trait VehicleRepository {
    /// Creates missing tables; a no-op once the schema is current.
    fn ensure_schema(&self) -> RepoResult<()>;
    /// Inserts a row and returns it with the storage-assigned id.
    fn create(&self, draft: &VehicleDraft) -> RepoResult<Vehicle>;
    fn get_by_id(&self, id: VehicleId) -> RepoResult<Option<Vehicle>>;
    /// Full scan. Callers must not rely on the order.
    fn list(&self) -> RepoResult<Vec<Vehicle>>;
    /// Replaces every attribute of the row keyed by `vehicle.id`.
    ///
    /// Returns `false` when no row had that id.
    fn update(&self, vehicle: &Vehicle) -> RepoResult<bool>;
    /// Returns the number of removed rows (0 or 1).
    fn delete(&self, id: VehicleId) -> RepoResult<usize>;
}

/// SQLite-backed vehicle repository.
pub struct SqliteVehicleRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteVehicleRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl VehicleRepository for SqliteVehicleRepository<'_> {
    fn ensure_schema(&self) -> RepoResult<()> {
        ensure_schema(self.conn)?;
        Ok(())
    }

    fn create(&self, draft: &VehicleDraft) -> RepoResult<Vehicle> {
        draft.validate()?;

        self.conn.execute(
            "INSERT INTO vehicles (company, model, kms, year, color, available)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                draft.company.as_str(),
                draft.model.as_str(),
                draft.kms,
                draft.year,
                draft.color.as_str(),
                bool_to_int(draft.available),
            ],
        )?;

        let id = self.conn.last_insert_rowid();
        Ok(Vehicle::from_draft(id, draft.clone()))
    }

    fn get_by_id(&self, id: VehicleId) -> RepoResult<Option<Vehicle>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{VEHICLE_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(read_vehicle_columns(row)?.into_vehicle()?));
        }

        Ok(None)
    }

    fn list(&self) -> RepoResult<Vec<Vehicle>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{VEHICLE_SELECT_SQL} ORDER BY id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut vehicles = Vec::new();

        while let Some(row) = rows.next()? {
            vehicles.push(read_vehicle_columns(row)?.into_vehicle()?);
        }

        Ok(vehicles)
    }

    fn update(&self, vehicle: &Vehicle) -> RepoResult<bool> {
        vehicle.validate()?;

        let changed = self.conn.execute(
            "UPDATE vehicles
             SET
                company = ?1,
                model = ?2,
                kms = ?3,
                year = ?4,
                color = ?5,
                available = ?6
             WHERE id = ?7;",
            params![
                vehicle.company.as_str(),
                vehicle.model.as_str(),
                vehicle.kms,
                vehicle.year,
                vehicle.color.as_str(),
                bool_to_int(vehicle.available),
                vehicle.id,
            ],
        )?;

        Ok(changed > 0)
    }

    fn delete(&self, id: VehicleId) -> RepoResult<usize> {
        let removed = self
            .conn
            .execute("DELETE FROM vehicles WHERE id = ?1;", [id])?;
        Ok(removed)
    }
}

/// Raw column values, checked before becoming a `Vehicle`.
struct VehicleColumns {
    id: VehicleId,
    company: String,
    model: String,
    kms: i64,
    year: i32,
    color: String,
    available: i64,
}

impl VehicleColumns {
    fn into_vehicle(self) -> RepoResult<Vehicle> {
        let kms = u32::try_from(self.kms).map_err(|_| {
            RepoError::InvalidData(format!(
                "invalid kms value `{}` in vehicles.kms (id {})",
                self.kms, self.id
            ))
        })?;
        let available = match self.available {
            0 => false,
            1 => true,
            other => {
                return Err(RepoError::InvalidData(format!(
                    "invalid available value `{other}` in vehicles.available (id {})",
                    self.id
                )));
            }
        };

        Ok(Vehicle {
            id: self.id,
            company: self.company,
            model: self.model,
            kms,
            year: self.year,
            color: self.color,
            available,
        })
    }
}

fn read_vehicle_columns(row: &Row<'_>) -> rusqlite::Result<VehicleColumns> {
    Ok(VehicleColumns {
        id: row.get("id")?,
        company: row.get("company")?,
        model: row.get("model")?,
        kms: row.get("kms")?,
        year: row.get("year")?,
        color: row.get("color")?,
        available: row.get("available")?,
    })
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}
