//! Booking repository contract and SQLite implementation.
//!
//! # Invariants
//! - Bookings are insert-only.
//! - Aggregates are deterministic on ties: lowest customer id, then
//!   lexicographically smallest model name.
//! - Bookings whose vehicle no longer exists do not count toward a model.

use crate::model::booking::{Booking, BookingDraft, TopCustomer, TopModel};
use crate::repo::vehicle_repo::{RepoError, RepoResult};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::str::FromStr;

const DATE_FORMAT: &str = "%Y-%m-%d";

const BOOKING_SELECT_SQL: &str = "SELECT
    id,
    customer_id,
    vehicle_id,
    start_date,
    end_date,
    total_price
FROM bookings";

/// Insert and aggregate-read primitives over the `bookings` table.
pub trait BookingRepository {
    /// Inserts a booking and returns it with the storage-assigned id.
    fn insert(&self, draft: &BookingDraft) -> RepoResult<Booking>;
    fn list(&self) -> RepoResult<Vec<Booking>>;
    /// `None` when there are no bookings at all.
    fn customer_with_most_bookings(&self) -> RepoResult<Option<TopCustomer>>;
    /// `None` when no booking resolves to an existing vehicle.
    fn model_with_most_bookings(&self) -> RepoResult<Option<TopModel>>;
}

/// SQLite-backed booking repository.
pub struct SqliteBookingRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteBookingRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl BookingRepository for SqliteBookingRepository<'_> {
    fn insert(&self, draft: &BookingDraft) -> RepoResult<Booking> {
        draft.validate()?;

        self.conn.execute(
            "INSERT INTO bookings (
                customer_id,
                vehicle_id,
                start_date,
                end_date,
                total_price
            ) VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                draft.customer_id,
                draft.vehicle_id,
                draft.start_date.format(DATE_FORMAT).to_string(),
                draft.end_date.format(DATE_FORMAT).to_string(),
                draft.total_price.to_string(),
            ],
        )?;

        let id = self.conn.last_insert_rowid();
        Ok(Booking::from_draft(id, draft.clone()))
    }

    fn list(&self) -> RepoResult<Vec<Booking>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{BOOKING_SELECT_SQL} ORDER BY id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut bookings = Vec::new();

        while let Some(row) = rows.next()? {
            bookings.push(parse_booking_row(row)?);
        }

        Ok(bookings)
    }

    fn customer_with_most_bookings(&self) -> RepoResult<Option<TopCustomer>> {
        let top = self
            .conn
            .query_row(
                "SELECT customer_id, COUNT(*) AS bookings
                 FROM bookings
                 GROUP BY customer_id
                 ORDER BY bookings DESC, customer_id ASC
                 LIMIT 1;",
                [],
                |row| Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)?)),
            )
            .optional()?;

        match top {
            Some((customer_id, count)) => Ok(Some(TopCustomer {
                customer_id,
                bookings: count_from_db(count)?,
            })),
            None => Ok(None),
        }
    }

    fn model_with_most_bookings(&self) -> RepoResult<Option<TopModel>> {
        let top = self
            .conn
            .query_row(
                "SELECT v.model, COUNT(*) AS bookings
                 FROM bookings b
                 JOIN vehicles v ON v.id = b.vehicle_id
                 GROUP BY v.model
                 ORDER BY bookings DESC, v.model ASC
                 LIMIT 1;",
                [],
                |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)),
            )
            .optional()?;

        match top {
            Some((model, count)) => Ok(Some(TopModel {
                model,
                bookings: count_from_db(count)?,
            })),
            None => Ok(None),
        }
    }
}

fn parse_booking_row(row: &Row<'_>) -> RepoResult<Booking> {
    let start_date = parse_date(row.get("start_date")?, "start_date")?;
    let end_date = parse_date(row.get("end_date")?, "end_date")?;

    let price_text: String = row.get("total_price")?;
    let total_price = Decimal::from_str(&price_text).map_err(|_| {
        RepoError::InvalidData(format!(
            "invalid price `{price_text}` in bookings.total_price"
        ))
    })?;

    Ok(Booking {
        id: row.get("id")?,
        customer_id: row.get("customer_id")?,
        vehicle_id: row.get("vehicle_id")?,
        start_date,
        end_date,
        total_price,
    })
}

fn parse_date(value: String, column: &'static str) -> RepoResult<NaiveDate> {
    NaiveDate::parse_from_str(&value, DATE_FORMAT)
        .map_err(|_| RepoError::InvalidData(format!("invalid date `{value}` in bookings.{column}")))
}

fn count_from_db(count: i64) -> RepoResult<u64> {
    u64::try_from(count)
        .map_err(|_| RepoError::InvalidData(format!("negative aggregate count `{count}`")))
}
