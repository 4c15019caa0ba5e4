//! Rental bookings.
//!
//! Bookings reference customers and vehicles by id only; neither is
//! enforced as a foreign key.

use super::vehicle::VehicleId;
use super::ValidationError;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Storage-assigned booking identifier.
pub type BookingId = i64;

/// Externally defined customer identity.
pub type CustomerId = i64;

/// Caller input for a new booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingDraft {
    pub customer_id: CustomerId,
    pub vehicle_id: VehicleId,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub total_price: Decimal,
}

impl BookingDraft {
    /// Rejects negative prices and inverted date ranges.
    ///
    /// Overlap with other bookings of the same vehicle is not checked.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.total_price < Decimal::ZERO {
            return Err(ValidationError::NegativePrice);
        }
        if self.end_date < self.start_date {
            return Err(ValidationError::EndBeforeStart);
        }
        Ok(())
    }
}

/// Persisted booking row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    pub id: BookingId,
    pub customer_id: CustomerId,
    pub vehicle_id: VehicleId,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub total_price: Decimal,
}

impl Booking {
    pub fn from_draft(id: BookingId, draft: BookingDraft) -> Self {
        Self {
            id,
            customer_id: draft.customer_id,
            vehicle_id: draft.vehicle_id,
            start_date: draft.start_date,
            end_date: draft.end_date,
            total_price: draft.total_price,
        }
    }
}

/// Customer with the highest booking count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopCustomer {
    pub customer_id: CustomerId,
    pub bookings: u64,
}

/// Vehicle model with the highest booking count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopModel {
    pub model: String,
    pub bookings: u64,
}
