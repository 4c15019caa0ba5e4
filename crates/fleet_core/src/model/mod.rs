//! Domain model for the rental fleet.
//!
//! # Responsibility
//! - Define vehicles, audit entries and bookings as plain typed records.
//! - Validate caller input once, before it reaches storage.
//!
//! # Invariants
//! - Ids are assigned by storage and never reused.
//! - Cross-entity relations are by id only; nothing is shared by reference.

pub mod audit;
pub mod booking;
pub mod vehicle;

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Input rejected before persistence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Required text attribute is empty or whitespace only.
    EmptyText(&'static str),
    /// Text attribute exceeds the stored column width.
    TextTooLong { field: &'static str, max_chars: usize },
    /// Booking price below zero.
    NegativePrice,
    /// Booking ends before it starts.
    EndBeforeStart,
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyText(field) => write!(f, "`{field}` must not be empty"),
            Self::TextTooLong { field, max_chars } => {
                write!(f, "`{field}` must be at most {max_chars} characters")
            }
            Self::NegativePrice => write!(f, "`total_price` must not be negative"),
            Self::EndBeforeStart => write!(f, "`end_date` must not be earlier than `start_date`"),
        }
    }
}

impl Error for ValidationError {}
