//! Vehicle records and their mutable attributes.
//!
//! # Invariants
//! - `company`, `model` and `color` are non-empty and at most 100 chars.
//! - `VehicleField::ALL` fixes the order in which attributes are compared.

use super::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Storage-assigned vehicle identifier.
pub type VehicleId = i64;

const MAX_TEXT_CHARS: usize = 100;

/// Caller-supplied attributes for creating or replacing a vehicle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleDraft {
    pub company: String,
    pub model: String,
    /// Odometer reading in kilometers.
    pub kms: u32,
    /// Manufacture year.
    pub year: i32,
    pub color: String,
    pub available: bool,
}

impl VehicleDraft {
    /// Checks text attributes against stored column limits.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_text("company", &self.company)?;
        validate_text("model", &self.model)?;
        validate_text("color", &self.color)?;
        Ok(())
    }
}

/// Persisted vehicle row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vehicle {
    pub id: VehicleId,
    pub company: String,
    pub model: String,
    pub kms: u32,
    pub year: i32,
    pub color: String,
    pub available: bool,
}

impl Vehicle {
    /// Builds a vehicle row from an id and a full attribute set.
    pub fn from_draft(id: VehicleId, draft: VehicleDraft) -> Self {
        Self {
            id,
            company: draft.company,
            model: draft.model,
            kms: draft.kms,
            year: draft.year,
            color: draft.color,
            available: draft.available,
        }
    }

    /// Returns the six mutable attributes without the id.
    pub fn to_draft(&self) -> VehicleDraft {
        VehicleDraft {
            company: self.company.clone(),
            model: self.model.clone(),
            kms: self.kms,
            year: self.year,
            color: self.color.clone(),
            available: self.available,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_text("company", &self.company)?;
        validate_text("model", &self.model)?;
        validate_text("color", &self.color)?;
        Ok(())
    }

    /// Renders one attribute as the string stored in the audit trail.
    pub fn field_value(&self, field: VehicleField) -> String {
        match field {
            VehicleField::Company => self.company.clone(),
            VehicleField::Model => self.model.clone(),
            VehicleField::Kms => self.kms.to_string(),
            VehicleField::Year => self.year.to_string(),
            VehicleField::Color => self.color.clone(),
            VehicleField::Available => self.available.to_string(),
        }
    }

    /// Computes per-field changes from `self` to `replacement`.
    ///
    /// Fields are compared in `VehicleField::ALL` order and only differing
    /// fields are returned.
    pub fn diff(&self, replacement: &Vehicle) -> Vec<FieldChange> {
        VehicleField::ALL
            .iter()
            .copied()
            .filter(|field| !self.same_value(replacement, *field))
            .map(|field| FieldChange {
                field,
                old_value: self.field_value(field),
                new_value: replacement.field_value(field),
            })
            .collect()
    }

    fn same_value(&self, other: &Vehicle, field: VehicleField) -> bool {
        match field {
            VehicleField::Company => self.company == other.company,
            VehicleField::Model => self.model == other.model,
            VehicleField::Kms => self.kms == other.kms,
            VehicleField::Year => self.year == other.year,
            VehicleField::Color => self.color == other.color,
            VehicleField::Available => self.available == other.available,
        }
    }
}

/// Mutable vehicle attribute, as named in the audit trail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VehicleField {
    Company,
    Model,
    Kms,
    Year,
    Color,
    Available,
}

impl VehicleField {
    pub const ALL: [VehicleField; 6] = [
        Self::Company,
        Self::Model,
        Self::Kms,
        Self::Year,
        Self::Color,
        Self::Available,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Company => "company",
            Self::Model => "model",
            Self::Kms => "kms",
            Self::Year => "year",
            Self::Color => "color",
            Self::Available => "available",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.as_str() == value)
    }
}

impl Display for VehicleField {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One changed attribute with before/after values in string form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldChange {
    pub field: VehicleField,
    pub old_value: String,
    pub new_value: String,
}

impl FieldChange {
    pub fn new(
        field: VehicleField,
        old_value: impl Into<String>,
        new_value: impl Into<String>,
    ) -> Self {
        Self {
            field,
            old_value: old_value.into(),
            new_value: new_value.into(),
        }
    }
}

fn validate_text(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::EmptyText(field));
    }
    if value.chars().count() > MAX_TEXT_CHARS {
        return Err(ValidationError::TextTooLong {
            field,
            max_chars: MAX_TEXT_CHARS,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{FieldChange, Vehicle, VehicleField};
    use crate::model::ValidationError;

    fn camry() -> Vehicle {
        Vehicle {
            id: 1,
            company: "Toyota".to_string(),
            model: "Camry".to_string(),
            kms: 50_000,
            year: 2020,
            color: "Blue".to_string(),
            available: true,
        }
    }

    #[test]
    fn diff_of_identical_rows_is_empty() {
        let vehicle = camry();
        assert!(vehicle.diff(&vehicle.clone()).is_empty());
    }

    #[test]
    fn diff_follows_fixed_field_order_and_renders_values() {
        let before = camry();
        let mut after = before.clone();
        after.available = false;
        after.kms = 55_000;
        after.color = "Red".to_string();

        let changes = before.diff(&after);
        assert_eq!(
            changes,
            vec![
                FieldChange::new(VehicleField::Kms, "50000", "55000"),
                FieldChange::new(VehicleField::Color, "Blue", "Red"),
                FieldChange::new(VehicleField::Available, "true", "false"),
            ]
        );
    }

    #[test]
    fn field_names_roundtrip() {
        for field in VehicleField::ALL {
            assert_eq!(VehicleField::parse(field.as_str()), Some(field));
        }
        assert_eq!(VehicleField::parse("price"), None);
    }

    #[test]
    fn draft_validation_rejects_blank_and_oversized_text() {
        let mut draft = camry().to_draft();
        assert!(draft.validate().is_ok());

        draft.model = "   ".to_string();
        assert_eq!(draft.validate(), Err(ValidationError::EmptyText("model")));

        draft.model = "x".repeat(101);
        assert!(matches!(
            draft.validate(),
            Err(ValidationError::TextTooLong { field: "model", .. })
        ));
    }
}
