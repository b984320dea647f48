//! Pet domain model.
//!
//! # Responsibility
//! - Define the canonical pet record handed between callers and storage.
//! - Validate record shape before it reaches persistence.
//!
//! # Invariants
//! - `id` is stable and never reused for another pet.
//! - `identification_number` is the business key used for log correlation.
//! - `version == 0` means the pet has never been persisted.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable surrogate identifier for a pet row.
pub type PetId = Uuid;

static IDENTIFICATION_NUMBER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9-]{1,32}$").expect("valid identification number regex")
});

/// Validation failure for a pet record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PetValidationError {
    /// Name is empty or whitespace only.
    EmptyName,
    /// Identification number does not match `[A-Za-z0-9-]{1,32}`.
    InvalidIdentificationNumber(String),
    /// Version counter went negative.
    NegativeVersion(i64),
}

impl Display for PetValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "pet name cannot be empty"),
            Self::InvalidIdentificationNumber(value) => {
                write!(f, "invalid identification number `{value}`")
            }
            Self::NegativeVersion(value) => write!(f, "pet version cannot be negative: {value}"),
        }
    }
}

impl Error for PetValidationError {}

/// Canonical pet record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pet {
    pub id: PetId,
    /// Business key, e.g. a microchip or registry number.
    pub identification_number: String,
    pub name: String,
    /// Unix epoch milliseconds.
    pub birth_date: Option<i64>,
    /// Free-form species label ("Cat", "Dog", ...).
    #[serde(rename = "type")]
    pub pet_type: Option<String>,
    /// Owner display name.
    pub owner: Option<String>,
    /// Populated by storage on every successful save.
    pub version: i64,
}

impl Pet {
    /// Creates a new, never persisted pet with a generated stable ID.
    pub fn new(identification_number: impl Into<String>, name: impl Into<String>) -> Self {
        Self::with_id(Uuid::new_v4(), identification_number, name)
    }

    /// Creates a new pet with a caller-provided stable ID.
    ///
    /// Used by import paths where identity already exists externally.
    pub fn with_id(
        id: PetId,
        identification_number: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            id,
            identification_number: identification_number.into(),
            name: name.into(),
            birth_date: None,
            pet_type: None,
            owner: None,
            version: 0,
        }
    }

    /// Returns whether this pet has never been saved.
    pub fn is_new(&self) -> bool {
        self.version == 0
    }

    /// Checks record shape before persistence.
    ///
    /// # Errors
    /// - `EmptyName` when `name` is blank.
    /// - `InvalidIdentificationNumber` when the business key is malformed.
    /// - `NegativeVersion` when `version < 0`.
    pub fn validate(&self) -> Result<(), PetValidationError> {
        if self.name.trim().is_empty() {
            return Err(PetValidationError::EmptyName);
        }
        if !IDENTIFICATION_NUMBER_RE.is_match(&self.identification_number) {
            return Err(PetValidationError::InvalidIdentificationNumber(
                self.identification_number.clone(),
            ));
        }
        if self.version < 0 {
            return Err(PetValidationError::NegativeVersion(self.version));
        }
        Ok(())
    }
}

// Rendered into log lines; keep it metadata-only and on one line.
impl Display for Pet {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Pet{{id={} identification_number={} name={}}}",
            self.id,
            self.identification_number,
            self.name.replace(['\n', '\r'], " ")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::{Pet, PetValidationError};

    #[test]
    fn new_pet_is_new_and_valid() {
        let pet = Pet::new("CHIP-0042", "Leo");
        assert!(pet.is_new());
        assert!(pet.validate().is_ok());
    }

    #[test]
    fn validate_rejects_blank_name() {
        let pet = Pet::new("42", "   ");
        assert_eq!(pet.validate(), Err(PetValidationError::EmptyName));
    }

    #[test]
    fn validate_rejects_malformed_identification_number() {
        let pet = Pet::new("42 / 7", "Leo");
        assert!(matches!(
            pet.validate(),
            Err(PetValidationError::InvalidIdentificationNumber(value)) if value == "42 / 7"
        ));
        assert!(Pet::new("", "Leo").validate().is_err());
    }

    #[test]
    fn serializes_with_external_field_names() {
        let mut pet = Pet::new("42", "Leo");
        pet.pet_type = Some("Cat".to_string());
        let json = serde_json::to_value(&pet).unwrap();
        assert_eq!(json["identificationNumber"], "42");
        assert_eq!(json["type"], "Cat");
        assert_eq!(json["version"], 0);
    }

    #[test]
    fn display_stays_on_one_line() {
        let pet = Pet::new("42", "multi\nline");
        let rendered = pet.to_string();
        assert!(!rendered.contains('\n'));
        assert!(rendered.contains("identification_number=42"));
    }
}
