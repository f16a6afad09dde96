//! Domain identifier types
//!
//! Newtype wrappers for the identifiers shared between the patient API and
//! the clinical database. `patient_id` is the join key across both sources,
//! so it gets a real type instead of a bare integer.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Patient identifier newtype wrapper
///
/// The external patient service owns identity; the clinical database refers
/// to the same value as a foreign key. Both sides use the same numeric space.
///
/// # Examples
///
/// ```
/// use meridian::domain::PatientId;
///
/// let id = PatientId::new(1001);
/// assert_eq!(id.value(), 1001);
/// assert_eq!(id.to_string(), "1001");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PatientId(i64);

impl PatientId {
    /// Creates a new PatientId
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Returns the numeric value of the identifier
    pub fn value(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for PatientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for PatientId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

/// Insurance identifier newtype wrapper
///
/// Free-form identifier assigned by the insurance provider (e.g. `INS001`).
/// Must be non-empty; everything else is opaque to the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InsuranceId(String);

impl InsuranceId {
    /// Creates a new InsuranceId from a string
    ///
    /// # Errors
    ///
    /// Returns an error if the identifier is empty or whitespace-only.
    pub fn new(id: impl Into<String>) -> Result<Self, String> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err("Insurance ID cannot be empty".to_string());
        }
        Ok(Self(id))
    }

    /// Returns the insurance ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes self and returns the inner String
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for InsuranceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for InsuranceId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for InsuranceId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
