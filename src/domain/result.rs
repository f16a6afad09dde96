//! Result type alias for Meridian operations

use crate::domain::errors::MeridianError;

/// Convenience alias used throughout the crate
pub type Result<T, E = MeridianError> = std::result::Result<T, E>;
