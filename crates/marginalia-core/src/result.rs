//! Result type alias for marginalia operations

use crate::error::MarginaliaError;

pub type Result<T> = std::result::Result<T, MarginaliaError>;
