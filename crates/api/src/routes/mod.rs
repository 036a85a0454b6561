pub mod ops;
pub mod orders;
pub mod workers;

use crate::error::ApiError;

/// Parses a path id. Text that cannot be an id names no record, so it is a 404.
pub(crate) fn parse_id<T: std::str::FromStr>(kind: &str, id: &str) -> Result<T, ApiError> {
    id.parse()
        .map_err(|_| ApiError::NotFound(format!("{kind} not found: {id}")))
}
