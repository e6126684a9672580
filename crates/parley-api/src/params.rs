use parley_types::api::IdField;

use crate::ApiError;

/// Parses a query-string id.
pub fn parse_id(name: &str, raw: &str) -> Result<i64, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::bad_request(format!("{name} must be an integer")))
}

/// Coerces a body id that may arrive as a number or a numeric string.
pub fn coerce_id(name: &str, field: &IdField) -> Result<i64, ApiError> {
    field
        .to_id()
        .ok_or_else(|| ApiError::bad_request(format!("{name} must be an integer")))
}
