//! Query string source.

use crate::error::BindError;
use crate::{BindRequest, Values};

/// Parses the request's query string into a [`Values`] map.
///
/// A request without a query string yields an empty map.
///
/// # Errors
///
/// Returns [`BindError::Query`] if the query string cannot be decoded.
pub fn read_query(request: &BindRequest) -> Result<Values, BindError> {
    let query = request.query_string().unwrap_or("");
    Values::from_urlencoded(query.as_bytes()).map_err(BindError::Query)
}
