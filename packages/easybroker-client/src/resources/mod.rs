//! Typed, validated, paginated access to the upstream collections.
//!
//! Shared here: pagination-argument validation (raised before any network
//! call) and the `content`/`pagination`/`total` envelope parsing. Resource
//! handles borrow the client and carry no state of their own.

pub mod locations;
pub mod properties;

pub use locations::Locations;
pub use properties::{Properties, PropertyFilters};

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::{EasyBrokerError, Result};
use crate::models::{PaginatedResponse, Pagination};

/// Default page for list calls.
pub const DEFAULT_PAGE: u32 = 1;
/// Default page size for list calls.
pub const DEFAULT_LIMIT: u32 = 20;
/// Upstream maximum page size.
pub const MAX_LIMIT: u32 = 50;

pub(crate) fn validate_page(page: u32) -> Result<()> {
    if page == 0 {
        return Err(EasyBrokerError::InvalidArgument(
            "page must be a positive integer".into(),
        ));
    }
    Ok(())
}

pub(crate) fn validate_limit(limit: u32) -> Result<()> {
    if !(1..=MAX_LIMIT).contains(&limit) {
        return Err(EasyBrokerError::InvalidArgument(
            "limit must be between 1 and 50".into(),
        ));
    }
    Ok(())
}

pub(crate) fn pagination_params(page: u32, limit: u32) -> Vec<(String, String)> {
    vec![
        ("page".to_string(), page.to_string()),
        ("limit".to_string(), limit.to_string()),
    ]
}

/// Parse a list-endpoint envelope: a possibly-absent `content` array, a
/// possibly-absent `pagination` object, and an optional top-level `total`
/// that overrides the pagination object's own total.
pub(crate) fn parse_paginated<T: DeserializeOwned>(
    mut body: Map<String, Value>,
) -> Result<PaginatedResponse<T>> {
    let items = match body.remove("content") {
        Some(Value::Array(entries)) => entries
            .into_iter()
            .map(|entry| {
                serde_json::from_value(entry).map_err(|e| {
                    EasyBrokerError::InvalidResponse(format!("malformed content entry: {e}"))
                })
            })
            .collect::<Result<Vec<T>>>()?,
        _ => Vec::new(),
    };

    let pagination = match body.remove("pagination") {
        Some(value @ Value::Object(_)) => serde_json::from_value::<Pagination>(value)
            .map_err(|e| EasyBrokerError::InvalidResponse(format!("malformed pagination: {e}")))?,
        _ => Pagination::default(),
    };

    let total = body.get("total").and_then(Value::as_u64);

    Ok(PaginatedResponse::new(items, pagination, total))
}
