//! Typed response models for the EasyBroker API.
//!
//! Every model is constructed once from raw upstream JSON and is immutable
//! afterward; derived fields are recomputed on access, never cached. Raw
//! untyped maps never leave the resource layer.

pub mod location;
pub mod pagination;
pub mod property;

pub use location::Location;
pub use pagination::{NextPage, PaginatedResponse, Pagination};
pub use property::{
    LocationDetail, Operation, OperationKind, Property, PropertyImage, PropertyLocation,
};

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Accept ids that arrive as either JSON strings or numbers.
pub(crate) fn de_opt_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| match v {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }))
}

/// Parse an ISO-8601 timestamp, yielding `None` on any parse failure.
pub(crate) fn de_opt_datetime<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    let raw = match value {
        Some(Value::String(s)) => s,
        _ => return Ok(None),
    };
    Ok(parse_datetime(&raw))
}

fn parse_datetime(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    // Upstream has been seen without an offset on older records.
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(parsed.and_utc());
        }
    }
    None
}
