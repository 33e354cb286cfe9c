//! Properties resource: list, find, and search.

use serde_json::{Map, Value};

use super::{pagination_params, parse_paginated, validate_limit, validate_page};
use crate::error::{EasyBrokerError, Result};
use crate::models::{PaginatedResponse, Property};
use crate::EasyBrokerClient;

/// Handle for `/properties` endpoints.
pub struct Properties<'a> {
    client: &'a EasyBrokerClient,
}

impl<'a> Properties<'a> {
    pub(crate) fn new(client: &'a EasyBrokerClient) -> Self {
        Self { client }
    }

    /// List properties with pagination and optional filters.
    ///
    /// `page` must be positive and `limit` in `[1, 50]`; both are checked
    /// before any network call.
    pub async fn list(
        &self,
        page: u32,
        limit: u32,
        filters: &PropertyFilters,
    ) -> Result<PaginatedResponse<Property>> {
        validate_page(page)?;
        validate_limit(limit)?;

        let mut params = pagination_params(page, limit);
        params.extend(filters.to_query());

        let body = self.client.get("/properties", &params).await?;
        parse_paginated(body)
    }

    /// Find one property by internal numeric id or public id.
    pub async fn find(&self, id: &str) -> Result<Property> {
        let body = self.client.get(&format!("/properties/{id}"), &[]).await?;
        serde_json::from_value(Value::Object(body))
            .map_err(|e| EasyBrokerError::InvalidResponse(format!("malformed property: {e}")))
    }

    /// Sugar for `list` with a search filter.
    pub async fn search(
        &self,
        query: &str,
        page: u32,
        limit: u32,
    ) -> Result<PaginatedResponse<Property>> {
        let filters = PropertyFilters {
            search: Some(query.to_string()),
            ..Default::default()
        };
        self.list(page, limit, &filters).await
    }
}

/// Allow-listed property filters.
///
/// The upstream query convention namespaces everything except the bare
/// `search` term under `search[<key>]`, with array filters repeated as
/// `search[<key>][]`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertyFilters {
    pub search: Option<String>,
    pub bedrooms: Option<u32>,
    pub bathrooms: Option<u32>,
    pub parking_spaces: Option<u32>,
    pub half_bathrooms: Option<u32>,
    pub min_price: Option<u64>,
    pub max_price: Option<u64>,
    pub min_construction_size: Option<f64>,
    pub max_construction_size: Option<f64>,
    pub min_lot_size: Option<f64>,
    pub max_lot_size: Option<f64>,
    pub updated_at_from: Option<String>,
    pub updated_at_to: Option<String>,
    pub property_types: Vec<String>,
    pub statuses: Vec<String>,
}

impl PropertyFilters {
    /// Build filters from an untyped map, silently dropping unknown keys
    /// and null values.
    pub fn from_map(raw: &Map<String, Value>) -> Self {
        let mut filters = Self::default();
        for (key, value) in raw {
            if value.is_null() {
                continue;
            }
            match key.as_str() {
                "search" => filters.search = as_string(value),
                "bedrooms" => filters.bedrooms = as_u32(value),
                "bathrooms" => filters.bathrooms = as_u32(value),
                "parking_spaces" => filters.parking_spaces = as_u32(value),
                "half_bathrooms" => filters.half_bathrooms = as_u32(value),
                "min_price" => filters.min_price = value.as_u64(),
                "max_price" => filters.max_price = value.as_u64(),
                "min_construction_size" => filters.min_construction_size = value.as_f64(),
                "max_construction_size" => filters.max_construction_size = value.as_f64(),
                "min_lot_size" => filters.min_lot_size = value.as_f64(),
                "max_lot_size" => filters.max_lot_size = value.as_f64(),
                "updated_at_from" => filters.updated_at_from = as_string(value),
                "updated_at_to" => filters.updated_at_to = as_string(value),
                "property_types" => filters.property_types = as_string_array(value),
                "statuses" => filters.statuses = as_string_array(value),
                _ => {}
            }
        }
        filters
    }

    /// Render the outbound query pairs.
    pub fn to_query(&self) -> Vec<(String, String)> {
        let mut query = Vec::new();
        if let Some(search) = &self.search {
            query.push(("search".to_string(), search.clone()));
        }
        push_scoped(&mut query, "bedrooms", self.bedrooms.map(|v| v.to_string()));
        push_scoped(
            &mut query,
            "bathrooms",
            self.bathrooms.map(|v| v.to_string()),
        );
        push_scoped(
            &mut query,
            "parking_spaces",
            self.parking_spaces.map(|v| v.to_string()),
        );
        push_scoped(
            &mut query,
            "half_bathrooms",
            self.half_bathrooms.map(|v| v.to_string()),
        );
        push_scoped(&mut query, "min_price", self.min_price.map(|v| v.to_string()));
        push_scoped(&mut query, "max_price", self.max_price.map(|v| v.to_string()));
        push_scoped(
            &mut query,
            "min_construction_size",
            self.min_construction_size.map(|v| v.to_string()),
        );
        push_scoped(
            &mut query,
            "max_construction_size",
            self.max_construction_size.map(|v| v.to_string()),
        );
        push_scoped(
            &mut query,
            "min_lot_size",
            self.min_lot_size.map(|v| v.to_string()),
        );
        push_scoped(
            &mut query,
            "max_lot_size",
            self.max_lot_size.map(|v| v.to_string()),
        );
        push_scoped(&mut query, "updated_at_from", self.updated_at_from.clone());
        push_scoped(&mut query, "updated_at_to", self.updated_at_to.clone());
        for value in &self.property_types {
            query.push(("search[property_types][]".to_string(), value.clone()));
        }
        for value in &self.statuses {
            query.push(("search[statuses][]".to_string(), value.clone()));
        }
        query
    }
}

fn push_scoped(query: &mut Vec<(String, String)>, key: &str, value: Option<String>) {
    if let Some(value) = value {
        query.push((format!("search[{key}]"), value));
    }
}

fn as_string(value: &Value) -> Option<String> {
    value.as_str().map(str::to_string)
}

fn as_u32(value: &Value) -> Option<u32> {
    value.as_u64().and_then(|v| u32::try_from(v).ok())
}

fn as_string_array(value: &Value) -> Vec<String> {
    value
        .as_array()
        .map(|entries| {
            entries
                .iter()
                .filter_map(|entry| entry.as_str())
                .filter(|entry| !entry.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}
