//! Locations resource: list, find, and search.

use serde_json::Value;

use super::{pagination_params, parse_paginated, validate_limit, validate_page};
use crate::error::{EasyBrokerError, Result};
use crate::models::{Location, PaginatedResponse};
use crate::EasyBrokerClient;

/// Handle for `/locations` endpoints.
pub struct Locations<'a> {
    client: &'a EasyBrokerClient,
}

impl<'a> Locations<'a> {
    pub(crate) fn new(client: &'a EasyBrokerClient) -> Self {
        Self { client }
    }

    /// List locations, optionally filtered by a search term. The term is
    /// omitted from the query entirely when `None`.
    pub async fn list(
        &self,
        search: Option<&str>,
        page: u32,
        limit: u32,
    ) -> Result<PaginatedResponse<Location>> {
        validate_page(page)?;
        validate_limit(limit)?;

        let mut params = pagination_params(page, limit);
        if let Some(search) = search {
            params.push(("search".to_string(), search.to_string()));
        }

        let body = self.client.get("/locations", &params).await?;
        parse_paginated(body)
    }

    /// Find one location by id.
    pub async fn find(&self, id: &str) -> Result<Location> {
        let body = self.client.get(&format!("/locations/{id}"), &[]).await?;
        serde_json::from_value(Value::Object(body))
            .map_err(|e| EasyBrokerError::InvalidResponse(format!("malformed location: {e}")))
    }

    /// Sugar for `list` with a search term.
    pub async fn search(
        &self,
        query: &str,
        page: u32,
        limit: u32,
    ) -> Result<PaginatedResponse<Location>> {
        self.list(Some(query), page, limit).await
    }
}
