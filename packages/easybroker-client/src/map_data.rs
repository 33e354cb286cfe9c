//! Map-data aggregation service.
//!
//! The list endpoint does not carry coordinates, so map data is assembled
//! by listing properties and then fetching each one's detail record. Each
//! of those calls passes through the client's rate limiter, keeping the
//! whole fan-out under the 20 requests/second ceiling.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, error};

use crate::error::{EasyBrokerError, Result};
use crate::models::Property;
use crate::resources::PropertyFilters;
use crate::EasyBrokerClient;

/// Maximum properties to show on a map, balancing UX and fetch cost.
pub const MAX_MAP_PROPERTIES: u32 = 30;
/// How long assembled map data stays cached.
pub const MAP_DATA_TTL: Duration = Duration::from_secs(10 * 60);

/// Builds the public detail-page link for a property id. Supplied by the
/// caller; this crate knows nothing about the consuming application's routes.
pub type DetailUrlFn = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// Map-ready summary of one property with coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapProperty {
    pub id: Option<String>,
    pub public_id: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub title: Option<String>,
    pub thumbnail: Option<String>,
    pub formatted_price: String,
    pub summary: String,
    pub full_location: Option<String>,
    pub operation_label: String,
    pub detail_url: String,
}

/// Assembled map data plus fetch accounting.
///
/// `total_fetched` counts the original listing; `valid_count` counts items
/// that survived the coordinate filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapData {
    pub properties: Vec<MapProperty>,
    pub total_fetched: usize,
    pub valid_count: usize,
    pub success: bool,
    pub error: Option<String>,
}

impl MapData {
    fn failure(message: impl Into<String>) -> Self {
        Self {
            properties: Vec::new(),
            total_fetched: 0,
            valid_count: 0,
            success: false,
            error: Some(message.into()),
        }
    }
}

/// Get/put cache contract for assembled map data.
///
/// Implementations own expiry bookkeeping and, when needed, single-flight
/// semantics for concurrent callers on the same key; this service only
/// reads before computing and writes after.
#[async_trait]
pub trait MapDataCache: Send + Sync {
    async fn get(&self, key: &str) -> Option<MapData>;
    async fn put(&self, key: &str, value: MapData, ttl: Duration);
}

/// In-memory cache with per-entry expiry.
#[derive(Default)]
pub struct InMemoryMapDataCache {
    entries: Mutex<HashMap<String, (MapData, Instant)>>,
}

impl InMemoryMapDataCache {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MapDataCache for InMemoryMapDataCache {
    async fn get(&self, key: &str) -> Option<MapData> {
        let mut entries = self.entries.lock().await;
        match entries.get(key) {
            Some((value, expires_at)) if Instant::now() < *expires_at => Some(value.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    async fn put(&self, key: &str, value: MapData, ttl: Duration) {
        self.entries
            .lock()
            .await
            .insert(key.to_string(), (value, Instant::now() + ttl));
    }
}

/// Assembles map-ready property data, tolerating individual item failures.
pub struct MapDataService {
    client: EasyBrokerClient,
    cache: Arc<dyn MapDataCache>,
    detail_url: DetailUrlFn,
}

impl MapDataService {
    pub fn new(client: EasyBrokerClient, cache: Arc<dyn MapDataCache>, detail_url: DetailUrlFn) -> Self {
        Self {
            client,
            cache,
            detail_url,
        }
    }

    /// Fetch up to `limit` map-ready properties (capped at
    /// [`MAX_MAP_PROPERTIES`]).
    ///
    /// Results are cached per effective limit for [`MAP_DATA_TTL`]. A
    /// failure of the initial list fetch propagates; per-item detail
    /// failures only drop the affected item.
    pub async fn map_properties(&self, limit: u32) -> Result<MapData> {
        let limit = limit.clamp(1, MAX_MAP_PROPERTIES);
        let key = format!("properties/map_data/limit_{limit}");

        if let Some(cached) = self.cache.get(&key).await {
            debug!(key, "map data cache hit");
            return Ok(cached);
        }

        let data = self.fetch_map_data(limit).await?;
        self.cache.put(&key, data.clone(), MAP_DATA_TTL).await;
        Ok(data)
    }

    async fn fetch_map_data(&self, limit: u32) -> Result<MapData> {
        let listed = self
            .client
            .properties()
            .list(1, limit, &PropertyFilters::default())
            .await?;
        if listed.is_empty() {
            return Ok(MapData::failure("No properties found"));
        }
        let total_fetched = listed.len();

        let mut detailed: Vec<Property> = Vec::with_capacity(total_fetched);
        for summary in &listed {
            let Some(id) = summary.public_id.as_deref().or(summary.id.as_deref()) else {
                error!("listed property carries no id, skipping");
                continue;
            };
            match self.client.properties().find(id).await {
                Ok(property) => detailed.push(property),
                Err(EasyBrokerError::NotFound { .. }) => {
                    // Deleted between the list and detail calls.
                    debug!(property_id = id, "property gone, skipping");
                }
                Err(e) => {
                    error!(property_id = id, error = %e, "failed to fetch property detail, skipping");
                }
            }
        }

        let valid: Vec<&Property> = detailed
            .iter()
            .filter(|property| property.has_coordinates())
            .collect();
        let valid_count = valid.len();
        let properties = valid
            .into_iter()
            .map(|property| self.map_property(property))
            .collect();

        Ok(MapData {
            properties,
            total_fetched,
            valid_count,
            success: true,
            error: None,
        })
    }

    fn map_property(&self, property: &Property) -> MapProperty {
        let route_id = property
            .public_id
            .as_deref()
            .or(property.id.as_deref())
            .unwrap_or_default();
        MapProperty {
            id: property.id.clone(),
            public_id: property.public_id.clone(),
            latitude: property.latitude().unwrap_or_default(),
            longitude: property.longitude().unwrap_or_default(),
            title: property.title.clone(),
            thumbnail: property.thumbnail_image().map(str::to_string),
            formatted_price: property.formatted_price(),
            summary: property.summary(),
            full_location: property.full_location(),
            operation_label: property.operation_label(),
            detail_url: (self.detail_url)(route_id),
        }
    }
}
