//! Address → coordinates providers

use std::{collections::HashMap, num::NonZeroUsize, time::Duration};

use async_trait::async_trait;
use lru::LruCache;
use serde::Deserialize;
use tokio::sync::Mutex;

use crate::{
    config::{GeocoderConfig, GeocoderProvider},
    Error, Result,
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// Geocoding collaborator. Returns candidates best-first; empty when nothing matched.
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn geocode(&self, address: &str) -> Result<Vec<Coordinates>>;
}

/// HTTP geocoder for MapQuest or Nominatim, with an LRU cache of answers.
pub struct HttpGeocoder {
    http: reqwest::Client,
    provider: GeocoderProvider,
    base_url: String,
    api_key: Option<String>,
    cache: Option<Mutex<LruCache<String, Vec<Coordinates>>>>,
}

#[derive(Debug, Deserialize)]
struct MapQuestResponse {
    #[serde(default)]
    results: Vec<MapQuestResult>,
}

#[derive(Debug, Deserialize)]
struct MapQuestResult {
    #[serde(default)]
    locations: Vec<MapQuestLocation>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MapQuestLocation {
    lat_lng: MapQuestLatLng,
}

#[derive(Debug, Deserialize)]
struct MapQuestLatLng {
    lat: f64,
    lng: f64,
}

/// Nominatim reports coordinates as strings.
#[derive(Debug, Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
}

impl HttpGeocoder {
    pub fn new(config: &GeocoderConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| Error::Internal(format!("Failed to build HTTP client: {e}")))?;

        if config.provider == GeocoderProvider::MapQuest && config.api_key.is_none() {
            return Err(Error::Internal(
                "geocoder.api_key is required for the mapquest provider".to_string(),
            ));
        }

        let cache = NonZeroUsize::new(config.cache_size).map(|n| Mutex::new(LruCache::new(n)));

        Ok(Self {
            http,
            provider: config.provider,
            base_url: config
                .base_url
                .clone()
                .unwrap_or_else(|| config.provider.default_base_url().to_string())
                .trim_end_matches('/')
                .to_string(),
            api_key: config.api_key.clone(),
            cache,
        })
    }

    async fn fetch(&self, address: &str) -> Result<Vec<Coordinates>> {
        let request = match self.provider {
            GeocoderProvider::MapQuest => self
                .http
                .get(format!("{}/geocoding/v1/address", self.base_url))
                .query(&[
                    ("key", self.api_key.as_deref().unwrap_or_default()),
                    ("location", address),
                ]),
            GeocoderProvider::Nominatim => self
                .http
                .get(format!("{}/search", self.base_url))
                .query(&[("q", address), ("format", "json"), ("limit", "5")]),
        };

        let res = request
            .send()
            .await
            .map_err(|e| Error::Upstream(format!("Geocoding request failed: {e}")))?;
        if !res.status().is_success() {
            return Err(Error::Upstream(format!(
                "Geocoding provider returned HTTP {}",
                res.status()
            )));
        }

        match self.provider {
            GeocoderProvider::MapQuest => {
                let body: MapQuestResponse = res.json().await.map_err(|e| {
                    Error::Upstream(format!("Geocoding response parse failed: {e}"))
                })?;
                Ok(body
                    .results
                    .into_iter()
                    .flat_map(|r| r.locations)
                    .map(|l| Coordinates {
                        latitude: l.lat_lng.lat,
                        longitude: l.lat_lng.lng,
                    })
                    .collect())
            }
            GeocoderProvider::Nominatim => {
                let places: Vec<NominatimPlace> = res.json().await.map_err(|e| {
                    Error::Upstream(format!("Geocoding response parse failed: {e}"))
                })?;
                places
                    .into_iter()
                    .map(|p| {
                        let latitude = p.lat.parse::<f64>();
                        let longitude = p.lon.parse::<f64>();
                        match (latitude, longitude) {
                            (Ok(latitude), Ok(longitude)) => Ok(Coordinates {
                                latitude,
                                longitude,
                            }),
                            _ => Err(Error::Upstream(format!(
                                "Geocoding provider returned invalid coordinates ({}, {})",
                                p.lat, p.lon
                            ))),
                        }
                    })
                    .collect()
            }
        }
    }
}

#[async_trait]
impl Geocoder for HttpGeocoder {
    async fn geocode(&self, address: &str) -> Result<Vec<Coordinates>> {
        let key = address.trim().to_lowercase();

        if let Some(cache) = &self.cache {
            if let Some(hit) = cache.lock().await.get(&key) {
                crate::metrics::GEOCODER_REQUESTS_TOTAL
                    .with_label_values(&["cache_hit"])
                    .inc();
                return Ok(hit.clone());
            }
        }

        let result = self.fetch(address).await;
        let outcome = match &result {
            Ok(c) if c.is_empty() => "no_match",
            Ok(_) => "match",
            Err(_) => "error",
        };
        crate::metrics::GEOCODER_REQUESTS_TOTAL
            .with_label_values(&[outcome])
            .inc();

        let candidates = result?;
        tracing::debug!(
            address = %address,
            candidates = candidates.len(),
            "Geocoded address"
        );

        if let Some(cache) = &self.cache {
            cache.lock().await.put(key, candidates.clone());
        }
        Ok(candidates)
    }
}

/// Fixed address book. Used in tests and offline development.
#[derive(Debug, Clone, Default)]
pub struct StaticGeocoder {
    entries: HashMap<String, Coordinates>,
}

impl StaticGeocoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, address: &str, longitude: f64, latitude: f64) -> Self {
        self.entries.insert(
            address.trim().to_lowercase(),
            Coordinates {
                latitude,
                longitude,
            },
        );
        self
    }
}

#[async_trait]
impl Geocoder for StaticGeocoder {
    async fn geocode(&self, address: &str) -> Result<Vec<Coordinates>> {
        Ok(self
            .entries
            .get(&address.trim().to_lowercase())
            .copied()
            .into_iter()
            .collect())
    }
}
