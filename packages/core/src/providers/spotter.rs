//! VaccineSpotter aggregator adapter.
//!
//! The aggregator publishes one GeoJSON feed per state covering many
//! pharmacy chains. Feeds are fetched through the per-cycle [`StateCache`]
//! and filtered to the search radius locally.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::cache::StateCache;
use crate::error::{AppError, ProviderError};
use crate::geo::{distance_miles, Coordinates};
use crate::providers::{
    deserialize_id, null_as_default, null_as_empty, null_as_false, Location, LocationDetails, ProviderFamily,
    ProviderFetch,
};
use crate::search_area::SearchArea;

/// Hy-Vee listings in the feed duplicate the Hy-Vee API and are skipped.
pub const HYVEE_PROVIDER_TAG: &str = "hyvee";
pub const CVS_PROVIDER_TAG: &str = "cvs";

#[derive(Debug, Clone, Deserialize)]
pub struct SpotterFeature {
    #[serde(default)]
    pub geometry: Option<SpotterGeometry>,
    pub properties: SpotterProperties,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpotterGeometry {
    #[serde(default, deserialize_with = "null_as_default")]
    pub coordinates: Vec<Option<f64>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpotterProperties {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub provider: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub provider_brand_name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub address: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub city: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub state: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub postal_code: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub url: String,
    #[serde(default, deserialize_with = "null_as_false")]
    pub appointments_available: bool,
}

impl SpotterFeature {
    pub fn coordinates(&self) -> Option<Coordinates> {
        self.geometry
            .as_ref()
            .and_then(|geometry| Coordinates::from_geojson(&geometry.coordinates))
    }
}

#[derive(Debug, Deserialize)]
struct FeatureCollection {
    features: Vec<SpotterFeature>,
}

#[async_trait]
pub trait SpotterApi: Send + Sync {
    /// Fetch every feature in a state's feed (`state` is an upper-case
    /// postal code).
    async fn fetch_state(&self, state: &str) -> Result<Vec<SpotterFeature>, ProviderError>;
}

#[derive(Clone)]
pub struct SpotterClient {
    base_url: String,
    http: Client,
}

impl SpotterClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, AppError> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
        })
    }
}

#[async_trait]
impl SpotterApi for SpotterClient {
    async fn fetch_state(&self, state: &str) -> Result<Vec<SpotterFeature>, ProviderError> {
        let url = format!("{}/api/v0/states/{}.json", self.base_url, state);

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|err| ProviderError::network(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let collection = response
            .json::<FeatureCollection>()
            .await
            .map_err(|err| ProviderError::format(err.to_string()))?;

        Ok(collection.features)
    }
}

impl From<&SpotterFeature> for Location {
    fn from(feature: &SpotterFeature) -> Self {
        let p = &feature.properties;
        let details = if p.provider == CVS_PROVIDER_TAG {
            LocationDetails::Cvs {
                city: p.city.clone(),
                state: p.state.clone(),
            }
        } else {
            LocationDetails::Pharmacy {
                name: p.name.clone(),
                brand: p.provider_brand_name.clone(),
                address: p.address.clone(),
                city: p.city.clone(),
                state: p.state.clone(),
                zip: p.postal_code.clone(),
            }
        };

        Location {
            family: ProviderFamily::Spotter,
            id: p.id.clone(),
            details,
            is_available: p.appointments_available,
            registration_url: p.url.clone(),
        }
    }
}

/// Collect the aggregator locations within `area`'s radius across all of
/// its states. States that fail are logged, cached as empty and skipped.
pub async fn fetch_locations(
    api: &dyn SpotterApi,
    cache: &mut StateCache,
    area: &SearchArea,
) -> ProviderFetch {
    let mut fetch = ProviderFetch::default();

    for state in &area.states {
        let (features, error) = cache.get_or_fetch(api, state).await;

        if let Some(err) = error {
            tracing::warn!(
                provider = "spotter",
                state = %state,
                "Error getting vaccine availability: {}",
                err
            );
            fetch.failed_requests += 1;
        }

        fetch.locations.extend(
            features
                .iter()
                .filter(|feature| match feature.coordinates() {
                    Some(point) => distance_miles(area.center, point) <= area.radius_miles,
                    None => false,
                })
                .map(Location::from),
        );
    }

    fetch
}
