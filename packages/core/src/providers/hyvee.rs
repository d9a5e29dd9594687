//! Hy-Vee pharmacy adapter.
//!
//! Hy-Vee exposes a GraphQL search that filters by radius server-side, so
//! the adapter only has to normalize the records.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use crate::error::{AppError, ProviderError};
use crate::providers::{
    deserialize_id, null_as_empty, null_as_false, Location, LocationDetails, ProviderFamily,
    ProviderFetch,
};
use crate::search_area::SearchArea;

/// Every Hy-Vee location registers through the same consent form.
pub const HYVEE_REGISTRATION_URL: &str = "https://www.hy-vee.com/my-pharmacy/covid-vaccine-consent";

const SEARCH_QUERY: &str = r#"
query SearchPharmaciesNearPointWithCovidVaccineAvailability($latitude: Float!, $longitude: Float!, $radius: Int! = 10) {
    searchPharmaciesNearPoint(latitude: $latitude, longitude: $longitude, radius: $radius) {
        distance
        location {
            locationId
            name
            nickname
            phoneNumber
            businessCode
            isCovidVaccineAvailable
            covidVaccineEligibilityTerms
            address {
                line1
                line2
                city
                state
                zip
                latitude
                longitude
            }
        }
    }
}
"#;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HyVeePharmacy {
    #[serde(deserialize_with = "deserialize_id")]
    pub location_id: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub nickname: String,
    #[serde(default, deserialize_with = "null_as_false")]
    pub is_covid_vaccine_available: bool,
    pub address: HyVeeAddress,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HyVeeAddress {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub line1: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub city: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub state: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub zip: String,
}

#[derive(Debug, Deserialize)]
struct GraphQlResponse {
    data: Option<SearchData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchData {
    search_pharmacies_near_point: Vec<SearchResult>,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    location: HyVeePharmacy,
}

/// Abstraction over the Hy-Vee search so the monitor can be tested
/// without the network.
#[async_trait]
pub trait HyVeeApi: Send + Sync {
    async fn search_near_point(
        &self,
        latitude: f64,
        longitude: f64,
        radius_miles: f64,
    ) -> Result<Vec<HyVeePharmacy>, ProviderError>;
}

#[derive(Clone)]
pub struct HyVeeClient {
    base_url: String,
    http: Client,
}

impl HyVeeClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, AppError> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
        })
    }
}

#[async_trait]
impl HyVeeApi for HyVeeClient {
    async fn search_near_point(
        &self,
        latitude: f64,
        longitude: f64,
        radius_miles: f64,
    ) -> Result<Vec<HyVeePharmacy>, ProviderError> {
        let url = format!("{}/my-pharmacy/api/graphql", self.base_url);
        let body = json!({
            "query": SEARCH_QUERY,
            "variables": {
                "latitude": latitude,
                "longitude": longitude,
                "radius": radius_miles.ceil() as i64,
            }
        });

        let response = self
            .http
            .post(&url)
            .json(&body)
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

        let parsed = response
            .json::<GraphQlResponse>()
            .await
            .map_err(|err| ProviderError::format(err.to_string()))?;

        let data = parsed
            .data
            .ok_or_else(|| ProviderError::format("GraphQL response has no data"))?;

        Ok(data
            .search_pharmacies_near_point
            .into_iter()
            .map(|result| result.location)
            .collect())
    }
}

impl From<HyVeePharmacy> for Location {
    fn from(pharmacy: HyVeePharmacy) -> Self {
        let name = if pharmacy.nickname.is_empty() {
            pharmacy.name
        } else {
            pharmacy.nickname
        };

        Location {
            family: ProviderFamily::HyVee,
            id: pharmacy.location_id,
            details: LocationDetails::HyVee {
                name,
                address: pharmacy.address.line1,
                city: pharmacy.address.city,
                state: pharmacy.address.state,
                zip: pharmacy.address.zip,
            },
            is_available: pharmacy.is_covid_vaccine_available,
            registration_url: HYVEE_REGISTRATION_URL.to_string(),
        }
    }
}

/// Fetch Hy-Vee locations for `area`. Any failure is logged and yields an
/// empty list; the next poll retries naturally.
pub async fn fetch_locations(api: &dyn HyVeeApi, area: &SearchArea) -> ProviderFetch {
    match api
        .search_near_point(area.center.latitude, area.center.longitude, area.radius_miles)
        .await
    {
        Ok(pharmacies) => ProviderFetch {
            locations: pharmacies.into_iter().map(Location::from).collect(),
            failed_requests: 0,
        },
        Err(err) => {
            tracing::warn!(
                provider = "hyvee",
                area = %area.name,
                "Error getting vaccine availability: {}",
                err
            );
            ProviderFetch {
                locations: Vec::new(),
                failed_requests: 1,
            }
        }
    }
}
