//! In-memory providers for tests. Responses can be swapped between cycles
//! and every call is counted.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::ProviderError;
use crate::providers::hyvee::{HyVeeAddress, HyVeeApi, HyVeePharmacy};
use crate::providers::spotter::{SpotterApi, SpotterFeature, SpotterGeometry, SpotterProperties};

pub struct MockHyVee {
    response: Mutex<Option<Vec<HyVeePharmacy>>>,
    calls: Mutex<usize>,
    delay: Mutex<Option<Duration>>,
}

impl MockHyVee {
    /// Starts out returning no pharmacies.
    pub fn new() -> Self {
        Self {
            response: Mutex::new(Some(Vec::new())),
            calls: Mutex::new(0),
            delay: Mutex::new(None),
        }
    }

    /// Every search sleeps for `delay` (tokio time) before answering.
    pub fn with_delay(self, delay: Duration) -> Self {
        *self.delay.lock().unwrap() = Some(delay);
        self
    }

    pub fn with_pharmacies(self, pharmacies: Vec<HyVeePharmacy>) -> Self {
        self.set_pharmacies(pharmacies);
        self
    }

    pub fn with_error(self) -> Self {
        self.set_error();
        self
    }

    pub fn set_pharmacies(&self, pharmacies: Vec<HyVeePharmacy>) {
        *self.response.lock().unwrap() = Some(pharmacies);
    }

    pub fn set_error(&self) {
        *self.response.lock().unwrap() = None;
    }

    pub fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

impl Default for MockHyVee {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HyVeeApi for MockHyVee {
    async fn search_near_point(
        &self,
        _latitude: f64,
        _longitude: f64,
        _radius_miles: f64,
    ) -> Result<Vec<HyVeePharmacy>, ProviderError> {
        *self.calls.lock().unwrap() += 1;
        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let response = self.response.lock().unwrap().clone();
        match response {
            Some(pharmacies) => Ok(pharmacies),
            None => Err(ProviderError::Status {
                status: 503,
                body: "mock failure".to_string(),
            }),
        }
    }
}

#[derive(Default)]
pub struct MockSpotter {
    states: Mutex<HashMap<String, Option<Vec<SpotterFeature>>>>,
    calls: Mutex<HashMap<String, usize>>,
}

impl MockSpotter {
    /// Unknown states answer with an empty feed.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(self, state: &str, features: Vec<SpotterFeature>) -> Self {
        self.set_state(state, features);
        self
    }

    pub fn with_failing_state(self, state: &str) -> Self {
        self.states.lock().unwrap().insert(state.to_string(), None);
        self
    }

    pub fn set_state(&self, state: &str, features: Vec<SpotterFeature>) {
        self.states
            .lock()
            .unwrap()
            .insert(state.to_string(), Some(features));
    }

    pub fn calls_for(&self, state: &str) -> usize {
        self.calls.lock().unwrap().get(state).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().values().sum()
    }
}

#[async_trait]
impl SpotterApi for MockSpotter {
    async fn fetch_state(&self, state: &str) -> Result<Vec<SpotterFeature>, ProviderError> {
        *self.calls.lock().unwrap().entry(state.to_string()).or_insert(0) += 1;
        let response = self.states.lock().unwrap().get(state).cloned();
        match response {
            Some(Some(features)) => Ok(features),
            Some(None) => Err(ProviderError::Status {
                status: 500,
                body: "mock failure".to_string(),
            }),
            None => Ok(Vec::new()),
        }
    }
}

pub fn hyvee_pharmacy(id: &str, available: bool) -> HyVeePharmacy {
    HyVeePharmacy {
        location_id: id.to_string(),
        name: format!("Hy-Vee Pharmacy {}", id),
        nickname: String::new(),
        is_covid_vaccine_available: available,
        address: HyVeeAddress {
            line1: "100 Main St".to_string(),
            city: "Omaha".to_string(),
            state: "NE".to_string(),
            zip: "68102".to_string(),
        },
    }
}

pub fn spotter_feature(
    id: &str,
    provider: &str,
    available: bool,
    latitude: f64,
    longitude: f64,
) -> SpotterFeature {
    SpotterFeature {
        geometry: Some(SpotterGeometry {
            coordinates: vec![Some(longitude), Some(latitude)],
        }),
        properties: SpotterProperties {
            id: id.to_string(),
            provider: provider.to_string(),
            provider_brand_name: provider.to_uppercase(),
            name: format!("Store {}", id),
            address: "200 Dodge St".to_string(),
            city: "Omaha".to_string(),
            state: "NE".to_string(),
            postal_code: "68102".to_string(),
            url: format!("https://example.com/{}/{}", provider, id),
            appointments_available: available,
        },
    }
}
