//! Per-cycle VaccineSpotter cache.
//!
//! Several search areas usually share a state feed. `StateCache` keeps each
//! state's listings for the rest of the cycle so every feed is fetched at
//! most once. The monitor clears it before each cycle; nothing here
//! survives between polls.

use std::collections::HashMap;

use crate::error::ProviderError;
use crate::providers::spotter::{SpotterApi, SpotterFeature, HYVEE_PROVIDER_TAG};

#[derive(Debug, Default)]
pub struct StateCache {
    entries: HashMap<String, Vec<SpotterFeature>>,
}

impl StateCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, state: &str) -> Option<&[SpotterFeature]> {
        self.entries.get(state).map(Vec::as_slice)
    }

    pub fn set(&mut self, state: impl Into<String>, features: Vec<SpotterFeature>) {
        self.entries.insert(state.into(), features);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Return the cached listings for `state`, fetching them on first use.
    ///
    /// Hy-Vee listings are dropped before caching; that family is tracked
    /// from its own API. A failed fetch caches an empty list so the state
    /// is not retried until the next cycle, and the error is returned once
    /// for the caller to log.
    pub async fn get_or_fetch(
        &mut self,
        api: &dyn SpotterApi,
        state: &str,
    ) -> (&[SpotterFeature], Option<ProviderError>) {
        let mut error = None;
        if !self.entries.contains_key(state) {
            let features = match api.fetch_state(state).await {
                Ok(features) => features
                    .into_iter()
                    .filter(|feature| feature.properties.provider != HYVEE_PROVIDER_TAG)
                    .collect(),
                Err(err) => {
                    error = Some(err);
                    Vec::new()
                }
            };
            self.entries.insert(state.to_string(), features);
        }

        let features = self.entries.get(state).map(Vec::as_slice).unwrap_or(&[]);
        (features, error)
    }
}
