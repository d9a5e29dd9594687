//! Availability providers.
//!
//! Two independent provider families feed the monitor: the Hy-Vee pharmacy
//! API and the VaccineSpotter aggregator. Both normalize into [`Location`].
//! Identifiers are only unique within a family, so the tracker keeps one
//! namespace per [`ProviderFamily`].

pub mod hyvee;
pub mod mock;
pub mod spotter;

use std::fmt;

use serde::{Deserialize, Deserializer};

/// The two independent data sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderFamily {
    HyVee,
    Spotter,
}

impl ProviderFamily {
    pub const ALL: [ProviderFamily; 2] = [ProviderFamily::HyVee, ProviderFamily::Spotter];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderFamily::HyVee => "hyvee",
            ProviderFamily::Spotter => "spotter",
        }
    }
}

impl fmt::Display for ProviderFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Display fields, one variant per way a location is presented.
#[derive(Debug, Clone, PartialEq)]
pub enum LocationDetails {
    /// A Hy-Vee pharmacy.
    HyVee {
        name: String,
        address: String,
        city: String,
        state: String,
        zip: String,
    },
    /// CVS listings on VaccineSpotter only identify the city.
    Cvs { city: String, state: String },
    /// Any other VaccineSpotter pharmacy.
    Pharmacy {
        name: String,
        brand: String,
        address: String,
        city: String,
        state: String,
        zip: String,
    },
}

/// A normalized provider listing.
#[derive(Debug, Clone, PartialEq)]
pub struct Location {
    pub family: ProviderFamily,
    pub id: String,
    pub details: LocationDetails,
    pub is_available: bool,
    pub registration_url: String,
}

/// Result of one adapter call. Failures have already been logged and
/// contribute no locations.
#[derive(Debug, Default)]
pub struct ProviderFetch {
    pub locations: Vec<Location>,
    pub failed_requests: usize,
}

/// Accepts identifiers encoded as either JSON strings or numbers.
pub(crate) fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(i64),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(text) => text,
        RawId::Number(number) => number.to_string(),
    })
}

/// Treats `null` the same as a missing string.
pub(crate) fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Treats `null` the same as the type's default.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Treats `null` the same as `false`.
pub(crate) fn null_as_false<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or(false))
}
