//! Geocoded search areas.
//!
//! Each `*.json` file in the config directory describes one area to watch:
//! a point, a radius in miles, the VaccineSpotter state feeds to scan and
//! the Slack channel to alert. Areas are loaded once at startup and are
//! read-only afterwards.
//!
//! ```json
//! { "latitude": 41.25, "longitude": -96.0, "radius": 25,
//!   "states": ["NE", "IA"], "channel": "#vaccines-omaha" }
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::error::AppError;
use crate::geo::Coordinates;

pub const DEFAULT_STATES: &[&str] = &["NE"];

/// One validated search area.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchArea {
    pub name: String,
    pub center: Coordinates,
    pub radius_miles: f64,
    pub states: Vec<String>,
    pub channel: String,
    pub enabled: bool,
    pub test: bool,
}

/// The record as written on disk. Required fields are optional here so a
/// bad record produces a warning rather than a parse failure.
#[derive(Debug, Deserialize)]
struct RawSearchArea {
    name: Option<String>,
    latitude: Option<f64>,
    longitude: Option<f64>,
    radius: Option<f64>,
    states: Option<Vec<String>>,
    channel: Option<String>,
    #[serde(default = "default_enabled")]
    enabled: bool,
    #[serde(default)]
    test: bool,
}

fn default_enabled() -> bool {
    true
}

/// Why a record was skipped.
#[derive(Error, Debug)]
pub enum AreaError {
    #[error("malformed JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("missing geolocation data")]
    MissingGeolocation,

    #[error("missing Slack channel")]
    MissingChannel,
}

impl SearchArea {
    /// Parse and validate a single record. `fallback_name` is used when the
    /// record has no `name` of its own (normally the file stem).
    pub fn from_json(raw: &str, fallback_name: &str) -> Result<Self, AreaError> {
        let raw: RawSearchArea = serde_json::from_str(raw)?;
        raw.validate(fallback_name)
    }
}

impl RawSearchArea {
    fn validate(self, fallback_name: &str) -> Result<SearchArea, AreaError> {
        // Zero counts as missing, same as an absent field.
        let (latitude, longitude, radius) = match (self.latitude, self.longitude, self.radius) {
            (Some(lat), Some(lon), Some(radius)) if lat != 0.0 && lon != 0.0 && radius > 0.0 => {
                (lat, lon, radius)
            }
            _ => return Err(AreaError::MissingGeolocation),
        };

        let channel = self
            .channel
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .ok_or(AreaError::MissingChannel)?;

        let states = match self.states {
            Some(states) => normalize_states(states),
            None => DEFAULT_STATES.iter().map(|s| s.to_string()).collect(),
        };

        Ok(SearchArea {
            name: self.name.unwrap_or_else(|| fallback_name.to_string()),
            center: Coordinates::new(latitude, longitude),
            radius_miles: radius,
            states,
            channel,
            enabled: self.enabled,
            test: self.test,
        })
    }
}

fn normalize_states(states: Vec<String>) -> Vec<String> {
    let mut normalized: Vec<String> = Vec::with_capacity(states.len());
    for state in states {
        let code = state.trim().to_ascii_uppercase();
        if !code.is_empty() && !normalized.contains(&code) {
            normalized.push(code);
        }
    }
    normalized
}

/// Load every `*.json` search area from `dir`, in file-name order.
///
/// Unreadable files, malformed JSON and invalid records are logged and
/// skipped. Only a missing or unreadable directory is an error.
pub fn load_search_areas(dir: &Path) -> Result<Vec<SearchArea>, AppError> {
    let entries = fs::read_dir(dir).map_err(|err| {
        AppError::Config(format!("cannot read config directory {}: {}", dir.display(), err))
    })?;

    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "json"))
        .collect();
    files.sort();

    let mut areas = Vec::with_capacity(files.len());
    for path in files {
        let file_name = path.display().to_string();
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(err) => {
                tracing::warn!(file = %file_name, "Skipping unreadable config file: {}", err);
                continue;
            }
        };

        match SearchArea::from_json(&contents, &stem) {
            Ok(area) => {
                tracing::info!(file = %file_name, area = %area.name, "Config file loaded");
                areas.push(area);
            }
            Err(err) => {
                tracing::warn!(file = %file_name, "Invalid config: {}", err);
            }
        }
    }

    Ok(areas)
}
