//! UI settings persisted as a JSON document next to the executable's
//! working directory. Storage failures are reported as warnings on the app
//! state; they never take the UI down.

use std::fmt;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use track_core::animation::DEFAULT_CYCLE_DURATION_MS;
use track_core::geo::GeoPoint;

pub(crate) const SETTINGS_FILE_NAME: &str = "track_ui_settings.json";
const SETTINGS_FILE_VERSION: u32 = 1;

// Default view: a delivery in Rabat dispatched from a Casablanca restaurant.
const DEFAULT_DESTINATION_LAT: f64 = 34.03;
const DEFAULT_DESTINATION_LNG: f64 = -6.83;
const DEFAULT_RESTAURANT_LAT: f64 = 33.59;
const DEFAULT_RESTAURANT_LNG: f64 = -7.61;

#[derive(Debug)]
pub enum SettingsStoreError {
    Io(String),
    InvalidFormat(String),
}

impl fmt::Display for SettingsStoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingsStoreError::Io(detail) => write!(f, "settings file I/O error: {detail}"),
            SettingsStoreError::InvalidFormat(detail) => {
                write!(f, "settings file is not usable: {detail}")
            }
        }
    }
}

impl std::error::Error for SettingsStoreError {}

/// Everything the operator can configure, kept as plain editable fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppSettings {
    pub routing_endpoint: String,
    pub directory_endpoint: String,
    pub city: String,
    pub use_osrm: bool,
    pub cycle_duration_ms: f64,
    pub destination_lat: f64,
    pub destination_lng: f64,
    pub restaurant_enabled: bool,
    pub restaurant_lat: f64,
    pub restaurant_lng: f64,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            routing_endpoint: "http://localhost:5000".to_string(),
            directory_endpoint: "http://localhost:3000/rest/v1".to_string(),
            city: "Casablanca".to_string(),
            use_osrm: true,
            cycle_duration_ms: DEFAULT_CYCLE_DURATION_MS,
            destination_lat: DEFAULT_DESTINATION_LAT,
            destination_lng: DEFAULT_DESTINATION_LNG,
            restaurant_enabled: true,
            restaurant_lat: DEFAULT_RESTAURANT_LAT,
            restaurant_lng: DEFAULT_RESTAURANT_LNG,
        }
    }
}

impl AppSettings {
    /// Delivery destination; out-of-range edits fall back to the default.
    pub fn destination(&self) -> GeoPoint {
        GeoPoint::new(self.destination_lat, self.destination_lng).unwrap_or_else(|_| {
            GeoPoint::new(DEFAULT_DESTINATION_LAT, DEFAULT_DESTINATION_LNG)
                .expect("default destination is valid")
        })
    }

    /// Restaurant position, when enabled and in range.
    pub fn restaurant(&self) -> Option<GeoPoint> {
        if !self.restaurant_enabled {
            return None;
        }
        GeoPoint::new(self.restaurant_lat, self.restaurant_lng).ok()
    }
}

#[derive(Serialize, Deserialize)]
struct SettingsFileV1 {
    version: u32,
    settings: AppSettings,
}

pub(crate) fn settings_file_path() -> Result<PathBuf, SettingsStoreError> {
    let cwd = std::env::current_dir()
        .map_err(|error| SettingsStoreError::Io(format!("failed to read current directory: {error}")))?;
    Ok(cwd.join(SETTINGS_FILE_NAME))
}

/// Load stored settings. A missing file is not an error; a corrupt one is.
pub(crate) fn load_settings(path: &Path) -> Result<Option<AppSettings>, SettingsStoreError> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(error) => return Err(SettingsStoreError::Io(error.to_string())),
    };
    let parsed: SettingsFileV1 = serde_json::from_str(&raw)
        .map_err(|error| SettingsStoreError::InvalidFormat(error.to_string()))?;
    if parsed.version != SETTINGS_FILE_VERSION {
        return Err(SettingsStoreError::InvalidFormat(format!(
            "unsupported settings version {}",
            parsed.version
        )));
    }
    Ok(Some(parsed.settings))
}

/// Write settings through a temp file so a crash can't truncate the store.
pub(crate) fn save_settings_atomic(
    path: &Path,
    settings: &AppSettings,
) -> Result<(), SettingsStoreError> {
    let document = SettingsFileV1 {
        version: SETTINGS_FILE_VERSION,
        settings: settings.clone(),
    };
    let payload = serde_json::to_string_pretty(&document)
        .map_err(|error| SettingsStoreError::InvalidFormat(error.to_string()))?;

    let tmp_path = path.with_extension("json.tmp");
    let mut file =
        File::create(&tmp_path).map_err(|error| SettingsStoreError::Io(error.to_string()))?;
    file.write_all(payload.as_bytes())
        .map_err(|error| SettingsStoreError::Io(error.to_string()))?;
    fs::rename(&tmp_path, path).map_err(|error| SettingsStoreError::Io(error.to_string()))?;
    Ok(())
}
