//! Driver directory: the external query for available drivers.
//!
//! The hosted database exposes a REST surface; the dispatcher asks it for
//! approved, currently-available drivers in the restaurant's city. Unlike
//! route lookups, a failure here blocks assignment and must reach the
//! dispatcher, so this client returns typed errors instead of degrading.

use std::time::Duration;

use reqwest::{blocking::Client, Url};
use serde::Deserialize;

use crate::dispatch::DriverCandidate;
use crate::geo::GeoPoint;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(3);

/// Errors encountered while querying driver candidates.
#[derive(Debug)]
pub enum DirectoryError {
    Http(reqwest::Error),
    Json(reqwest::Error),
    Api(String),
}

impl From<reqwest::Error> for DirectoryError {
    fn from(err: reqwest::Error) -> Self {
        DirectoryError::Http(err)
    }
}

impl std::fmt::Display for DirectoryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DirectoryError::Http(err) => write!(f, "driver query failed: {err}"),
            DirectoryError::Json(err) => write!(f, "driver query returned malformed data: {err}"),
            DirectoryError::Api(detail) => write!(f, "driver query rejected: {detail}"),
        }
    }
}

impl std::error::Error for DirectoryError {}

/// Source of driver candidates for the dispatch panel.
pub trait DriverDirectory {
    /// Snapshot of approved, available drivers in `city`.
    fn available_drivers(&self, city: &str) -> Result<Vec<DriverCandidate>, DirectoryError>;
}

/// One driver row as stored by the hosted database.
#[derive(Debug, Clone, Deserialize)]
pub struct DriverRow {
    pub id: i64,
    pub name: String,
    pub phone: String,
    pub current_latitude: Option<f64>,
    pub current_longitude: Option<f64>,
}

impl DriverRow {
    /// Convert a stored row into a ranking candidate. A missing or invalid
    /// coordinate pair simply yields an unknown position, never an error.
    pub fn into_candidate(self) -> DriverCandidate {
        let point = match (self.current_latitude, self.current_longitude) {
            (Some(lat), Some(lng)) => GeoPoint::new(lat, lng).ok(),
            _ => None,
        };
        DriverCandidate::new(self.id, self.name, self.phone, point)
    }
}

/// Thin client for the hosted database's REST query surface.
#[derive(Debug, Clone)]
pub struct RestDriverDirectory {
    client: Client,
    endpoint: String,
}

impl RestDriverDirectory {
    /// Create a client for the given endpoint (e.g. `https://db.example.com/rest/v1`).
    pub fn new(endpoint: &str) -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("failed to build directory client");
        Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
        }
    }
}

impl DriverDirectory for RestDriverDirectory {
    fn available_drivers(&self, city: &str) -> Result<Vec<DriverCandidate>, DirectoryError> {
        let mut url = Url::parse(&format!("{}/drivers", self.endpoint))
            .map_err(|err| DirectoryError::Api(format!("failed to build driver query URL: {err}")))?;
        url.query_pairs_mut()
            .append_pair("select", "id,name,phone,current_latitude,current_longitude")
            .append_pair("status", "eq.approved")
            .append_pair("availability", "eq.true")
            .append_pair("city", &format!("eq.{city}"));

        let response = self.client.get(url).send().map_err(DirectoryError::Http)?;
        if !response.status().is_success() {
            return Err(DirectoryError::Api(format!("status {}", response.status())));
        }

        let rows: Vec<DriverRow> = response.json().map_err(DirectoryError::Json)?;
        Ok(rows.into_iter().map(DriverRow::into_candidate).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_with_both_coordinates_becomes_positioned_candidate() {
        let row = DriverRow {
            id: 7,
            name: "Yassine".to_string(),
            phone: "+212600000007".to_string(),
            current_latitude: Some(33.59),
            current_longitude: Some(-7.61),
        };
        let candidate = row.into_candidate();
        let point = candidate.last_known_point.expect("position");
        assert_eq!(point.lat(), 33.59);
        assert_eq!(point.lng(), -7.61);
        assert_eq!(candidate.distance_km, None);
    }

    #[test]
    fn row_missing_either_coordinate_has_unknown_position() {
        let lat_only = DriverRow {
            id: 1,
            name: "A".to_string(),
            phone: "1".to_string(),
            current_latitude: Some(33.59),
            current_longitude: None,
        };
        let lng_only = DriverRow {
            id: 2,
            name: "B".to_string(),
            phone: "2".to_string(),
            current_latitude: None,
            current_longitude: Some(-7.61),
        };
        assert_eq!(lat_only.into_candidate().last_known_point, None);
        assert_eq!(lng_only.into_candidate().last_known_point, None);
    }

    #[test]
    fn row_with_out_of_range_coordinates_has_unknown_position() {
        let row = DriverRow {
            id: 3,
            name: "C".to_string(),
            phone: "3".to_string(),
            current_latitude: Some(123.0),
            current_longitude: Some(-7.61),
        };
        assert_eq!(row.into_candidate().last_known_point, None);
    }

    #[test]
    fn rows_deserialize_from_rest_payload() {
        let raw = r#"[
            {"id": 1, "name": "Yassine", "phone": "+212600000001",
             "current_latitude": 33.6, "current_longitude": -7.6},
            {"id": 2, "name": "Imane", "phone": "+212600000002",
             "current_latitude": null, "current_longitude": null}
        ]"#;
        let rows: Vec<DriverRow> = serde_json::from_str(raw).expect("parse");
        assert_eq!(rows.len(), 2);
        assert!(rows[0].current_latitude.is_some());
        assert!(rows[1].current_latitude.is_none());
    }
}
