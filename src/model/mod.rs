//! Station metadata records as delivered by the metadata backend, and the
//! interactive filter criteria applied to them.

pub mod fields;

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use time::Date;

use crate::geometry::Coordinate;

pub type StationId = i64;
pub type VariableId = i64;

/// An observing station. Owns its histories.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Station {
    pub id: StationId,
    #[serde(default)]
    pub native_id: String,
    pub network_uri: String,
    #[serde(default)]
    pub histories: Vec<History>,
}

/// One observation period/location segment of a station.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct History {
    pub id: i64,
    pub lat: f64,
    pub lon: f64,
    #[serde(default)]
    pub elevation: Option<f64>,
    #[serde(default)]
    pub station_name: String,
    #[serde(default)]
    pub province: String,
    #[serde(default, with = "fields::opt_date")]
    pub min_obs_time: Option<Date>,
    #[serde(default, with = "fields::opt_date")]
    pub max_obs_time: Option<Date>,
    #[serde(default)]
    pub freq: String,
    #[serde(
        default,
        alias = "variable_uris",
        deserialize_with = "fields::variable_ids::deserialize"
    )]
    pub variable_ids: Vec<VariableId>,
}

/// A distinct station position. Histories sharing a position collapse into one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Location {
    pub lon: f64,
    pub lat: f64,
    pub elevation: Option<f64>,
}

impl Coordinate for Location {
    fn x(&self) -> f64 {
        self.lon
    }

    fn y(&self) -> f64 {
        self.lat
    }
}

impl Station {
    /// Union of the variables reported by all histories.
    pub fn variable_ids(&self) -> HashSet<VariableId> {
        self.histories
            .iter()
            .flat_map(|h| h.variable_ids.iter().copied())
            .collect()
    }

    /// Union of the non-empty frequency codes of all histories.
    pub fn frequencies(&self) -> HashSet<&str> {
        self.histories
            .iter()
            .map(|h| h.freq.as_str())
            .filter(|freq| !freq.is_empty())
            .collect()
    }

    /// Distinct `(lon, lat, elevation)` positions, in history order.
    pub fn unique_locations(&self) -> Vec<Location> {
        let mut locations: Vec<Location> = Vec::with_capacity(self.histories.len());
        for history in &self.histories {
            let location = Location {
                lon: history.lon,
                lat: history.lat,
                elevation: history.elevation,
            };
            if !locations.contains(&location) {
                locations.push(location);
            }
        }
        locations
    }

    /// Name of the most recent history, for display.
    pub fn display_name(&self) -> Option<&str> {
        self.histories
            .last()
            .map(|h| h.station_name.as_str())
            .filter(|name| !name.is_empty())
    }

    pub fn min_obs_time(&self) -> Option<Date> {
        self.histories.iter().filter_map(|h| h.min_obs_time).min()
    }

    pub fn max_obs_time(&self) -> Option<Date> {
        self.histories.iter().filter_map(|h| h.max_obs_time).max()
    }
}

/// A data-provider grouping of stations, joined to stations by `uri`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Network {
    pub uri: String,
    pub name: String,
    #[serde(default)]
    pub long_name: String,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default = "default_true")]
    pub publish: bool,
}

fn default_true() -> bool {
    true
}

/// An observed quantity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variable {
    pub id: VariableId,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub standard_name: String,
    #[serde(default)]
    pub cell_method: Option<String>,
}

/// The full, unfiltered metadata collections.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Metadata {
    pub stations: Vec<Station>,
    pub networks: Vec<Network>,
    pub variables: Vec<Variable>,
    pub frequencies: Vec<String>,
}

impl Metadata {
    pub fn network(&self, uri: &str) -> Option<&Network> {
        self.networks.iter().find(|n| n.uri == uri)
    }
}

/// User-selected criteria for one filter pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterCriteria {
    #[serde(default, with = "fields::opt_date")]
    pub start_date: Option<Date>,
    #[serde(default, with = "fields::opt_date")]
    pub end_date: Option<Date>,
    #[serde(default)]
    pub include_stations_with_no_obs: bool,
    #[serde(default)]
    pub selected_networks: Vec<String>,
    #[serde(default)]
    pub selected_variables: Vec<VariableId>,
    #[serde(default)]
    pub selected_frequencies: Vec<String>,
    #[serde(default)]
    pub only_with_climatology: bool,
}

impl FilterCriteria {
    /// Everything in `metadata` selected, no date restriction, stations
    /// without observations included.
    pub fn select_all(metadata: &Metadata) -> Self {
        Self {
            start_date: None,
            end_date: None,
            include_stations_with_no_obs: true,
            selected_networks: metadata.networks.iter().map(|n| n.uri.clone()).collect(),
            selected_variables: metadata.variables.iter().map(|v| v.id).collect(),
            selected_frequencies: metadata.frequencies.clone(),
            only_with_climatology: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use time::macros::date;

    #[test]
    fn deserializes_backend_station_shape() {
        let station: Station = serde_json::from_value(json!({
            "id": 1101,
            "native_id": "1010066",
            "network_uri": "https://pdp.example/networks/1",
            "histories": [{
                "id": 13216,
                "station_name": "Beaver Creek",
                "lat": 49.55,
                "lon": -120.95,
                "elevation": 1020.0,
                "province": "BC",
                "freq": "daily",
                "min_obs_time": "1971-01-01T00:00:00",
                "max_obs_time": null,
                "variable_ids": [1, 3]
            }]
        }))
        .unwrap();

        let history = &station.histories[0];
        assert_eq!(history.min_obs_time, Some(date!(1971 - 01 - 01)));
        assert_eq!(history.max_obs_time, None);
        assert_eq!(history.variable_ids, vec![1, 3]);
    }

    #[test]
    fn accepts_variable_uris() {
        let history: History = serde_json::from_value(json!({
            "id": 1,
            "lat": 49.0,
            "lon": -123.0,
            "variable_uris": [
                "https://pdp.example/variables/428",
                "https://pdp.example/variables/429/"
            ]
        }))
        .unwrap();
        assert_eq!(history.variable_ids, vec![428, 429]);
    }

    #[test]
    fn missing_histories_mean_empty() {
        let station: Station =
            serde_json::from_value(json!({"id": 5, "network_uri": "n"})).unwrap();
        assert!(station.histories.is_empty());
        assert!(station.variable_ids().is_empty());
        assert!(station.unique_locations().is_empty());
    }

    #[test]
    fn dates_serialize_as_calendar_dates() {
        let criteria = FilterCriteria {
            start_date: Some(date!(2000 - 01 - 01)),
            ..Default::default()
        };
        let value = serde_json::to_value(&criteria).unwrap();
        assert_eq!(value["start_date"], "2000-01-01");
        assert_eq!(value["end_date"], serde_json::Value::Null);
    }

    #[test]
    fn unique_locations_dedup_on_position_and_elevation() {
        let station: Station = serde_json::from_value(json!({
            "id": 1,
            "network_uri": "n",
            "histories": [
                {"id": 1, "lat": 49.0, "lon": -123.0, "elevation": 5.0},
                {"id": 2, "lat": 49.0, "lon": -123.0, "elevation": 5.0},
                {"id": 3, "lat": 49.0, "lon": -123.0, "elevation": 7.0},
                {"id": 4, "lat": 49.5, "lon": -123.0, "elevation": 5.0}
            ]
        }))
        .unwrap();
        assert_eq!(station.unique_locations().len(), 3);
    }

    #[test]
    fn frequencies_skip_blank_codes() {
        let station: Station = serde_json::from_value(json!({
            "id": 1,
            "network_uri": "n",
            "histories": [
                {"id": 1, "lat": 0.0, "lon": 0.0, "freq": ""},
                {"id": 2, "lat": 0.0, "lon": 0.0, "freq": "daily"}
            ]
        }))
        .unwrap();
        assert_eq!(station.frequencies(), HashSet::from(["daily"]));
    }
}
