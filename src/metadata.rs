use anyhow::{Context, Result, bail};
use geojson::GeoJson;
use serde::de::DeserializeOwned;
use std::collections::BTreeSet;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::config::CompiledFilters;
use crate::model::{Metadata, Network, Station, Variable};
use crate::utils::normalize_iso_dates;

pub const STATIONS_FILE: &str = "stations.json";
pub const NETWORKS_FILE: &str = "networks.json";
pub const VARIABLES_FILE: &str = "variables.json";
pub const FREQUENCIES_FILE: &str = "frequencies.json";

/// A directory of already-fetched metadata collections.
#[derive(Debug, Clone)]
pub struct MetadataSource {
    dir: PathBuf,
}

impl MetadataSource {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    /// Load every collection and apply the coarse filters.
    pub fn load(&self, filters: &CompiledFilters) -> Result<Metadata> {
        let networks: Vec<Network> = read_collection(&self.dir.join(NETWORKS_FILE))?;
        let stations: Vec<Station> = read_collection(&self.dir.join(STATIONS_FILE))?;
        let variables: Vec<Variable> = read_collection(&self.dir.join(VARIABLES_FILE))?;

        let frequencies_path = self.dir.join(FREQUENCIES_FILE);
        let frequencies: Vec<String> = if frequencies_path.exists() {
            read_collection(&frequencies_path)?
        } else {
            tracing::info!(
                "Metadata: {} not found, using frequencies reported by stations",
                frequencies_path.display()
            );
            distinct_frequencies(&stations)
        };

        let network_count = networks.len();
        let networks = filters.networks.retain(networks);
        if networks.len() < network_count {
            tracing::info!(
                "Metadata: network filter kept {} of {} networks",
                networks.len(),
                network_count
            );
        }

        let station_count = stations.len();
        let stations = filters.stations.retain(stations);
        if stations.len() < station_count {
            tracing::info!(
                "Metadata: station filter kept {} of {} stations",
                stations.len(),
                station_count
            );
        }

        tracing::info!(
            "Metadata: {} stations, {} networks, {} variables, {} frequencies",
            stations.len(),
            networks.len(),
            variables.len(),
            frequencies.len()
        );

        Ok(Metadata {
            stations,
            networks,
            variables,
            frequencies,
        })
    }
}

/// Read a JSON array, normalising ISO-8601 strings to calendar dates first.
pub fn read_collection<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let file = File::open(path)
        .with_context(|| format!("Metadata: Failed to open {}", path.display()))?;
    let raw: serde_json::Value = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Metadata: Failed to parse JSON in {}", path.display()))?;
    serde_json::from_value(normalize_iso_dates(raw))
        .with_context(|| format!("Metadata: Unexpected record shape in {}", path.display()))
}

/// Sorted distinct non-empty frequency codes of `stations`.
pub fn distinct_frequencies(stations: &[Station]) -> Vec<String> {
    stations
        .iter()
        .flat_map(|s| s.frequencies())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// Load a drawn area from a GeoJSON Geometry, a Feature, or a
/// FeatureCollection holding exactly one Feature.
pub fn load_area(path: &Path) -> Result<geojson::Geometry> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Area: Failed to read {}", path.display()))?;
    let geojson: GeoJson = contents
        .parse()
        .with_context(|| format!("Area: Invalid GeoJSON in {}", path.display()))?;

    let geometry = match geojson {
        GeoJson::Geometry(geometry) => Some(geometry),
        GeoJson::Feature(feature) => feature.geometry,
        GeoJson::FeatureCollection(collection) => {
            if collection.features.len() != 1 {
                bail!(
                    "Area: Expected exactly one feature in {}, found {}",
                    path.display(),
                    collection.features.len()
                );
            }
            collection
                .features
                .into_iter()
                .next()
                .and_then(|feature| feature.geometry)
        }
    };

    geometry.with_context(|| format!("Area: No geometry in {}", path.display()))
}
