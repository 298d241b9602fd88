use anyhow::{Context, Result};
use geo_types::{Geometry, MultiPoint, Point};
use serde_json::{Map, Value};
use std::collections::BTreeSet;

pub mod geojson;
pub mod geojsonl;

pub use self::geojson::GeoJsonSink;
pub use self::geojsonl::GeoJsonlSink;

use crate::model::Station;
use crate::utils::format_date;

#[derive(Clone, Debug)]
pub struct FeatureRow {
    pub geometry: Geometry<f64>,
    pub properties: Map<String, Value>,
}

pub trait DataSink: Send {
    fn add_feature(&mut self, row: FeatureRow) -> Result<()>;
    fn finish(&mut self) -> Result<()>;
}

fn date_value(date: Option<time::Date>) -> Result<Value> {
    match date {
        Some(date) => Ok(Value::String(
            format_date(date).context("Sink: Failed to format date")?,
        )),
        None => Ok(Value::Null),
    }
}

/// One feature per station: a Point for a single location, a MultiPoint when
/// the station has moved. Stations without locations produce no feature.
pub fn station_feature_row(station: &Station, network_name: Option<&str>) -> Result<Option<FeatureRow>> {
    let points: Vec<Point<f64>> = station
        .unique_locations()
        .iter()
        .map(|location| Point::new(location.lon, location.lat))
        .collect();

    let geometry = match points.as_slice() {
        [] => return Ok(None),
        [point] => Geometry::Point(*point),
        _ => Geometry::MultiPoint(MultiPoint::new(points)),
    };

    let freqs: BTreeSet<&str> = station.frequencies().into_iter().collect();

    let mut properties = Map::new();
    properties.insert("id".into(), Value::from(station.id));
    properties.insert("native_id".into(), Value::from(station.native_id.clone()));
    properties.insert("network_uri".into(), Value::from(station.network_uri.clone()));
    properties.insert(
        "network_name".into(),
        network_name.map_or(Value::Null, Value::from),
    );
    properties.insert(
        "station_name".into(),
        station.display_name().map_or(Value::Null, Value::from),
    );
    properties.insert(
        "freqs".into(),
        Value::Array(freqs.into_iter().map(Value::from).collect()),
    );
    properties.insert("min_obs_time".into(), date_value(station.min_obs_time())?);
    properties.insert("max_obs_time".into(), date_value(station.max_obs_time())?);

    Ok(Some(FeatureRow {
        geometry,
        properties,
    }))
}
