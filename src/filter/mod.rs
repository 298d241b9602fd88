//! Filter passes over the station collection.
//!
//! [`station_filter`] applies the interactive criteria; [`station_area_filter`]
//! is an independent second pass restricting stations to a drawn area.
//! Both are pure and keep the input order.

pub mod timing;

use regex::Regex;
use std::borrow::Borrow;
use std::collections::HashSet;
use std::sync::LazyLock;

use crate::error::GeometryError;
use crate::geometry::point_in_multi_polygon;
use crate::model::{FilterCriteria, Metadata, Station, Variable, VariableId};
use crate::predicates::{
    station_in_any_network, station_matches_dates, station_reports_any_freqs,
    station_reports_climatology_variable, station_reports_some_variables,
};

pub use timing::{Instrumentation, NoInstrumentation, PhaseTimer, PhaseTotal, timed};

/// Phase names reported to [`Instrumentation`].
pub mod phase {
    pub const CLIMATOLOGY_IDS: &str = "climatology_variable_ids";
    pub const DATES: &str = "station_matches_dates";
    pub const NETWORKS: &str = "station_in_any_network";
    pub const VARIABLES: &str = "station_reports_some_variables";
    pub const FREQUENCIES: &str = "station_reports_any_freqs";
    pub const CLIMATOLOGY: &str = "station_reports_climatology_variable";
}

static CLIMATOLOGY_CELL_METHOD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("within|over").expect("valid climatology pattern"));

/// A climatology variable aggregates within or over a period.
pub fn is_climatology_variable(variable: &Variable) -> bool {
    variable
        .cell_method
        .as_deref()
        .is_some_and(|method| CLIMATOLOGY_CELL_METHOD.is_match(method))
}

pub fn climatology_variable_ids(variables: &[Variable]) -> HashSet<VariableId> {
    variables
        .iter()
        .filter(|v| is_climatology_variable(v))
        .map(|v| v.id)
        .collect()
}

/// Stations satisfying every criterion, in input order.
pub fn station_filter<'a>(criteria: &FilterCriteria, metadata: &'a Metadata) -> Vec<&'a Station> {
    station_filter_instrumented(criteria, metadata, &mut NoInstrumentation)
}

/// [`station_filter`] reporting per-predicate timings to `instrumentation`.
pub fn station_filter_instrumented<'a, I>(
    criteria: &FilterCriteria,
    metadata: &'a Metadata,
    instrumentation: &mut I,
) -> Vec<&'a Station>
where
    I: Instrumentation + ?Sized,
{
    instrumentation.begin_pass();

    let climatology_ids = timed(instrumentation, phase::CLIMATOLOGY_IDS, || {
        climatology_variable_ids(&metadata.variables)
    });

    let matches: Vec<&Station> = metadata
        .stations
        .iter()
        .filter(|station| {
            timed(instrumentation, phase::DATES, || {
                station_matches_dates(station, criteria.start_date, criteria.end_date, false)
            }) && timed(instrumentation, phase::NETWORKS, || {
                station_in_any_network(station, &criteria.selected_networks)
            }) && timed(instrumentation, phase::VARIABLES, || {
                station_reports_some_variables(
                    station,
                    &criteria.selected_variables,
                    criteria.include_stations_with_no_obs,
                )
            }) && timed(instrumentation, phase::FREQUENCIES, || {
                station_reports_any_freqs(
                    station,
                    &criteria.selected_frequencies,
                    criteria.include_stations_with_no_obs,
                )
            }) && (!criteria.only_with_climatology
                || timed(instrumentation, phase::CLIMATOLOGY, || {
                    station_reports_climatology_variable(station, &climatology_ids)
                }))
        })
        .collect();

    instrumentation.end_pass();
    tracing::debug!(
        "Filter: {} of {} stations match criteria",
        matches.len(),
        metadata.stations.len()
    );
    matches
}

/// Stations with at least one location inside `area`, in input order.
///
/// `None` keeps every station. Works on owned stations or references.
pub fn station_area_filter<S, I>(
    area: Option<&geojson::Geometry>,
    stations: I,
) -> Result<Vec<S>, GeometryError>
where
    I: IntoIterator<Item = S>,
    S: Borrow<Station>,
{
    let Some(area) = area else {
        return Ok(stations.into_iter().collect());
    };

    let inside = point_in_multi_polygon(Some(area))?;
    Ok(stations
        .into_iter()
        .filter(|station| {
            let station: &Station = station.borrow();
            station
                .unique_locations()
                .iter()
                .any(|location| inside.contains(location))
        })
        .collect())
}
