//! Boolean predicates over a single station.
//!
//! Each predicate is independent of the others; [`crate::filter`] combines
//! them into a filter pass.

use std::collections::HashSet;
use time::Date;

use crate::model::{History, Station, VariableId};

fn history_overlaps(history: &History, start: Option<Date>, end: Option<Date>) -> bool {
    let starts_in_time =
        start.is_none_or(|start| history.max_obs_time.is_none_or(|max| start <= max));
    let ends_in_time = end.is_none_or(|end| history.min_obs_time.is_none_or(|min| min <= end));
    starts_in_time && ends_in_time
}

fn history_contains(history: &History, start: Option<Date>, end: Option<Date>) -> bool {
    let covers_start =
        start.is_none_or(|start| history.min_obs_time.is_some_and(|min| min <= start));
    let covers_end = end.is_none_or(|end| history.max_obs_time.is_some_and(|max| end <= max));
    covers_start && covers_end
}

/// True when some history matches the `[start, end]` query range.
///
/// Non-strict matching only asks for the ranges to overlap, with an unknown
/// bound on either side counting as open. Strict matching requires the query
/// range to lie within the history's observed range. Dates are UTC calendar
/// dates. A station without histories never matches.
pub fn station_matches_dates(
    station: &Station,
    start: Option<Date>,
    end: Option<Date>,
    strict: bool,
) -> bool {
    station.histories.iter().any(|history| {
        if strict {
            history_contains(history, start, end)
        } else {
            history_overlaps(history, start, end)
        }
    })
}

/// True when the station belongs to one of `network_uris`. Selecting no
/// networks selects no stations.
pub fn station_in_any_network(station: &Station, network_uris: &[String]) -> bool {
    network_uris.iter().any(|uri| *uri == station.network_uri)
}

/// True when the station reports any of `variable_ids`.
///
/// A station whose histories report no variables at all is decided by
/// `include_stations_with_no_obs` alone.
pub fn station_reports_some_variables(
    station: &Station,
    variable_ids: &[VariableId],
    include_stations_with_no_obs: bool,
) -> bool {
    let reported = station.variable_ids();
    if reported.is_empty() {
        return include_stations_with_no_obs;
    }
    variable_ids.iter().any(|id| reported.contains(id))
}

/// True when the station reports at any of `freqs`.
///
/// A station with no frequency codes is decided by
/// `include_stations_with_no_obs` alone.
pub fn station_reports_any_freqs(
    station: &Station,
    freqs: &[String],
    include_stations_with_no_obs: bool,
) -> bool {
    let reported = station.frequencies();
    if reported.is_empty() {
        return include_stations_with_no_obs;
    }
    freqs.iter().any(|freq| reported.contains(freq.as_str()))
}

/// True when the station reports any climatology variable.
pub fn station_reports_climatology_variable(
    station: &Station,
    climatology_variable_ids: &HashSet<VariableId>,
) -> bool {
    station
        .histories
        .iter()
        .flat_map(|h| &h.variable_ids)
        .any(|id| climatology_variable_ids.contains(id))
}
