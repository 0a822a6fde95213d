//! Filter and projection stages.
//!
//! Stages run in a fixed order: line, line colour, route number, real-time,
//! wait time, result limit, then field projection. Each keeps a subsequence
//! of its input, so board order is never disturbed.

use crate::domain::{Departure, FieldSet, LineColour, ProjectedDeparture, StopResult};

use super::options::QueryOptions;

/// Does `route` count as `filter` or one of its lettered variants?
///
/// "58" matches "58", "58A" and "58X" but not "580" or "158".
pub fn route_matches(route: &str, filter: &str) -> bool {
    route == filter || (route.starts_with(filter) && !route.ends_with(|c: char| c.is_ascii_digit()))
}

/// Apply every filter stage and the result limit, in order.
pub fn filter_departures(departures: Vec<Departure>, options: &QueryOptions) -> Vec<Departure> {
    // An unparseable colour can never equal an extracted one.
    let colour = options
        .line_colour
        .as_deref()
        .map(|c| LineColour::parse(c).ok());
    let limit = options.max_results.unwrap_or(usize::MAX);

    departures
        .into_iter()
        .filter(|d| {
            options
                .line
                .as_deref()
                .is_none_or(|line| d.line.as_deref() == Some(line))
        })
        .filter(|d| colour.is_none_or(|c| c.is_some() && d.line_colour == c))
        .filter(|d| {
            options.route_number.as_deref().is_none_or(|filter| {
                d.route_number
                    .as_deref()
                    .is_some_and(|route| route_matches(route, filter))
            })
        })
        .filter(|d| !options.real_time_only || d.is_real_time)
        .filter(|d| {
            options
                .max_wait_time
                .is_none_or(|max| d.expected_mins.is_some_and(|mins| mins <= max))
        })
        .take(limit)
        .collect()
}

/// Run the whole pipeline over a scraped board.
pub fn apply(result: StopResult, options: &QueryOptions) -> StopResult<ProjectedDeparture> {
    let fields = options.fields.unwrap_or_else(FieldSet::all);
    let departures = filter_departures(result.departures, options)
        .iter()
        .map(|d| d.project(fields))
        .collect();

    StopResult {
        stop_id: result.stop_id,
        stop_name: result.stop_name,
        departures,
    }
}
