//! Client query options.

use std::collections::HashMap;

use crate::domain::{FieldSet, StopId};

use super::format::OutputFormat;

/// Errors in a client's query that make the request unanswerable.
///
/// Anything else odd about a query (a non-numeric limit, an unknown field
/// name) just switches that option off.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
    #[error("missing stopId")]
    MissingStopId,

    #[error("unknown format: {0}")]
    UnknownFormat(String),
}

/// Filter, projection and encoding options for one request.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct QueryOptions {
    /// Keep only departures on this line name.
    pub line: Option<String>,

    /// Keep only departures with this colour (hex, `#` optional).
    pub line_colour: Option<String>,

    /// Keep only this route and its lettered variants.
    pub route_number: Option<String>,

    /// Keep only live-tracked departures.
    pub real_time_only: bool,

    /// Keep only departures due within this many minutes.
    pub max_wait_time: Option<i64>,

    /// Return at most this many departures. Always positive.
    pub max_results: Option<usize>,

    /// Fields to keep on each departure; `None` keeps all.
    pub fields: Option<FieldSet>,

    /// Output encoding.
    pub format: OutputFormat,
}

/// A validated departures request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepartureQuery {
    pub stop_id: StopId,
    pub options: QueryOptions,
}

impl DepartureQuery {
    /// Build a query from URL query pairs.
    ///
    /// When a key repeats, its first value is used. Unrecognized keys are
    /// ignored.
    ///
    /// ```
    /// use board_server::query::{DepartureQuery, OutputFormat};
    ///
    /// let query = DepartureQuery::from_pairs([
    ///     ("stopId", "3390FO07"),
    ///     ("routeNumber", "58"),
    ///     ("maxResults", "3"),
    ///     ("format", "string"),
    /// ])
    /// .unwrap();
    ///
    /// assert_eq!(query.stop_id.as_str(), "3390FO07");
    /// assert_eq!(query.options.route_number.as_deref(), Some("58"));
    /// assert_eq!(query.options.max_results, Some(3));
    /// assert_eq!(query.options.format, OutputFormat::Delimited);
    /// ```
    pub fn from_pairs<'a, I>(pairs: I) -> Result<Self, QueryError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut params: HashMap<&str, &str> = HashMap::new();
        for (key, value) in pairs {
            params.entry(key).or_insert(value);
        }

        let stop_id = params
            .get("stopId")
            .and_then(|s| StopId::parse(s).ok())
            .ok_or(QueryError::MissingStopId)?;

        let text = |key: &str| params.get(key).filter(|v| !v.is_empty()).map(|v| v.to_string());
        let integer = |key: &str| params.get(key).and_then(|v| v.trim().parse::<i64>().ok());

        let format = match params.get("format").filter(|v| !v.is_empty()) {
            None => OutputFormat::default(),
            Some(name) => {
                OutputFormat::parse(name).ok_or_else(|| QueryError::UnknownFormat(name.to_string()))?
            }
        };

        let options = QueryOptions {
            line: text("line"),
            line_colour: text("lineColour"),
            route_number: text("routeNumber"),
            real_time_only: params.contains_key("realTimeOnly"),
            max_wait_time: integer("maxWaitTime"),
            max_results: integer("maxResults")
                .filter(|n| *n > 0)
                .and_then(|n| usize::try_from(n).ok()),
            fields: params
                .get("fields")
                .map(|list| FieldSet::parse_list(list))
                .filter(|set| !set.is_empty()),
            format,
        };

        Ok(Self { stop_id, options })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Field;

    fn parse(pairs: &[(&str, &str)]) -> Result<DepartureQuery, QueryError> {
        DepartureQuery::from_pairs(pairs.iter().copied())
    }

    fn options(pairs: &[(&str, &str)]) -> QueryOptions {
        let mut all = vec![("stopId", "123")];
        all.extend_from_slice(pairs);
        parse(&all).unwrap().options
    }

    #[test]
    fn stop_id_only_gives_defaults() {
        let query = parse(&[("stopId", "123")]).unwrap();
        assert_eq!(query.stop_id.as_str(), "123");
        assert_eq!(query.options, QueryOptions::default());
    }

    #[test]
    fn missing_stop_id_rejected() {
        assert_eq!(parse(&[]), Err(QueryError::MissingStopId));
        assert_eq!(parse(&[("stopId", "")]), Err(QueryError::MissingStopId));
        assert_eq!(parse(&[("stopId", "  ")]), Err(QueryError::MissingStopId));
        assert_eq!(
            parse(&[("stop", "123"), ("format", "json")]),
            Err(QueryError::MissingStopId)
        );
    }

    #[test]
    fn unknown_format_rejected() {
        assert_eq!(
            parse(&[("stopId", "123"), ("format", "xml")]),
            Err(QueryError::UnknownFormat("xml".into()))
        );
    }

    #[test]
    fn format_names() {
        assert_eq!(options(&[("format", "json")]).format, OutputFormat::Json);
        assert_eq!(options(&[("format", "string")]).format, OutputFormat::Delimited);
        assert_eq!(options(&[("format", "")]).format, OutputFormat::Json);
    }

    #[test]
    fn format_names_are_case_sensitive() {
        assert_eq!(
            parse(&[("stopId", "123"), ("format", "STRING")]),
            Err(QueryError::UnknownFormat("STRING".into()))
        );
        assert_eq!(
            parse(&[("stopId", "123"), ("format", "Json")]),
            Err(QueryError::UnknownFormat("Json".into()))
        );
    }

    #[test]
    fn first_value_wins() {
        let query = parse(&[("stopId", "1"), ("stopId", "2"), ("routeNumber", "58"), ("routeNumber", "59")]).unwrap();
        assert_eq!(query.stop_id.as_str(), "1");
        assert_eq!(query.options.route_number.as_deref(), Some("58"));
    }

    #[test]
    fn text_filters() {
        let opts = options(&[("line", "Lime"), ("lineColour", "92D400"), ("routeNumber", "58X")]);
        assert_eq!(opts.line.as_deref(), Some("Lime"));
        assert_eq!(opts.line_colour.as_deref(), Some("92D400"));
        assert_eq!(opts.route_number.as_deref(), Some("58X"));

        let opts = options(&[("line", ""), ("lineColour", ""), ("routeNumber", "")]);
        assert_eq!(opts, QueryOptions::default());
    }

    #[test]
    fn real_time_only_is_presence() {
        assert!(options(&[("realTimeOnly", "true")]).real_time_only);
        assert!(options(&[("realTimeOnly", "false")]).real_time_only);
        assert!(options(&[("realTimeOnly", "")]).real_time_only);
        assert!(!options(&[]).real_time_only);
    }

    #[test]
    fn max_wait_time() {
        assert_eq!(options(&[("maxWaitTime", "5")]).max_wait_time, Some(5));
        assert_eq!(options(&[("maxWaitTime", "0")]).max_wait_time, Some(0));
        assert_eq!(options(&[("maxWaitTime", " 10 ")]).max_wait_time, Some(10));
        assert_eq!(options(&[("maxWaitTime", "soon")]).max_wait_time, None);
        assert_eq!(options(&[("maxWaitTime", "")]).max_wait_time, None);
    }

    #[test]
    fn max_results() {
        assert_eq!(options(&[("maxResults", "3")]).max_results, Some(3));
        assert_eq!(options(&[("maxResults", "0")]).max_results, None);
        assert_eq!(options(&[("maxResults", "-2")]).max_results, None);
        assert_eq!(options(&[("maxResults", "lots")]).max_results, None);
    }

    #[test]
    fn fields() {
        let opts = options(&[("fields", "routeNumber,expectedMins")]);
        let fields: Vec<_> = opts.fields.unwrap().iter().collect();
        assert_eq!(fields, [Field::RouteNumber, Field::ExpectedMins]);

        assert_eq!(options(&[("fields", "bogus")]).fields, None);
        assert_eq!(options(&[("fields", "")]).fields, None);
    }
}
