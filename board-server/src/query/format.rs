//! Response encodings.

use crate::domain::{ProjectedDeparture, StopResult};

/// How a filtered board is encoded for the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Pretty-printed JSON object.
    #[default]
    Json,

    /// Compact `|`-separated records with `^`-separated fields.
    Delimited,
}

impl OutputFormat {
    /// Parse a `format` option value: exactly "json" or "string".
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "json" => Some(OutputFormat::Json),
            "string" => Some(OutputFormat::Delimited),
            _ => None,
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            OutputFormat::Json => "application/json;charset=UTF-8",
            OutputFormat::Delimited => "text/plain;charset=UTF-8",
        }
    }

    pub fn encode(self, result: &StopResult<ProjectedDeparture>) -> Result<String, serde_json::Error> {
        match self {
            OutputFormat::Json => serde_json::to_string_pretty(result),
            OutputFormat::Delimited => Ok(to_delimited(result)),
        }
    }
}

/// Encode as `stopId|stopName|dep1|dep2|...`.
///
/// Nothing is escaped, so a `|` or `^` inside a value is ambiguous to the
/// reader. With no departures the output still ends in `|`.
pub fn to_delimited(result: &StopResult<ProjectedDeparture>) -> String {
    let departures: Vec<String> = result.departures.iter().map(ProjectedDeparture::delimited).collect();
    format!("{}|{}|{}", result.stop_id, result.stop_name, departures.join("|"))
}
