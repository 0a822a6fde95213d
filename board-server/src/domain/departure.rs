//! Departure records and field projection.

use std::fmt;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use super::{LineColour, StopId};

/// One departure observed on a board.
///
/// Optional fields are omitted from JSON output rather than sent as null.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Departure {
    /// Route as printed, e.g. "58X".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub route_number: Option<String>,

    /// Free-text destination.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,

    /// Colour of the route's highlight bar.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_colour: Option<LineColour>,

    /// Line name resolved from `line_colour`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<String>,

    /// Arrival exactly as displayed ("Due", "12 mins", "23:47").
    pub expected_raw: String,

    /// Minutes until departure, when the display could be interpreted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_mins: Option<i64>,

    /// Live-tracked estimate rather than a timetabled time.
    pub is_real_time: bool,
}

/// A record field, in the record's natural order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    RouteNumber,
    Destination,
    LineColour,
    Line,
    ExpectedRaw,
    ExpectedMins,
    IsRealTime,
}

impl Field {
    /// All fields in natural order.
    pub const ALL: [Field; 7] = [
        Field::RouteNumber,
        Field::Destination,
        Field::LineColour,
        Field::Line,
        Field::ExpectedRaw,
        Field::ExpectedMins,
        Field::IsRealTime,
    ];

    /// The field's name in output and in the `fields` option.
    pub fn name(self) -> &'static str {
        match self {
            Field::RouteNumber => "routeNumber",
            Field::Destination => "destination",
            Field::LineColour => "lineColour",
            Field::Line => "line",
            Field::ExpectedRaw => "expectedRaw",
            Field::ExpectedMins => "expectedMins",
            Field::IsRealTime => "isRealTime",
        }
    }

    /// Look up a field by its exact name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.name() == name)
    }

    fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

/// A set of fields, iterated in natural order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FieldSet(u8);

impl FieldSet {
    pub fn all() -> Self {
        Field::ALL.into_iter().collect()
    }

    pub fn contains(&self, field: Field) -> bool {
        self.0 & field.bit() != 0
    }

    pub fn insert(&mut self, field: Field) {
        self.0 |= field.bit();
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = Field> + '_ {
        Field::ALL.into_iter().filter(|f| self.contains(*f))
    }

    /// Parse a comma-separated list of field names.
    ///
    /// Whitespace around names is ignored, as are unknown names.
    ///
    /// ```
    /// use board_server::domain::{Field, FieldSet};
    ///
    /// let fields = FieldSet::parse_list("expectedMins, routeNumber,bogus");
    /// let names: Vec<_> = fields.iter().map(Field::name).collect();
    /// assert_eq!(names, ["routeNumber", "expectedMins"]);
    /// ```
    pub fn parse_list(list: &str) -> Self {
        list.split(',')
            .filter_map(|name| Field::from_name(name.trim()))
            .collect()
    }
}

impl FromIterator<Field> for FieldSet {
    fn from_iter<I: IntoIterator<Item = Field>>(iter: I) -> Self {
        let mut set = FieldSet::default();
        for field in iter {
            set.insert(field);
        }
        set
    }
}

/// The value of one field of a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Minutes(i64),
    Flag(bool),
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(s) => f.write_str(s),
            FieldValue::Minutes(m) => write!(f, "{m}"),
            FieldValue::Flag(b) => write!(f, "{b}"),
        }
    }
}

impl Departure {
    /// The value of `field`, or `None` if this record lacks it.
    pub fn value(&self, field: Field) -> Option<FieldValue> {
        match field {
            Field::RouteNumber => self.route_number.clone().map(FieldValue::Text),
            Field::Destination => self.destination.clone().map(FieldValue::Text),
            Field::LineColour => self.line_colour.map(|c| FieldValue::Text(c.to_string())),
            Field::Line => self.line.clone().map(FieldValue::Text),
            Field::ExpectedRaw => Some(FieldValue::Text(self.expected_raw.clone())),
            Field::ExpectedMins => self.expected_mins.map(FieldValue::Minutes),
            Field::IsRealTime => Some(FieldValue::Flag(self.is_real_time)),
        }
    }

    /// Keep only the given fields.
    pub fn project(&self, fields: FieldSet) -> ProjectedDeparture {
        ProjectedDeparture {
            slots: fields.iter().map(|f| (f, self.value(f))).collect(),
        }
    }
}

/// A departure reduced to a chosen set of fields.
///
/// Selected fields the record lacks are kept as empty slots: they are left
/// out of JSON but still occupy a position in the delimited encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectedDeparture {
    slots: Vec<(Field, Option<FieldValue>)>,
}

impl ProjectedDeparture {
    /// Values joined with `^` in natural field order. Absent values are empty.
    pub fn delimited(&self) -> String {
        self.slots
            .iter()
            .map(|(_, value)| value.as_ref().map(ToString::to_string).unwrap_or_default())
            .collect::<Vec<_>>()
            .join("^")
    }

    /// Present values in natural field order.
    pub fn values(&self) -> impl Iterator<Item = (Field, &FieldValue)> + '_ {
        self.slots
            .iter()
            .filter_map(|(field, value)| value.as_ref().map(|v| (*field, v)))
    }
}

impl Serialize for ProjectedDeparture {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        for (field, value) in self.values() {
            map.serialize_entry(field.name(), value)?;
        }
        map.end()
    }
}

/// Everything extracted from one stop's board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StopResult<D = Departure> {
    pub stop_id: StopId,

    /// Board heading; empty if the page had none.
    pub stop_name: String,

    pub departures: Vec<D>,
}
