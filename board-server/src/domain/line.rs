//! Line colours and the colour -> line name table.

use std::collections::HashMap;
use std::fmt;

use serde::{Serialize, Serializer};

/// Error returned when parsing an invalid colour token.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid line colour: {reason}")]
pub struct InvalidColour {
    reason: &'static str,
}

/// A `#RRGGBB` colour token identifying a line on the board.
///
/// Hex digits are stored upper-cased, so two tokens that differ only in
/// case compare equal.
///
/// # Examples
///
/// ```
/// use board_server::domain::LineColour;
///
/// let lime = LineColour::parse("#92d400").unwrap();
/// assert_eq!(lime.to_string(), "#92D400");
///
/// // The leading '#' is optional
/// assert_eq!(LineColour::parse("92D400").unwrap(), lime);
///
/// assert!(LineColour::parse("#92D40").is_err());
/// assert!(LineColour::parse("#92D40G").is_err());
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct LineColour([u8; 6]);

impl LineColour {
    /// Parse a colour from six hex digits with an optional leading `#`.
    pub fn parse(s: &str) -> Result<Self, InvalidColour> {
        let hex = s.strip_prefix('#').unwrap_or(s).as_bytes();

        if hex.len() != 6 {
            return Err(InvalidColour {
                reason: "must be exactly 6 hex digits",
            });
        }

        let mut digits = [0u8; 6];
        for (slot, &b) in digits.iter_mut().zip(hex) {
            if !b.is_ascii_hexdigit() {
                return Err(InvalidColour {
                    reason: "must be hex digits 0-9 or A-F",
                });
            }
            *slot = b.to_ascii_uppercase();
        }

        Ok(LineColour(digits))
    }

    /// Returns the six hex digits without the leading `#`.
    pub fn hex(&self) -> &str {
        // SAFETY: We only store ASCII hex digits
        std::str::from_utf8(&self.0).unwrap()
    }
}

impl fmt::Debug for LineColour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LineColour(#{})", self.hex())
    }
}

impl fmt::Display for LineColour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.hex())
    }
}

impl Serialize for LineColour {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Errors loading a colour table.
#[derive(Debug, thiserror::Error)]
pub enum LineTableError {
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("bad colour key {key:?}: {source}")]
    Colour {
        key: String,
        #[source]
        source: InvalidColour,
    },
}

/// Colour -> line name lookup.
///
/// Built once at startup and shared read-only between requests.
#[derive(Debug, Clone, Default)]
pub struct LineTable {
    names: HashMap<LineColour, String>,
}

/// Built-in line colours for Nottingham City Transport boards.
const NCT_LINES: &[(&str, &str)] = &[
    ("#92D400", "Lime"),
    ("#213D7A", "Navy"),
    ("#E3051B", "Red"),
    ("#E6007E", "Pink"),
    ("#7D2883", "Purple"),
    ("#F39200", "Orange"),
    ("#FFDD00", "Yellow"),
    ("#00963F", "Green"),
    ("#0075BF", "Blue"),
    ("#00A0E2", "Sky"),
    ("#00A19A", "Turquoise"),
    ("#007A7D", "Teal"),
    ("#8B5A2B", "Brown"),
    ("#B48CC3", "Lilac"),
    ("#878787", "Grey"),
];

impl LineTable {
    /// Build a table from colour/name pairs. Later duplicates win.
    pub fn new(entries: impl IntoIterator<Item = (LineColour, String)>) -> Self {
        Self {
            names: entries.into_iter().collect(),
        }
    }

    /// The built-in table for the default operator.
    pub fn nct() -> Self {
        Self::new(NCT_LINES.iter().filter_map(|(colour, name)| {
            LineColour::parse(colour)
                .ok()
                .map(|c| (c, (*name).to_string()))
        }))
    }

    /// Parse a JSON object of `{"#RRGGBB": "Line name"}`.
    pub fn from_json(json: &str) -> Result<Self, LineTableError> {
        let raw: HashMap<String, String> = serde_json::from_str(json)?;

        let mut names = HashMap::with_capacity(raw.len());
        for (key, name) in raw {
            let colour = LineColour::parse(&key)
                .map_err(|source| LineTableError::Colour { key, source })?;
            names.insert(colour, name);
        }

        Ok(Self { names })
    }

    /// Look up the line name for a colour.
    pub fn resolve(&self, colour: &LineColour) -> Option<&str> {
        self.names.get(colour).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_valid_colours() {
        assert!(LineColour::parse("#000000").is_ok());
        assert!(LineColour::parse("#FFFFFF").is_ok());
        assert!(LineColour::parse("abcdef").is_ok());
    }

    #[test]
    fn reject_wrong_length() {
        assert!(LineColour::parse("").is_err());
        assert!(LineColour::parse("#").is_err());
        assert!(LineColour::parse("#FFF").is_err());
        assert!(LineColour::parse("#FFFFFFF").is_err());
        assert!(LineColour::parse("##FFFFFF").is_err());
    }

    #[test]
    fn reject_non_hex() {
        assert!(LineColour::parse("#GGGGGG").is_err());
        assert!(LineColour::parse("#12 456").is_err());
        assert!(LineColour::parse("#12345Ö").is_err());
    }

    #[test]
    fn canonical_upper_case() {
        let c = LineColour::parse("#e3051b").unwrap();
        assert_eq!(c.hex(), "E3051B");
        assert_eq!(c.to_string(), "#E3051B");
        assert_eq!(format!("{c:?}"), "LineColour(#E3051B)");
    }

    #[test]
    fn serializes_with_hash() {
        let c = LineColour::parse("92d400").unwrap();
        assert_eq!(serde_json::to_string(&c).unwrap(), "\"#92D400\"");
    }

    #[test]
    fn builtin_table_resolves() {
        let table = LineTable::nct();
        assert_eq!(table.len(), NCT_LINES.len());

        let lime = LineColour::parse("#92D400").unwrap();
        assert_eq!(table.resolve(&lime), Some("Lime"));

        let unknown = LineColour::parse("#123456").unwrap();
        assert_eq!(table.resolve(&unknown), None);
    }

    #[test]
    fn table_from_json() {
        let table = LineTable::from_json(r##"{"#abcdef": "Test", "123456": "Other"}"##).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(
            table.resolve(&LineColour::parse("#ABCDEF").unwrap()),
            Some("Test")
        );
        assert_eq!(
            table.resolve(&LineColour::parse("#123456").unwrap()),
            Some("Other")
        );
    }

    #[test]
    fn table_from_json_rejects_bad_key() {
        let err = LineTable::from_json(r#"{"red": "Red"}"#).unwrap_err();
        assert!(matches!(err, LineTableError::Colour { ref key, .. } if key == "red"));
        assert!(err.to_string().contains("bad colour key"));

        assert!(matches!(
            LineTable::from_json("[]").unwrap_err(),
            LineTableError::Json(_)
        ));
    }

    #[test]
    fn empty_table() {
        let table = LineTable::default();
        assert!(table.is_empty());
        assert_eq!(table.resolve(&LineColour::parse("#92D400").unwrap()), None);
    }
}
