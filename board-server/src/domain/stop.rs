//! Stop identifier type.

use std::fmt;

use serde::Serialize;

/// Error returned when a stop identifier is missing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid stop id: must not be empty")]
pub struct InvalidStopId;

/// A client-supplied stop identifier.
///
/// Opaque apart from being non-blank; it is passed through to the board
/// source unchanged.
///
/// # Examples
///
/// ```
/// use board_server::domain::StopId;
///
/// let stop = StopId::parse("3390FO07").unwrap();
/// assert_eq!(stop.as_str(), "3390FO07");
///
/// assert!(StopId::parse("").is_err());
/// assert!(StopId::parse("   ").is_err());
/// ```
#[derive(Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct StopId(String);

impl StopId {
    pub fn parse(s: &str) -> Result<Self, InvalidStopId> {
        if s.trim().is_empty() {
            return Err(InvalidStopId);
        }
        Ok(StopId(s.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for StopId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StopId({})", self.0)
    }
}

impl fmt::Display for StopId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_value_verbatim() {
        let stop = StopId::parse(" 123 ").unwrap();
        assert_eq!(stop.as_str(), " 123 ");
        assert_eq!(stop.to_string(), " 123 ");
    }

    #[test]
    fn rejects_blank() {
        assert_eq!(StopId::parse("\t\n"), Err(InvalidStopId));
    }

    #[test]
    fn serializes_as_string() {
        let stop = StopId::parse("123").unwrap();
        assert_eq!(serde_json::to_string(&stop).unwrap(), "\"123\"");
    }
}
