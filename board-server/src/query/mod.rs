//! Client queries over a scraped board.
//!
//! A query names a stop, narrows its departures with optional filters,
//! trims each record to chosen fields, and picks an output encoding.
//! Only a missing stop or an unknown encoding is an error; every other
//! malformed option is treated as not given.

mod format;
mod options;
mod pipeline;

pub use format::{OutputFormat, to_delimited};
pub use options::{DepartureQuery, QueryError, QueryOptions};
pub use pipeline::{apply, filter_departures, route_matches};
