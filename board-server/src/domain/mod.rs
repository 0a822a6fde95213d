//! Domain types for stop departure boards.
//!
//! This module contains the validated building blocks of a board: stop ids,
//! line colours, departure records and the arrival-time normalizer. Types
//! enforce their invariants at construction time.

mod clock;
mod departure;
mod line;
mod stop;
mod time;

pub use clock::{Clock, FixedClock, OPERATOR_ZONE, SystemClock};
pub use departure::{Departure, Field, FieldSet, FieldValue, ProjectedDeparture, StopResult};
pub use line::{InvalidColour, LineColour, LineTable, LineTableError};
pub use stop::{InvalidStopId, StopId};
pub use time::{ArrivalEstimate, BoardTime, TimeError, normalize};
