//! Stop departure boards: fetching and extraction.
//!
//! Boards are ordinary web pages, one per stop. Key characteristics:
//! - The page is read in a single streaming pass and never held whole
//! - Departures are delimited only by their arrival time element; fields
//!   before it belong to it
//! - Unknown or broken markup yields fewer fields, never an error
//! - Clock times ("HH:MM") are operator local time

mod client;
mod error;
mod extract;
mod fixture;
mod scrape;
mod source;

pub use client::{BoardClient, BoardClientConfig, DEFAULT_BASE_URL};
pub use error::BoardError;
pub use extract::{BoardAccumulator, BoardEvent, BoardExtractor, ExtractError, StopPage, extract};
pub use fixture::FixtureBoardSource;
pub use scrape::scrape_stop;
pub use source::{BoardSource, BoardStream};
