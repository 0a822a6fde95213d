//! Departure board server.
//!
//! Scrapes a transit operator's public stop pages and answers with the
//! upcoming departures as JSON or a compact delimited string, optionally
//! filtered by line, route, live tracking and waiting time.

pub mod board;
pub mod config;
pub mod domain;
pub mod query;
pub mod web;
