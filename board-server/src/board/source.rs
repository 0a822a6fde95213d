//! Where board documents come from.

use bytes::Bytes;
use futures::future::BoxFuture;
use futures::stream::BoxStream;

use crate::domain::StopId;

use super::error::BoardError;

/// A board document, delivered in chunks as it arrives.
pub type BoardStream = BoxStream<'static, Result<Bytes, BoardError>>;

/// Provides the board document for a stop.
///
/// One call is one attempt; implementations do not retry.
pub trait BoardSource: Send + Sync {
    fn open<'a>(&'a self, stop: &'a StopId) -> BoxFuture<'a, Result<BoardStream, BoardError>>;
}
