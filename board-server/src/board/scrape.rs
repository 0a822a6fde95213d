//! Fetch-and-extract for one stop.

use std::sync::Arc;

use bytes::Bytes;
use futures::StreamExt;
use tokio::sync::mpsc;
use tracing::debug;

use crate::domain::{Clock, LineTable, StopId, StopResult};

use super::error::BoardError;
use super::extract::BoardExtractor;
use super::source::BoardSource;

/// Chunks allowed in flight between download and extraction.
const CHUNK_BUFFER: usize = 16;

/// Fetch a stop's board and extract its departures in one streaming pass.
///
/// The tokenizer is not `Send`, so it runs on a blocking thread and is fed
/// over a bounded channel as chunks arrive. A failure of the source stream
/// fails the whole call; whatever was extracted so far is discarded.
pub async fn scrape_stop(
    source: &dyn BoardSource,
    stop: &StopId,
    lines: Arc<LineTable>,
    clock: Arc<dyn Clock>,
) -> Result<StopResult, BoardError> {
    let mut body = source.open(stop).await?;

    let (tx, mut rx) = mpsc::channel::<Bytes>(CHUNK_BUFFER);
    let extraction = tokio::task::spawn_blocking(move || {
        let mut extractor = BoardExtractor::new(lines, clock);
        while let Some(chunk) = rx.blocking_recv() {
            extractor.write(&chunk)?;
        }
        extractor.finish()
    });

    let mut bytes_read = 0usize;
    while let Some(chunk) = body.next().await {
        let chunk = chunk?;
        bytes_read += chunk.len();
        if tx.send(chunk).await.is_err() {
            // The extractor has stopped; its error is reported below.
            break;
        }
    }
    drop(tx);

    let page = extraction.await??;
    debug!(
        %stop,
        bytes_read,
        departures = page.departures.len(),
        "board extracted"
    );

    Ok(page.into_result(stop.clone()))
}
