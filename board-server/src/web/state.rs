//! Application state for the web layer.

use std::sync::Arc;

use crate::board::BoardSource;
use crate::domain::{Clock, LineTable};

/// Shared application state.
///
/// Everything here is read-only once the server starts.
#[derive(Clone)]
pub struct AppState {
    /// Where board pages come from
    pub source: Arc<dyn BoardSource>,

    /// Colour-to-line table
    pub lines: Arc<LineTable>,

    /// Reference time for relative arrival times
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    /// Create a new app state.
    pub fn new(
        source: impl BoardSource + 'static,
        lines: LineTable,
        clock: impl Clock + 'static,
    ) -> Self {
        Self {
            source: Arc::new(source),
            lines: Arc::new(lines),
            clock: Arc::new(clock),
        }
    }
}
