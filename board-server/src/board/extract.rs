//! Streaming extraction of departures from board markup.
//!
//! The board page is fed through `lol_html` chunk by chunk; it is never held
//! in memory as a whole. Selector handlers do no interpretation: they only
//! turn matched markup into [`BoardEvent`]s. After each chunk the queued
//! events are replayed into a [`BoardAccumulator`], which owns the two
//! pieces of mutable state (stop name and the departure being assembled) and
//! decides where one departure ends and the next begins.
//!
//! The arrival time is the only record boundary. A departure is emitted the
//! moment its arrival text is seen, with whatever other fields happened to
//! precede it.

use std::borrow::Cow;
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use lol_html::errors::RewritingError;
use lol_html::{
    ElementContentHandlers, HtmlRewriter, OutputSink, Selector, Settings, element, end_tag, text,
};
use tracing::{debug, trace};

use crate::domain::{Clock, Departure, LineColour, LineTable, StopId, StopResult, normalize};

/// Stop name banner.
const HEADING: &str = "h1.place-info-banner__name";
/// Coloured bar carrying the line colour in its inline style.
const HIGHLIGHT: &str = "div.single-visit__highlight";
/// Route number, e.g. "58X".
const ROUTE_NAME: &str = "p.single-visit__name";
/// Destination text.
const DESCRIPTION: &str = "p.single-visit__description";
/// Arrival time of a live-tracked departure ("Due" or "N mins").
const LIVE_TIME: &str = "div.single-visit__time--expected";
/// Arrival time of a timetabled departure ("Due" or "HH:MM").
const AIMED_TIME: &str = "div.single-visit__time--aimed";

const COLOUR_PREFIX: &str = "background-color:";

/// Error from the markup tokenizer itself.
///
/// Markup that merely does not look like a board is never an error.
#[derive(Debug, Clone, thiserror::Error)]
#[error("markup rewriting failed: {0}")]
pub struct ExtractError(String);

impl From<RewritingError> for ExtractError {
    fn from(err: RewritingError) -> Self {
        ExtractError(err.to_string())
    }
}

/// One selector observation, in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardEvent {
    /// Trimmed, non-blank text of the stop name banner.
    Heading(String),
    /// The highlight bar's `style` attribute, if it had one.
    Highlight(Option<String>),
    /// Trimmed, non-blank route number text.
    RouteName(String),
    /// Trimmed, non-blank destination text.
    Description(String),
    /// Start of an arrival time element: live (`true`) or timetabled.
    Tracking(bool),
    /// Trimmed, non-blank arrival time text. Closes the current departure.
    ArrivalTime(String),
}

/// What an extraction pass found on a board.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StopPage {
    pub stop_name: String,
    pub departures: Vec<Departure>,
}

impl StopPage {
    pub fn into_result(self, stop_id: StopId) -> StopResult {
        StopResult {
            stop_id,
            stop_name: self.stop_name,
            departures: self.departures,
        }
    }
}

/// Fields seen so far for the departure being assembled.
#[derive(Debug, Default)]
struct Draft {
    route_number: Option<String>,
    destination: Option<String>,
    line_colour: Option<LineColour>,
    line: Option<String>,
    is_real_time: bool,
}

/// Folds board events into departures.
pub struct BoardAccumulator {
    lines: Arc<LineTable>,
    clock: Arc<dyn Clock>,
    stop_name: String,
    /// `None` while idle, `Some` while a departure is being assembled.
    current: Option<Draft>,
    departures: Vec<Departure>,
}

impl BoardAccumulator {
    pub fn new(lines: Arc<LineTable>, clock: Arc<dyn Clock>) -> Self {
        Self {
            lines,
            clock,
            stop_name: String::new(),
            current: None,
            departures: Vec::new(),
        }
    }

    /// Apply one event.
    pub fn observe(&mut self, event: BoardEvent) {
        match event {
            BoardEvent::Heading(text) => {
                if self.stop_name.is_empty() {
                    self.stop_name = text;
                }
            }
            BoardEvent::Highlight(style) => {
                let Some(colour) = style.as_deref().and_then(highlight_colour) else {
                    debug!(?style, "highlight without a readable background colour");
                    return;
                };
                let line = self.lines.resolve(&colour).map(str::to_string);
                let draft = self.draft();
                draft.line_colour = Some(colour);
                draft.line = line;
            }
            BoardEvent::RouteName(text) => self.draft().route_number = Some(text),
            BoardEvent::Description(text) => self.draft().destination = Some(text),
            BoardEvent::Tracking(live) => self.draft().is_real_time = live,
            BoardEvent::ArrivalTime(raw) => self.close(raw),
        }
    }

    /// Finish the pass. A departure still being assembled is dropped.
    pub fn finish(self) -> StopPage {
        if let Some(draft) = self.current {
            debug!(?draft, "board ended mid-departure; discarding");
        }
        StopPage {
            stop_name: self.stop_name,
            departures: self.departures,
        }
    }

    fn draft(&mut self) -> &mut Draft {
        self.current.get_or_insert_with(Draft::default)
    }

    fn close(&mut self, raw: String) {
        let draft = self.current.take().unwrap_or_default();

        let estimate = normalize(&raw, &self.clock.now());
        let departure = Departure {
            route_number: draft.route_number,
            destination: draft.destination,
            line_colour: draft.line_colour,
            line: draft.line,
            expected_raw: raw,
            expected_mins: estimate.minutes,
            is_real_time: draft.is_real_time,
        };

        trace!(?departure, "departure complete");
        self.departures.push(departure);
    }
}

/// Pull the colour out of a style like `background-color:#92D400;`.
///
/// The property name is matched case-insensitively. Returns `None` when the
/// property or its `;` terminator is missing, or the value is not a colour.
fn highlight_colour(style: &str) -> Option<LineColour> {
    // ASCII lowercasing keeps byte offsets valid for `style`.
    let start = style.to_ascii_lowercase().find(COLOUR_PREFIX)? + COLOUR_PREFIX.len();
    let rest = &style[start..];
    let end = rest.find(';')?;
    LineColour::parse(rest[..end].trim()).ok()
}

type EventQueue = Rc<RefCell<Vec<BoardEvent>>>;
type Handler = (Cow<'static, Selector>, ElementContentHandlers<'static>);

/// Output is not needed; only the handlers' side effects are.
struct Discard;

impl OutputSink for Discard {
    fn handle_chunk(&mut self, _chunk: &[u8]) {}
}

/// Text rule: deliver each whole, non-blank text node under `selector`.
fn text_rule(selector: &'static str, queue: &EventQueue, event: fn(String) -> BoardEvent) -> Handler {
    let queue = Rc::clone(queue);
    let mut buffer = String::new();
    text!(selector, move |chunk| {
        buffer.push_str(chunk.as_str());
        if chunk.last_in_text_node() {
            let text = std::mem::take(&mut buffer);
            let text = text.trim();
            if !text.is_empty() {
                queue.borrow_mut().push(event(text.to_string()));
            }
        }
        Ok(())
    })
}

/// Arrival rules: the tracking marker at the start tag, then the element's
/// whole text (all descendant text nodes joined) once at its end tag.
///
/// An arrival element whose end tag never comes is flushed when the next
/// one starts; one still open when the document ends is dropped.
fn arrival_rules(selector: &'static str, queue: &EventQueue, live: bool) -> [Handler; 2] {
    let pending: Rc<RefCell<Option<String>>> = Rc::default();

    let start = {
        let queue = Rc::clone(queue);
        let pending = Rc::clone(&pending);
        element!(selector, move |el| {
            if let Some(text) = pending.borrow_mut().take() {
                push_arrival(&queue, &text);
            }
            queue.borrow_mut().push(BoardEvent::Tracking(live));

            let Some(handlers) = el.end_tag_handlers() else {
                return Ok(());
            };
            *pending.borrow_mut() = Some(String::new());
            let queue = Rc::clone(&queue);
            let pending = Rc::clone(&pending);
            handlers.push(end_tag!(move |_end| {
                if let Some(text) = pending.borrow_mut().take() {
                    push_arrival(&queue, &text);
                }
                Ok(())
            }));
            Ok(())
        })
    };

    let text = text!(selector, move |chunk| {
        if let Some(buffer) = pending.borrow_mut().as_mut() {
            buffer.push_str(chunk.as_str());
        }
        Ok(())
    });

    [start, text]
}

fn push_arrival(queue: &EventQueue, text: &str) {
    let text = text.trim();
    if !text.is_empty() {
        queue
            .borrow_mut()
            .push(BoardEvent::ArrivalTime(text.to_string()));
    }
}

fn highlight_rule(queue: &EventQueue) -> Handler {
    let queue = Rc::clone(queue);
    element!(HIGHLIGHT, move |el| {
        queue
            .borrow_mut()
            .push(BoardEvent::Highlight(el.get_attribute("style")));
        Ok(())
    })
}

/// The fixed selector table.
///
/// Each arrival element yields exactly one `ArrivalTime`, so exactly one
/// departure.
fn board_rules(queue: &EventQueue) -> Vec<Handler> {
    let mut rules = vec![
        text_rule(HEADING, queue, BoardEvent::Heading),
        highlight_rule(queue),
        text_rule(ROUTE_NAME, queue, BoardEvent::RouteName),
        text_rule(DESCRIPTION, queue, BoardEvent::Description),
    ];
    rules.extend(arrival_rules(LIVE_TIME, queue, true));
    rules.extend(arrival_rules(AIMED_TIME, queue, false));
    rules
}

/// Single-pass board extractor.
///
/// Feed the document with [`write`](Self::write) as it arrives, then call
/// [`finish`](Self::finish). Not `Send`: create it on the thread that feeds
/// it.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use board_server::board::BoardExtractor;
/// use board_server::domain::{LineTable, SystemClock};
///
/// let mut extractor = BoardExtractor::new(Arc::new(LineTable::nct()), Arc::new(SystemClock::default()));
/// extractor.write(b"<h1 class=\"place-info-banner__name\">High St</h1>").unwrap();
/// extractor.write(b"<div class=\"single-visit__time--expected\">Due</div>").unwrap();
/// let page = extractor.finish().unwrap();
///
/// assert_eq!(page.stop_name, "High St");
/// assert_eq!(page.departures[0].expected_mins, Some(0));
/// assert!(page.departures[0].is_real_time);
/// ```
pub struct BoardExtractor {
    rewriter: HtmlRewriter<'static, Discard>,
    queue: EventQueue,
    accumulator: BoardAccumulator,
}

impl BoardExtractor {
    pub fn new(lines: Arc<LineTable>, clock: Arc<dyn Clock>) -> Self {
        let queue = EventQueue::default();
        let settings = Settings {
            element_content_handlers: board_rules(&queue),
            // Real pages are messy; never bail out on ambiguous markup.
            strict: false,
            ..Settings::default()
        };

        Self {
            rewriter: HtmlRewriter::new(settings, Discard),
            queue,
            accumulator: BoardAccumulator::new(lines, clock),
        }
    }

    /// Feed the next chunk of the document.
    pub fn write(&mut self, chunk: &[u8]) -> Result<(), ExtractError> {
        self.rewriter.write(chunk)?;
        self.drain();
        Ok(())
    }

    /// Signal end of document and collect the results.
    pub fn finish(self) -> Result<StopPage, ExtractError> {
        let BoardExtractor {
            rewriter,
            queue,
            mut accumulator,
        } = self;

        rewriter.end()?;
        for event in queue.borrow_mut().drain(..) {
            accumulator.observe(event);
        }
        Ok(accumulator.finish())
    }

    fn drain(&mut self) {
        for event in self.queue.borrow_mut().drain(..) {
            self.accumulator.observe(event);
        }
    }
}

/// Run one extraction pass over an in-memory sequence of chunks.
pub fn extract<I>(
    chunks: I,
    lines: Arc<LineTable>,
    clock: Arc<dyn Clock>,
) -> Result<StopPage, ExtractError>
where
    I: IntoIterator,
    I::Item: AsRef<[u8]>,
{
    let mut extractor = BoardExtractor::new(lines, clock);
    for chunk in chunks {
        extractor.write(chunk.as_ref())?;
    }
    extractor.finish()
}
