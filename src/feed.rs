//! Paginated item feed with one page of look-ahead.
//!
//! [`Feed`] is a sans-IO state machine. Query changes, scroll signals and
//! timer ticks mutate its state and queue [`FetchRequest`]s; a driver drains
//! them with [`Feed::next_request`], performs the fetch, and reports back via
//! [`Feed::on_response`]. Each request carries a [`FetchToken`] whose
//! generation identifies the query it was issued for, so responses to a
//! superseded query are discarded no matter what order they arrive in.
//!
//! ```text
//! Idle -> Loading (page 1) -> Ready -> [prefetch page N into on-deck] -> Ready (merged)
//!            ^                                                            |
//!            +---------------------- query changes ------------------------+
//! ```

use std::collections::VecDeque;
use std::fmt;
use std::time::{Duration, Instant};

use crate::client::PriceSource;
use crate::config;
use crate::error::Result;
use crate::models::{Direction, Item, ItemType, QueryOptions, Range, Server, Sort};

// ---------------------------------------------------------------------------
// Requests and events
// ---------------------------------------------------------------------------

/// Identifies one issued fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FetchToken {
    pub generation: u64,
    pub page: u32,
}

/// A fetch the driver should perform.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchRequest {
    pub token: FetchToken,
    pub query: QueryOptions,
}

/// What a state transition did, for UI layers that react to changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedEvent {
    /// The displayed list was replaced by a fresh first page.
    Replaced { count: usize },
    /// A prefetched page landed in the on-deck buffer.
    Prefetched { page: u32, count: usize },
    /// The on-deck page was appended to the displayed list.
    Appended { count: usize },
    /// A fetch failed; the displayed list is unchanged.
    Failed { page: u32 },
    /// A previously failed prefetch was queued again.
    Retried { page: u32 },
    /// A response for a superseded request was dropped.
    Discarded,
    /// Nothing changed.
    Ignored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedPhase {
    Idle,
    Loading,
    Ready,
}

// ---------------------------------------------------------------------------
// Empty state
// ---------------------------------------------------------------------------

/// Message shown when the first page comes back empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmptyState {
    NoResults { query: String },
    NoResultsInCategory { query: String, category: ItemType },
}

impl fmt::Display for EmptyState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EmptyState::NoResults { query } => write!(f, "No results found for \"{}\".", query),
            EmptyState::NoResultsInCategory { query, category } => write!(
                f,
                "No results found for \"{}\" under the \"{}\" type.",
                query, category
            ),
        }
    }
}

/// Range and server the displayed list was fetched for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ChartOptions {
    pub range: Range,
    pub server: Server,
}

/// Read-only view of the feed for rendering.
#[derive(Debug, Clone, Copy)]
pub struct FeedSnapshot<'a> {
    pub items: &'a [Item],
    pub loading: bool,
    pub chart: ChartOptions,
    pub empty_state: Option<&'a EmptyState>,
}

// ---------------------------------------------------------------------------
// Debouncer
// ---------------------------------------------------------------------------

/// Single-shot deadline that is pushed back on every arm.
#[derive(Debug, Clone, Default)]
pub struct Debouncer {
    deadline: Option<Instant>,
}

impl Debouncer {
    pub fn arm(&mut self, now: Instant, delay: Duration) {
        self.deadline = Some(now + delay);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Fire (and disarm) if the deadline has passed.
    pub fn fire(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

// ---------------------------------------------------------------------------
// Feed
// ---------------------------------------------------------------------------

/// Displayed items for the active query plus one prefetched page.
pub struct Feed {
    query: QueryOptions,
    items: Vec<Item>,
    on_deck: Vec<Item>,
    page: u32,
    generation: u64,
    phase: FeedPhase,
    prefetch_pending: bool,
    retry_page: Option<u32>,
    outbox: VecDeque<FetchRequest>,
    debounce: Debouncer,
    pending_text: Option<String>,
    chart: ChartOptions,
    empty_state: Option<EmptyState>,
}

impl Default for Feed {
    fn default() -> Self {
        Self::new(QueryOptions::default())
    }
}

impl Feed {
    /// Create an idle feed for `query`. Nothing is fetched until
    /// [`apply_query`](Self::apply_query) or [`start`](Self::start).
    pub fn new(query: QueryOptions) -> Self {
        Self {
            chart: ChartOptions {
                range: query.sort.range,
                server: query.sort.server,
            },
            query,
            items: Vec::new(),
            on_deck: Vec::new(),
            page: 1,
            generation: 0,
            phase: FeedPhase::Idle,
            prefetch_pending: false,
            retry_page: None,
            outbox: VecDeque::new(),
            debounce: Debouncer::default(),
            pending_text: None,
            empty_state: None,
        }
    }

    /// Fetch the first page of the current query.
    pub fn start(&mut self) {
        self.apply_query(self.query.clone());
    }

    // -- Query changes ------------------------------------------------------

    /// Replace the active query and fetch its first page.
    ///
    /// Clears the on-deck buffer and resets the page counter. Responses to
    /// any earlier request are discarded from here on. The displayed list
    /// stays visible until the new first page arrives.
    pub fn apply_query(&mut self, query: QueryOptions) {
        self.debounce.cancel();
        self.pending_text = None;
        self.generation += 1;
        self.query = QueryOptions { page: 1, ..query };
        self.page = 1;
        self.on_deck.clear();
        self.prefetch_pending = false;
        self.retry_page = None;
        self.phase = FeedPhase::Loading;
        self.empty_state = None;
        self.enqueue(1);
    }

    /// Record a keystroke in the search box; the query is sent once typing
    /// pauses for the debounce window.
    pub fn search_text_changed(&mut self, text: impl Into<String>, now: Instant) {
        self.pending_text = Some(text.into());
        self.phase = FeedPhase::Loading;
        self.debounce.arm(now, config::SEARCH_DEBOUNCE);
    }

    /// Focusing a non-empty search box clears it, with a longer delay.
    pub fn search_focused(&mut self, now: Instant) {
        if self.search_text().is_empty() {
            return;
        }
        self.pending_text = Some(String::new());
        self.phase = FeedPhase::Loading;
        self.debounce.arm(now, config::FOCUS_CLEAR_DEBOUNCE);
    }

    /// Text currently in the search box, including keystrokes not yet sent.
    pub fn search_text(&self) -> &str {
        self.pending_text.as_deref().unwrap_or(&self.query.item)
    }

    /// The active query with any unsent search text folded in.
    fn draft_query(&self) -> QueryOptions {
        QueryOptions {
            item: self.search_text().to_string(),
            ..self.query.clone()
        }
    }

    /// Apply a debounced search whose deadline has passed.
    ///
    /// Returns `true` if a query was issued.
    pub fn poll_timer(&mut self, now: Instant) -> bool {
        if self.debounce.fire(now) {
            self.apply_query(self.draft_query());
            true
        } else {
            false
        }
    }

    /// When the next debounced search is due, if one is pending.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.debounce.deadline()
    }

    pub fn set_item_type(&mut self, item_type: ItemType) {
        let mut query = self.draft_query();
        query.item_type = item_type;
        self.apply_query(query);
    }

    pub fn set_range(&mut self, range: Range) {
        let mut query = self.draft_query();
        query.sort.range = range;
        self.apply_query(query);
    }

    pub fn set_server(&mut self, server: Server) {
        let mut query = self.draft_query();
        query.sort.server = server;
        self.apply_query(query);
    }

    pub fn set_sort(&mut self, sort: Sort, direction: Direction) {
        let mut query = self.draft_query();
        query.sort.sort = sort;
        query.sort.direction = direction;
        self.apply_query(query);
    }

    pub fn set_exact(&mut self, exact: bool) {
        let mut query = self.draft_query();
        query.exact = exact;
        self.apply_query(query);
    }

    // -- Scrolling ----------------------------------------------------------

    /// Scroll position update. Merges the on-deck page when the bottom of
    /// the list is within the scroll threshold of the viewport bottom.
    pub fn on_scroll(&mut self, list_bottom_px: f64, viewport_height_px: f64) -> FeedEvent {
        if list_bottom_px - config::SCROLL_THRESHOLD_PX <= viewport_height_px {
            self.on_scroll_near_end()
        } else {
            FeedEvent::Ignored
        }
    }

    /// Append the on-deck page and prefetch the next one.
    ///
    /// With an empty buffer, a failed prefetch is queued again for the same
    /// page; otherwise (prefetch pending or no more data) this is a no-op.
    pub fn on_scroll_near_end(&mut self) -> FeedEvent {
        if self.on_deck.is_empty() {
            return self.retry_prefetch();
        }
        let count = self.on_deck.len();
        self.items.append(&mut self.on_deck);
        self.prefetch();
        FeedEvent::Appended { count }
    }

    // -- Responses ----------------------------------------------------------

    /// Next request the driver should perform.
    ///
    /// Requests queued for a superseded query are skipped.
    pub fn next_request(&mut self) -> Option<FetchRequest> {
        while let Some(request) = self.outbox.pop_front() {
            if request.token.generation == self.generation {
                return Some(request);
            }
            tracing::debug!(token = ?request.token, "dropping queued request for stale query");
        }
        None
    }

    /// Feed back the outcome of a fetch.
    pub fn on_response<E: fmt::Display>(
        &mut self,
        token: FetchToken,
        result: std::result::Result<Vec<Item>, E>,
    ) -> FeedEvent {
        if token.generation != self.generation || token.page != self.page {
            tracing::debug!(
                ?token,
                current_generation = self.generation,
                current_page = self.page,
                "discarding stale response"
            );
            return FeedEvent::Discarded;
        }

        let first_page = token.page == 1 && self.phase == FeedPhase::Loading;
        if !first_page && !self.prefetch_pending {
            return FeedEvent::Discarded;
        }

        match result {
            Err(e) => {
                tracing::warn!(page = token.page, error = %e, "fetch failed");
                if first_page {
                    self.phase = FeedPhase::Ready;
                    self.update_empty_state();
                } else {
                    self.prefetch_pending = false;
                    self.retry_page = Some(token.page);
                }
                FeedEvent::Failed { page: token.page }
            }
            Ok(items) if first_page => {
                let count = items.len();
                self.items = items;
                self.phase = FeedPhase::Ready;
                self.chart = ChartOptions {
                    range: self.query.sort.range,
                    server: self.query.sort.server,
                };
                self.update_empty_state();
                self.prefetch();
                FeedEvent::Replaced { count }
            }
            Ok(items) => {
                self.prefetch_pending = false;
                let count = items.len();
                self.on_deck = items;
                FeedEvent::Prefetched {
                    page: token.page,
                    count,
                }
            }
        }
    }

    /// Drain the outbox synchronously against `source`.
    ///
    /// Performs the first-page fetch and the follow-up prefetch it triggers.
    /// Fetch errors are absorbed into [`FeedEvent::Failed`].
    pub fn run_blocking(&mut self, source: &dyn PriceSource) -> Vec<FeedEvent> {
        let mut events = Vec::new();
        while let Some(request) = self.next_request() {
            tracing::debug!(page = request.query.page, item = %request.query.item, "fetching page");
            let result: Result<Vec<Item>> = source.fetch_items(&request.query);
            events.push(self.on_response(request.token, result));
        }
        events
    }

    // -- Accessors ----------------------------------------------------------

    pub fn snapshot(&self) -> FeedSnapshot<'_> {
        FeedSnapshot {
            items: &self.items,
            loading: self.is_loading(),
            chart: self.chart,
            empty_state: self.empty_state.as_ref(),
        }
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn on_deck(&self) -> &[Item] {
        &self.on_deck
    }

    /// Page number of the most recently requested page.
    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn phase(&self) -> FeedPhase {
        self.phase
    }

    pub fn is_loading(&self) -> bool {
        self.phase == FeedPhase::Loading
    }

    pub fn query(&self) -> &QueryOptions {
        &self.query
    }

    pub fn chart_options(&self) -> ChartOptions {
        self.chart
    }

    pub fn empty_state(&self) -> Option<&EmptyState> {
        self.empty_state.as_ref()
    }

    // -- Internals ----------------------------------------------------------

    fn prefetch(&mut self) {
        if self.prefetch_pending {
            return;
        }
        self.page += 1;
        self.prefetch_pending = true;
        self.enqueue(self.page);
    }

    fn retry_prefetch(&mut self) -> FeedEvent {
        match self.retry_page {
            Some(page) if !self.prefetch_pending => {
                self.retry_page = None;
                self.prefetch_pending = true;
                self.enqueue(page);
                FeedEvent::Retried { page }
            }
            _ => FeedEvent::Ignored,
        }
    }

    fn enqueue(&mut self, page: u32) {
        let request = FetchRequest {
            token: FetchToken {
                generation: self.generation,
                page,
            },
            query: self.query.with_page(page),
        };
        tracing::debug!(token = ?request.token, "queued fetch");
        self.outbox.push_back(request);
    }

    fn update_empty_state(&mut self) {
        self.empty_state = if self.items.is_empty() {
            let query = self.query.item.clone();
            Some(if self.query.item_type.is_all() {
                EmptyState::NoResults { query }
            } else {
                EmptyState::NoResultsInCategory {
                    query,
                    category: self.query.item_type,
                }
            })
        } else {
            None
        };
    }
}
