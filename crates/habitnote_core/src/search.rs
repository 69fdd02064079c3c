//! Debounced search lifecycle.
//!
//! # Responsibility
//! - Coalesce keystrokes into one collaborator query per quiet period.
//! - Decide whether a query response is still current.
//! - Degrade to local substring filtering when the query command fails.
//!
//! # Invariants
//! - Only the most recent debounce deadline exists; each keystroke replaces it.
//! - Every issued query carries a strictly increasing sequence number and
//!   only the latest issued, unresolved sequence may change the visible list.
//! - Clearing the query invalidates any in-flight query.
//! - The coordinator never reads a clock; callers pass `now_ms`.

use crate::command::{CommandError, CommandResult};
use crate::model::document::Document;
use crate::ordering::filter_by_text;
use log::{debug, info, warn};

/// Quiet period before a typed query is sent.
pub const DEFAULT_DEBOUNCE_MS: u64 = 300;

/// Lifecycle phase of one coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchPhase {
    Idle,
    Debouncing,
    Querying,
}

/// Handle for one issued query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryTicket {
    seq: u64,
    text: String,
}

impl QueryTicket {
    pub fn seq(&self) -> u64 {
        self.seq
    }

    /// Trimmed query text sent to the collaborator.
    pub fn text(&self) -> &str {
        &self.text
    }
}

/// What the caller must do after a debounce elapses or a clear.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchAction {
    /// Show the unfiltered, folder-scoped collection.
    ShowScope,
    /// Run the collaborator search for this ticket.
    Query(QueryTicket),
}

/// Outcome of feeding a query response back into the coordinator.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchResolution<D> {
    /// Collaborator results for the current query.
    Results(Vec<D>),
    /// The command failed; `items` is the local substring fallback.
    Degraded { items: Vec<D>, error: CommandError },
    /// The response belongs to a superseded or cancelled query.
    Stale,
}

/// Debounced query state machine for one document list.
#[derive(Debug, Clone)]
pub struct SearchCoordinator {
    debounce_ms: u64,
    query: String,
    deadline_ms: Option<u64>,
    next_seq: u64,
    in_flight: Option<u64>,
    applied: Option<String>,
}

impl Default for SearchCoordinator {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE_MS)
    }
}

impl SearchCoordinator {
    pub fn new(debounce_ms: u64) -> Self {
        Self {
            debounce_ms: debounce_ms.max(1),
            query: String::new(),
            deadline_ms: None,
            next_seq: 1,
            in_flight: None,
            applied: None,
        }
    }

    /// Text currently held by the search input.
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Query whose results the visible list currently shows, if any.
    pub fn applied_query(&self) -> Option<&str> {
        self.applied.as_deref()
    }

    pub fn phase(&self) -> SearchPhase {
        if self.deadline_ms.is_some() {
            SearchPhase::Debouncing
        } else if self.in_flight.is_some() {
            SearchPhase::Querying
        } else {
            SearchPhase::Idle
        }
    }

    /// Whether a query is in flight, for the "searching" indicator.
    pub fn is_searching(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Records a keystroke and restarts the debounce window.
    pub fn input(&mut self, text: impl Into<String>, now_ms: u64) {
        self.query = text.into();
        self.deadline_ms = Some(now_ms.saturating_add(self.debounce_ms));
    }

    /// Fires the debounce if it has elapsed at `now_ms`.
    pub fn poll(&mut self, now_ms: u64) -> Option<SearchAction> {
        let deadline = self.deadline_ms?;
        if now_ms < deadline {
            return None;
        }
        self.deadline_ms = None;

        let text = self.query.trim();
        if text.is_empty() {
            return Some(self.reset_to_scope());
        }

        let ticket = QueryTicket {
            seq: self.next_seq,
            text: text.to_string(),
        };
        self.next_seq += 1;
        self.in_flight = Some(ticket.seq);
        info!(
            "event=search_query module=search status=start seq={} query_len={}",
            ticket.seq,
            ticket.text.chars().count()
        );
        Some(SearchAction::Query(ticket))
    }

    /// Explicit clear: bypasses the debounce and restores the scope view.
    pub fn clear(&mut self) -> SearchAction {
        self.query.clear();
        self.deadline_ms = None;
        self.reset_to_scope()
    }

    /// Issues an immediate query for the applied text, used after reloads.
    pub fn reissue(&mut self) -> Option<QueryTicket> {
        let text = self.applied.clone()?;
        let ticket = QueryTicket {
            seq: self.next_seq,
            text,
        };
        self.next_seq += 1;
        self.in_flight = Some(ticket.seq);
        Some(ticket)
    }

    /// Feeds a query response back.
    ///
    /// `fallback` is the last full collection, filtered locally when the
    /// command failed.
    pub fn resolve<D: Document>(
        &mut self,
        ticket: &QueryTicket,
        result: CommandResult<Vec<D>>,
        fallback: &[D],
    ) -> SearchResolution<D> {
        if self.in_flight != Some(ticket.seq) {
            debug!(
                "event=search_stale module=search status=stale seq={} latest={:?}",
                ticket.seq, self.in_flight
            );
            return SearchResolution::Stale;
        }
        self.in_flight = None;
        self.applied = Some(ticket.text.clone());

        match result {
            Ok(items) => {
                info!(
                    "event=search_query module=search status=ok seq={} hits={}",
                    ticket.seq,
                    items.len()
                );
                SearchResolution::Results(items)
            }
            Err(error) => {
                let items = filter_by_text(fallback, &ticket.text);
                warn!(
                    "event=search_fallback module=search status=degraded seq={} hits={} error={}",
                    ticket.seq,
                    items.len(),
                    error
                );
                SearchResolution::Degraded { items, error }
            }
        }
    }

    fn reset_to_scope(&mut self) -> SearchAction {
        self.in_flight = None;
        self.applied = None;
        SearchAction::ShowScope
    }
}
