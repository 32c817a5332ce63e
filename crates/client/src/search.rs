//! Search/list controller: debounced search input and page fetches.
//!
//! Typed input never fetches directly. Each change of the (column, term) pair
//! re-arms a quiescence timer; only when it elapses is a first-page fetch
//! issued. Every fetch takes a generation number when it is issued and its
//! result replaces the displayed page only if no later-issued fetch has been
//! applied first.

use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::task::JoinHandle;

use labstock_inventory::{Page, PageRequest, SearchColumn, SearchQuery};

use crate::error::ClientError;
use crate::view::{ViewEvent, ViewShared};

/// Current search inputs and the page the next refresh targets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchState {
    pub query: SearchQuery,
    pub page: u32,
}

/// Single pending deferred action; scheduling a new one cancels the old.
///
/// Only the waiting period is cancelable: once the delay elapses the action
/// runs on its own task, so later cancellations never abort it.
#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: Mutex::new(None),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn schedule<F>(&self, action: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let delay = self.delay;
        // Spawn under the lock so concurrent callers install timers in order.
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        let timer = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            tokio::spawn(action);
        });
        if let Some(previous) = pending.replace(timer) {
            previous.abort();
        }
    }

    /// Cancel the pending timer. Returns true if one was still waiting.
    pub fn cancel(&self) -> bool {
        let pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner).take();
        match pending {
            Some(timer) if !timer.is_finished() => {
                timer.abort();
                true
            }
            _ => false,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|timer| !timer.is_finished())
    }
}

/// What happened to a completed list fetch.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The response replaced the displayed page.
    Applied { generation: u64 },
    /// A later-issued fetch had already been applied; the response was dropped.
    Superseded { generation: u64 },
    /// The view was deactivated while the request was in flight.
    Discarded,
}

#[derive(Clone)]
pub struct SearchListController {
    shared: Arc<ViewShared>,
    debouncer: Arc<Debouncer>,
}

impl SearchListController {
    pub(crate) fn new(shared: Arc<ViewShared>, debounce: Duration) -> Self {
        Self {
            shared,
            debouncer: Arc::new(Debouncer::new(debounce)),
        }
    }

    pub fn state(&self) -> SearchState {
        self.shared.with_state(|s| s.search.clone())
    }

    /// Update the pending term. The fetch follows after the debounce delay.
    pub fn set_search_term(&self, term: impl Into<String>) {
        let term = term.into();
        let changed = self.shared.with_state(|s| {
            if s.search.query.term == term {
                return None;
            }
            s.search.query.term = term;
            Some(s.search.query.clone())
        });

        if let Some(query) = changed {
            self.schedule(query);
        }
    }

    /// Update the filter column. The fetch follows after the debounce delay.
    pub fn set_search_column(&self, column: SearchColumn) {
        let changed = self.shared.with_state(|s| {
            if s.search.query.column == column {
                return None;
            }
            s.search.query.column = column;
            Some(s.search.query.clone())
        });

        if let Some(query) = changed {
            self.schedule(query);
        }
    }

    /// True while a debounced search is waiting for quiescence.
    pub fn has_pending_search(&self) -> bool {
        self.debouncer.is_pending()
    }

    pub(crate) fn cancel_pending(&self) {
        if self.debouncer.cancel() {
            tracing::debug!("pending search cancelled");
        }
    }

    fn schedule(&self, query: SearchQuery) {
        tracing::debug!(
            column = %query.column,
            term = %query.term,
            delay_ms = self.debouncer.delay().as_millis() as u64,
            "search input changed"
        );

        let controller = self.clone();
        self.debouncer.schedule(async move {
            let request = controller.request_for(query, 0);
            // Failures are surfaced on the view by fetch_page itself.
            let _ = controller.fetch_page(request).await;
        });
    }

    /// Fetch `page` of the current query immediately.
    pub async fn set_page(&self, page: u32) -> Result<FetchOutcome, ClientError> {
        let query = self.shared.with_state(|s| s.search.query.clone());
        self.fetch_page(self.request_for(query, page)).await
    }

    /// Re-issue the list fetch for the search state as it is right now.
    ///
    /// `state().page` only advances when a fetch is applied, so this targets
    /// the displayed page.
    pub async fn refresh(&self) -> Result<FetchOutcome, ClientError> {
        let state = self.state();
        self.fetch_page(self.request_for(state.query, state.page))
            .await
    }

    pub fn request_for(&self, query: SearchQuery, page: u32) -> PageRequest {
        PageRequest {
            query,
            page,
            size: self.shared.page_size(),
        }
    }

    /// Fetch one page and, if it is still the freshest, display it.
    ///
    /// On failure the previous page stays displayed and the error is surfaced.
    pub async fn fetch_page(&self, request: PageRequest) -> Result<FetchOutcome, ClientError> {
        let generation = self.shared.next_generation();
        let token = self.shared.token();

        tracing::debug!(
            generation,
            column = %request.query.column,
            term = %request.query.term,
            page = request.page,
            size = request.size,
            "fetching inventory page"
        );

        let response = self.shared.api().fetch_page(&request).await;

        if !self.shared.is_live(token) {
            tracing::debug!(generation, "view no longer active; dropping list response");
            return response.map(|_| FetchOutcome::Discarded);
        }

        match response {
            Ok(response) => {
                let page = Page::from_response(&request, response);
                let items = page.items.len();
                let applied = self.shared.with_state(|s| {
                    if generation <= s.applied_generation {
                        return false;
                    }
                    s.applied_generation = generation;
                    s.search.page = request.page;
                    s.page = page;
                    true
                });

                if applied {
                    self.shared.emit(ViewEvent::PageReplaced {
                        generation,
                        page_index: request.page,
                        items,
                    });
                    Ok(FetchOutcome::Applied { generation })
                } else {
                    tracing::debug!(generation, "superseded list response dropped");
                    Ok(FetchOutcome::Superseded { generation })
                }
            }
            Err(err) => {
                self.shared.surface_error(token, "fetch_page", &err);
                Err(err)
            }
        }
    }
}
