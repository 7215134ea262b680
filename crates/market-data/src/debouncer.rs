//! Debounced symbol search.
//!
//! Keystrokes are sent to a worker task over an mpsc channel. The worker waits
//! for a quiet window after the last keystroke, then issues one search. Each
//! keystroke takes a new generation; a search result commits only if no newer
//! keystroke arrived while it was in flight.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::client::MarketDataSource;
use crate::config::{MarketDataConfig, DEFAULT_MIN_QUERY_LEN, DEFAULT_SEARCH_DEBOUNCE_MS};
use crate::errors::FetchErrorKind;
use crate::models::SearchResult;

/// Published search state.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchState {
    /// Trimmed text of the latest keystroke.
    pub query: String,
    pub results: Vec<SearchResult>,
    pub loading: bool,
    /// Set when the latest search failed; earlier results are kept.
    pub error: Option<FetchErrorKind>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DebounceConfig {
    /// Quiet period after the last keystroke before a search is issued.
    pub window: Duration,
    /// Queries shorter than this (in characters, after trimming) are never sent.
    pub min_query_len: usize,
}

impl Default for DebounceConfig {
    fn default() -> Self {
        Self {
            window: Duration::from_millis(DEFAULT_SEARCH_DEBOUNCE_MS),
            min_query_len: DEFAULT_MIN_QUERY_LEN,
        }
    }
}

impl From<&MarketDataConfig> for DebounceConfig {
    fn from(config: &MarketDataConfig) -> Self {
        Self {
            window: config.search_debounce,
            min_query_len: config.min_query_len,
        }
    }
}

#[derive(Debug)]
enum SearchCommand {
    Input(String),
    Clear,
}

/// Handle to the search worker.
pub struct SearchDebouncer {
    commands: mpsc::UnboundedSender<SearchCommand>,
    state_rx: watch::Receiver<SearchState>,
    worker: JoinHandle<()>,
}

impl SearchDebouncer {
    /// Start the worker on the current tokio runtime.
    pub fn spawn(source: Arc<dyn MarketDataSource>, config: DebounceConfig) -> Self {
        let (commands, rx) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(SearchState::default());

        let worker = SearchWorker {
            source,
            config,
            generation: Arc::new(AtomicU64::new(0)),
            state_tx: Arc::new(state_tx),
        };

        Self {
            commands,
            state_rx,
            worker: tokio::spawn(worker.run(rx)),
        }
    }

    /// Record a keystroke. The full text of the search box is passed each time.
    pub fn input(&self, query: impl Into<String>) {
        self.send(SearchCommand::Input(query.into()));
    }

    /// Empty the search box and drop any pending or in-flight search.
    pub fn clear(&self) {
        self.send(SearchCommand::Clear);
    }

    pub fn state(&self) -> SearchState {
        self.state_rx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SearchState> {
        self.state_rx.clone()
    }

    /// Stop the worker. A pending keystroke that has not fired is dropped.
    pub async fn shutdown(self) {
        let Self {
            commands, worker, ..
        } = self;
        drop(commands);
        if let Err(e) = worker.await {
            warn!("Search worker ended abnormally: {}", e);
        }
    }

    fn send(&self, command: SearchCommand) {
        if self.commands.send(command).is_err() {
            warn!("Search worker is gone, dropping command");
        }
    }
}

struct SearchWorker {
    source: Arc<dyn MarketDataSource>,
    config: DebounceConfig,
    generation: Arc<AtomicU64>,
    state_tx: Arc<watch::Sender<SearchState>>,
}

impl SearchWorker {
    async fn run(self, mut rx: mpsc::UnboundedReceiver<SearchCommand>) {
        info!(
            window_ms = self.config.window.as_millis() as u64,
            min_query_len = self.config.min_query_len,
            "Search worker started"
        );

        let mut pending: Option<(u64, String)> = None;

        loop {
            if pending.is_some() {
                tokio::select! {
                    command = rx.recv() => match command {
                        Some(command) => pending = self.handle(command),
                        None => break,
                    },
                    // Re-armed on every loop turn, so each keystroke restarts the window.
                    _ = tokio::time::sleep(self.config.window) => {
                        if let Some((generation, query)) = pending.take() {
                            self.dispatch(generation, query);
                        }
                    }
                }
            } else {
                match rx.recv().await {
                    Some(command) => pending = self.handle(command),
                    None => break,
                }
            }
        }

        info!("Search worker shutting down");
    }

    /// Apply a command; returns the search to fire once the window elapses.
    fn handle(&self, command: SearchCommand) -> Option<(u64, String)> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        let query = match command {
            SearchCommand::Input(raw) => raw.trim().to_string(),
            SearchCommand::Clear => String::new(),
        };

        if query.chars().count() < self.config.min_query_len {
            self.state_tx.send_modify(|state| {
                state.query = query;
                state.results.clear();
                state.loading = false;
                state.error = None;
            });
            return None;
        }

        // Older in-flight searches can no longer commit, so nothing is loading yet.
        self.state_tx.send_modify(|state| {
            state.query = query.clone();
            state.loading = false;
            state.error = None;
        });
        Some((generation, query))
    }

    fn dispatch(&self, generation: u64, query: String) {
        let marked = commit_if_current(&self.state_tx, &self.generation, generation, |state| {
            state.loading = true;
        });
        if !marked {
            return;
        }

        debug!(generation, query = %query, "Issuing symbol search");

        let source = self.source.clone();
        let state_tx = self.state_tx.clone();
        let latest = self.generation.clone();
        tokio::spawn(async move {
            let result = source.search_symbols(&query).await;

            let committed = commit_if_current(&state_tx, &latest, generation, |state| {
                state.loading = false;
                match &result {
                    Ok(results) => {
                        state.results = results.clone();
                        state.error = None;
                    }
                    Err(e) => state.error = Some(e.kind()),
                }
            });

            match (&result, committed) {
                (Err(e), true) => warn!(query = %query, error = %e, "Symbol search failed"),
                (Ok(results), true) => {
                    debug!(query = %query, count = results.len(), "Search results committed")
                }
                (_, false) => debug!(generation, query = %query, "Discarding stale search result"),
            }
        });
    }
}

fn commit_if_current<F>(
    state_tx: &watch::Sender<SearchState>,
    latest: &AtomicU64,
    generation: u64,
    apply: F,
) -> bool
where
    F: FnOnce(&mut SearchState),
{
    state_tx.send_if_modified(|state| {
        if latest.load(Ordering::SeqCst) != generation {
            return false;
        }
        apply(state);
        true
    })
}
