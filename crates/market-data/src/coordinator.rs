//! Fetch coordinator for the active symbol.
//!
//! Selecting a symbol (or refreshing it) takes a new generation, moves the
//! published state to `Loading`, then fetches the quote and the option chain
//! concurrently. The result commits only if its generation is still the
//! latest one; anything older is dropped.
//!
//! ```text
//! select_symbol("A") ──▶ gen 1 ─▶ Loading(A) ─▶ join(quote, chain) ──▶ commit? gen 1 != 2 → dropped
//! select_symbol("B") ──▶ gen 2 ─▶ Loading(B) ─▶ join(quote, chain) ──▶ commit? gen 2 == 2 → Ready(B)
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::client::MarketDataSource;
use crate::errors::FetchErrorKind;
use crate::models::{OptionChain, Quote};

/// Quote and chain for one symbol, fetched in the same cycle.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MarketSnapshot {
    pub quote: Quote,
    pub chain: OptionChain,
}

/// Published state of the active symbol.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub enum FetchState {
    #[default]
    Idle,
    Loading {
        symbol: String,
    },
    Ready(MarketSnapshot),
    Failed {
        symbol: String,
        kind: FetchErrorKind,
    },
}

impl FetchState {
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading { .. })
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }

    /// Symbol the state belongs to, if any.
    pub fn symbol(&self) -> Option<&str> {
        match self {
            Self::Idle => None,
            Self::Loading { symbol } | Self::Failed { symbol, .. } => Some(symbol.as_str()),
            Self::Ready(snapshot) => Some(snapshot.chain.symbol()),
        }
    }

    pub fn snapshot(&self) -> Option<&MarketSnapshot> {
        match self {
            Self::Ready(snapshot) => Some(snapshot),
            _ => None,
        }
    }
}

/// What happened to one fetch cycle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The cycle was still the latest and its state was published.
    Committed(FetchState),
    /// A newer selection or refresh started before this cycle finished.
    Superseded { generation: u64 },
}

/// Owns the current [`FetchState`]; cheap to clone.
#[derive(Clone)]
pub struct FetchCoordinator {
    source: Arc<dyn MarketDataSource>,
    generation: Arc<AtomicU64>,
    active_symbol: Arc<Mutex<Option<String>>>,
    state_tx: Arc<watch::Sender<FetchState>>,
}

impl FetchCoordinator {
    pub fn new(source: Arc<dyn MarketDataSource>) -> Self {
        let (state_tx, _) = watch::channel(FetchState::Idle);
        Self {
            source,
            generation: Arc::new(AtomicU64::new(0)),
            active_symbol: Arc::new(Mutex::new(None)),
            state_tx: Arc::new(state_tx),
        }
    }

    /// Make `symbol` the active symbol and fetch it.
    ///
    /// The generation is taken and `Loading` published before this returns,
    /// so call order decides which selection wins. Must be called inside a
    /// tokio runtime.
    pub fn select_symbol(&self, symbol: impl Into<String>) -> JoinHandle<FetchOutcome> {
        let symbol = symbol.into().trim().to_string();
        let generation = {
            let mut active = self.lock_active();
            *active = Some(symbol.clone());
            self.begin_cycle(&symbol)
        };
        self.spawn_fetch(generation, symbol)
    }

    /// Re-fetch the active symbol. `None` when nothing has been selected yet.
    pub fn refresh(&self) -> Option<JoinHandle<FetchOutcome>> {
        let (generation, symbol) = {
            let active = self.lock_active();
            let symbol = active.clone()?;
            (self.begin_cycle(&symbol), symbol)
        };
        Some(self.spawn_fetch(generation, symbol))
    }

    pub fn active_symbol(&self) -> Option<String> {
        self.lock_active().clone()
    }

    pub fn state(&self) -> FetchState {
        self.state_tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<FetchState> {
        self.state_tx.subscribe()
    }

    /// Latest issued generation.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    fn lock_active(&self) -> MutexGuard<'_, Option<String>> {
        self.active_symbol.lock().unwrap_or_else(|poisoned| {
            warn!("Active symbol mutex was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    /// Take a generation and publish `Loading`. Callers hold the active-symbol
    /// lock, so the latest generation always belongs to the active symbol.
    fn begin_cycle(&self, symbol: &str) -> u64 {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.commit(
            generation,
            FetchState::Loading {
                symbol: symbol.to_string(),
            },
        );
        generation
    }

    fn spawn_fetch(&self, generation: u64, symbol: String) -> JoinHandle<FetchOutcome> {
        let this = self.clone();
        tokio::spawn(async move { this.run_fetch(generation, symbol).await })
    }

    async fn run_fetch(&self, generation: u64, symbol: String) -> FetchOutcome {
        debug!(generation, symbol = %symbol, "Fetching quote and option chain");

        let (quote, chain) = tokio::join!(
            self.source.get_quote(&symbol),
            self.source.get_options_chain(&symbol)
        );

        let next = match (quote, chain) {
            (Ok(quote), Ok(chain)) => FetchState::Ready(MarketSnapshot { quote, chain }),
            (Err(error), chain) => {
                warn!(symbol = %symbol, sub_fetch = "quote", error = %error, "Quote fetch failed");
                if let Err(chain_error) = chain {
                    warn!(symbol = %symbol, sub_fetch = "chain", error = %chain_error, "Option chain fetch failed");
                }
                FetchState::Failed {
                    symbol,
                    kind: error.kind(),
                }
            }
            (Ok(_), Err(error)) => {
                warn!(symbol = %symbol, sub_fetch = "chain", error = %error, "Option chain fetch failed");
                FetchState::Failed {
                    symbol,
                    kind: error.kind(),
                }
            }
        };

        if self.commit(generation, next.clone()) {
            info!(generation, state = ?StateLabel(&next), "Market data committed");
            FetchOutcome::Committed(next)
        } else {
            debug!(
                generation,
                latest = self.generation(),
                "Discarding superseded market data"
            );
            FetchOutcome::Superseded { generation }
        }
    }

    /// Publish `next` only if `generation` is still the latest.
    ///
    /// The comparison runs under the watch channel's lock, so a commit cannot
    /// interleave with another commit.
    fn commit(&self, generation: u64, next: FetchState) -> bool {
        self.state_tx.send_if_modified(|state| {
            if self.generation.load(Ordering::SeqCst) != generation {
                return false;
            }
            *state = next;
            true
        })
    }
}

/// Compact log rendering of a state.
struct StateLabel<'a>(&'a FetchState);

impl std::fmt::Debug for StateLabel<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.0 {
            FetchState::Idle => write!(f, "Idle"),
            FetchState::Loading { symbol } => write!(f, "Loading({})", symbol),
            FetchState::Ready(s) => write!(f, "Ready({}, {} contracts)", s.quote.symbol, s.chain.len()),
            FetchState::Failed { symbol, kind } => write!(f, "Failed({}, {:?})", symbol, kind),
        }
    }
}
