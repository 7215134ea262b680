//! Search debouncer behaviour under paused time.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use optrader_market_data::{
    DebounceConfig, FetchErrorKind, MarketDataError, MarketDataSource, OptionChain, Quote,
    SearchDebouncer, SearchResult,
};

/// Records every query it receives; latency and failures are scripted per query.
#[derive(Default)]
struct RecordingSearch {
    calls: Mutex<Vec<String>>,
    delays: HashMap<&'static str, Duration>,
    failing: Vec<&'static str>,
}

impl RecordingSearch {
    fn with_delay(mut self, query: &'static str, delay: Duration) -> Self {
        self.delays.insert(query, delay);
        self
    }

    fn with_failure(mut self, query: &'static str) -> Self {
        self.failing.push(query);
        self
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl MarketDataSource for RecordingSearch {
    async fn search_symbols(&self, query: &str) -> Result<Vec<SearchResult>, MarketDataError> {
        self.calls.lock().unwrap().push(query.to_string());
        if let Some(delay) = self.delays.get(query) {
            tokio::time::sleep(*delay).await;
        }
        if self.failing.contains(&query) {
            return Err(MarketDataError::ProviderError {
                provider: "RECORDING".to_string(),
                message: "HTTP 503".to_string(),
            });
        }
        Ok(vec![SearchResult::new(
            query.to_uppercase(),
            format!("{} Inc", query),
            "Equity",
            "United States",
            "USD",
        )])
    }

    async fn get_quote(&self, _symbol: &str) -> Result<Quote, MarketDataError> {
        Err(MarketDataError::InvalidInput("not used".to_string()))
    }

    async fn get_options_chain(&self, _symbol: &str) -> Result<OptionChain, MarketDataError> {
        Err(MarketDataError::InvalidInput("not used".to_string()))
    }
}

fn window() -> Duration {
    DebounceConfig::default().window
}

#[tokio::test(start_paused = true)]
async fn test_burst_of_keystrokes_issues_one_search() {
    let source = Arc::new(RecordingSearch::default());
    let debouncer = SearchDebouncer::spawn(source.clone(), DebounceConfig::default());

    for text in ["A", "AA", "AAP", "AAPL"] {
        debouncer.input(text);
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    tokio::time::sleep(window() * 2).await;

    assert_eq!(source.calls(), vec!["AAPL".to_string()]);
    let state = debouncer.state();
    assert_eq!(state.query, "AAPL");
    assert_eq!(state.results.len(), 1);
    assert_eq!(state.results[0].symbol, "AAPL");
    assert!(!state.loading);

    debouncer.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_two_characters_is_searchable() {
    let source = Arc::new(RecordingSearch::default());
    let debouncer = SearchDebouncer::spawn(source.clone(), DebounceConfig::default());

    debouncer.input("AA");
    tokio::time::sleep(window() + Duration::from_millis(50)).await;

    assert_eq!(source.calls(), vec!["AA".to_string()]);
    debouncer.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_no_search_before_window_elapses() {
    let source = Arc::new(RecordingSearch::default());
    let debouncer = SearchDebouncer::spawn(source.clone(), DebounceConfig::default());

    debouncer.input("MSFT");
    tokio::time::sleep(window() - Duration::from_millis(50)).await;
    assert!(source.calls().is_empty());

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(source.calls(), vec!["MSFT".to_string()]);
    debouncer.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_short_query_resets_results_without_a_call() {
    let source = Arc::new(RecordingSearch::default());
    let debouncer = SearchDebouncer::spawn(source.clone(), DebounceConfig::default());
    let mut rx = debouncer.subscribe();

    debouncer.input("apple");
    rx.wait_for(|s| !s.results.is_empty()).await.unwrap();

    debouncer.input("A");
    let state = rx
        .wait_for(|s| s.query == "A")
        .await
        .unwrap()
        .clone();

    assert!(state.results.is_empty());
    assert!(!state.loading);
    tokio::time::sleep(window() * 2).await;
    assert_eq!(source.calls(), vec!["apple".to_string()]);

    debouncer.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_stale_result_is_discarded() {
    let source = Arc::new(
        RecordingSearch::default()
            .with_delay("apple", Duration::from_millis(1_000))
            .with_delay("tesla", Duration::from_millis(10)),
    );
    let debouncer = SearchDebouncer::spawn(source.clone(), DebounceConfig::default());

    debouncer.input("apple");
    // Past the window, so the "apple" search is in flight.
    tokio::time::sleep(window() + Duration::from_millis(50)).await;
    assert!(debouncer.state().loading);

    debouncer.input("tesla");
    tokio::time::sleep(Duration::from_secs(3)).await;

    assert_eq!(source.calls(), vec!["apple".to_string(), "tesla".to_string()]);
    let state = debouncer.state();
    assert_eq!(state.query, "tesla");
    assert_eq!(state.results.len(), 1);
    assert_eq!(state.results[0].symbol, "TESLA");
    assert!(!state.loading);

    debouncer.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_failed_search_keeps_previous_results() {
    let source = Arc::new(RecordingSearch::default().with_failure("broken"));
    let debouncer = SearchDebouncer::spawn(source.clone(), DebounceConfig::default());
    let mut rx = debouncer.subscribe();

    debouncer.input("nvda");
    rx.wait_for(|s| !s.results.is_empty()).await.unwrap();

    debouncer.input("broken");
    let state = rx
        .wait_for(|s| s.error.is_some())
        .await
        .unwrap()
        .clone();

    assert_eq!(state.error, Some(FetchErrorKind::Provider));
    assert_eq!(state.results[0].symbol, "NVDA");
    assert!(!state.loading);

    // A later successful search clears the error.
    debouncer.input("amd");
    let state = rx
        .wait_for(|s| s.results.first().map(|r| r.symbol.as_str()) == Some("AMD"))
        .await
        .unwrap()
        .clone();
    assert!(state.error.is_none());

    debouncer.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_custom_window_and_min_length() {
    let source = Arc::new(RecordingSearch::default());
    let config = DebounceConfig {
        window: Duration::from_millis(50),
        min_query_len: 3,
    };
    let debouncer = SearchDebouncer::spawn(source.clone(), config);

    debouncer.input("ab");
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(source.calls().is_empty());

    debouncer.input("abc");
    tokio::time::sleep(Duration::from_millis(60)).await;
    assert_eq!(source.calls(), vec!["abc".to_string()]);

    debouncer.shutdown().await;
}
