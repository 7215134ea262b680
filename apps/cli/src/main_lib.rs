use std::sync::Arc;

use optrader_market_data::{
    DebounceConfig, FetchCoordinator, MarketDataClient, MarketDataConfig, SearchDebouncer,
};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use crate::commands::{Command, HELP};
use crate::render::{render_fetch, render_search};

/// Logs go to stderr so they do not interleave with the rendered dashboard on stdout.
pub fn init_tracing() {
    let log_format = std::env::var("OPTRADER_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_line_number(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

pub struct App {
    pub coordinator: FetchCoordinator,
    pub debouncer: SearchDebouncer,
}

pub fn build_app(config: &MarketDataConfig) -> anyhow::Result<App> {
    let client = Arc::new(MarketDataClient::from_config(config)?);
    let coordinator = FetchCoordinator::new(client.clone());
    let debouncer = SearchDebouncer::spawn(client, DebounceConfig::from(config));
    Ok(App {
        coordinator,
        debouncer,
    })
}

impl App {
    pub fn handle(&self, command: Command) {
        match command {
            Command::Type(text) => self.debouncer.input(text),
            Command::Select(symbol) => {
                self.debouncer.clear();
                self.coordinator.select_symbol(symbol);
            }
            Command::Refresh => {
                if self.coordinator.refresh().is_none() {
                    println!("No symbol selected");
                }
            }
            Command::Clear => self.debouncer.clear(),
            Command::Help => println!("{}", HELP),
            // Handled by the input loop.
            Command::Quit => {}
        }
    }

    /// Print both states whenever they change.
    pub fn spawn_renderers(&self) -> Vec<JoinHandle<()>> {
        vec![
            spawn_renderer(self.coordinator.subscribe(), render_fetch),
            spawn_renderer(self.debouncer.subscribe(), render_search),
        ]
    }

    pub async fn shutdown(self, renderers: Vec<JoinHandle<()>>) {
        for renderer in renderers {
            renderer.abort();
        }
        self.debouncer.shutdown().await;
        tracing::info!("optrader stopped");
    }
}

fn spawn_renderer<T, F>(mut rx: watch::Receiver<T>, render: F) -> JoinHandle<()>
where
    T: Send + Sync + 'static,
    F: Fn(&T) -> String + Send + 'static,
{
    tokio::spawn(async move {
        while rx.changed().await.is_ok() {
            let text = render(&*rx.borrow_and_update());
            println!("{}\n", text);
        }
    })
}
