mod commands;
mod main_lib;
mod render;

use commands::{Command, HELP};
use main_lib::{build_app, init_tracing};
use optrader_market_data::MarketDataConfig;
use tokio::io::{AsyncBufReadExt, BufReader};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = MarketDataConfig::from_env();
    tracing::info!("Starting optrader with {:?}", config);
    let app = build_app(&config)?;
    let renderers = app.spawn_renderers();

    println!("{}\n", HELP);
    app.coordinator.select_symbol(config.default_symbol.clone());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match Command::parse(&line) {
            Ok(Some(Command::Quit)) => break,
            Ok(Some(command)) => app.handle(command),
            Ok(None) => {}
            Err(e) => eprintln!("{}", e),
        }
    }

    app.shutdown(renderers).await;
    Ok(())
}
