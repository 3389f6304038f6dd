use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod api;
mod commands;
mod config;
mod models;
mod services;
mod utils;

use api::dashboard::DashboardClient;
use commands::{Dashboard, Reply};
use config::Config;
use services::price_service::PriceConverter;
use services::{ViewSettings, ViewSynchronizer};

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();

    // Logs go to stderr so they do not interleave with the rendered view
    let mut filter = EnvFilter::from_default_env();
    for directive in ["node_dash=debug", "reqwest=warn", "hyper=warn"] {
        if let Ok(directive) = directive.parse() {
            filter = filter.add_directive(directive);
        }
    }
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    info!("⚡ Starting node-dash...");

    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            return;
        }
    };
    info!(
        "Backend {} (page size {}, fiat {})",
        config.api_url,
        config.page_size,
        if config.show_fiat { "on" } else { "off" }
    );

    let client = match DashboardClient::new(
        config.api_url.clone(),
        config.api_token.clone(),
        config.request_timeout,
    ) {
        Ok(c) => Arc::new(c),
        Err(e) => {
            error!("Failed to create API client: {}", e);
            return;
        }
    };

    let dashboard = Dashboard {
        view: ViewSynchronizer::new(
            client.clone(),
            ViewSettings::new(config.page_size, config.max_visible_pages),
        ),
        client,
        prices: config.show_fiat.then(PriceConverter::new),
    };

    if let Err(e) = run(&dashboard).await {
        error!("Terminal error: {}", e);
    }
}

async fn run(dashboard: &Dashboard) -> std::io::Result<()> {
    dashboard.view.mount().await;
    let snapshot = dashboard.view.snapshot().await;
    println!("{}\n", commands::view::render_snapshot(&snapshot, dashboard.btc_price().await));
    println!("Type `help` for commands.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match commands::handle_line(dashboard, &line).await {
            Ok(Some(Reply::Output(text))) => println!("{}\n", text),
            Ok(Some(Reply::Quit)) => break,
            Ok(None) => {}
            Err(message) => println!("{}\n", message),
        }
    }

    info!("Bye");
    Ok(())
}
