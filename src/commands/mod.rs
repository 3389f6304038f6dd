pub mod export;
pub mod filter;
pub mod help;
pub mod page;
pub mod show;
pub mod view;

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::api::dashboard::DashboardClient;
use crate::models::DirectionTab;
use crate::models::FilterCriteria;
use crate::services::price_service::PriceConverter;
use crate::services::{CycleOutcome, ViewSynchronizer};
use page::PageTarget;

/// Everything a command needs
pub struct Dashboard {
    pub view: ViewSynchronizer,
    pub client: Arc<DashboardClient>,
    pub prices: Option<PriceConverter>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Refresh,
    Tab(DirectionTab),
    Page(PageTarget),
    Filter(FilterCriteria),
    ClearFilter,
    Show(String),
    Export(Option<PathBuf>),
    Quit,
}

/// What the front end should do after a command
#[derive(Debug, PartialEq, Eq)]
pub enum Reply {
    Output(String),
    Quit,
}

impl Dashboard {
    /// BTC price for the fiat column, when enabled and reachable
    pub async fn btc_price(&self) -> Option<f64> {
        let prices = self.prices.as_ref()?;
        match prices.btc_price().await {
            Ok(price) => Some(price),
            Err(e) => {
                warn!("{}", e);
                None
            }
        }
    }

    async fn render(&self) -> String {
        let snapshot = self.view.snapshot().await;
        view::render_snapshot(&snapshot, self.btc_price().await)
    }
}

/// Parse one input line. Blank lines yield `None`.
pub fn parse_command(line: &str) -> Result<Option<Command>, String> {
    let mut parts = line.split_whitespace();
    let Some(name) = parts.next() else {
        return Ok(None);
    };
    let args: Vec<&str> = parts.collect();

    let command = match name.to_lowercase().as_str() {
        "help" | "h" | "?" => Command::Help,
        "refresh" | "r" => Command::Refresh,
        "quit" | "exit" | "q" => Command::Quit,
        "clear" => Command::ClearFilter,
        "next" => Command::Page(PageTarget::Next),
        "prev" | "previous" => Command::Page(PageTarget::Previous),
        "tab" => {
            let tab = args.first().ok_or("❌ Usage: `tab <all|incoming|outgoing>`")?;
            Command::Tab(tab.parse::<DirectionTab>().map_err(|e| format!("❌ {}", e))?)
        }
        "all" | "incoming" | "outgoing" => {
            Command::Tab(name.parse::<DirectionTab>().map_err(|e| format!("❌ {}", e))?)
        }
        "page" => {
            let arg = args.first().ok_or("❌ Usage: `page <n|next|prev>`")?;
            Command::Page(page::parse_page_arg(arg)?)
        }
        "filter" => Command::Filter(filter::parse_filter_args(&args)?),
        "show" => {
            let id = args.first().ok_or("❌ Usage: `show <payment hash>`")?;
            Command::Show(id.to_string())
        }
        "export" => Command::Export(args.first().map(PathBuf::from)),
        other => return Err(format!("❌ Unknown command: '{}'. Type `help` for the list", other)),
    };

    Ok(Some(command))
}

pub async fn execute(dashboard: &Dashboard, command: Command) -> Result<Reply, String> {
    debug!("Executing {:?}", command);

    let outcome = match command {
        Command::Help => return Ok(Reply::Output(help::help_text())),
        Command::Quit => return Ok(Reply::Quit),
        Command::Show(id) => return show::execute(dashboard, &id).await.map(Reply::Output),
        Command::Export(path) => return export::execute(dashboard, path).await.map(Reply::Output),
        Command::Refresh => dashboard.view.refresh().await,
        Command::Tab(tab) => dashboard.view.set_direction(tab).await,
        Command::Page(PageTarget::Number(n)) => dashboard.view.go_to_page(n).await,
        Command::Page(PageTarget::Next) => dashboard.view.next_page().await,
        Command::Page(PageTarget::Previous) => dashboard.view.previous_page().await,
        Command::ClearFilter => dashboard.view.clear_filter().await,
        Command::Filter(criteria) => dashboard
            .view
            .apply_filter(criteria)
            .await
            .map_err(|e| format!("❌ {}", e))?,
    };

    if outcome.is_superseded() {
        debug!("Cycle superseded by a newer request");
    } else if let CycleOutcome::Failed(e) = &outcome {
        debug!("Cycle ended in error: {}", e);
    }

    Ok(Reply::Output(dashboard.render().await))
}

/// Parse and run one line
pub async fn handle_line(dashboard: &Dashboard, line: &str) -> Result<Option<Reply>, String> {
    match parse_command(line)? {
        Some(command) => execute(dashboard, command).await.map(Some),
        None => Ok(None),
    }
}
