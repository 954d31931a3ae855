mod analysis;
mod cli;
mod config;
mod llm;
mod logging;
mod session;
mod tui;

use std::path::PathBuf;

use anyhow::{Result, bail};
use clap::{ArgAction, Parser};
use dotenvy::dotenv;
use tracing::info;

use crate::analysis::AnalysisAction;
use crate::cli::run_once;
use crate::config::AppConfig;
use crate::llm::OpenAIClient;
use crate::tui::{AnalysisExecutor, TuiApp};

#[derive(Parser, Debug, Clone)]
#[command(
    name = "decomp-assist",
    version,
    about = "AI assistant for decompiled C/C++: explain, audit, refactor, port (TUI/pipe)"
)]
pub struct Cli {
    /// Source file to load on startup (.c .cpp .h .hpp .txt)
    pub file: Option<PathBuf>,

    /// Run one analysis without the TUI and print it to stdout
    /// (explain, vulnerabilities, refactor, python)
    #[arg(long, value_name = "ACTION")]
    pub action: Option<AnalysisAction>,

    /// Fail instead of starting the TUI when no --action is given
    #[arg(long, action = ArgAction::SetTrue)]
    pub no_tui: bool,

    /// OpenAI-compatible API base URL
    #[arg(long, default_value = "")]
    pub base_url: String,

    /// Model name
    #[arg(long, default_value = "")]
    pub model: String,

    /// API key (set via env OPENAI_API_KEY recommended)
    #[arg(long)]
    pub api_key: Option<String>,

    /// Color scheme (dark or light)
    #[arg(long)]
    pub theme: Option<String>,

    /// Log level when DECOMP_ASSIST_LOG is not set (error,warn,info,debug,trace)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    let cli = Cli::parse();
    logging::init_logging(&cli.log_level)?;

    let cfg = AppConfig::from_cli(cli.clone())?;
    info!(base_url = %cfg.base_url, model = %cfg.model, theme = %cfg.theme, "config resolved");

    if let Some(action) = cli.action {
        return run_once(&cfg, action, cli.file.as_deref()).await;
    }
    if cli.no_tui {
        let ids: Vec<&str> = AnalysisAction::ALL.iter().map(|a| a.id()).collect();
        bail!("--no-tui requires --action <{}>", ids.join("|"));
    }
    if !atty::is(atty::Stream::Stdout) {
        bail!("stdout is not a terminal; use --action <...> for pipe mode");
    }

    run_tui(cfg, cli.file).await
}

async fn run_tui(cfg: AppConfig, initial_file: Option<PathBuf>) -> Result<()> {
    let client = match cfg.api_key.clone() {
        Some(key) => {
            Some(OpenAIClient::new(cfg.base_url.clone(), key)?.with_llm_config(cfg.llm.clone()))
        }
        None => None,
    };

    let mut app = TuiApp::new(cfg.clone());
    app.push_log("Welcome to decomp-assist. Tab switches panes, /help lists commands.");
    if client.is_none() {
        app.push_log("OPENAI_API_KEY not set; analyses will fail until it is configured.");
    }
    if let Some(path) = initial_file {
        app.load_file(&path);
    }

    let mut executor = AnalysisExecutor::new(cfg, client);
    app.run(&mut executor)
}
