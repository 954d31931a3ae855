//! Non-interactive pipe mode: one analysis request, chunks printed to
//! stdout as they arrive.

use std::io::{self, Read, Write};
use std::path::Path;

use anyhow::{Context, Result, bail};
use futures::StreamExt;
use tracing::warn;

use crate::analysis::{self, AnalysisAction};
use crate::config::AppConfig;
use crate::llm::OpenAIClient;
use crate::llm::types::ChatMessage;
use crate::session::ANALYSIS_FAILED_NOTICE;

pub async fn run_once(cfg: &AppConfig, action: AnalysisAction, file: Option<&Path>) -> Result<()> {
    let source = match file {
        Some(path) => analysis::read_source(path)?,
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("read source from stdin")?;
            buf
        }
    };
    if source.trim().is_empty() {
        bail!("no source code to analyze");
    }
    let Some(api_key) = cfg.api_key.clone() else {
        bail!("OPENAI_API_KEY not set; cannot call the analysis service");
    };

    let client = OpenAIClient::new(cfg.base_url.clone(), api_key)?.with_llm_config(cfg.llm.clone());
    let prompt = analysis::build_prompt(action, &source);

    let mut stream = match client
        .chat_stream(&cfg.model, vec![ChatMessage::user(prompt)], None)
        .await
    {
        Ok(stream) => stream,
        Err(err) => {
            eprintln!("{ANALYSIS_FAILED_NOTICE}");
            return Err(err);
        }
    };

    let mut stdout = io::stdout();
    while let Some(tok) = stream.next().await {
        match tok {
            Ok(chunk) => {
                stdout.write_all(chunk.as_bytes())?;
                stdout.flush()?;
            }
            Err(err) => {
                warn!(%err, "stream failed mid-analysis");
                eprintln!("{ANALYSIS_FAILED_NOTICE}");
                return Err(err);
            }
        }
    }
    stdout.write_all(b"\n")?;
    Ok(())
}
