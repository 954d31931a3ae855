//! Slash-command dispatch and the bridge between the UI thread and the
//! streaming task.

use std::path::PathBuf;

use futures::StreamExt;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::analysis::{self, AnalysisAction};
use crate::config::AppConfig;
use crate::llm::OpenAIClient;
use crate::llm::types::ChatMessage;
use crate::tui::state::TuiApp;

pub const HELP_TEXT: &[&str] = &[
    "/explain        Explain the logic of the loaded code",
    "/vulns          Find vulnerabilities",
    "/refactor       Suggest refactoring",
    "/python         Translate to Python",
    "/load <path>    Load a source file (.c .cpp .h .hpp .txt)",
    "/copy           Copy the analysis output to the clipboard",
    "/clear          Clear input, output and status",
    "/cancel         Stop the in-flight analysis (Esc)",
    "/quit           Exit",
];

pub struct AnalysisExecutor {
    pub cfg: AppConfig,
    pub client: Option<OpenAIClient>,
    cancel: Option<CancellationToken>,
}

impl AnalysisExecutor {
    pub fn new(cfg: AppConfig, client: Option<OpenAIClient>) -> Self {
        Self {
            cfg,
            client,
            cancel: None,
        }
    }

    pub fn dispatch(&mut self, line: &str, ui: &mut TuiApp) {
        if line.is_empty() {
            return;
        }
        match line {
            "/help" => {
                for l in HELP_TEXT {
                    ui.push_log(*l);
                }
            }
            "/quit" | "/exit" => ui.should_quit = true,
            "/clear" => {
                self.cancel_inflight();
                ui.reset();
                ui.push_log("[cleared]");
            }
            "/cancel" => {
                if ui.session.cancel() {
                    self.cancel_inflight();
                    ui.push_log("[analysis cancelled]");
                }
            }
            "/copy" => self.copy_result(ui),
            "/explain" => self.run_analysis(ui, AnalysisAction::ExplainLogic),
            "/vulns" | "/vulnerabilities" => {
                self.run_analysis(ui, AnalysisAction::FindVulnerabilities)
            }
            "/refactor" => self.run_analysis(ui, AnalysisAction::SuggestRefactoring),
            "/python" => self.run_analysis(ui, AnalysisAction::TranslateToPython),
            "/load" => ui.push_log("[usage: /load <path>]"),
            _ => {
                if let Some(rest) = line.strip_prefix("/load ") {
                    ui.load_file(&PathBuf::from(rest.trim()));
                } else {
                    ui.push_log(format!("[unknown command: {line}; /help lists commands]"));
                }
            }
        }
    }

    fn cancel_inflight(&mut self) {
        if let Some(token) = self.cancel.take() {
            token.cancel();
        }
    }

    fn copy_result(&self, ui: &mut TuiApp) {
        if ui.session.result().is_empty() {
            ui.push_log("[nothing to copy]");
            return;
        }
        let text = ui.session.result().to_string();
        match arboard::Clipboard::new().and_then(|mut cb| cb.set_text(text)) {
            Ok(()) => ui.push_log("[analysis output copied]"),
            Err(err) => {
                warn!(%err, "clipboard copy failed");
                ui.push_log(format!("[clipboard error: {err}]"));
            }
        }
    }

    fn run_analysis(&mut self, ui: &mut TuiApp, action: AnalysisAction) {
        let Some(client) = self.client.clone() else {
            ui.push_log("OPENAI_API_KEY not set; cannot call the analysis service.");
            return;
        };
        ui.session.set_input(ui.editor_text());
        let Some(generation) = ui.session.submit(action) else {
            if ui.session.status().is_running() {
                ui.push_log("[an analysis is already running]");
            } else {
                ui.push_log("[nothing to analyze; paste code or /load a file]");
            }
            return;
        };
        let ts = chrono::Local::now().format("%H:%M:%S");
        ui.push_log(format!("[{ts}] {} requested", action.label()));

        let prompt = analysis::build_prompt(action, ui.session.input());
        let model = self.cfg.model.clone();
        let tx = ui.sender();
        let cancel_token = CancellationToken::new();
        self.cancel = Some(cancel_token.clone());

        tokio::runtime::Handle::current().spawn(async move {
            info!(generation, "starting analysis stream");
            match client
                .chat_stream(&model, vec![ChatMessage::user(prompt)], Some(cancel_token))
                .await
            {
                Ok(mut stream) => {
                    let mut failed = false;
                    while let Some(tok) = stream.next().await {
                        match tok {
                            Ok(chunk) => {
                                if tx.send(format!("::chunk:{generation}:{chunk}")).is_err() {
                                    return;
                                }
                            }
                            Err(err) => {
                                warn!(%err, generation, "analysis stream failed");
                                let _ = tx.send(format!("::failed:{generation}"));
                                failed = true;
                                break;
                            }
                        }
                    }
                    if !failed {
                        let _ = tx.send(format!("::done:{generation}"));
                    }
                }
                Err(err) => {
                    warn!(%err, generation, "could not establish analysis stream");
                    let _ = tx.send(format!("::failed:{generation}"));
                }
            }
        });
    }
}
