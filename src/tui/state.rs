use std::path::Path;
use std::sync::mpsc;

use tui_textarea::TextArea;

use crate::config::AppConfig;
use crate::session::AnalysisSession;
use crate::tui::theme::Theme;

const EDITOR_PLACEHOLDER: &str = "// Paste decompiled code here or /load a file...";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Editor,
    Command,
}

pub struct TuiApp {
    pub title: String,
    pub cfg: AppConfig,
    pub theme: Theme,
    pub session: AnalysisSession,
    pub editor: TextArea<'static>,
    pub command: String,
    pub mode: InputMode,
    pub log: Vec<String>,
    pub max_log_lines: usize,
    pub spinner_state: u8,
    /// Scroll offset from the bottom of the output pane; 0 follows the
    /// stream.
    pub output_scroll: u16,
    pub should_quit: bool,
    pub(crate) inbox_rx: Option<mpsc::Receiver<String>>,
    inbox_tx: mpsc::Sender<String>,
}

impl TuiApp {
    pub fn new(cfg: AppConfig) -> Self {
        let (tx, rx) = mpsc::channel();
        let theme = Theme::named(&cfg.theme);
        let mut editor = TextArea::default();
        editor.set_placeholder_text(EDITOR_PLACEHOLDER);
        Self {
            title: "decomp-assist".to_string(),
            theme,
            session: AnalysisSession::new(),
            editor,
            command: String::new(),
            mode: InputMode::Editor,
            log: Vec::new(),
            max_log_lines: 200,
            spinner_state: 0,
            output_scroll: 0,
            should_quit: false,
            inbox_rx: Some(rx),
            inbox_tx: tx,
            cfg,
        }
    }

    /// Sender half of the inbox, for background tasks to clone.
    pub fn sender(&self) -> mpsc::Sender<String> {
        self.inbox_tx.clone()
    }

    pub fn push_log<S: Into<String>>(&mut self, s: S) {
        self.log.push(s.into());
        if self.log.len() > self.max_log_lines {
            let overflow = self.log.len() - self.max_log_lines;
            self.log.drain(0..overflow);
        }
    }

    pub fn editor_text(&self) -> String {
        self.editor.lines().join("\n")
    }

    pub fn set_editor_text(&mut self, text: &str) {
        let mut editor = if text.is_empty() {
            TextArea::default()
        } else {
            TextArea::from(text.lines().map(str::to_string).collect::<Vec<_>>())
        };
        editor.set_placeholder_text(EDITOR_PLACEHOLDER);
        self.editor = editor;
    }

    /// Loads a source file into the session and mirrors it into the
    /// editor pane on success.
    pub fn load_file(&mut self, path: &Path) {
        let shown = path.display().to_string();
        if self.session.load_file(path) {
            let text = self.session.input().to_string();
            self.set_editor_text(&text);
            self.push_log(format!("[loaded {shown}]"));
        } else {
            self.push_log(format!("[failed to load {shown}]"));
        }
    }

    pub fn reset(&mut self) {
        self.session.reset();
        self.set_editor_text("");
        self.output_scroll = 0;
    }
}
