//! One analysis session: the input and result buffers, the request
//! status, and the rules for mutating them.
//!
//! Every mutation happens on the UI thread in response to a discrete
//! event. The streaming task never touches the session directly; it
//! reports chunks and terminal events tagged with the generation it was
//! started under, and anything stale is dropped here.

use std::path::Path;

use tracing::{debug, warn};

use crate::analysis::{self, AnalysisAction};

pub const ANALYSIS_FAILED_NOTICE: &str =
    "// ERROR: FAILED TO GET ANALYSIS FROM AI. PLEASE TRY AGAIN.";

pub fn load_success_notice(file_name: &str) -> String {
    format!("// SUCCESS: LOADED FILE \"{file_name}\"")
}

pub fn load_failure_notice(file_name: &str) -> String {
    format!("// ERROR: FAILED TO READ FILE \"{file_name}\"")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RequestStatus {
    #[default]
    Idle,
    Running(AnalysisAction),
    Completed,
    Failed,
    Cancelled,
}

impl RequestStatus {
    pub fn is_running(self) -> bool {
        matches!(self, RequestStatus::Running(_))
    }
}

#[derive(Debug, Default)]
pub struct AnalysisSession {
    input: String,
    result: String,
    status: RequestStatus,
    generation: u64,
}

impl AnalysisSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn result(&self) -> &str {
        &self.result
    }

    pub fn status(&self) -> RequestStatus {
        self.status
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    /// Starts a new request and returns its generation tag, or `None`
    /// when the guard rejects it: whitespace-only input, or a request
    /// already in flight.
    pub fn submit(&mut self, action: AnalysisAction) -> Option<u64> {
        if self.input.trim().is_empty() || self.status.is_running() {
            debug!(?action, status = ?self.status, "submit rejected");
            return None;
        }
        self.result.clear();
        self.status = RequestStatus::Running(action);
        self.generation += 1;
        Some(self.generation)
    }

    /// Appends one streamed chunk, preserving delivery order. Chunks
    /// from a superseded request, or arriving after the stream already
    /// terminated, are dropped. Returns whether the chunk was applied.
    pub fn on_chunk(&mut self, generation: u64, chunk: &str) -> bool {
        if generation != self.generation || !self.status.is_running() {
            debug!(generation, current = self.generation, "dropping stale chunk");
            return false;
        }
        self.result.push_str(chunk);
        true
    }

    pub fn on_complete(&mut self, generation: u64) {
        if generation != self.generation || !self.status.is_running() {
            debug!(generation, current = self.generation, "dropping stale completion");
            return;
        }
        self.status = RequestStatus::Completed;
    }

    /// A terminal stream failure replaces whatever partial output
    /// accumulated with the fixed failure notice.
    pub fn on_failure(&mut self, generation: u64) {
        if generation != self.generation || !self.status.is_running() {
            debug!(generation, current = self.generation, "dropping stale failure");
            return;
        }
        self.result.clear();
        self.result.push_str(ANALYSIS_FAILED_NOTICE);
        self.status = RequestStatus::Failed;
    }

    /// Replaces the input with freshly loaded source and posts the load
    /// notice to the result buffer.
    pub fn install_source(&mut self, file_name: &str, contents: String) {
        self.input = contents;
        self.result = load_success_notice(file_name);
    }

    pub fn note_load_failure(&mut self, file_name: &str) {
        self.result = load_failure_notice(file_name);
    }

    /// Reads `path` in full and installs it as the new input. Any read
    /// or decode failure becomes the failure notice; nothing propagates.
    pub fn load_file(&mut self, path: &Path) -> bool {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        match analysis::read_source(path) {
            Ok(contents) => {
                self.install_source(&file_name, contents);
                true
            }
            Err(err) => {
                warn!(%err, path = %path.display(), "failed to load source file");
                self.note_load_failure(&file_name);
                false
            }
        }
    }

    /// Unconditional reset, valid in any state. Advancing the
    /// generation makes the session deaf to whatever an in-flight
    /// stream still delivers.
    pub fn reset(&mut self) {
        self.input.clear();
        self.result.clear();
        self.status = RequestStatus::Idle;
        self.generation += 1;
    }

    /// Stops listening to the in-flight request without touching the
    /// buffers. No-op unless a request is running.
    pub fn cancel(&mut self) -> bool {
        if !self.status.is_running() {
            return false;
        }
        self.status = RequestStatus::Cancelled;
        self.generation += 1;
        true
    }
}

#[cfg(test)]
mod tests;
