//! The fixed analysis catalogue: which assists exist, how their prompts
//! are built, and how decompiled source is read from disk.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use thiserror::Error;

/// File extensions accepted for decompiled source input.
pub const SUPPORTED_EXTENSIONS: [&str; 5] = ["c", "cpp", "h", "hpp", "txt"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisAction {
    ExplainLogic,
    FindVulnerabilities,
    SuggestRefactoring,
    TranslateToPython,
}

impl AnalysisAction {
    pub const ALL: [AnalysisAction; 4] = [
        AnalysisAction::ExplainLogic,
        AnalysisAction::FindVulnerabilities,
        AnalysisAction::SuggestRefactoring,
        AnalysisAction::TranslateToPython,
    ];

    /// Stable identifier used on the command line.
    pub fn id(self) -> &'static str {
        match self {
            AnalysisAction::ExplainLogic => "explain",
            AnalysisAction::FindVulnerabilities => "vulnerabilities",
            AnalysisAction::SuggestRefactoring => "refactor",
            AnalysisAction::TranslateToPython => "python",
        }
    }

    /// Display label, embedded verbatim in the prompt template.
    pub fn label(self) -> &'static str {
        match self {
            AnalysisAction::ExplainLogic => "EXPLAIN LOGIC",
            AnalysisAction::FindVulnerabilities => "FIND VULNERABILITIES",
            AnalysisAction::SuggestRefactoring => "SUGGEST REFACTORING",
            AnalysisAction::TranslateToPython => "TRANSLATE TO PYTHON",
        }
    }
}

impl fmt::Display for AnalysisAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for AnalysisAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "explain" => Ok(AnalysisAction::ExplainLogic),
            "vulnerabilities" | "vulns" => Ok(AnalysisAction::FindVulnerabilities),
            "refactor" => Ok(AnalysisAction::SuggestRefactoring),
            "python" => Ok(AnalysisAction::TranslateToPython),
            other => Err(format!(
                "unknown analysis action: {other} (expected explain, vulnerabilities, refactor or python)"
            )),
        }
    }
}

/// Builds the instruction prompt for one request. The input code goes in
/// verbatim, fenced as a C code block.
pub fn build_prompt(action: AnalysisAction, code: &str) -> String {
    format!(
        "Analyze the following C/C++ code snippet for the action: \"{}\".\n\
         Provide a clear, well-formatted response using Markdown.\n\
         - Use headings for sections.\n\
         - Use code blocks for any code examples.\n\
         - Use lists for bullet points.\n\
         Code to analyze:\n\
         ```c\n\
         {}\n\
         ```",
        action.label(),
        code
    )
}

#[derive(Debug, Error)]
pub enum SourceLoadError {
    #[error("unsupported file type: {}", .0.display())]
    UnsupportedExtension(PathBuf),
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("{} is not valid UTF-8 text", .0.display())]
    Decode(PathBuf),
}

pub fn is_supported_source(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| SUPPORTED_EXTENSIONS.iter().any(|s| e.eq_ignore_ascii_case(s)))
        .unwrap_or(false)
}

/// Reads a decompiled source file in full, as UTF-8 text. No size limit
/// is enforced here.
pub fn read_source(path: &Path) -> Result<String, SourceLoadError> {
    if !is_supported_source(path) {
        return Err(SourceLoadError::UnsupportedExtension(path.to_path_buf()));
    }
    let bytes = std::fs::read(path).map_err(|source| SourceLoadError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    String::from_utf8(bytes).map_err(|_| SourceLoadError::Decode(path.to_path_buf()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn action_ids_parse_back() {
        for action in AnalysisAction::ALL {
            assert_eq!(action.id().parse::<AnalysisAction>().unwrap(), action);
        }
        assert_eq!(
            "vulns".parse::<AnalysisAction>().unwrap(),
            AnalysisAction::FindVulnerabilities
        );
        assert!("disassemble".parse::<AnalysisAction>().is_err());
    }

    #[test]
    fn prompt_embeds_label_and_code_verbatim() {
        let code = "int main(void) { return 1; }";
        let prompt = build_prompt(AnalysisAction::FindVulnerabilities, code);
        assert!(prompt.contains("\"FIND VULNERABILITIES\""));
        assert!(prompt.contains("```c\n"));
        assert!(prompt.contains(code));
    }

    #[test]
    fn extension_filter_is_case_insensitive() {
        assert!(is_supported_source(Path::new("a.c")));
        assert!(is_supported_source(Path::new("a.HPP")));
        assert!(is_supported_source(Path::new("notes.txt")));
        assert!(!is_supported_source(Path::new("a.rs")));
        assert!(!is_supported_source(Path::new("noext")));
    }

    #[test]
    fn read_source_round_trips_utf8() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("main.c");
        fs::write(&path, "int main(){}").unwrap();
        assert_eq!(read_source(&path).unwrap(), "int main(){}");
    }

    #[test]
    fn read_source_rejects_unsupported_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("main.exe");
        fs::write(&path, "MZ").unwrap();
        assert!(matches!(
            read_source(&path),
            Err(SourceLoadError::UnsupportedExtension(_))
        ));
    }

    #[test]
    fn read_source_reports_decode_failures() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blob.c");
        fs::write(&path, [0x66u8, 0x6f, 0xff, 0xfe]).unwrap();
        assert!(matches!(read_source(&path), Err(SourceLoadError::Decode(_))));
    }

    #[test]
    fn read_source_reports_io_failures() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.c");
        assert!(matches!(
            read_source(&path),
            Err(SourceLoadError::Read { .. })
        ));
    }
}
