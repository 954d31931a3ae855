//! Line-based styling for the output pane. Only the structures the
//! analysis responses actually use are recognized: fenced code blocks,
//! headings and the fixed `//`-prefixed notices. Styling is per line so
//! a fence that is still open mid-stream renders correctly.

use std::sync::OnceLock;

use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use regex::Regex;

use crate::tui::theme::Theme;

fn fence_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*```(\w*)\s*$").unwrap())
}

pub fn styled_lines(text: &str, theme: &Theme) -> Vec<Line<'static>> {
    let mut out = Vec::new();
    let mut in_code = false;
    for raw in text.lines() {
        if fence_re().is_match(raw) {
            in_code = !in_code;
            out.push(Line::from(Span::styled(
                raw.to_string(),
                Style::default().fg(theme.dim),
            )));
            continue;
        }
        let style = if in_code {
            Style::default().fg(theme.code)
        } else if raw.starts_with('#') {
            Style::default().fg(theme.accent).add_modifier(Modifier::BOLD)
        } else if raw.starts_with("// ERROR") {
            Style::default().fg(theme.error)
        } else if raw.starts_with("// SUCCESS") {
            Style::default().fg(theme.ok)
        } else {
            Style::default().fg(theme.text)
        };
        out.push(Line::from(Span::styled(raw.to_string(), style)));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn style_of(line: &Line<'_>) -> Style {
        line.spans[0].style
    }

    #[test]
    fn fences_toggle_code_styling() {
        let theme = Theme::dark();
        let lines = styled_lines("before\n```c\nint x;\n```\nafter", &theme);
        assert_eq!(lines.len(), 5);
        assert_eq!(style_of(&lines[0]).fg, Some(theme.text));
        assert_eq!(style_of(&lines[1]).fg, Some(theme.dim));
        assert_eq!(style_of(&lines[2]).fg, Some(theme.code));
        assert_eq!(style_of(&lines[3]).fg, Some(theme.dim));
        assert_eq!(style_of(&lines[4]).fg, Some(theme.text));
    }

    #[test]
    fn unclosed_fence_styles_the_tail_as_code() {
        let theme = Theme::dark();
        let lines = styled_lines("```python\nprint(1)\nprint(2)", &theme);
        assert_eq!(style_of(&lines[1]).fg, Some(theme.code));
        assert_eq!(style_of(&lines[2]).fg, Some(theme.code));
    }

    #[test]
    fn headings_are_bold_accent() {
        let theme = Theme::dark();
        let lines = styled_lines("## Overview", &theme);
        let style = style_of(&lines[0]);
        assert_eq!(style.fg, Some(theme.accent));
        assert!(style.add_modifier.contains(Modifier::BOLD));
    }

    #[test]
    fn notices_use_status_colors() {
        let theme = Theme::dark();
        let lines = styled_lines(
            "// ERROR: FAILED TO READ FILE \"a.c\"\n// SUCCESS: LOADED FILE \"a.c\"",
            &theme,
        );
        assert_eq!(style_of(&lines[0]).fg, Some(theme.error));
        assert_eq!(style_of(&lines[1]).fg, Some(theme.ok));
    }

    #[test]
    fn text_keeps_its_content_verbatim() {
        let theme = Theme::dark();
        let lines = styled_lines("plain `span` text", &theme);
        assert_eq!(lines[0].spans[0].content, "plain `span` text");
    }
}
