use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use unicode_width::UnicodeWidthChar;

use crate::session::RequestStatus;
use crate::tui::markdown;
use crate::tui::state::{InputMode, TuiApp};

const SPINNER_FRAMES: [char; 10] = ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];

/// Truncates to a display width, not a byte or char count.
pub(crate) fn truncate_display(s: &str, max: usize) -> String {
    if max == 0 {
        return String::new();
    }
    let mut width = 0usize;
    let mut out = String::new();
    for ch in s.chars() {
        let ch_w = ch.width().unwrap_or(0);
        if ch_w == 0 {
            out.push(ch);
            continue;
        }
        if width + ch_w > max {
            break;
        }
        out.push(ch);
        width += ch_w;
    }
    out
}

pub(crate) fn status_line(app: &TuiApp) -> String {
    match app.session.status() {
        RequestStatus::Idle => "IDLE".to_string(),
        RequestStatus::Running(action) => {
            let frame = SPINNER_FRAMES[app.spinner_state as usize % SPINNER_FRAMES.len()];
            format!("{frame} ANALYZING: {}", action.label())
        }
        RequestStatus::Completed => "DONE".to_string(),
        RequestStatus::Failed => "ERROR".to_string(),
        RequestStatus::Cancelled => "CANCELLED".to_string(),
    }
}

pub fn draw(f: &mut Frame, app: &mut TuiApp) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(5),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(f.area());

    draw_header(f, app, rows[0]);

    let panes = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(rows[1]);
    draw_editor(f, app, panes[0]);
    draw_output(f, app, panes[1]);

    draw_log(f, app, rows[2]);
    draw_command(f, app, rows[3]);
    draw_hints(f, app, rows[4]);
}

fn draw_header(f: &mut Frame, app: &TuiApp, area: Rect) {
    let text = format!(
        "{} — AI DECOMPILATION ASSISTANT  [{}]  model:{}",
        app.title,
        status_line(app),
        app.cfg.model
    );
    let text = truncate_display(&text, area.width as usize);
    let style = match app.session.status() {
        RequestStatus::Failed => Style::default()
            .fg(app.theme.error)
            .add_modifier(Modifier::BOLD),
        RequestStatus::Running(_) => Style::default()
            .fg(app.theme.accent)
            .add_modifier(Modifier::BOLD),
        _ => Style::default()
            .fg(app.theme.text)
            .add_modifier(Modifier::BOLD),
    };
    f.render_widget(Paragraph::new(Line::from(Span::styled(text, style))), area);
}

fn draw_editor(f: &mut Frame, app: &mut TuiApp, area: Rect) {
    let focused = app.mode == InputMode::Editor;
    let border = if focused {
        Style::default().fg(app.theme.accent)
    } else {
        Style::default().fg(app.theme.dim)
    };
    app.editor.set_block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border)
            .title(" DECOMPILED CODE (C/C++) "),
    );
    app.editor.set_cursor_line_style(Style::default());
    f.render_widget(&app.editor, area);
}

fn draw_output(f: &mut Frame, app: &TuiApp, area: Rect) {
    let mut lines = if app.session.result().is_empty() {
        vec![Line::from(Span::styled(
            "// OUTPUT WILL APPEAR HERE".to_string(),
            Style::default().fg(app.theme.dim),
        ))]
    } else {
        markdown::styled_lines(app.session.result(), &app.theme)
    };
    if app.session.status().is_running() {
        lines.push(Line::from(Span::styled(
            "▌".to_string(),
            Style::default().fg(app.theme.accent),
        )));
    }

    // Follow the bottom unless the user scrolled away from it. The
    // offset ignores soft-wrapped rows; close enough for a log view.
    let inner_height = area.height.saturating_sub(2);
    let bottom = (lines.len() as u16).saturating_sub(inner_height);
    let scroll = bottom.saturating_sub(app.output_scroll);

    let widget = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .scroll((scroll, 0))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(app.theme.dim))
                .title(" ANALYSIS OUTPUT "),
        );
    f.render_widget(widget, area);
}

fn draw_log(f: &mut Frame, app: &TuiApp, area: Rect) {
    let rows = area.height.saturating_sub(2) as usize;
    let start = app.log.len().saturating_sub(rows);
    let lines: Vec<Line> = app.log[start..]
        .iter()
        .map(|l| Line::from(Span::styled(l.clone(), Style::default().fg(app.theme.dim))))
        .collect();
    let widget = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(app.theme.dim))
            .title(" EVENTS "),
    );
    f.render_widget(widget, area);
}

fn draw_command(f: &mut Frame, app: &TuiApp, area: Rect) {
    let focused = app.mode == InputMode::Command;
    let text = if focused {
        format!("> {}█", app.command)
    } else {
        format!("> {}", app.command)
    };
    let style = if focused {
        Style::default().fg(app.theme.accent)
    } else {
        Style::default().fg(app.theme.dim)
    };
    f.render_widget(
        Paragraph::new(truncate_display(&text, area.width as usize)).style(style),
        area,
    );
}

fn draw_hints(f: &mut Frame, app: &TuiApp, area: Rect) {
    let hints =
        "Tab focus · /explain /vulns /refactor /python · /load <file> · /copy · /clear · /quit · /help";
    f.render_widget(
        Paragraph::new(truncate_display(hints, area.width as usize))
            .style(Style::default().fg(app.theme.dim)),
        area,
    );
}
