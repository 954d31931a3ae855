use std::io;
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::{cursor, execute, terminal};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;

use crate::tui::commands::AnalysisExecutor;
use crate::tui::state::{InputMode, TuiApp};
use crate::tui::view;

impl TuiApp {
    pub fn run(&mut self, executor: &mut AnalysisExecutor) -> Result<()> {
        struct TuiGuard;
        impl Drop for TuiGuard {
            fn drop(&mut self) {
                let mut stdout = io::stdout();
                let _ = execute!(stdout, terminal::LeaveAlternateScreen, cursor::Show);
                let _ = terminal::disable_raw_mode();
            }
        }

        let mut stdout = io::stdout();
        terminal::enable_raw_mode()?;
        execute!(stdout, terminal::EnterAlternateScreen, cursor::Hide)?;
        let _guard = TuiGuard;

        let mut terminal = Terminal::new(CrosstermBackend::new(io::stdout()))?;
        self.event_loop(&mut terminal, executor)
    }

    fn event_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
        executor: &mut AnalysisExecutor,
    ) -> Result<()> {
        let mut last_ctrl_c_at: Option<Instant> = None;
        let mut last_spinner_update = Instant::now();
        let mut dirty = true;
        loop {
            if self.session.status().is_running()
                && last_spinner_update.elapsed() >= Duration::from_millis(150)
            {
                self.spinner_state = self.spinner_state.wrapping_add(1);
                last_spinner_update = Instant::now();
                dirty = true;
            }

            if self.drain_inbox() {
                dirty = true;
            }

            if dirty {
                terminal.draw(|f| view::draw(f, self))?;
                dirty = false;
            }

            if self.should_quit {
                return Ok(());
            }

            if !event::poll(Duration::from_millis(50))? {
                continue;
            }
            match event::read()? {
                Event::Key(k) if k.kind == KeyEventKind::Press => {
                    if k.code == KeyCode::Char('c') && k.modifiers.contains(KeyModifiers::CONTROL) {
                        if let Some(at) = last_ctrl_c_at
                            && at.elapsed() <= Duration::from_secs(1)
                        {
                            return Ok(());
                        }
                        last_ctrl_c_at = Some(Instant::now());
                        self.push_log("[press Ctrl+C again to quit]");
                        dirty = true;
                        continue;
                    }
                    match k.code {
                        KeyCode::Tab => {
                            self.mode = match self.mode {
                                InputMode::Editor => InputMode::Command,
                                InputMode::Command => InputMode::Editor,
                            };
                        }
                        KeyCode::Esc => {
                            executor.dispatch("/cancel", self);
                        }
                        KeyCode::PageUp => {
                            self.output_scroll = self.output_scroll.saturating_add(5);
                        }
                        KeyCode::PageDown => {
                            self.output_scroll = self.output_scroll.saturating_sub(5);
                        }
                        _ => match self.mode {
                            InputMode::Editor => {
                                self.editor.input(k);
                            }
                            InputMode::Command => match k.code {
                                KeyCode::Enter => {
                                    let line = std::mem::take(&mut self.command);
                                    executor.dispatch(line.trim(), self);
                                }
                                KeyCode::Backspace => {
                                    self.command.pop();
                                }
                                KeyCode::Char(c) => {
                                    self.command.push(c);
                                }
                                _ => {}
                            },
                        },
                    }
                    dirty = true;
                }
                Event::Resize(_, _) => {
                    dirty = true;
                }
                _ => {}
            }
        }
    }

    /// Drains background messages; returns whether anything arrived.
    pub(crate) fn drain_inbox(&mut self) -> bool {
        let Some(rx) = self.inbox_rx.as_ref() else {
            return false;
        };
        let mut drained = Vec::new();
        while let Ok(msg) = rx.try_recv() {
            drained.push(msg);
        }
        if drained.is_empty() {
            return false;
        }
        for msg in drained {
            self.apply_message(&msg);
        }
        true
    }

    /// Routes one inbox frame. `::`-prefixed frames carry generation-
    /// tagged stream events; everything else is an app-log line.
    pub(crate) fn apply_message(&mut self, msg: &str) {
        if let Some(rest) = msg.strip_prefix("::chunk:")
            && let Some((generation, chunk)) = rest.split_once(':')
            && let Ok(generation) = generation.parse::<u64>()
        {
            self.session.on_chunk(generation, chunk);
            return;
        }
        if let Some(generation) = msg.strip_prefix("::done:")
            && let Ok(generation) = generation.parse::<u64>()
        {
            self.session.on_complete(generation);
            return;
        }
        if let Some(generation) = msg.strip_prefix("::failed:")
            && let Ok(generation) = generation.parse::<u64>()
        {
            self.session.on_failure(generation);
            return;
        }
        self.push_log(msg.to_string());
    }
}
