use anyhow::Result;
use chrono::{DateTime, Utc};
use crossterm::event::{self, Event, KeyEventKind};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame, Terminal,
};
use std::io;
use std::time::Duration;
use tokio::sync::mpsc;

use aibattery_core::refresh::{RefreshEvent, RefreshHandle, RefreshPhase, UsageView};

use super::components::{BatteryBar, StatusBar};
use super::key_handler::{resolve_key, KeyAction};
use crate::config::Settings;
use crate::source::build_refresher;

/// Spinner frames for the loading animation
pub const SPINNER_FRAMES: &[char] = &['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];

/// Interactive terminal application
pub struct App {
    settings: Settings,
    view: UsageView,
    spinner_frame: usize,
    running: bool,
}

impl App {
    /// Create a new application
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            view: UsageView::new(),
            spinner_frame: 0,
            running: true,
        }
    }

    /// Run the application
    pub async fn run(&mut self) -> Result<()> {
        // Setup terminal
        crossterm::terminal::enable_raw_mode()?;
        let mut stdout = io::stdout();
        crossterm::execute!(stdout, crossterm::terminal::EnterAlternateScreen)?;

        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        // Start refresher
        let refresher = build_refresher(
            &self.settings.source,
            self.settings.ui.refresh_interval_secs,
        );
        let (handle, mut events) = refresher.start();

        // Main loop
        let result = self.main_loop(&mut terminal, &handle, &mut events).await;

        // Restore terminal
        crossterm::terminal::disable_raw_mode()?;
        crossterm::execute!(
            terminal.backend_mut(),
            crossterm::terminal::LeaveAlternateScreen
        )?;
        terminal.show_cursor()?;

        result
    }

    async fn main_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
        handle: &RefreshHandle,
        events: &mut mpsc::Receiver<RefreshEvent>,
    ) -> Result<()> {
        while self.running {
            // Draw UI
            terminal.draw(|frame| {
                render(
                    frame,
                    &self.view,
                    self.spinner_frame,
                    &self.settings,
                    Utc::now(),
                )
            })?;

            self.spinner_frame = self.spinner_frame.wrapping_add(1);

            // Handle events with timeout
            if event::poll(Duration::from_millis(80))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(resolve_key(key.code, key.modifiers), handle);
                    }
                }
            }

            // Process refresh events
            while let Ok(event) = events.try_recv() {
                self.view.apply(event, Utc::now());
            }
        }

        Ok(())
    }

    fn handle_key(&mut self, action: KeyAction, handle: &RefreshHandle) {
        match action {
            KeyAction::Quit => self.running = false,
            KeyAction::Refresh => {
                // A fetch already in flight absorbs the request
                if !self.view.is_loading() && handle.request() {
                    self.view.begin();
                }
            }
            KeyAction::None => {}
        }
    }
}

/// Draw the whole view
pub fn render(
    frame: &mut Frame,
    view: &UsageView,
    spinner_frame: usize,
    settings: &Settings,
    now: DateTime<Utc>,
) {
    let area = frame.area().inner(ratatui::layout::Margin {
        horizontal: 1,
        vertical: 0,
    });

    match (view.phase, &view.snapshot, &view.error) {
        (RefreshPhase::Loading, _, _) => {
            let spinner = SPINNER_FRAMES[spinner_frame % SPINNER_FRAMES.len()];
            let line = Line::from(vec![
                Span::styled(spinner.to_string(), Style::default().fg(Color::Cyan)),
                Span::raw(" Loading usage data..."),
            ]);
            frame.render_widget(Paragraph::new(vec![line]), area);
        }
        (RefreshPhase::Error, _, Some(error)) => {
            let lines = vec![
                Line::from(Span::styled(
                    format!("Error: {}", error),
                    Style::default().fg(Color::Red),
                )),
                Line::from(Span::styled(
                    "Press 'r' to retry, 'q' to quit",
                    Style::default().add_modifier(Modifier::DIM),
                )),
            ];
            frame.render_widget(Paragraph::new(lines), area);
        }
        (_, Some(snapshot), _) => {
            let metrics = snapshot.metrics();

            // Header, one block per metric (blank line between), footer
            let mut constraints = vec![Constraint::Length(2)];
            for (i, (_, metric)) in metrics.iter().enumerate() {
                if i > 0 {
                    constraints.push(Constraint::Length(1));
                }
                constraints.push(Constraint::Length(BatteryBar::height(metric, now)));
            }
            constraints.push(Constraint::Length(1));
            constraints.push(Constraint::Length(1));
            constraints.push(Constraint::Min(0));

            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints(constraints)
                .split(area);

            render_header(frame, chunks[0]);
            let mut idx = 1;
            for (i, (kind, metric)) in metrics.iter().enumerate() {
                if i > 0 {
                    idx += 1;
                }
                BatteryBar::render(
                    frame,
                    chunks[idx],
                    kind.label(),
                    metric,
                    settings.ui.bar_width,
                    now,
                );
                idx += 1;
            }
            StatusBar::render(
                frame,
                chunks[idx + 1],
                view.last_refresh,
                settings.ui.refresh_interval_secs,
            );
        }
        _ => {
            let line = Line::from(Span::styled(
                "No usage data available",
                Style::default().fg(Color::Yellow),
            ));
            frame.render_widget(Paragraph::new(vec![line]), area);
        }
    }
}

fn render_header(frame: &mut Frame, area: Rect) {
    let line = Line::from(Span::styled(
        "⚡ AI Battery",
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    ));
    frame.render_widget(Paragraph::new(vec![line]), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use aibattery_core::usage::MockSource;
    use aibattery_core::FetchError;
    use ratatui::backend::TestBackend;

    fn draw(view: &UsageView) -> String {
        let backend = TestBackend::new(80, 20);
        let mut terminal = Terminal::new(backend).expect("Failed to create test terminal");
        let settings = Settings::default();
        terminal
            .draw(|frame| render(frame, view, 0, &settings, Utc::now()))
            .expect("Failed to render");

        let buffer = terminal.backend().buffer();
        let mut text = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                text.push_str(buffer[(x, y)].symbol());
            }
            text.push('\n');
        }
        text
    }

    #[test]
    fn test_app_creation() {
        let settings = Settings::default();
        let app = App::new(settings);
        assert!(app.running);
        assert!(app.view.is_loading());
    }

    #[test]
    fn test_render_loading() {
        let text = draw(&UsageView::new());
        assert!(text.contains("Loading usage data..."));
    }

    #[test]
    fn test_render_ready() {
        let mut view = UsageView::new();
        view.finish(Ok(MockSource::snapshot()), Utc::now());
        let text = draw(&view);

        assert!(text.contains("AI Battery"));
        assert!(text.contains("85% remaining"));
        assert!(text.contains("89% remaining"));
        assert!(text.contains("100% remaining"));
        assert!(text.contains("Resets 1am (America/Chicago)"));
        assert!(text.contains("'r' refresh"));
    }

    #[test]
    fn test_render_error() {
        let mut view = UsageView::new();
        view.finish(Err(FetchError::NoMeters), Utc::now());
        let text = draw(&view);
        assert!(text.contains("Error: no usage meters found in output"));
        assert!(text.contains("Press 'r' to retry"));
    }

    #[tokio::test]
    async fn test_refresh_key_is_ignored_while_loading() {
        let refresher = aibattery_core::refresh::Refresher::new(
            std::sync::Arc::new(MockSource),
            Duration::from_secs(3600),
        );
        let (handle, _events) = refresher.start();
        let mut app = App::new(Settings::default());

        app.handle_key(KeyAction::Refresh, &handle);
        assert!(app.view.is_loading());

        app.view.finish(Ok(MockSource::snapshot()), Utc::now());
        app.handle_key(KeyAction::Refresh, &handle);
        assert!(app.view.is_loading());

        app.handle_key(KeyAction::Quit, &handle);
        assert!(!app.running);
    }
}
