use chrono::{DateTime, Local, Utc};
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

/// Footer with refresh info and key hints
pub struct StatusBar;

impl StatusBar {
    /// Render the status bar
    pub fn render(
        frame: &mut Frame,
        area: Rect,
        last_refresh: Option<DateTime<Utc>>,
        refresh_interval_secs: u64,
    ) {
        let line = Self::line(last_refresh, refresh_interval_secs);
        frame.render_widget(Paragraph::new(vec![line]), area);
    }

    /// "Updated 12:00:00 · Auto-refresh 60s · 'r' refresh · 'q' quit"
    pub fn line(last_refresh: Option<DateTime<Utc>>, refresh_interval_secs: u64) -> Line<'static> {
        let mut text = String::new();
        if let Some(at) = last_refresh {
            let local = at.with_timezone(&Local);
            text.push_str(&format!("Updated {} · ", local.format("%H:%M:%S")));
        }
        text.push_str(&format!(
            "Auto-refresh {} · 'r' refresh · 'q' quit",
            Self::format_interval(refresh_interval_secs)
        ));
        Line::from(Span::styled(
            text,
            Style::default().add_modifier(Modifier::DIM),
        ))
    }

    fn format_interval(secs: u64) -> String {
        if secs >= 60 && secs % 60 == 0 && secs != 60 {
            format!("{}m", secs / 60)
        } else {
            format!("{}s", secs)
        }
    }
}
