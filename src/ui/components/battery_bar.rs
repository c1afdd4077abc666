//! One battery row per usage metric, with its reset line underneath.

use chrono::{DateTime, Utc};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use aibattery_core::battery::reset_label;
use aibattery_core::usage::UsageMetric;
use aibattery_core::{BarStyle, ColorTier};

/// Fixed label width for alignment
const LABEL_WIDTH: usize = 8;
/// Indent of the reset line (label + space + icon + space)
const RESET_INDENT: usize = 11;
/// Cells used by everything except the bar: " Label    🔋 " + " 100% remaining"
const FIXED_WIDTH: usize = LABEL_WIDTH + 1 + 3 + 1 + 4 + 10;

/// Battery row widget
pub struct BatteryBar;

impl BatteryBar {
    /// Rows needed for a metric
    pub fn height(metric: &UsageMetric, now: DateTime<Utc>) -> u16 {
        if reset_label(metric, now).is_some() {
            2
        } else {
            1
        }
    }

    /// Render a metric into `area`
    pub fn render(
        frame: &mut Frame,
        area: Rect,
        label: &str,
        metric: &UsageMetric,
        bar_width: usize,
        now: DateTime<Utc>,
    ) {
        if area.height == 0 || area.width < 10 {
            return;
        }
        let bar_width = Self::fit_bar_width(bar_width, area.width);
        let lines = Self::lines(label, metric, bar_width, now);
        frame.render_widget(Paragraph::new(lines), area);
    }

    /// Shrink the bar so the row fits in `available` cells
    fn fit_bar_width(bar_width: usize, available: u16) -> usize {
        bar_width.min((available as usize).saturating_sub(FIXED_WIDTH))
    }

    /// Build the lines for one metric:
    /// "Session  🔋 ██████████░░░░ 85% remaining"
    /// "           Resets in 3 hours"
    pub fn lines(
        label: &str,
        metric: &UsageMetric,
        bar_width: usize,
        now: DateTime<Utc>,
    ) -> Vec<Line<'static>> {
        let battery = metric.battery();
        let bar = battery.bar(bar_width);
        let color = Self::tier_color(battery.color_tier);
        let dim = Style::default().add_modifier(Modifier::DIM);

        let mut lines = vec![Line::from(vec![
            Span::styled(
                format!("{:w$}", label, w = LABEL_WIDTH),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::raw(" "),
            Span::raw(format!("{} ", battery.icon.glyph())),
            Span::styled(bar.filled_str(BarStyle::Block), Style::default().fg(color)),
            Span::styled(bar.empty_str(BarStyle::Block), dim),
            Span::raw(" "),
            Span::styled(
                format!("{}%", battery.display_percent()),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            ),
            Span::styled(" remaining", dim),
        ])];

        if let Some(reset) = reset_label(metric, now) {
            lines.push(Line::from(Span::styled(
                format!("{:indent$}{}", "", reset, indent = RESET_INDENT),
                dim,
            )));
        }

        lines
    }

    /// Terminal color for a tier
    pub fn tier_color(tier: ColorTier) -> Color {
        match tier {
            ColorTier::Green => Color::Green,
            ColorTier::Yellow => Color::Yellow,
            ColorTier::Red => Color::Red,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn line_text(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn test_line_layout() {
        let now = Utc::now();
        let metric = UsageMetric {
            percent_used: 15.0,
            reset_at: Some(now + Duration::seconds(90)),
            reset_info: None,
        };

        let lines = BatteryBar::lines("Session", &metric, 20, now);
        assert_eq!(lines.len(), 2);
        assert_eq!(
            line_text(&lines[0]),
            "Session  🔋 █████████████████░░░ 85% remaining"
        );
        assert_eq!(line_text(&lines[1]), "           Resets in 1 minute");
    }

    #[test]
    fn test_bar_color_follows_tier() {
        let now = Utc::now();
        let lines = BatteryBar::lines("Session", &UsageMetric::used(97.0), 10, now);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].spans[3].style.fg, Some(Color::Red));
        assert_eq!(lines[0].spans[6].style.fg, Some(Color::Red));
        assert!(line_text(&lines[0]).contains("🪫"));

        let lines = BatteryBar::lines("Weekly", &UsageMetric::used(85.0), 10, now);
        assert_eq!(lines[0].spans[3].style.fg, Some(Color::Yellow));
    }

    #[test]
    fn test_height() {
        let now = Utc::now();
        assert_eq!(BatteryBar::height(&UsageMetric::used(10.0), now), 1);
        let with_info = UsageMetric {
            reset_info: Some("1am".to_string()),
            ..UsageMetric::used(10.0)
        };
        assert_eq!(BatteryBar::height(&with_info, now), 2);
    }

    #[test]
    fn test_fit_bar_width() {
        assert_eq!(BatteryBar::fit_bar_width(30, 120), 30);
        assert_eq!(BatteryBar::fit_bar_width(30, 40), 40 - FIXED_WIDTH);
        assert_eq!(BatteryBar::fit_bar_width(30, 10), 0);
    }
}
