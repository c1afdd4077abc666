//! Tray title and menu model.

use chrono::{DateTime, Utc};

use aibattery_core::battery::reset_label;
use aibattery_core::refresh::{RefreshPhase, UsageView};
use aibattery_core::{BarStyle, BatteryIcon, BatteryState, ColorTier};

/// Title shown before the first snapshot arrives
pub const PLACEHOLDER_TITLE: &str = "🔋 --";
/// Section heading above the metric rows
const PROVIDER_SECTION: &str = "Claude";

/// Action bound to a clickable menu entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrayAction {
    Refresh,
    Quit,
}

/// One menu entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuItem {
    /// Informational, not clickable
    Label(String),
    Separator,
    /// Clickable entry
    Action { label: String, action: TrayAction },
}

impl MenuItem {
    fn label(text: impl Into<String>) -> Self {
        MenuItem::Label(text.into())
    }

    fn action(label: &str, action: TrayAction) -> Self {
        MenuItem::Action {
            label: label.to_string(),
            action,
        }
    }
}

/// Title next to the tray icon, driven by the lower of session/weekly remaining
pub fn tray_title(view: &UsageView) -> String {
    match view.snapshot {
        Some(ref snapshot) => {
            let lowest = snapshot.lowest_remaining();
            let icon = BatteryIcon::from_tier(ColorTier::from_remaining(lowest));
            format!("{} {}%", icon.glyph(), lowest.round() as u8)
        }
        None => PLACEHOLDER_TITLE.to_string(),
    }
}

/// Build the dropdown menu
pub fn build_menu(view: &UsageView, bar_width: usize, now: DateTime<Utc>) -> Vec<MenuItem> {
    let mut items = vec![MenuItem::label("⚡ AI Battery"), MenuItem::Separator];

    match (&view.snapshot, view.phase) {
        (Some(snapshot), _) => {
            items.push(MenuItem::label(PROVIDER_SECTION));
            for (i, (kind, metric)) in snapshot.metrics().into_iter().enumerate() {
                if i > 0 {
                    items.push(MenuItem::Separator);
                }
                items.push(MenuItem::label(metric_row(
                    kind.label(),
                    &metric.battery(),
                    bar_width,
                )));
                if let Some(reset) = reset_label(metric, now) {
                    items.push(MenuItem::label(format!("      {}", reset)));
                }
            }
        }
        (None, RefreshPhase::Error) => {
            let message = view.error.as_deref().unwrap_or("unknown error");
            items.push(MenuItem::label(format!("Error: {}", message)));
        }
        (None, _) => items.push(MenuItem::label("Loading...")),
    }

    items.push(MenuItem::Separator);
    items.push(MenuItem::action("Refresh", TrayAction::Refresh));
    items.push(MenuItem::action("Quit", TrayAction::Quit));
    items
}

/// "🟢  Session  [▓▓▓▓▓░░░]  85% left"
fn metric_row(label: &str, battery: &BatteryState, bar_width: usize) -> String {
    format!(
        "{}  {}  [{}]  {}% left",
        battery.color_tier.status_dot(),
        label,
        battery.bar(bar_width).render(BarStyle::Shade),
        battery.display_percent()
    )
}
