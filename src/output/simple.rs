use chrono::{DateTime, Utc};

use aibattery_core::battery::reset_label;
use aibattery_core::usage::UsageSnapshot;
use aibattery_core::BarStyle;

/// Column where the reset line starts (label width + separator)
const RESET_INDENT: usize = 9;

/// Plain-text rendering of a snapshot:
///
/// ```text
/// ⚡ AI Battery
///
/// Session  🔋 █████████████████░░░ 85% remaining
///          Resets in 3 hours
/// ```
pub fn render_simple(snapshot: &UsageSnapshot, bar_width: usize, now: DateTime<Utc>) -> String {
    let mut out = String::from("\n⚡ AI Battery\n\n");

    for (kind, metric) in snapshot.metrics() {
        let battery = metric.battery();
        out.push_str(&format!(
            "{:<8} {} {} {}% remaining\n",
            kind.label(),
            battery.icon.glyph(),
            battery.bar(bar_width).render(BarStyle::Block),
            battery.display_percent()
        ));
        if let Some(reset) = reset_label(metric, now) {
            out.push_str(&format!("{:indent$}{}\n", "", reset, indent = RESET_INDENT));
        }
        out.push('\n');
    }

    out
}
