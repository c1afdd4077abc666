//! Battery state derived from a usage percentage.
//!
//! Every surface goes through this module, so the thresholds and bar
//! arithmetic live in exactly one place.

pub mod relative_time;

pub use relative_time::{format_relative, reset_label};

use serde::Serialize;

/// Below this many percent remaining the battery is red
pub const RED_BELOW: f64 = 5.0;
/// At or below this many percent remaining the battery is yellow
pub const YELLOW_AT_OR_BELOW: f64 = 20.0;

/// Remaining capacity for a percent-used value, clamped to 0..=100.
///
/// NaN is treated as fully used.
pub fn percent_remaining(percent_used: f64) -> f64 {
    let remaining = 100.0 - percent_used;
    if remaining.is_nan() {
        return 0.0;
    }
    remaining.clamp(0.0, 100.0)
}

/// Color tier of a battery
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorTier {
    /// More than 20% remaining
    Green,
    /// Between 5% and 20% remaining (inclusive)
    Yellow,
    /// Less than 5% remaining
    Red,
}

impl ColorTier {
    /// Tier for a remaining percentage
    pub fn from_remaining(percent_remaining: f64) -> Self {
        if percent_remaining < RED_BELOW {
            ColorTier::Red
        } else if percent_remaining <= YELLOW_AT_OR_BELOW {
            ColorTier::Yellow
        } else {
            ColorTier::Green
        }
    }

    /// Lowercase name (matches the terminal color name)
    pub fn name(&self) -> &'static str {
        match self {
            ColorTier::Green => "green",
            ColorTier::Yellow => "yellow",
            ColorTier::Red => "red",
        }
    }

    /// Colored dot used in the tray menu
    pub fn status_dot(&self) -> &'static str {
        match self {
            ColorTier::Green => "🟢",
            ColorTier::Yellow => "🟡",
            ColorTier::Red => "🔴",
        }
    }
}

/// Battery icon variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BatteryIcon {
    Normal,
    Low,
}

impl BatteryIcon {
    /// Icon for a color tier (only red counts as low)
    pub fn from_tier(tier: ColorTier) -> Self {
        match tier {
            ColorTier::Red => BatteryIcon::Low,
            ColorTier::Green | ColorTier::Yellow => BatteryIcon::Normal,
        }
    }

    pub fn glyph(&self) -> &'static str {
        match self {
            BatteryIcon::Normal => "🔋",
            BatteryIcon::Low => "🪫",
        }
    }
}

/// Derived visual state for one usage metric
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BatteryState {
    /// Remaining capacity, clamped to 0..=100
    pub percent_remaining: f64,
    /// Color tier
    pub color_tier: ColorTier,
    /// Icon variant
    pub icon: BatteryIcon,
}

impl BatteryState {
    /// Derive the battery state from a percent-used value
    pub fn from_percent_used(percent_used: f64) -> Self {
        let percent_remaining = percent_remaining(percent_used);
        let color_tier = ColorTier::from_remaining(percent_remaining);
        Self {
            percent_remaining,
            color_tier,
            icon: BatteryIcon::from_tier(color_tier),
        }
    }

    /// Remaining percentage rounded for display
    pub fn display_percent(&self) -> u8 {
        self.percent_remaining.round() as u8
    }

    /// Bar segments for a given width
    pub fn bar(&self, width: usize) -> BarSegments {
        BarSegments::new(self.percent_remaining, width)
    }
}

/// Glyph pair used to draw a bar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BarStyle {
    /// `█` filled, `░` empty (terminal surfaces)
    #[default]
    Block,
    /// `▓` filled, `░` empty (tray menu)
    Shade,
}

impl BarStyle {
    pub fn filled_glyph(&self) -> char {
        match self {
            BarStyle::Block => '█',
            BarStyle::Shade => '▓',
        }
    }

    pub fn empty_glyph(&self) -> char {
        '░'
    }
}

/// Filled/empty cell counts of a bar. `filled + empty == width` always.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BarSegments {
    pub filled: usize,
    pub empty: usize,
}

impl BarSegments {
    /// Split `width` cells for a remaining percentage (no partial cells)
    pub fn new(percent_remaining: f64, width: usize) -> Self {
        let remaining = if percent_remaining.is_nan() {
            0.0
        } else {
            percent_remaining.clamp(0.0, 100.0)
        };
        let filled = ((width as f64 * remaining / 100.0).round() as usize).min(width);
        Self {
            filled,
            empty: width - filled,
        }
    }

    pub fn width(&self) -> usize {
        self.filled + self.empty
    }

    /// Filled run as a string
    pub fn filled_str(&self, style: BarStyle) -> String {
        style.filled_glyph().to_string().repeat(self.filled)
    }

    /// Empty run as a string
    pub fn empty_str(&self, style: BarStyle) -> String {
        style.empty_glyph().to_string().repeat(self.empty)
    }

    /// Whole bar as a string
    pub fn render(&self, style: BarStyle) -> String {
        let mut bar = self.filled_str(style);
        bar.push_str(&self.empty_str(style));
        bar
    }
}
