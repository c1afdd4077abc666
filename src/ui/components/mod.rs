mod battery_bar;
mod status_bar;

pub use battery_bar::BatteryBar;
pub use status_bar::StatusBar;
