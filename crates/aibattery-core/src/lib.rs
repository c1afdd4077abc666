//! Core library for aibattery.
//!
//! Turns usage percentages into battery states, formats reset times, and
//! provides the pluggable usage sources plus the refresh loop every
//! presentation surface polls through.

pub mod battery;
pub mod error;
pub mod refresh;
pub mod usage;

pub use battery::{BarSegments, BarStyle, BatteryIcon, BatteryState, ColorTier};
pub use error::FetchError;
