//! Menu-bar tray surface.

mod app;
pub mod host;
pub mod icon;
pub mod menu;

pub use app::{TrayApp, TrayState};
pub use host::{spawn_stdin_actions, TerminalTrayHost, TrayHost};
pub use menu::{build_menu, tray_title, MenuItem, TrayAction};
