pub mod config;
pub mod output;
pub mod source;
pub mod tray;
pub mod ui;
