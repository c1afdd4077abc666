//! Where the tray is displayed.
//!
//! `TrayHost` is the seam to a platform status-bar binding. The bundled
//! `TerminalTrayHost` prints the menu to a writer and takes commands from
//! stdin, which is enough to run and script the tray anywhere.

use std::io::{BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use image::RgbaImage;
use tokio::sync::mpsc;
use tracing::debug;

use super::icon::save_icon;
use super::menu::{MenuItem, TrayAction};

/// Display backend for the tray surface
pub trait TrayHost {
    /// Text next to the icon
    fn set_title(&mut self, title: &str) -> Result<()>;
    /// Replace the dropdown menu
    fn set_menu(&mut self, items: &[MenuItem]) -> Result<()>;
    /// Replace the icon image
    fn set_icon(&mut self, icon: &RgbaImage) -> Result<()>;
}

/// Prints the tray to a terminal (or any writer)
pub struct TerminalTrayHost<W: Write> {
    out: W,
    title: String,
    icon_path: Option<PathBuf>,
}

impl<W: Write> TerminalTrayHost<W> {
    pub fn new(out: W, icon_path: Option<PathBuf>) -> Self {
        Self {
            out,
            title: String::new(),
            icon_path,
        }
    }

    /// Consume the host and return the writer
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> TrayHost for TerminalTrayHost<W> {
    fn set_title(&mut self, title: &str) -> Result<()> {
        self.title = title.to_string();
        Ok(())
    }

    fn set_menu(&mut self, items: &[MenuItem]) -> Result<()> {
        writeln!(self.out, "[{}]", self.title)?;
        for item in items {
            match item {
                MenuItem::Label(text) => writeln!(self.out, "  {}", text)?,
                MenuItem::Separator => writeln!(self.out, "  {}", "─".repeat(24))?,
                MenuItem::Action { label, action } => {
                    writeln!(self.out, "  ({}) {}", action_key(*action), label)?
                }
            }
        }
        writeln!(self.out)?;
        self.out.flush()?;
        Ok(())
    }

    fn set_icon(&mut self, icon: &RgbaImage) -> Result<()> {
        if let Some(ref path) = self.icon_path {
            save_icon(icon, path)
                .with_context(|| format!("Failed to write tray icon: {:?}", path))?;
            debug!("Tray icon written to {:?}", path);
        }
        Ok(())
    }
}

fn action_key(action: TrayAction) -> char {
    match action {
        TrayAction::Refresh => 'r',
        TrayAction::Quit => 'q',
    }
}

/// Map a command line typed by the user to an action
pub fn parse_action(line: &str) -> Option<TrayAction> {
    match line.trim().to_ascii_lowercase().as_str() {
        "r" | "refresh" => Some(TrayAction::Refresh),
        "q" | "quit" => Some(TrayAction::Quit),
        _ => None,
    }
}

/// Read actions from stdin on a background thread.
///
/// The channel closes when stdin reaches EOF.
pub fn spawn_stdin_actions() -> mpsc::Receiver<TrayAction> {
    let (tx, rx) = mpsc::channel(8);
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            match parse_action(&line) {
                Some(action) => {
                    if tx.blocking_send(action).is_err() {
                        break;
                    }
                }
                None if line.trim().is_empty() => {}
                None => debug!("Unknown tray command: {:?}", line.trim()),
            }
        }
    });
    rx
}
