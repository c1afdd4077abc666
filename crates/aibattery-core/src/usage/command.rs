//! Live source that runs `claude /usage` in a PTY and scrapes the screen.

use std::io::{Read, Write};
use std::sync::mpsc as std_mpsc;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use chrono::Local;
use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use portable_pty::{native_pty_system, CommandBuilder, PtySize};
use tracing::{debug, info, warn};

use super::parser::{parse_usage_output, snapshot_from_meters};
use super::source::UsageSource;
use super::types::UsageSnapshot;
use crate::error::FetchError;

/// Marker that the usage overlay has rendered
const USAGE_MARKER: &str = "% used";
/// Prompt Claude Code shows in an untrusted directory
const TRUST_PROMPT: &str = "Yes, I trust this folder";
/// How long one read waits for PTY output
const POLL_INTERVAL: Duration = Duration::from_millis(100);
/// Escape the overlay, then quit
const EXIT_KEYS: [&[u8]; 4] = [b"\x1b", b"\x1b", b"q", b"\x03"];
/// Pause after each exit key
const EXIT_KEY_DELAY: Duration = Duration::from_millis(150);

/// Configuration for the PTY capture
#[derive(Debug, Clone)]
pub struct CommandSourceConfig {
    /// Program to run
    pub command: String,
    /// Arguments
    pub args: Vec<String>,
    /// PTY rows
    pub rows: u16,
    /// PTY columns
    pub cols: u16,
    /// Upper bound on the whole capture, exit sequence included
    pub output_timeout: Duration,
    /// Extra time to keep reading once the overlay appears
    pub settle: Duration,
}

impl Default for CommandSourceConfig {
    fn default() -> Self {
        Self {
            command: "claude".to_string(),
            args: vec!["/usage".to_string()],
            rows: 40,
            cols: 120,
            output_timeout: Duration::from_secs(25),
            settle: Duration::from_millis(800),
        }
    }
}

/// Runs the usage command and parses its output
#[derive(Debug, Clone, Default)]
pub struct CommandSource {
    config: CommandSourceConfig,
}

impl CommandSourceConfig {
    /// Time kept back at the end of the capture to send the exit keys
    pub fn exit_allowance() -> Duration {
        EXIT_KEY_DELAY * EXIT_KEYS.len() as u32 + POLL_INTERVAL
    }

    /// How long to wait for the usage overlay
    fn wait_budget(&self) -> Duration {
        self.output_timeout.saturating_sub(Self::exit_allowance())
    }
}

impl CommandSource {
    pub fn new(config: CommandSourceConfig) -> Self {
        Self { config }
    }
}

impl UsageSource for CommandSource {
    fn name(&self) -> &str {
        "command"
    }

    fn fetch(&self) -> BoxFuture<'_, Result<UsageSnapshot, FetchError>> {
        let config = self.config.clone();
        async move {
            let screen = tokio::task::spawn_blocking(move || capture_usage_screen(&config))
                .await
                .map_err(|e| FetchError::Command(format!("capture task failed: {}", e)))?
                .map_err(|e| FetchError::Command(format!("{:#}", e)))?;

            let meters = parse_usage_output(&screen);
            debug!("Parsed {} usage meters", meters.len());
            snapshot_from_meters(&meters, Local::now())
        }
        .boxed()
    }
}

/// Spawn the command in a PTY and return the rendered screen once the usage
/// overlay is visible.
///
/// 1. Opens a PTY sized like a normal terminal and starts the command
/// 2. Feeds output through a vt100 screen until "% used" shows up
/// 3. Confirms the folder-trust prompt if it appears
/// 4. Exits the program (Esc, Esc, q, Ctrl-C) and kills it if still alive
fn capture_usage_screen(config: &CommandSourceConfig) -> Result<String> {
    let pty_system = native_pty_system();
    let pair = pty_system
        .openpty(PtySize {
            rows: config.rows,
            cols: config.cols,
            pixel_width: 0,
            pixel_height: 0,
        })
        .context("Failed to open PTY")?;

    let mut cmd = CommandBuilder::new(&config.command);
    cmd.args(&config.args);
    // Home is trusted by Claude Code, which avoids the trust prompt
    if let Some(home) = dirs::home_dir() {
        cmd.cwd(home);
    }

    let mut child = pair
        .slave
        .spawn_command(cmd)
        .with_context(|| format!("Failed to spawn {}", config.command))?;
    drop(pair.slave);
    info!(
        "Usage fetch: spawned {} {} (pid {:?})",
        config.command,
        config.args.join(" "),
        child.process_id()
    );

    let mut reader = pair
        .master
        .try_clone_reader()
        .context("Failed to clone PTY reader")?;
    let mut writer = pair
        .master
        .take_writer()
        .context("Failed to take PTY writer")?;

    // Reader thread: PTY output -> channel
    let (tx, rx) = std_mpsc::channel::<Vec<u8>>();
    thread::spawn(move || {
        let mut buf = [0u8; 4096];
        loop {
            match reader.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => {
                    if tx.send(buf[..n].to_vec()).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    debug!("PTY read ended: {}", e);
                    break;
                }
            }
        }
    });

    let mut screen = vt100::Parser::new(config.rows, config.cols, 0);
    let start = Instant::now();
    let mut seen_at: Option<Instant> = None;
    let mut trust_confirmed = false;

    let wait_budget = config.wait_budget();
    while start.elapsed() < wait_budget {
        match rx.recv_timeout(POLL_INTERVAL) {
            Ok(chunk) => screen.process(&chunk),
            Err(std_mpsc::RecvTimeoutError::Timeout) => {}
            Err(std_mpsc::RecvTimeoutError::Disconnected) => break,
        }

        let contents = screen.screen().contents();
        if !trust_confirmed && contents.contains(TRUST_PROMPT) {
            debug!("Usage fetch: confirming trust prompt");
            let _ = writer.write_all(b"\r");
            let _ = writer.flush();
            trust_confirmed = true;
        }

        match seen_at {
            Some(t) if t.elapsed() >= config.settle => break,
            Some(_) => {}
            None if contents.contains(USAGE_MARKER) => {
                debug!(
                    "Usage fetch: overlay visible after {:.1}s",
                    start.elapsed().as_secs_f32()
                );
                seen_at = Some(Instant::now());
            }
            None => {}
        }
    }

    let contents = screen.screen().contents();

    for keys in EXIT_KEYS {
        if let Ok(Some(_)) = child.try_wait() {
            break;
        }
        let _ = writer.write_all(keys);
        let _ = writer.flush();
        thread::sleep(EXIT_KEY_DELAY);
    }
    match child.try_wait() {
        Ok(Some(status)) => debug!("Usage fetch: command exited with {:?}", status),
        _ => {
            match child.kill() {
                Ok(()) => {
                    let _ = child.wait();
                }
                Err(e) => warn!("Usage fetch: failed to kill command: {}", e),
            }
        }
    }

    if seen_at.is_none() {
        anyhow::bail!(
            "usage output did not appear within {:.1}s",
            wait_budget.as_secs_f32()
        );
    }
    Ok(contents)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CommandSourceConfig::default();
        assert_eq!(config.command, "claude");
        assert_eq!(config.args, vec!["/usage".to_string()]);
        assert_eq!((config.rows, config.cols), (40, 120));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_scrapes_usage_from_pty() {
        let source = CommandSource::new(CommandSourceConfig {
            command: "printf".to_string(),
            args: vec![
                "Current session\\n%s\\nResets 1am (UTC)\\n\\nCurrent week (all models)\\n%s\\n"
                    .to_string(),
                "######     40% used".to_string(),
                "##         12% used".to_string(),
            ],
            output_timeout: Duration::from_secs(10),
            settle: Duration::from_millis(200),
            ..Default::default()
        });

        let snapshot = source.fetch().await.unwrap();
        assert_eq!(snapshot.session.percent_used, 40.0);
        assert_eq!(snapshot.weekly.percent_used, 12.0);
        assert_eq!(snapshot.session.reset_info.as_deref(), Some("1am (UTC)"));
    }

    #[test]
    fn test_wait_leaves_room_for_exit() {
        let config = CommandSourceConfig {
            output_timeout: Duration::from_secs(5),
            ..Default::default()
        };
        assert_eq!(
            config.wait_budget() + CommandSourceConfig::exit_allowance(),
            Duration::from_secs(5)
        );

        let tiny = CommandSourceConfig {
            output_timeout: Duration::from_millis(100),
            ..Default::default()
        };
        assert_eq!(tiny.wait_budget(), Duration::ZERO);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_hung_command_stops_within_output_timeout() {
        let source = CommandSource::new(CommandSourceConfig {
            command: "sleep".to_string(),
            args: vec!["30".to_string()],
            output_timeout: Duration::from_millis(1500),
            ..Default::default()
        });

        let start = Instant::now();
        let result = source.fetch().await;
        assert!(matches!(result, Err(FetchError::Command(ref msg)) if msg.contains("did not appear")));
        assert!(start.elapsed() < Duration::from_millis(2000));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_missing_command_is_command_error() {
        let source = CommandSource::new(CommandSourceConfig {
            command: "definitely-not-a-real-binary-aibattery".to_string(),
            args: vec![],
            output_timeout: Duration::from_secs(2),
            ..Default::default()
        });
        assert!(matches!(source.fetch().await, Err(FetchError::Command(_))));
    }
}
