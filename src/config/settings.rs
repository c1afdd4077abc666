use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use aibattery_core::usage::FallbackMode;

/// Command line arguments
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    disable_version_flag = true,
    about = "Battery-style indicator for Claude usage",
    long_about = "Battery-style indicator for Claude usage.\n\n\
        Shows remaining capacity with color-coded alerts:\n  \
        Green  = >20% remaining\n  \
        Yellow = <=20% remaining\n  \
        Red    = <5% remaining"
)]
pub struct Config {
    /// Simple output (no interactive UI)
    #[arg(short, long)]
    pub simple: bool,

    /// JSON output
    #[arg(short, long)]
    pub json: bool,

    /// Print version
    #[arg(short = 'v', long, action = clap::ArgAction::Version)]
    pub version: (),

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub debug: bool,

    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Where usage data comes from
    #[arg(long, value_enum, global = true)]
    pub source: Option<SourceKind>,

    /// Usage file to read (file source)
    #[arg(long, global = true)]
    pub file: Option<PathBuf>,

    /// What to show when fetching fails
    #[arg(long, value_enum, global = true)]
    pub fallback: Option<FallbackMode>,

    /// Refresh interval in seconds
    #[arg(short = 'i', long, global = true)]
    pub interval: Option<u64>,

    /// Subcommand
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Run the menu-bar tray surface
    Tray {
        /// Write the rendered tray icon (PNG) here on every refresh
        #[arg(long)]
        icon: Option<PathBuf>,
    },
}

/// Presentation surface for this invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Interactive terminal UI
    Interactive,
    /// One-shot plain text
    Simple,
    /// One-shot JSON document
    Json,
    /// Tray menu
    Tray,
}

impl Config {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Pick the surface. JSON wins over simple; non-interactive terminals
    /// fall back to simple output.
    pub fn output_mode(&self, interactive_terminal: bool) -> OutputMode {
        if matches!(self.command, Some(Command::Tray { .. })) {
            OutputMode::Tray
        } else if self.json {
            OutputMode::Json
        } else if self.simple || !interactive_terminal {
            OutputMode::Simple
        } else {
            OutputMode::Interactive
        }
    }
}

/// Usage source kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Fixed demo values
    Mock,
    /// Persisted usage file
    #[default]
    File,
    /// Run `claude /usage` and read its output
    Command,
}

/// Application settings (from config file)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// Usage source settings
    #[serde(default)]
    pub source: SourceSettings,

    /// Interactive terminal settings
    #[serde(default)]
    pub ui: UiSettings,

    /// Simple output settings
    #[serde(default)]
    pub simple: SimpleSettings,

    /// Tray settings
    #[serde(default)]
    pub tray: TraySettings,
}

/// Usage source settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceSettings {
    /// Which source to use
    #[serde(default)]
    pub kind: SourceKind,

    /// Usage file path (defaults to `<config_dir>/aibattery/usage-data.json`)
    #[serde(default)]
    pub file: Option<PathBuf>,

    /// Command run by the command source
    #[serde(default = "default_command")]
    pub command: String,

    /// Arguments for the command source
    #[serde(default = "default_command_args")]
    pub args: Vec<String>,

    /// Behavior when a fetch fails
    #[serde(default)]
    pub fallback: FallbackMode,

    /// Upper bound on a single fetch in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_command() -> String {
    "claude".to_string()
}

fn default_command_args() -> Vec<String> {
    vec!["/usage".to_string()]
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self {
            kind: SourceKind::default(),
            file: None,
            command: default_command(),
            args: default_command_args(),
            fallback: FallbackMode::default(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Interactive terminal settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiSettings {
    /// Auto-refresh interval in seconds
    #[serde(default = "default_ui_refresh")]
    pub refresh_interval_secs: u64,

    /// Bar width in cells
    #[serde(default = "default_ui_bar_width")]
    pub bar_width: usize,
}

fn default_ui_refresh() -> u64 {
    60
}

fn default_ui_bar_width() -> usize {
    30
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            refresh_interval_secs: default_ui_refresh(),
            bar_width: default_ui_bar_width(),
        }
    }
}

/// Simple output settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimpleSettings {
    /// Bar width in cells
    #[serde(default = "default_simple_bar_width")]
    pub bar_width: usize,
}

fn default_simple_bar_width() -> usize {
    20
}

impl Default for SimpleSettings {
    fn default() -> Self {
        Self {
            bar_width: default_simple_bar_width(),
        }
    }
}

/// Tray settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraySettings {
    /// Refresh interval in seconds
    #[serde(default = "default_tray_refresh")]
    pub refresh_interval_secs: u64,

    /// Bar width in cells
    #[serde(default = "default_tray_bar_width")]
    pub bar_width: usize,

    /// Where to write the rendered icon
    #[serde(default)]
    pub icon_path: Option<PathBuf>,
}

fn default_tray_refresh() -> u64 {
    300
}

fn default_tray_bar_width() -> usize {
    15
}

impl Default for TraySettings {
    fn default() -> Self {
        Self {
            refresh_interval_secs: default_tray_refresh(),
            bar_width: default_tray_bar_width(),
            icon_path: None,
        }
    }
}

impl Settings {
    /// Load settings from config file or use defaults
    pub fn load(path: Option<&PathBuf>) -> Result<Self> {
        // Try custom path first
        if let Some(p) = path {
            if p.exists() {
                return Self::load_file(p);
            }
            tracing::warn!("Config file {:?} not found, using defaults", p);
        }

        // Try default config locations
        let default_paths = [
            dirs::config_dir().map(|p| p.join("aibattery/config.toml")),
            dirs::home_dir().map(|p| p.join(".config/aibattery/config.toml")),
            dirs::home_dir().map(|p| p.join(".aibattery.toml")),
        ];

        for path in default_paths.iter().flatten() {
            if path.exists() {
                return Self::load_file(path);
            }
        }

        // Return defaults if no config file found
        Ok(Self::default())
    }

    fn load_file(path: &PathBuf) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
    }

    /// Merge CLI config into settings (CLI takes precedence)
    pub fn merge_cli(&mut self, cli: &Config) {
        if let Some(kind) = cli.source {
            self.source.kind = kind;
        }
        if let Some(ref file) = cli.file {
            self.source.file = Some(file.clone());
        }
        if let Some(fallback) = cli.fallback {
            self.source.fallback = fallback;
        }
        if let Some(interval) = cli.interval {
            self.ui.refresh_interval_secs = interval;
            self.tray.refresh_interval_secs = interval;
        }
        if let Some(Command::Tray { icon: Some(ref icon) }) = cli.command {
            self.tray.icon_path = Some(icon.clone());
        }
    }

    /// Validate and normalize settings values
    pub fn validate(&mut self) {
        const MIN_INTERVAL_SECS: u64 = 1;
        const MIN_TIMEOUT_SECS: u64 = 1;
        const MAX_BAR_WIDTH: usize = 200;

        self.ui.refresh_interval_secs = self.ui.refresh_interval_secs.max(MIN_INTERVAL_SECS);
        self.tray.refresh_interval_secs = self.tray.refresh_interval_secs.max(MIN_INTERVAL_SECS);
        self.source.timeout_secs = self.source.timeout_secs.max(MIN_TIMEOUT_SECS);

        self.ui.bar_width = self.ui.bar_width.min(MAX_BAR_WIDTH);
        self.simple.bar_width = self.simple.bar_width.min(MAX_BAR_WIDTH);
        self.tray.bar_width = self.tray.bar_width.min(MAX_BAR_WIDTH);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn cli(args: &[&str]) -> Config {
        Config::try_parse_from(std::iter::once("aibattery").chain(args.iter().copied()))
            .expect("valid args")
    }

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.source.kind, SourceKind::File);
        assert_eq!(settings.source.fallback, FallbackMode::Fail);
        assert_eq!(settings.source.timeout_secs, 30);
        assert_eq!(settings.ui.refresh_interval_secs, 60);
        assert_eq!(settings.ui.bar_width, 30);
        assert_eq!(settings.simple.bar_width, 20);
        assert_eq!(settings.tray.refresh_interval_secs, 300);
        assert_eq!(settings.tray.bar_width, 15);
    }

    #[test]
    fn test_parse_toml() {
        let toml = r#"
            [source]
            kind = "command"
            fallback = "demo"
            timeout_secs = 45

            [ui]
            refresh_interval_secs = 30

            [tray]
            bar_width = 10
        "#;

        let settings: Settings = toml::from_str(toml).expect("Should parse TOML");
        assert_eq!(settings.source.kind, SourceKind::Command);
        assert_eq!(settings.source.fallback, FallbackMode::Demo);
        assert_eq!(settings.source.timeout_secs, 45);
        assert_eq!(settings.source.command, "claude");
        assert_eq!(settings.ui.refresh_interval_secs, 30);
        assert_eq!(settings.ui.bar_width, 30);
        assert_eq!(settings.tray.bar_width, 10);
    }

    #[test]
    fn test_load_from_custom_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[simple]\nbar_width = 12\n").unwrap();

        let settings = Settings::load(Some(&path)).unwrap();
        assert_eq!(settings.simple.bar_width, 12);
    }

    #[test]
    fn test_load_rejects_bad_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[ui\n").unwrap();
        assert!(Settings::load(Some(&path)).is_err());
    }

    #[test]
    fn test_merge_cli() {
        let mut settings = Settings::default();
        settings.merge_cli(&cli(&[
            "--source",
            "mock",
            "--fallback",
            "demo",
            "--interval",
            "5",
            "tray",
            "--icon",
            "/tmp/icon.png",
        ]));
        assert_eq!(settings.source.kind, SourceKind::Mock);
        assert_eq!(settings.source.fallback, FallbackMode::Demo);
        assert_eq!(settings.ui.refresh_interval_secs, 5);
        assert_eq!(settings.tray.refresh_interval_secs, 5);
        assert_eq!(settings.tray.icon_path, Some(PathBuf::from("/tmp/icon.png")));
    }

    #[test]
    fn test_validate_clamps() {
        let mut settings = Settings::default();
        settings.ui.refresh_interval_secs = 0;
        settings.source.timeout_secs = 0;
        settings.simple.bar_width = 10_000;
        settings.validate();
        assert_eq!(settings.ui.refresh_interval_secs, 1);
        assert_eq!(settings.source.timeout_secs, 1);
        assert_eq!(settings.simple.bar_width, 200);
    }

    #[test]
    fn test_output_mode() {
        assert_eq!(cli(&[]).output_mode(true), OutputMode::Interactive);
        assert_eq!(cli(&[]).output_mode(false), OutputMode::Simple);
        assert_eq!(cli(&["-s"]).output_mode(true), OutputMode::Simple);
        assert_eq!(cli(&["--json"]).output_mode(false), OutputMode::Json);
        assert_eq!(cli(&["-j", "-s"]).output_mode(true), OutputMode::Json);
        assert_eq!(cli(&["tray"]).output_mode(false), OutputMode::Tray);
    }

    #[test]
    fn test_version_flag() {
        for flag in ["-v", "--version"] {
            let err = Config::try_parse_from(["aibattery", flag]).unwrap_err();
            assert_eq!(err.kind(), clap::error::ErrorKind::DisplayVersion);
        }
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_load_from_xdg_config_dir() {
        let dir = tempfile::tempdir().unwrap();
        let config_dir = dir.path().join("aibattery");
        std::fs::create_dir_all(&config_dir).unwrap();
        std::fs::write(
            config_dir.join("config.toml"),
            "[ui]\nbar_width = 12\n\n[source]\nkind = \"mock\"\n",
        )
        .unwrap();

        temp_env::with_var("XDG_CONFIG_HOME", Some(dir.path()), || {
            let settings = Settings::load(None).unwrap();
            assert_eq!(settings.ui.bar_width, 12);
            assert_eq!(settings.source.kind, SourceKind::Mock);
        });
    }
}
