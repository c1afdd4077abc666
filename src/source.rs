//! Build the usage source selected by the settings.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use aibattery_core::refresh::Refresher;
use aibattery_core::usage::{
    apply_fallback, CommandSource, CommandSourceConfig, FileSource, MockSource, SharedSource,
    UsageSource,
};

use crate::config::{SourceKind, SourceSettings};

/// Usage file used when neither the settings nor the platform provide one
const LOCAL_USAGE_FILE: &str = "usage-data.json";
/// Headroom between the end of a PTY capture and the fetch timeout
const CAPTURE_MARGIN: Duration = Duration::from_millis(300);

/// Resolve the usage file path
pub fn usage_file_path(settings: &SourceSettings) -> PathBuf {
    settings
        .file
        .clone()
        .or_else(FileSource::default_path)
        .unwrap_or_else(|| PathBuf::from(LOCAL_USAGE_FILE))
}

/// Create the configured source, wrapped in the fallback policy
pub fn build_source(settings: &SourceSettings) -> SharedSource {
    let source: SharedSource = match settings.kind {
        SourceKind::Mock => Arc::new(MockSource),
        SourceKind::File => Arc::new(FileSource::new(usage_file_path(settings))),
        SourceKind::Command => Arc::new(CommandSource::new(CommandSourceConfig {
            command: settings.command.clone(),
            args: settings.args.clone(),
            output_timeout: capture_timeout(settings),
            ..Default::default()
        })),
    };
    tracing::debug!("Using '{}' usage source", source.name());
    apply_fallback(source, settings.fallback)
}

/// Budget for the PTY capture. It ends before the fetch timeout so the
/// command's own error is reported and no capture outlives its fetch.
fn capture_timeout(settings: &SourceSettings) -> Duration {
    Duration::from_secs(settings.timeout_secs).saturating_sub(CAPTURE_MARGIN)
}

/// Refresher over the configured source
pub fn build_refresher(settings: &SourceSettings, interval_secs: u64) -> Refresher {
    Refresher::new(build_source(settings), Duration::from_secs(interval_secs))
        .with_timeout(Duration::from_secs(settings.timeout_secs))
}
