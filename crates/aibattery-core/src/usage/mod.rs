//! Usage data: the snapshot model, `/usage` parsing and the sources that
//! produce snapshots.

pub mod command;
pub mod parser;
pub mod source;
pub mod types;

pub use command::{CommandSource, CommandSourceConfig};
pub use parser::{parse_reset_time, parse_usage_output, snapshot_from_meters, UsageMeter};
pub use source::{
    apply_fallback, FallbackMode, FallbackSource, FileSource, MockSource, SharedSource,
    UsageSource,
};
pub use types::{MetricKind, UsageFile, UsageMetric, UsageSnapshot};
