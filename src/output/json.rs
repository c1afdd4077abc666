use anyhow::Result;
use serde::Serialize;

use aibattery_core::usage::types::percent;
use aibattery_core::usage::{UsageMetric, UsageSnapshot};

/// A metric with its remaining percentage prepended
#[derive(Debug, Serialize)]
pub struct JsonMetric<'a> {
    #[serde(serialize_with = "percent::serialize")]
    pub remaining: f64,
    #[serde(flatten)]
    pub metric: &'a UsageMetric,
}

impl<'a> JsonMetric<'a> {
    fn new(metric: &'a UsageMetric) -> Self {
        Self {
            remaining: metric.battery().percent_remaining,
            metric,
        }
    }
}

/// JSON document printed by `--json`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonReport<'a> {
    pub session: JsonMetric<'a>,
    pub weekly: JsonMetric<'a>,
    /// `null` when the secondary bucket is absent
    pub weekly_sonnet: Option<JsonMetric<'a>>,
}

/// Build the report for a snapshot
pub fn json_report(snapshot: &UsageSnapshot) -> JsonReport<'_> {
    JsonReport {
        session: JsonMetric::new(&snapshot.session),
        weekly: JsonMetric::new(&snapshot.weekly),
        weekly_sonnet: snapshot.weekly_secondary.as_ref().map(JsonMetric::new),
    }
}

/// Pretty-printed JSON for a snapshot
pub fn render_json(snapshot: &UsageSnapshot) -> Result<String> {
    Ok(serde_json::to_string_pretty(&json_report(snapshot))?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;
    use serde_json::Value;

    #[test]
    fn test_remaining_alongside_original_fields() {
        let snapshot = UsageSnapshot {
            session: UsageMetric {
                percent_used: 15.0,
                reset_at: Some(Utc.with_ymd_and_hms(2026, 1, 11, 7, 0, 0).unwrap()),
                reset_info: Some("1am (America/Chicago)".to_string()),
            },
            weekly: UsageMetric::used(11.0),
            weekly_secondary: None,
        };

        let value: Value = serde_json::from_str(&render_json(&snapshot).unwrap()).unwrap();
        assert_eq!(value["session"]["remaining"].as_f64(), Some(85.0));
        assert_eq!(value["session"]["percentUsed"].as_f64(), Some(15.0));
        assert_eq!(value["session"]["resetAt"], "2026-01-11T07:00:00Z");
        assert_eq!(value["session"]["resetInfo"], "1am (America/Chicago)");
        assert_eq!(value["weekly"]["remaining"].as_f64(), Some(89.0));
        assert_eq!(value["weekly"]["percentUsed"].as_f64(), Some(11.0));
        assert!(value["weeklySonnet"].is_null());
    }

    #[test]
    fn test_secondary_present() {
        let snapshot = UsageSnapshot {
            session: UsageMetric::used(97.0),
            weekly: UsageMetric::used(40.0),
            weekly_secondary: Some(UsageMetric::used(20.0)),
        };
        let value = serde_json::to_value(json_report(&snapshot)).unwrap();
        assert_eq!(value["session"]["remaining"].as_f64(), Some(3.0));
        assert_eq!(value["weeklySonnet"]["remaining"].as_f64(), Some(80.0));
        assert_eq!(value["weeklySonnet"]["percentUsed"].as_f64(), Some(20.0));
    }

    #[test]
    fn test_whole_numbers_print_as_integers() {
        let snapshot = UsageSnapshot {
            session: UsageMetric::used(15.0),
            weekly: UsageMetric::used(12.5),
            weekly_secondary: None,
        };
        let value = serde_json::to_value(json_report(&snapshot)).unwrap();
        assert_eq!(value["session"]["remaining"], serde_json::json!(85));
        assert_eq!(value["session"]["percentUsed"], serde_json::json!(15));
        assert_eq!(value["weekly"]["remaining"], serde_json::json!(87.5));
        assert_eq!(value["weekly"]["percentUsed"], serde_json::json!(12.5));

        let text = render_json(&snapshot).unwrap();
        assert!(text.contains("\"remaining\": 85,"));
        assert!(!text.contains("85.0"));
    }

    #[test]
    fn test_remaining_listed_first() {
        let snapshot = UsageSnapshot::default();
        let text = render_json(&snapshot).unwrap();
        let session = text.find("\"session\"").unwrap();
        let remaining = text[session..].find("\"remaining\"").unwrap();
        let used = text[session..].find("\"percentUsed\"").unwrap();
        assert!(remaining < used);
    }
}
