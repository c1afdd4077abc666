//! Usage data model shared by every source and surface.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::battery::BatteryState;

/// Consumption of one quota bucket
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageMetric {
    /// Percentage used (0-100)
    #[serde(default, serialize_with = "percent::serialize")]
    pub percent_used: f64,
    /// When the bucket resets
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "timestamp::option"
    )]
    pub reset_at: Option<DateTime<Utc>>,
    /// Free-text reset description (e.g., "1am (America/Chicago)")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reset_info: Option<String>,
}

impl UsageMetric {
    /// Metric with only a percent-used value
    pub fn used(percent_used: f64) -> Self {
        Self {
            percent_used,
            ..Default::default()
        }
    }

    /// Derived battery state
    pub fn battery(&self) -> BatteryState {
        BatteryState::from_percent_used(self.percent_used)
    }
}

/// Which bucket a metric belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    Session,
    Weekly,
    WeeklySecondary,
}

impl MetricKind {
    /// Display label
    pub fn label(&self) -> &'static str {
        match self {
            MetricKind::Session => "Session",
            MetricKind::Weekly => "Weekly",
            MetricKind::WeeklySecondary => "Sonnet",
        }
    }

    /// JSON key
    pub fn key(&self) -> &'static str {
        match self {
            MetricKind::Session => "session",
            MetricKind::Weekly => "weekly",
            MetricKind::WeeklySecondary => "weeklySonnet",
        }
    }
}

/// One fetch's worth of usage data
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageSnapshot {
    #[serde(default)]
    pub session: UsageMetric,
    #[serde(default)]
    pub weekly: UsageMetric,
    /// Secondary weekly bucket (Sonnet-only quota)
    #[serde(default, rename = "weeklySonnet", alias = "weeklySecondary")]
    pub weekly_secondary: Option<UsageMetric>,
}

impl UsageSnapshot {
    /// Present metrics in display order
    pub fn metrics(&self) -> Vec<(MetricKind, &UsageMetric)> {
        let mut metrics = vec![
            (MetricKind::Session, &self.session),
            (MetricKind::Weekly, &self.weekly),
        ];
        if let Some(ref secondary) = self.weekly_secondary {
            metrics.push((MetricKind::WeeklySecondary, secondary));
        }
        metrics
    }

    /// Lowest remaining percentage of the session and weekly buckets
    pub fn lowest_remaining(&self) -> f64 {
        self.session
            .battery()
            .percent_remaining
            .min(self.weekly.battery().percent_remaining)
    }
}

/// Persisted usage file: `{ lastUpdated, claude }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageFile {
    #[serde(default, with = "timestamp::option")]
    pub last_updated: Option<DateTime<Utc>>,
    pub claude: UsageSnapshot,
}

/// Percentages written as integers when they are whole (`15`, not `15.0`)
pub mod percent {
    use serde::Serializer;

    pub fn serialize<S>(value: &f64, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if value.is_finite() && value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
            serializer.serialize_i64(*value as i64)
        } else {
            serializer.serialize_f64(*value)
        }
    }
}

/// Timestamp (de)serialization accepting RFC 3339 or naive local ISO-8601
pub mod timestamp {
    use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};

    /// Parse an RFC 3339 timestamp, or a naive one interpreted as local time
    pub fn parse(value: &str) -> Option<DateTime<Utc>> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
            return Some(dt.with_timezone(&Utc));
        }
        let naive = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f").ok()?;
        Local
            .from_local_datetime(&naive)
            .earliest()
            .map(|dt| dt.with_timezone(&Utc))
    }

    pub mod option {
        use chrono::{DateTime, SecondsFormat, Utc};
        use serde::{de, Deserialize, Deserializer, Serializer};

        pub fn serialize<S>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            match value {
                Some(dt) => {
                    serializer.serialize_str(&dt.to_rfc3339_opts(SecondsFormat::Secs, true))
                }
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
        where
            D: Deserializer<'de>,
        {
            let raw: Option<String> = Option::deserialize(deserializer)?;
            match raw {
                None => Ok(None),
                Some(s) if s.is_empty() => Ok(None),
                Some(s) => super::parse(&s)
                    .map(Some)
                    .ok_or_else(|| de::Error::custom(format!("invalid timestamp: {}", s))),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_deserialize_usage_file() {
        let json = r#"{
            "lastUpdated": "2026-01-10T12:00:00Z",
            "claude": {
                "session": {"percentUsed": 91, "resetAt": "2026-01-11T01:00:00+00:00"},
                "weekly": {"percentUsed": 40},
                "weeklySonnet": {"percentUsed": 5}
            }
        }"#;
        let file: UsageFile = serde_json::from_str(json).unwrap();
        assert_eq!(
            file.last_updated,
            Some(Utc.with_ymd_and_hms(2026, 1, 10, 12, 0, 0).unwrap())
        );
        assert_eq!(file.claude.session.percent_used, 91.0);
        assert_eq!(
            file.claude.session.reset_at,
            Some(Utc.with_ymd_and_hms(2026, 1, 11, 1, 0, 0).unwrap())
        );
        assert_eq!(file.claude.weekly.reset_at, None);
        assert_eq!(
            file.claude.weekly_secondary.map(|m| m.percent_used),
            Some(5.0)
        );
    }

    #[test]
    fn test_whole_percentages_serialize_as_integers() {
        let metric = UsageMetric::used(15.0);
        assert_eq!(
            serde_json::to_string(&metric).unwrap(),
            r#"{"percentUsed":15}"#
        );

        let metric = UsageMetric::used(12.5);
        assert_eq!(
            serde_json::to_string(&metric).unwrap(),
            r#"{"percentUsed":12.5}"#
        );
    }

    #[test]
    fn test_missing_fields_default() {
        let snapshot: UsageSnapshot =
            serde_json::from_str(r#"{"session": {}, "weeklySecondary": {"percentUsed": 3}}"#)
                .unwrap();
        assert_eq!(snapshot.session.percent_used, 0.0);
        assert_eq!(snapshot.weekly, UsageMetric::default());
        assert_eq!(snapshot.weekly_secondary, Some(UsageMetric::used(3.0)));
    }

    #[test]
    fn test_naive_timestamp_is_local() {
        let parsed = timestamp::parse("2026-01-15T06:00:00").unwrap();
        let expected = chrono::Local
            .with_ymd_and_hms(2026, 1, 15, 6, 0, 0)
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(parsed, expected);
        assert!(timestamp::parse("2026-01-15T06:00:00.123456").is_some());
        assert!(timestamp::parse("tomorrow").is_none());
    }

    #[test]
    fn test_metrics_order_and_lowest() {
        let snapshot = UsageSnapshot {
            session: UsageMetric::used(30.0),
            weekly: UsageMetric::used(60.0),
            weekly_secondary: Some(UsageMetric::used(99.0)),
        };
        let kinds: Vec<_> = snapshot.metrics().iter().map(|(k, _)| *k).collect();
        assert_eq!(
            kinds,
            vec![
                MetricKind::Session,
                MetricKind::Weekly,
                MetricKind::WeeklySecondary
            ]
        );
        // Secondary bucket does not count toward the lowest
        assert_eq!(snapshot.lowest_remaining(), 40.0);
    }

    #[test]
    fn test_serialize_skips_absent_reset() {
        let value = serde_json::to_value(UsageMetric::used(15.0)).unwrap();
        assert_eq!(value, serde_json::json!({"percentUsed": 15.0}));
    }
}
