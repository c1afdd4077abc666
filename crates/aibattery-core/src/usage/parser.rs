//! Parse Claude Code `/usage` output captured from a terminal screen.

use chrono::{DateTime, Datelike, Duration, Local, NaiveDate, NaiveTime, TimeZone, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

use super::types::{UsageMetric, UsageSnapshot};
use crate::error::FetchError;

/// "Resets 1am" / "Resets 12:59pm"
static TIME_ONLY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^Resets\s+(\d{1,2})(?::(\d{2}))?\s*([ap]m)").expect("valid regex")
});

/// "Resets Jan 15, 6am" / "Resets Mar 1"
static DATED_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^Resets\s+(jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)[a-z]*\s+(\d{1,2}),?(?:\s*(\d{1,2})(?::(\d{2}))?\s*([ap]m))?",
    )
    .expect("valid regex")
});

/// A single usage meter block (e.g., "Current session")
#[derive(Debug, Clone, PartialEq)]
pub struct UsageMeter {
    /// Label (e.g., "Current session", "Current week (all models)")
    pub label: String,
    /// Percentage used (0-100)
    pub percent: u8,
    /// Reset info (e.g., "Resets 1am (Asia/Tokyo)")
    pub reset_info: Option<String>,
    /// Spending detail (e.g., "$22.22 / $50.00 spent")
    pub spending: Option<String>,
}

/// Parse `/usage` screen text into meters.
///
/// Expected format (each meter block):
/// ```text
///   Current session
///   ████████████████████████████████████               72% used
///   Resets 1am (Asia/Tokyo)
///
///   Current week (all models)
///   ███████████▌                                       23% used
///   Resets Mar 3, 12am (Asia/Tokyo)
/// ```
pub fn parse_usage_output(text: &str) -> Vec<UsageMeter> {
    let lines: Vec<&str> = text.lines().collect();
    let mut meters = Vec::new();

    for (i, raw) in lines.iter().enumerate() {
        let Some(percent) = extract_percent(raw.trim()) else {
            continue;
        };

        // The label sits on the line above the bar
        let label = match i.checked_sub(1) {
            Some(prev) => lines[prev].trim().to_string(),
            None => continue,
        };
        if label.is_empty() || label.starts_with("Settings:") {
            continue;
        }

        let mut reset_info = None;
        let mut spending = None;
        for next_line in lines[i + 1..].iter().map(|l| l.trim()) {
            if next_line.is_empty() {
                break;
            }
            if next_line.contains('·') && next_line.contains("Resets ") {
                // "$22.22 / $50.00 spent · Resets Mar 1 (Asia/Tokyo)"
                if let Some((spend, reset)) = next_line.split_once('·') {
                    spending = Some(spend.trim().to_string());
                    reset_info = Some(reset.trim().to_string());
                }
            } else if next_line.starts_with("Resets ") {
                reset_info = Some(next_line.to_string());
            } else if next_line.contains('$') && next_line.contains("spent") {
                spending = Some(next_line.to_string());
            }
        }

        meters.push(UsageMeter {
            label,
            percent,
            reset_info,
            spending,
        });
    }

    meters
}

/// Extract the percentage from a line containing "N% used"
fn extract_percent(line: &str) -> Option<u8> {
    let idx = line.find("% used")?;
    let before = &line[..idx];
    let digits_start = before
        .char_indices()
        .rev()
        .take_while(|(_, c)| c.is_ascii_digit())
        .last()
        .map(|(pos, _)| pos)?;
    before[digits_start..].parse::<u8>().ok()
}

/// Build a snapshot from parsed meters.
///
/// Reset strings are resolved against `now`. The Sonnet bucket inherits the
/// weekly reset when it shows none of its own.
pub fn snapshot_from_meters(
    meters: &[UsageMeter],
    now: DateTime<Local>,
) -> Result<UsageSnapshot, FetchError> {
    let mut session = None;
    let mut weekly = None;
    let mut secondary = None;

    for meter in meters {
        let metric = UsageMetric {
            percent_used: f64::from(meter.percent),
            reset_at: meter
                .reset_info
                .as_deref()
                .and_then(|info| parse_reset_time(info, now)),
            reset_info: meter.reset_info.as_deref().map(strip_resets_prefix),
        };

        let label = meter.label.to_lowercase();
        if label.contains("session") {
            session.get_or_insert(metric);
        } else if label.contains("all models") {
            weekly.get_or_insert(metric);
        } else if label.contains("sonnet") {
            secondary.get_or_insert(metric);
        } else {
            tracing::debug!("Ignoring usage meter {:?}", meter.label);
        }
    }

    if session.is_none() && weekly.is_none() {
        return Err(FetchError::NoMeters);
    }

    let weekly = weekly.unwrap_or_default();
    if let Some(ref mut secondary) = secondary {
        if secondary.reset_at.is_none() {
            secondary.reset_at = weekly.reset_at;
        }
    }

    Ok(UsageSnapshot {
        session: session.unwrap_or_default(),
        weekly,
        weekly_secondary: secondary,
    })
}

fn strip_resets_prefix(info: &str) -> String {
    info.strip_prefix("Resets ").unwrap_or(info).to_string()
}

/// Resolve a "Resets ..." string to an absolute time.
///
/// A bare time means its next occurrence (today or tomorrow). A month/day
/// means this year, or next year when that month has already passed.
pub fn parse_reset_time(reset_info: &str, now: DateTime<Local>) -> Option<DateTime<Utc>> {
    let reset_info = reset_info.trim();

    if let Some(caps) = DATED_RE.captures(reset_info) {
        let month = month_number(&caps[1])?;
        let day: u32 = caps[2].parse().ok()?;
        let time = match caps.get(3) {
            Some(hour) => clock_time(
                hour.as_str(),
                caps.get(4).map(|m| m.as_str()),
                caps.get(5).map(|m| m.as_str())?,
            )?,
            None => NaiveTime::MIN,
        };
        let year = if month >= now.month() {
            now.year()
        } else {
            now.year() + 1
        };
        let date = NaiveDate::from_ymd_opt(year, month, day)?;
        return to_utc(date.and_time(time));
    }

    if let Some(caps) = TIME_ONLY_RE.captures(reset_info) {
        let time = clock_time(&caps[1], caps.get(2).map(|m| m.as_str()), &caps[3])?;
        let mut reset = to_utc(now.date_naive().and_time(time))?;
        if reset <= now.with_timezone(&Utc) {
            reset = to_utc(now.date_naive().and_time(time) + Duration::days(1))?;
        }
        return Some(reset);
    }

    None
}

fn clock_time(hour: &str, minute: Option<&str>, ampm: &str) -> Option<NaiveTime> {
    let mut hour: u32 = hour.parse().ok()?;
    let minute: u32 = minute.map(str::parse::<u32>).transpose().ok()?.unwrap_or(0);
    if !(1..=12).contains(&hour) {
        return None;
    }
    let pm = ampm.eq_ignore_ascii_case("pm");
    if pm && hour != 12 {
        hour += 12;
    } else if !pm && hour == 12 {
        hour = 0;
    }
    NaiveTime::from_hms_opt(hour, minute, 0)
}

fn month_number(name: &str) -> Option<u32> {
    const MONTHS: [&str; 12] = [
        "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
    ];
    let name = name.to_lowercase();
    MONTHS
        .iter()
        .position(|m| name.starts_with(m))
        .map(|i| i as u32 + 1)
}

fn to_utc(naive: chrono::NaiveDateTime) -> Option<DateTime<Utc>> {
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
}
