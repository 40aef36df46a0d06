//! Date parsing, formatting and frequency helpers

use crate::error::{ForecastError, Result};
use chrono::{Duration, Months, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use std::collections::HashMap;
use std::fmt;

const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
];

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%Y%m%d"];

/// Parse a date or timestamp cell
pub fn parse_timestamp(raw: &str) -> Result<NaiveDateTime> {
    let raw = raw.trim();

    for format in DATETIME_FORMATS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(ts);
        }
    }
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(raw, format) {
            return Ok(date.and_time(NaiveTime::MIN));
        }
    }

    Err(ForecastError::DataError(format!(
        "Cannot parse '{}' as a date",
        raw
    )))
}

/// Format a date column, dropping the time part when every entry is at midnight
pub fn format_timestamps(timestamps: &[NaiveDateTime]) -> Vec<String> {
    let date_only = timestamps.iter().all(is_midnight);
    let format = if date_only { "%Y-%m-%d" } else { "%Y-%m-%d %H:%M:%S" };

    timestamps
        .iter()
        .map(|ts| ts.format(format).to_string())
        .collect()
}

/// Sorted, de-duplicated copy of a date sequence
pub fn unique_sorted(timestamps: &[NaiveDateTime]) -> Vec<NaiveDateTime> {
    let mut dates = timestamps.to_vec();
    dates.sort_unstable();
    dates.dedup();
    dates
}

/// Spacing between consecutive observations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frequency {
    /// Fixed-length step (days, hours, minutes, weeks)
    Fixed(Duration),
    /// Calendar step of whole months
    Months(u32),
}

impl Frequency {
    pub fn daily() -> Self {
        Frequency::Fixed(Duration::days(1))
    }

    /// Timestamp `steps` periods after `start`
    pub fn advance(&self, start: NaiveDateTime, steps: usize) -> Result<NaiveDateTime> {
        let overflow = || {
            ForecastError::ValidationError(format!(
                "Date overflow stepping {} periods of {} from {}",
                steps, self, start
            ))
        };

        match *self {
            Frequency::Fixed(step) => {
                let steps = i32::try_from(steps).map_err(|_| overflow())?;
                let offset = step.checked_mul(steps).ok_or_else(overflow)?;
                start.checked_add_signed(offset).ok_or_else(overflow)
            }
            Frequency::Months(months) => {
                let total = u32::try_from(steps)
                    .ok()
                    .and_then(|s| s.checked_mul(months))
                    .ok_or_else(overflow)?;
                start.checked_add_months(Months::new(total)).ok_or_else(overflow)
            }
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Frequency::Fixed(step) if step.num_seconds() % 86_400 == 0 => {
                write!(f, "{} day(s)", step.num_days())
            }
            Frequency::Fixed(step) if step.num_seconds() % 60 == 0 => {
                write!(f, "{} minute(s)", step.num_minutes())
            }
            Frequency::Fixed(step) => write!(f, "{} second(s)", step.num_seconds()),
            Frequency::Months(months) => write!(f, "{} month(s)", months),
        }
    }
}

/// Infer the native spacing of a date sequence.
///
/// Uses the most common gap between consecutive unique dates. Month-like,
/// quarter-like and year-like gaps become calendar steps so that future
/// dates stay on the same day of the month. Fewer than two dates default to
/// daily.
pub fn infer_frequency(timestamps: &[NaiveDateTime]) -> Result<Frequency> {
    let dates = unique_sorted(timestamps);
    if dates.len() < 2 {
        return Ok(Frequency::daily());
    }

    let gaps: Vec<Duration> = dates.windows(2).map(|w| w[1] - w[0]).collect();

    let all_calendar_days = gaps
        .iter()
        .all(|gap| gap.num_seconds() % 86_400 == 0);
    if all_calendar_days {
        let days: Vec<i64> = gaps.iter().map(|gap| gap.num_days()).collect();
        let within = |lo: i64, hi: i64| days.iter().all(|d| (lo..=hi).contains(d));

        if within(28, 31) {
            return Ok(Frequency::Months(1));
        }
        if within(89, 92) {
            return Ok(Frequency::Months(3));
        }
        if within(365, 366) {
            return Ok(Frequency::Months(12));
        }
    }

    // Most common gap; ties go to the smaller step.
    let mut counts: HashMap<Duration, usize> = HashMap::new();
    for gap in &gaps {
        *counts.entry(*gap).or_insert(0) += 1;
    }
    let (step, _) = counts
        .into_iter()
        .max_by(|(gap_a, count_a), (gap_b, count_b)| {
            count_a.cmp(count_b).then_with(|| gap_b.cmp(gap_a))
        })
        .ok_or_else(|| ForecastError::DataError("No date gaps to infer from".to_string()))?;

    Ok(Frequency::Fixed(step))
}

/// `periods` timestamps strictly after `last`, one frequency step apart
pub fn future_dates(last: NaiveDateTime, periods: usize, frequency: Frequency) -> Result<Vec<NaiveDateTime>> {
    (1..=periods)
        .map(|step| frequency.advance(last, step))
        .collect()
}

/// True when the timestamp carries no time-of-day
pub fn is_midnight(ts: &NaiveDateTime) -> bool {
    ts.num_seconds_from_midnight() == 0 && ts.nanosecond() == 0
}
