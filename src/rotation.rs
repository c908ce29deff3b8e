//! Stateless, clock-driven source rotation.
//!
//! The UTC day is cut into windows of `interval_hours`, numbered from
//! midnight. Window `w` is served by source `w mod len(sources)`. Nothing is
//! persisted: any process that sees the same clock and the same
//! [`RotationConfig`] picks the same source, so concurrent or repeated
//! invocations agree without coordination.
//!
//! When `interval_hours` does not divide 24 the last window of the day is
//! cut short at midnight, because window numbering restarts from hour 0.
//! [`schedule`] reports those boundaries as computed and does not try to
//! even them out.

use crate::error::RotationError;
use chrono::{DateTime, Duration, NaiveTime, TimeZone, Timelike, Utc};
use serde::Serialize;
use std::collections::HashSet;

const MS_PER_HOUR: u64 = 3_600_000;

/// A named member of the rotation. Order in the list is rotation order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Source {
    name: String,
}

impl Source {
    /// Wrap a display name. Names are compared exactly; `"CNN"` and `"cnn"`
    /// are different sources.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// The name this source was configured with.
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Validated rotation parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RotationConfig {
    sources: Vec<Source>,
    interval_hours: u32,
}

impl RotationConfig {
    /// Build a config, rejecting an empty list, a zero interval, and
    /// duplicate source names.
    pub fn new(sources: Vec<Source>, interval_hours: u32) -> Result<Self, RotationError> {
        if sources.is_empty() {
            return Err(RotationError::NoSources);
        }
        if interval_hours == 0 {
            return Err(RotationError::ZeroInterval);
        }
        let mut seen = HashSet::new();
        for source in &sources {
            if !seen.insert(source.name()) {
                return Err(RotationError::DuplicateSource(source.name().to_string()));
            }
        }
        Ok(Self {
            sources,
            interval_hours,
        })
    }

    /// Convenience constructor from bare names.
    pub fn from_names<I, S>(names: I, interval_hours: u32) -> Result<Self, RotationError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(names.into_iter().map(Source::new).collect(), interval_hours)
    }

    /// Sources in rotation order. Never empty.
    pub fn sources(&self) -> &[Source] {
        &self.sources
    }

    /// Window width in hours. Never zero.
    pub fn interval_hours(&self) -> u32 {
        self.interval_hours
    }

    fn interval_ms(&self) -> u64 {
        u64::from(self.interval_hours) * MS_PER_HOUR
    }
}

/// One upcoming boundary and the source that takes over there.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScheduleEntry {
    /// UTC instant the window opens.
    pub starts_at: DateTime<Utc>,
    /// Name of the source active from `starts_at`.
    pub source: String,
}

/// Index of the window containing `now`, before reducing by source count.
fn window(now: DateTime<Utc>, config: &RotationConfig) -> u32 {
    now.hour() / config.interval_hours
}

/// Index into `config.sources()` of the source active at `now`.
pub fn current_index(now: DateTime<Utc>, config: &RotationConfig) -> usize {
    window(now, config) as usize % config.sources.len()
}

/// Index of the source that follows the current one.
pub fn next_index(now: DateTime<Utc>, config: &RotationConfig) -> usize {
    (current_index(now, config) + 1) % config.sources.len()
}

/// The source that owns the window containing `now`.
///
/// # Arguments
///
/// * `now` - Instant to evaluate. Only its UTC hour matters.
/// * `config` - Validated rotation
///
/// # Returns
///
/// A reference into `config.sources()`. Every instant in the same window
/// returns the same source.
///
/// # Examples
///
/// ```
/// use awful_news_tweets::RotationConfig;
/// use awful_news_tweets::rotation::current_source;
/// use chrono::{TimeZone, Utc};
///
/// let config = RotationConfig::from_names(["A", "B", "C"], 4).unwrap();
/// let now = Utc.with_ymd_and_hms(2025, 5, 6, 2, 0, 0).unwrap();
/// assert_eq!(current_source(now, &config).name(), "A");
/// ```
pub fn current_source(now: DateTime<Utc>, config: &RotationConfig) -> &Source {
    &config.sources[current_index(now, config)]
}

/// The source that takes over at the next boundary.
///
/// # Arguments
///
/// * `now` - Instant to evaluate
/// * `config` - Validated rotation
///
/// # Returns
///
/// The source after [`current_source`] in list order, wrapping to the first.
/// With a single source this is the current source again.
pub fn next_source(now: DateTime<Utc>, config: &RotationConfig) -> &Source {
    &config.sources[next_index(now, config)]
}

/// Milliseconds from `now` until the next window boundary.
///
/// Always in `[0, interval_hours * 3_600_000)`. Exactly on a boundary the
/// answer is `0`: the rotation is happening now.
pub fn ms_until_next_rotation(now: DateTime<Utc>, config: &RotationConfig) -> u64 {
    let hour = now.hour();
    let next_boundary = (window(now, config) + 1) * config.interval_hours;

    let hours_until = if next_boundary >= 24 {
        // Rolls into the next UTC day.
        (24 - hour) + (next_boundary - 24)
    } else {
        next_boundary - hour
    };

    // Leap-second instants report nanos >= 1e9.
    let millis = (now.nanosecond() / 1_000_000).min(999);
    let elapsed_in_hour =
        u64::from(now.minute()) * 60_000 + u64::from(now.second()) * 1_000 + u64::from(millis);

    (u64::from(hours_until) * MS_PER_HOUR - elapsed_in_hour) % config.interval_ms()
}

/// Boundaries for the next 24 hours, starting at the boundary that opened
/// the current window.
///
/// Yields `ceil(24 / interval_hours)` entries. Hours wrap at 24 and the
/// date rolls forward once the wrapped hour drops below the start hour.
pub fn schedule(now: DateTime<Utc>, config: &RotationConfig) -> Vec<ScheduleEntry> {
    let start_hour = window(now, config) * config.interval_hours;
    let count = 24u32.div_ceil(config.interval_hours);
    let midnight = Utc.from_utc_datetime(&now.date_naive().and_time(NaiveTime::MIN));

    (0..count)
        .map(|i| {
            let hour = (start_hour + i * config.interval_hours) % 24;
            let day = if hour < start_hour {
                Duration::days(1)
            } else {
                Duration::zero()
            };
            let starts_at = midnight + day + Duration::hours(i64::from(hour));
            ScheduleEntry {
                starts_at,
                source: current_source(starts_at, config).name().to_string(),
            }
        })
        .collect()
}
