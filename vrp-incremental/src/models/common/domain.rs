#[cfg(test)]
#[path = "../../../tests/unit/models/common/domain_test.rs"]
mod domain_test;

use crate::utils::{Float, GenericResult};

/// Represents a time in seconds relative to the model epoch.
pub type Timestamp = Float;

/// Specifies a duration in seconds.
pub type Duration = Float;

/// Specifies a distance in meters.
pub type Distance = Float;

/// A length of one minute in seconds.
pub const MINUTE: Duration = 60.;

/// A length of one day in seconds.
pub const DAY: Duration = 24. * 3600.;

/// Returns true if timestamp lies exactly on a minute boundary.
pub fn is_minute_aligned(time: Timestamp) -> bool {
    time.is_finite() && (time % MINUTE).abs() < Float::EPSILON
}

/// Represents a half open time window `[start, end)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TimeWindow {
    /// Start of time window.
    pub start: Timestamp,
    /// End of time window.
    pub end: Timestamp,
}

impl TimeWindow {
    /// Creates a new [`TimeWindow`].
    pub fn new(start: Timestamp, end: Timestamp) -> Self {
        Self { start, end }
    }

    /// Checks whether time is inside time window.
    pub fn contains(&self, time: Timestamp) -> bool {
        time >= self.start && time < self.end
    }

    /// Checks whether time window has intersection with another one.
    pub fn intersects(&self, other: &Self) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// Validates a set of time windows: each window has to be minute aligned with start not after end,
/// and windows must not overlap. Returns windows sorted by start.
pub fn validate_time_windows(windows: Vec<TimeWindow>) -> GenericResult<Vec<TimeWindow>> {
    let mut windows = windows;

    if let Some(window) = windows.iter().find(|w| w.start > w.end) {
        return Err(format!("time window start {} is after end {}", window.start, window.end).into());
    }

    if let Some(window) = windows.iter().find(|w| !is_minute_aligned(w.start) || !is_minute_aligned(w.end)) {
        return Err(format!("time window [{}, {}) is not on minute boundaries", window.start, window.end).into());
    }

    windows.sort_by(|a, b| a.start.total_cmp(&b.start));

    if let Some(pair) = windows.windows(2).find(|pair| pair[0].intersects(&pair[1])) {
        return Err(format!(
            "time windows [{}, {}) and [{}, {}) overlap",
            pair[0].start, pair[0].end, pair[1].start, pair[1].end
        )
        .into());
    }

    Ok(windows)
}
