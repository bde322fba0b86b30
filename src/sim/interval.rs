use chrono::{Duration, NaiveDateTime};

/// Classification of the time elapsed between consecutive samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntervalCheck {
    /// No previous sample exists; the current one seeds the timeline and is
    /// excluded from simulation.
    First,
    /// The elapsed time is within the configured maximum and usable.
    Valid(Duration),
    /// The elapsed time exceeds the maximum; the interval must be excluded
    /// and the accumulators re-based.
    Gap(Duration),
}

/// Classifies the interval ending at `current`.
///
/// An interval of exactly `max_interval` is still valid; only strictly
/// longer gaps are rejected.
pub fn check_interval(
    previous: Option<NaiveDateTime>,
    current: NaiveDateTime,
    max_interval: Duration,
) -> IntervalCheck {
    let Some(previous) = previous else {
        return IntervalCheck::First;
    };
    let elapsed = current - previous;
    if elapsed > max_interval {
        IntervalCheck::Gap(elapsed)
    } else {
        IntervalCheck::Valid(elapsed)
    }
}
