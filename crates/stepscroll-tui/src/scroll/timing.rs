//! Time calculation utilities for scroll animations

use std::time::Duration;

use tokio::time::Instant;

/// Animation progress (0.0 to 1.0) from start time and duration
#[inline]
pub fn progress(start: Instant, duration: Duration) -> f64 {
    if duration.is_zero() {
        return 1.0;
    }
    let ratio = start.elapsed().as_secs_f64() / duration.as_secs_f64();
    ratio.clamp(0.0, 1.0)
}

#[inline]
pub fn is_complete(start: Instant, duration: Duration) -> bool {
    start.elapsed() >= duration
}

/// Linear interpolation between two values
#[inline]
pub fn lerp(from: f64, to: f64, t: f64) -> f64 {
    from + (to - from) * t
}

/// Convert a row offset to a whole terminal row
#[inline]
pub fn to_row(offset: f64) -> u16 {
    offset.round().clamp(0.0, u16::MAX as f64) as u16
}
