//! Retry strategy.

use std::time::Duration;
use tokio_retry::strategy::FixedInterval;

/// Creates the fixed-delay retry strategy used for batch submissions.
///
/// `tokio_retry` performs one attempt before consuming the first delay, so a
/// strategy yielding `max_attempts - 1` delays produces exactly `max_attempts`
/// attempts in total.
///
/// # Arguments
///
/// * `max_attempts` - Total attempts, initial attempt included
/// * `delay` - Pause between two consecutive attempts
pub fn get_retry_strategy(max_attempts: usize, delay: Duration) -> impl Iterator<Item = Duration> {
    FixedInterval::new(delay).take(max_attempts.saturating_sub(1))
}
