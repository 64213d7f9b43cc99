//! Exponential resurrection backoff.

use std::time::Duration;

/// Time a connection with `failures` failures stays dead.
///
/// `initial * 2^min(failures - 1, cutoff)`; saturates instead of overflowing.
pub fn resurrection_timeout(failures: u32, initial: Duration, cutoff: u32) -> Duration {
    let factor = failures.saturating_sub(1).min(cutoff);
    let multiplier = 2u32.saturating_pow(factor);
    initial.saturating_mul(multiplier)
}
