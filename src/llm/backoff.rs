use rand::Rng;
use std::time::Duration;

/// Exponential backoff with ±30% jitter, in milliseconds.
pub fn calculate_backoff_delay(attempt: u32, base_delay_ms: u64) -> Duration {
    // 2^6 is plenty for a handful of API retries
    let capped_attempt = attempt.min(6);

    let base_delay = base_delay_ms.saturating_mul(2_u64.saturating_pow(capped_attempt));

    let jitter_factor = rand::thread_rng().gen_range(0.7..1.3);
    let delay_with_jitter = (base_delay as f64 * jitter_factor).round() as u64;

    Duration::from_millis(delay_with_jitter)
}
