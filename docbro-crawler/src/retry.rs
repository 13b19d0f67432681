//! ABOUTME: Fetch retry schedule — exponential backoff with jitter, `Retry-After` honored (spec §4.F)

use rand::Rng;
use std::time::Duration;

pub const MAX_ATTEMPTS: u32 = 5;
const BASE_SECS: [u64; 5] = [1, 2, 4, 8, 16];
const JITTER_FRACTION: f64 = 0.25;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    Transport,
    Status(u16),
}

#[must_use]
pub fn is_retryable(outcome: FetchOutcome) -> bool {
    match outcome {
        FetchOutcome::Transport => true,
        FetchOutcome::Status(code) => code == 429 || (500..600).contains(&code),
    }
}

/// Backoff for the attempt that just failed (1-based: the 1st failure uses
/// `BASE_SECS[0]`). Honors an explicit `Retry-After` (seconds) when the
/// server sent one; otherwise applies exponential backoff with ±25% jitter.
#[must_use]
pub fn backoff_for(attempt: u32, retry_after: Option<u64>) -> Duration {
    if let Some(secs) = retry_after {
        return Duration::from_secs(secs);
    }
    let index = (attempt.saturating_sub(1) as usize).min(BASE_SECS.len() - 1);
    let base = BASE_SECS[index] as f64;
    let jitter = rand::thread_rng().gen_range(-JITTER_FRACTION..=JITTER_FRACTION);
    let secs = (base * (1.0 + jitter)).max(0.0);
    Duration::from_secs_f64(secs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_failure_is_retryable() {
        assert!(is_retryable(FetchOutcome::Transport));
    }

    #[test]
    fn server_errors_and_429_are_retryable() {
        assert!(is_retryable(FetchOutcome::Status(500)));
        assert!(is_retryable(FetchOutcome::Status(503)));
        assert!(is_retryable(FetchOutcome::Status(429)));
    }

    #[test]
    fn client_errors_other_than_429_are_not_retryable() {
        assert!(!is_retryable(FetchOutcome::Status(404)));
        assert!(!is_retryable(FetchOutcome::Status(403)));
    }

    #[test]
    fn backoff_grows_with_attempt_number_within_jitter_bounds() {
        let first = backoff_for(1, None).as_secs_f64();
        let last = backoff_for(5, None).as_secs_f64();
        assert!(first >= 0.75 && first <= 1.25);
        assert!(last >= 12.0 && last <= 20.0);
    }

    #[test]
    fn retry_after_overrides_computed_backoff() {
        let backoff = backoff_for(1, Some(30));
        assert_eq!(backoff, Duration::from_secs(30));
    }

    #[test]
    fn attempt_beyond_table_length_clamps_to_max_entry() {
        let bounded = backoff_for(99, None).as_secs_f64();
        assert!(bounded >= 12.0 && bounded <= 20.0);
    }
}
