use std::time::Duration;

/// Backoff policy for transient fetch failures.
///
/// Exponential: `base_delay * 2^(attempt - 1)`, capped at `max_delay`.
/// NotFound never goes through this policy; it advances to the next
/// candidate path immediately.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Total attempts per path, including the first.
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(8),
        }
    }
}

impl RetryConfig {
    /// Delay to wait after the given failed attempt (1-indexed).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let pow = attempt.saturating_sub(1).min(16);
        let delay = self.base_delay.saturating_mul(2_u32.saturating_pow(pow));
        delay.min(self.max_delay)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delay_doubles_per_attempt() {
        let config = RetryConfig {
            max_attempts: 5,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(60),
        };

        assert_eq!(config.delay_for(1), Duration::from_millis(500));
        assert_eq!(config.delay_for(2), Duration::from_secs(1));
        assert_eq!(config.delay_for(3), Duration::from_secs(2));
    }

    #[test]
    fn delay_is_capped() {
        let config = RetryConfig {
            max_attempts: 10,
            base_delay: Duration::from_secs(4),
            max_delay: Duration::from_secs(8),
        };

        assert_eq!(config.delay_for(1), Duration::from_secs(4));
        assert_eq!(config.delay_for(2), Duration::from_secs(8));
        assert_eq!(config.delay_for(9), Duration::from_secs(8));
    }

    #[test]
    fn huge_attempt_numbers_do_not_overflow() {
        let config = RetryConfig::default();
        assert_eq!(config.delay_for(u32::MAX), config.max_delay);
    }
}
