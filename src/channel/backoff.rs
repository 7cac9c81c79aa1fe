//! Reconnect delay policies.
//!
//! The retry cadence differs between deployments (fixed vs. exponential), so
//! the supervisor takes the policy as a value instead of hardcoding one.

use std::time::Duration;

use rand::Rng;
use serde::Deserialize;

pub trait Backoff: Send {
    /// Delay to wait before the next reconnect attempt.
    fn next_delay(&mut self) -> Duration;

    /// Called after a successful connection so the next outage starts from
    /// the base delay again.
    fn reset(&mut self);
}

/// Same delay on every attempt.
#[derive(Debug, Clone)]
pub struct FixedBackoff {
    delay: Duration,
}

impl FixedBackoff {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

impl Backoff for FixedBackoff {
    fn next_delay(&mut self) -> Duration {
        self.delay
    }

    fn reset(&mut self) {}
}

/// Doubling delay, capped at `max`, with +/-10% jitter so a fleet of clients
/// does not reconnect in lockstep.
#[derive(Debug, Clone)]
pub struct ExponentialBackoff {
    base: Duration,
    max: Duration,
    attempt: u32,
    jitter: bool,
}

impl ExponentialBackoff {
    pub fn new(base: Duration, max: Duration) -> Self {
        Self {
            base,
            max,
            attempt: 0,
            jitter: true,
        }
    }

    #[cfg(test)]
    fn without_jitter(mut self) -> Self {
        self.jitter = false;
        self
    }
}

impl Backoff for ExponentialBackoff {
    fn next_delay(&mut self) -> Duration {
        let factor = 2u32.saturating_pow(self.attempt);
        let delay = self.base.saturating_mul(factor).min(self.max);
        self.attempt = self.attempt.saturating_add(1);
        if self.jitter {
            delay.mul_f64(rand::thread_rng().gen_range(0.9..=1.1))
        } else {
            delay
        }
    }

    fn reset(&mut self) {
        self.attempt = 0;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackoffStrategy {
    Fixed,
    Exponential,
}

impl BackoffStrategy {
    pub fn parse(value: &str) -> Self {
        match value {
            "fixed" => BackoffStrategy::Fixed,
            _ => BackoffStrategy::Exponential,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReconnectConfig {
    pub strategy: BackoffStrategy,
    pub base_ms: u64,
    pub max_ms: u64,
}

pub fn build(config: &ReconnectConfig) -> Box<dyn Backoff> {
    let base = Duration::from_millis(config.base_ms);
    let max = Duration::from_millis(config.max_ms);
    match config.strategy {
        BackoffStrategy::Fixed => Box::new(FixedBackoff::new(base)),
        BackoffStrategy::Exponential => Box::new(ExponentialBackoff::new(base, max)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_never_grows() {
        let mut backoff = FixedBackoff::new(Duration::from_millis(250));
        for _ in 0..5 {
            assert_eq!(backoff.next_delay(), Duration::from_millis(250));
        }
    }

    #[test]
    fn exponential_doubles_and_caps() {
        let mut backoff =
            ExponentialBackoff::new(Duration::from_millis(500), Duration::from_secs(4))
                .without_jitter();
        assert_eq!(backoff.next_delay(), Duration::from_millis(500));
        assert_eq!(backoff.next_delay(), Duration::from_secs(1));
        assert_eq!(backoff.next_delay(), Duration::from_secs(2));
        assert_eq!(backoff.next_delay(), Duration::from_secs(4));
        assert_eq!(backoff.next_delay(), Duration::from_secs(4));
    }

    #[test]
    fn reset_returns_to_base() {
        let mut backoff =
            ExponentialBackoff::new(Duration::from_millis(500), Duration::from_secs(30))
                .without_jitter();
        backoff.next_delay();
        backoff.next_delay();
        backoff.reset();
        assert_eq!(backoff.next_delay(), Duration::from_millis(500));
    }

    #[test]
    fn jitter_stays_within_ten_percent() {
        let mut backoff =
            ExponentialBackoff::new(Duration::from_millis(1000), Duration::from_secs(30));
        for _ in 0..20 {
            backoff.reset();
            let d = backoff.next_delay();
            assert!(d >= Duration::from_millis(900) && d <= Duration::from_millis(1100));
        }
    }

    #[test]
    fn strategy_parsing_defaults_to_exponential() {
        assert_eq!(BackoffStrategy::parse("fixed"), BackoffStrategy::Fixed);
        assert_eq!(
            BackoffStrategy::parse("exponential"),
            BackoffStrategy::Exponential
        );
        assert_eq!(BackoffStrategy::parse("???"), BackoffStrategy::Exponential);
    }
}
