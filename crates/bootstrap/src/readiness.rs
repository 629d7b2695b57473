use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, info, warn};

/// Outcome of waiting for readiness.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Readiness {
    /// The probe succeeded on attempt `attempts`.
    Ready {
        /// Probe calls made.
        attempts: u32,
    },

    /// Every attempt failed.
    TimedOut {
        /// Probe calls made.
        attempts: u32,
    },
}

/// Bounded-retry gate: calls a probe until it succeeds or attempts run out.
#[derive(Clone, Copy, Debug)]
pub struct ReadinessWaiter {
    interval: Duration,
    max_attempts: u32,
}

impl ReadinessWaiter {
    /// Creates a waiter making at most `max_attempts` calls, `interval` apart.
    #[must_use]
    pub const fn new(max_attempts: u32, interval: Duration) -> Self {
        Self {
            interval,
            max_attempts,
        }
    }

    /// Call `probe` until it returns `Ok`. There is no pause after the final
    /// attempt, and `max_attempts == 0` never calls the probe.
    pub async fn wait_ready<F, Fut, E>(&self, mut probe: F) -> Readiness
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<(), E>>,
        E: Display,
    {
        for attempt in 1..=self.max_attempts {
            match probe().await {
                Ok(()) => {
                    info!("ready after {} attempt(s)", attempt);
                    return Readiness::Ready { attempts: attempt };
                }
                Err(e) => {
                    debug!("readiness attempt {}/{} failed: {}", attempt, self.max_attempts, e);

                    if attempt < self.max_attempts {
                        tokio::time::sleep(self.interval).await;
                    }
                }
            }
        }

        warn!("not ready after {} attempt(s)", self.max_attempts);

        Readiness::TimedOut {
            attempts: self.max_attempts,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::time::Instant;

    use super::*;

    fn probe_failing_until(
        calls: &Cell<u32>,
        succeed_on: u32,
    ) -> impl FnMut() -> std::future::Ready<Result<(), &'static str>> + '_ {
        move || {
            calls.set(calls.get() + 1);
            std::future::ready(if calls.get() >= succeed_on {
                Ok(())
            } else {
                Err("connection refused")
            })
        }
    }

    #[tokio::test]
    async fn test_ready_on_third_attempt() {
        let calls = Cell::new(0);
        let waiter = ReadinessWaiter::new(5, Duration::ZERO);

        let readiness = waiter.wait_ready(probe_failing_until(&calls, 3)).await;

        assert_eq!(readiness, Readiness::Ready { attempts: 3 });
        assert_eq!(calls.get(), 3);
    }

    #[tokio::test]
    async fn test_times_out_after_exactly_max_attempts() {
        let calls = Cell::new(0);
        let waiter = ReadinessWaiter::new(3, Duration::ZERO);

        let readiness = waiter.wait_ready(probe_failing_until(&calls, u32::MAX)).await;

        assert_eq!(readiness, Readiness::TimedOut { attempts: 3 });
        assert_eq!(calls.get(), 3);
    }

    #[tokio::test]
    async fn test_zero_attempts_never_probes() {
        let calls = Cell::new(0);
        let waiter = ReadinessWaiter::new(0, Duration::from_secs(60));

        let readiness = waiter.wait_ready(probe_failing_until(&calls, 1)).await;

        assert_eq!(readiness, Readiness::TimedOut { attempts: 0 });
        assert_eq!(calls.get(), 0);
    }

    #[tokio::test]
    async fn test_no_pause_after_final_attempt() {
        let calls = Cell::new(0);
        let waiter = ReadinessWaiter::new(1, Duration::from_secs(60));
        let started = Instant::now();

        let readiness = waiter.wait_ready(probe_failing_until(&calls, u32::MAX)).await;

        assert_eq!(readiness, Readiness::TimedOut { attempts: 1 });
        assert!(started.elapsed() < Duration::from_secs(30));
    }
}
