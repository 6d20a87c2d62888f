// src/core/poller.rs
//
// Dispatch is fire-and-forget, so "did the install finish?" has no real
// answer from the session itself. The poller approximates one: it runs a
// cheap silent predicate on a fixed cadence until it reports true or the
// attempt budget runs out.

use crate::constants::{POLL_INTERVAL_MS, POLL_MAX_ATTEMPTS};
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(POLL_INTERVAL_MS),
            max_attempts: POLL_MAX_ATTEMPTS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    Succeeded { attempts: u32 },
    TimedOut { attempts: u32 },
}

impl PollOutcome {
    pub fn succeeded(self) -> bool {
        matches!(self, PollOutcome::Succeeded { .. })
    }
}

/// Runs `probe` every `interval` until it returns true or `max_attempts`
/// checks have failed. The first wait happens before the first check,
/// giving the dispatched command a head start. Probe failures of any kind
/// count as "not yet"; the probe itself decides what failure means.
pub fn poll_until<P>(settings: &PollSettings, mut probe: P) -> PollOutcome
where
    P: FnMut() -> bool,
{
    let mut attempts = 0;
    while attempts < settings.max_attempts {
        thread::sleep(settings.interval);
        attempts += 1;
        log::trace!("Poll attempt {attempts}/{}", settings.max_attempts);
        if probe() {
            return PollOutcome::Succeeded { attempts };
        }
    }
    PollOutcome::TimedOut { attempts }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn instant(max_attempts: u32) -> PollSettings {
        PollSettings {
            interval: Duration::ZERO,
            max_attempts,
        }
    }

    #[test]
    fn a_never_true_predicate_is_probed_exactly_max_attempts_times() {
        let mut calls = 0;
        let outcome = poll_until(&instant(3), || {
            calls += 1;
            false
        });
        assert_eq!(outcome, PollOutcome::TimedOut { attempts: 3 });
        assert_eq!(calls, 3);
        assert!(!outcome.succeeded());
    }

    #[test]
    fn polling_stops_on_the_first_success() {
        let mut calls = 0;
        let outcome = poll_until(&instant(10), || {
            calls += 1;
            calls == 4
        });
        assert_eq!(outcome, PollOutcome::Succeeded { attempts: 4 });
        assert_eq!(calls, 4);
    }

    #[test]
    fn an_immediately_true_predicate_succeeds_on_the_first_attempt() {
        let outcome = poll_until(&instant(5), || true);
        assert_eq!(outcome, PollOutcome::Succeeded { attempts: 1 });
    }

    #[test]
    fn a_zero_attempt_budget_never_probes() {
        let mut calls = 0;
        let outcome = poll_until(&instant(0), || {
            calls += 1;
            true
        });
        assert_eq!(outcome, PollOutcome::TimedOut { attempts: 0 });
        assert_eq!(calls, 0);
    }
}
