use std::time::Duration;

use anyhow::{anyhow, Result};
use omnipack_core::{CancelToken, LogSink, Settings};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub delay_increment: Duration,
    pub debug: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(100),
            delay_increment: Duration::ZERO,
            debug: false,
        }
    }
}

impl RetryPolicy {
    pub fn with_attempts(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            ..Self::default()
        }
    }

    pub fn from_settings(max_attempts: u32, settings: &Settings) -> Self {
        Self {
            max_attempts,
            debug: settings.debug,
            ..Self::default()
        }
    }

    // Wait applied after attempt `attempt` (1-indexed) fails with
    // attempts remaining.
    fn delay_after(&self, attempt: u32) -> Duration {
        self.base_delay + self.delay_increment * attempt.saturating_sub(1)
    }
}

fn failure_text(err: &anyhow::Error, debug: bool) -> String {
    if debug {
        format!("{err:?}")
    } else {
        format!("{err:#}")
    }
}

/// Runs `work` up to `policy.max_attempts` times, warning on each failure
/// and surfacing the last attempt's error unchanged after logging it.
pub fn retry<T, F>(
    policy: &RetryPolicy,
    sink: &dyn LogSink,
    cancel: Option<&CancelToken>,
    description: Option<&str>,
    mut work: F,
) -> Result<T>
where
    F: FnMut() -> Result<T>,
{
    if policy.max_attempts == 0 {
        return Err(anyhow!(
            "you must specify a number of retries greater than zero"
        ));
    }

    let mut attempt = 1;
    loop {
        match work() {
            Ok(value) => return Ok(value),
            Err(err) => {
                sink.warn(&format!(
                    "operation failed ({attempt}/{}): {}",
                    policy.max_attempts,
                    failure_text(&err, policy.debug)
                ));

                if attempt == policy.max_attempts {
                    match description {
                        Some(description) => {
                            sink.error(&format!("could not execute: {description}"))
                        }
                        None => sink.error("could not execute the operation"),
                    }
                    return Err(err);
                }

                let delay = policy.delay_after(attempt);
                sink.info(&format!("retrying after {} ms...", delay.as_millis()));
                std::thread::sleep(delay);

                if let Some(token) = cancel {
                    token.check()?;
                }
                attempt += 1;
            }
        }
    }
}

pub fn retry_unit<F>(
    policy: &RetryPolicy,
    sink: &dyn LogSink,
    cancel: Option<&CancelToken>,
    description: Option<&str>,
    work: F,
) -> Result<()>
where
    F: FnMut() -> Result<()>,
{
    retry(policy, sink, cancel, description, work)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OnFailure {
    pub propagate: bool,
    pub warn_instead_of_error: bool,
    pub debug: bool,
}

/// Runs `work` exactly once. A failure is logged and, unless
/// `on_failure.propagate` is set, swallowed by returning the default value.
pub fn try_with_logging<T, F>(
    sink: &dyn LogSink,
    error_message: &str,
    on_failure: OnFailure,
    work: F,
) -> Result<T>
where
    T: Default,
    F: FnOnce() -> Result<T>,
{
    match work() {
        Ok(value) => Ok(value),
        Err(err) => {
            let message = format!(
                "{error_message}: {}",
                failure_text(&err, on_failure.debug)
            );
            if on_failure.warn_instead_of_error {
                sink.warn(&message);
            } else {
                sink.error(&message);
            }

            if on_failure.propagate {
                Err(err)
            } else {
                Ok(T::default())
            }
        }
    }
}
