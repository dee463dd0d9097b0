//! Bounded retry for structured generation
//!
//! Attempts run back to back with no delay and an unchanged request. Each
//! attempt returns its own `Result`; the policy decides whether a failure is
//! worth another attempt.

/// Attempt budget for one generation step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first (default: 5)
    pub max_attempts: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { max_attempts: 5 }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
        }
    }
}

/// Result of a retried operation
#[derive(Debug)]
pub struct RetryResult<T, E> {
    /// The successful value or the last error
    pub result: Result<T, E>,
    /// Number of attempts made
    pub attempts: u32,
    /// True when the last error was retryable but the budget ran out
    pub exhausted: bool,
}

/// Run `operation` until it succeeds, fails with a non-retryable error, or the
/// budget is spent.
///
/// `on_failure` sees every failed attempt with its 1-based number and whether
/// another attempt follows.
pub fn with_retry<T, E, F, P, R>(
    policy: &RetryPolicy,
    mut operation: F,
    is_retryable: P,
    mut on_failure: R,
) -> RetryResult<T, E>
where
    F: FnMut(u32) -> Result<T, E>,
    P: Fn(&E) -> bool,
    R: FnMut(u32, &E, bool),
{
    let mut attempts = 0u32;

    loop {
        attempts += 1;

        match operation(attempts) {
            Ok(value) => {
                return RetryResult {
                    result: Ok(value),
                    attempts,
                    exhausted: false,
                };
            }
            Err(error) => {
                let retryable = is_retryable(&error);
                let will_retry = retryable && attempts < policy.max_attempts;
                on_failure(attempts, &error, will_retry);

                if !will_retry {
                    return RetryResult {
                        result: Err(error),
                        attempts,
                        exhausted: retryable,
                    };
                }
            }
        }
    }
}
