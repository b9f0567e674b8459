//! Immediate re-attempts for settlement reads.

use std::future::Future;

use tracing::warn;

/// Attempts made before a transient failure is surfaced.
pub const READ_ATTEMPTS: u32 = 3;

/// Errors that may succeed when the same operation is simply run again.
pub(crate) trait Transient {
    fn is_transient(&self) -> bool;
}

impl Transient for sqlx::Error {
    fn is_transient(&self) -> bool {
        match self {
            Self::PoolTimedOut | Self::Io(_) | Self::Protocol(_) | Self::WorkerCrashed => true,

            // serialization_failure, deadlock_detected
            Self::Database(error) => matches!(error.code().as_deref(), Some("40001" | "40P01")),
            _ => false,
        }
    }
}

/// Run `operation` up to `attempts` times with no delay, re-running only transient failures.
///
/// Each run gets the 1-based attempt number.
pub(crate) async fn retry_immediately<T, E, F, Fut>(attempts: u32, mut operation: F) -> Result<T, E>
where
    E: Transient + std::fmt::Display,
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut attempt = 1;

    loop {
        match operation(attempt).await {
            Err(error) if attempt < attempts && error.is_transient() => {
                warn!(attempt, %error, "transient failure, retrying");

                attempt += 1;
            }
            result => return result,
        }
    }
}
