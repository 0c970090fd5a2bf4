//! Timeout helper.

use std::future::Future;
use std::time::Duration;

use crate::error::HrAgentError;

/// Bound a fallible future by `duration`; elapsing yields
/// [`HrAgentError::Timeout`] and drops the future.
pub async fn with_timeout<T>(
    duration: Duration,
    future: impl Future<Output = Result<T, HrAgentError>>,
) -> Result<T, HrAgentError> {
    match tokio::time::timeout(duration, future).await {
        Ok(result) => result,
        Err(_) => Err(HrAgentError::Timeout(saturating_millis(duration))),
    }
}

fn saturating_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
