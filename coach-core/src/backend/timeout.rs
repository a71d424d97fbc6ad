//! Request Timeout
//!
//! Runtime-agnostic timeout: tokio timers natively, browser timers on WASM.

use std::future::Future;
use std::time::Duration;

use futures::future::{select, Either};
use futures::pin_mut;

use crate::domain::{DomainError, DomainResult};

/// Fixed abort applied to every outbound backend request
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[cfg(not(target_arch = "wasm32"))]
pub async fn sleep(duration: Duration) {
    tokio::time::sleep(duration).await;
}

#[cfg(target_arch = "wasm32")]
pub async fn sleep(duration: Duration) {
    gloo_timers::future::sleep(duration).await;
}

/// Resolve `future`, or fail with `DomainError::Timeout` once `duration` elapses
pub async fn with_timeout<F: Future>(duration: Duration, future: F) -> DomainResult<F::Output> {
    let timer = sleep(duration);
    pin_mut!(future);
    pin_mut!(timer);
    match select(future, timer).await {
        Either::Left((output, _)) => Ok(output),
        Either::Right(((), _)) => {
            log::warn!("[BACKEND] request aborted after {:?}", duration);
            Err(DomainError::Timeout(duration.as_secs()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_completes_before_deadline() {
        let result = with_timeout(Duration::from_secs(1), async { 7 }).await;
        assert_eq!(result, Ok(7));
    }

    #[tokio::test]
    async fn test_pending_future_times_out() {
        let result = with_timeout(Duration::from_millis(20), futures::future::pending::<()>()).await;
        assert!(matches!(result, Err(DomainError::Timeout(_))));
    }
}
