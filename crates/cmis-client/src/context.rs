//! Per-session timeout and cancellation settings.

use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::{Error, Result};

/// Settings every network-bound call of a session runs under.
///
/// Objects fetched through a session inherit its context. Cancelling the
/// token aborts calls in flight and fails later calls with
/// [`Cancelled`](crate::ErrorKind::Cancelled).
#[derive(Debug, Clone, Default)]
pub struct OperationContext {
    timeout: Option<Duration>,
    cancellation: CancellationToken,
    page_size: Option<u32>,
}

impl OperationContext {
    /// Creates a context without timeout or page size preference.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the time limit for each individual call.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Uses `token` to cancel calls.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    /// Sets the number of items requested per page. Zero means the binding default.
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = (page_size > 0).then_some(page_size);
        self
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancellation
    }

    pub fn page_size(&self) -> Option<u32> {
        self.page_size
    }

    /// Runs `future` under the timeout and cancellation token.
    pub(crate) async fn guard<T, F>(&self, future: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        if self.cancellation.is_cancelled() {
            return Err(Error::cancelled().with_message("operation cancelled before it started"));
        }

        let limited = async {
            match self.timeout {
                Some(limit) => match tokio::time::timeout(limit, future).await {
                    Ok(result) => result,
                    Err(_) => Err(Error::timeout()
                        .with_message(format!("operation exceeded {} ms", limit.as_millis()))),
                },
                None => future.await,
            }
        };

        tokio::select! {
            biased;

            () = self.cancellation.cancelled() => {
                Err(Error::cancelled().with_message("operation cancelled"))
            }

            result = limited => result,
        }
    }
}
