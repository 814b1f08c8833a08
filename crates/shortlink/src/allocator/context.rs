use crate::StoreError;
use core::future::Future;
use core::time::Duration;
use tokio::time::{Instant, timeout, timeout_at};
use tokio_util::sync::CancellationToken;

/// Deadline and cancellation inherited from the request driving an
/// allocation.
///
/// Every store call made on behalf of the request is bounded by the deadline
/// and raced against the cancellation token. Once the token is cancelled no
/// further store call is issued. A call already in flight when the token
/// fires gets [`Self::cancel_grace`] to finish, so a write that reached the
/// store is reported rather than lost.
///
/// # Example
/// ```
/// use std::time::Duration;
/// use shortlink::RequestContext;
/// use tokio_util::sync::CancellationToken;
///
/// let shutdown = CancellationToken::new();
/// let ctx = RequestContext::new()
///     .with_timeout(Duration::from_millis(250))
///     .with_cancellation(shutdown.child_token());
/// assert!(!ctx.is_cancelled());
///
/// shutdown.cancel();
/// assert!(ctx.is_cancelled());
/// ```
#[derive(Clone, Debug)]
pub struct RequestContext {
    deadline: Option<Instant>,
    cancel: CancellationToken,
    cancel_grace: Duration,
}

/// How long an in-flight store call may still complete after cancellation.
pub const DEFAULT_CANCEL_GRACE: Duration = Duration::from_millis(100);

impl Default for RequestContext {
    fn default() -> Self {
        Self {
            deadline: None,
            cancel: CancellationToken::new(),
            cancel_grace: DEFAULT_CANCEL_GRACE,
        }
    }
}

/// Why a guarded store call did not produce a value.
#[derive(Debug)]
pub(crate) enum Interrupted {
    Store(StoreError),
    Cancelled,
}

impl RequestContext {
    /// A context with no deadline and a fresh, never-cancelled token.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Sets the deadline to `timeout` from now.
    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Sets how long an in-flight call may still complete once the token is
    /// cancelled. The deadline still applies.
    pub fn with_cancel_grace(mut self, grace: Duration) -> Self {
        self.cancel_grace = grace;
        self
    }

    pub fn cancel_grace(&self) -> Duration {
        self.cancel_grace
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Runs one store call under this context.
    ///
    /// A call still pending at the deadline fails with
    /// [`StoreError::Timeout`]. A cancellation never discards a call that
    /// completes successfully within the grace period: its value is returned
    /// and the caller observes the cancellation through [`Self::is_cancelled`].
    /// A call that fails or outlives the grace after cancellation yields
    /// [`Interrupted::Cancelled`].
    pub(crate) async fn guard<F, T>(&self, call: F) -> Result<T, Interrupted>
    where
        F: Future<Output = Result<T, StoreError>>,
    {
        if self.cancel.is_cancelled() {
            return Err(Interrupted::Cancelled);
        }

        let mut bounded = core::pin::pin!(async {
            match self.deadline {
                Some(deadline) => timeout_at(deadline, call)
                    .await
                    .unwrap_or(Err(StoreError::Timeout)),
                None => call.await,
            }
        });

        tokio::select! {
            biased;
            result = &mut bounded => return result.map_err(Interrupted::Store),
            () = self.cancel.cancelled() => {}
        }

        match timeout(self.cancel_grace, bounded).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(_)) | Err(_) => Err(Interrupted::Cancelled),
        }
    }
}
