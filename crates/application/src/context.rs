use ferrous_doh_domain::DomainError;
use std::future::Future;
use std::time::Duration;
use tokio::time::{sleep_until, Instant};
use tokio_util::sync::CancellationToken;

/// Cancellation and deadline scope for one query.
///
/// Cloning shares the same token and deadline. Use [`QueryContext::child_with_timeout`]
/// to derive a narrower scope for a single upstream attempt: cancelling the parent
/// cancels the child, never the reverse.
#[derive(Debug, Clone, Default)]
pub struct QueryContext {
    cancel: CancellationToken,
    deadline: Option<Instant>,
}

impl QueryContext {
    /// No deadline; cancelled only through [`QueryContext::cancel`].
    pub fn background() -> Self {
        Self::default()
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            cancel: CancellationToken::new(),
            deadline: Some(Instant::now() + timeout),
        }
    }

    pub fn with_cancellation(cancel: CancellationToken) -> Self {
        Self {
            cancel,
            deadline: None,
        }
    }

    /// The shorter of the parent's deadline and `now + timeout` wins.
    pub fn child_with_timeout(&self, timeout: Duration) -> Self {
        let local = Instant::now() + timeout;
        let deadline = match self.deadline {
            Some(parent) => parent.min(local),
            None => local,
        };
        Self {
            cancel: self.cancel.child_token(),
            deadline: Some(deadline),
        }
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Cancellation takes precedence over an elapsed deadline.
    pub fn check(&self) -> Result<(), DomainError> {
        if self.cancel.is_cancelled() {
            return Err(DomainError::Cancelled);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Err(DomainError::DeadlineExceeded),
            _ => Ok(()),
        }
    }

    /// Drive `fut` until it completes, the context is cancelled, or the deadline passes.
    pub async fn run<F, T>(&self, fut: F) -> Result<T, DomainError>
    where
        F: Future<Output = Result<T, DomainError>>,
    {
        self.check()?;

        let deadline = self.deadline;
        let expired = async move {
            match deadline {
                Some(deadline) => sleep_until(deadline).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(DomainError::Cancelled),
            _ = expired => Err(DomainError::DeadlineExceeded),
            result = fut => result,
        }
    }
}
