use std::{future::Future, time::Duration};

use tokio::time::{Instant, timeout_at};
use tokio_util::sync::CancellationToken;

use super::AssignerError;

/// Cancellation and deadline for a single lifecycle operation.
///
/// When either fires, the operation's future is dropped. Any transaction it
/// held open is dropped with it and rolled back by the driver.
#[derive(Debug, Clone, Default)]
pub struct OpContext {
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl OpContext {
    pub fn new(token: CancellationToken) -> Self {
        Self {
            token,
            deadline: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.deadline = Some(Instant::now() + timeout);
        self
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Drives `operation` until it finishes, the token is cancelled, or the
    /// deadline passes, whichever comes first.
    pub async fn run<T, F>(&self, operation: F) -> Result<T, AssignerError>
    where
        F: Future<Output = Result<T, AssignerError>>,
    {
        if self.is_cancelled() {
            return Err(AssignerError::Cancelled);
        }

        let bounded = async {
            match self.deadline {
                Some(deadline) => timeout_at(deadline, operation)
                    .await
                    .unwrap_or(Err(AssignerError::TimedOut)),
                None => operation.await,
            }
        };

        tokio::select! {
            biased;
            _ = self.token.cancelled() => Err(AssignerError::Cancelled),
            result = bounded => result,
        }
    }
}
