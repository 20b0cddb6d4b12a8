//! Cancellation of in-flight transport calls.

use std::sync::Arc;

use tokio::sync::watch;

/// Sender half: aborts the call its receiver is racing against.
#[derive(Debug, Clone)]
pub struct CancellationToken {
    sender: Arc<watch::Sender<bool>>,
}

impl CancellationToken {
    /// Creates a token together with the receiver a call waits on.
    #[must_use]
    pub fn pair() -> (Self, CancellationReceiver) {
        let (sender, receiver) = watch::channel(false);
        (
            Self {
                sender: Arc::new(sender),
            },
            CancellationReceiver { receiver },
        )
    }

    /// Signals cancellation. Idempotent.
    pub fn cancel(&self) {
        self.sender.send_replace(true);
    }

    /// Returns whether cancellation was signalled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        *self.sender.borrow()
    }
}

/// Receiver half, raced against the transport call.
#[derive(Debug)]
pub struct CancellationReceiver {
    receiver: watch::Receiver<bool>,
}

impl CancellationReceiver {
    /// Completes once the token is cancelled; pends forever if the token
    /// is dropped without cancelling.
    pub async fn cancelled(&mut self) {
        loop {
            if *self.receiver.borrow_and_update() {
                return;
            }
            if self.receiver.changed().await.is_err() {
                std::future::pending::<()>().await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn cancel_wakes_receiver() {
        let (token, mut receiver) = CancellationToken::pair();
        let waiter = tokio::spawn(async move { receiver.cancelled().await });

        token.cancel();
        assert!(token.is_cancelled());
        let joined = tokio::time::timeout(Duration::from_secs(1), waiter).await;
        assert!(matches!(joined, Ok(Ok(()))));
    }

    #[tokio::test]
    async fn dropped_token_never_cancels() {
        let (token, mut receiver) = CancellationToken::pair();
        drop(token);
        let waited = tokio::time::timeout(Duration::from_millis(20), receiver.cancelled()).await;
        assert!(waited.is_err());
    }
}
