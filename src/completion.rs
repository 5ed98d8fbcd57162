//! Exactly-once delivery of a probe outcome.

use tokio::sync::oneshot;
use tracing::trace;

use crate::types::ImageSize;

/// Sending half. The first `complete` wins; a completion dropped without
/// firing delivers `None`.
#[derive(Debug)]
pub struct Completion {
    sender: Option<oneshot::Sender<Option<ImageSize>>>,
}

#[derive(Debug)]
pub struct CompletionReceiver {
    receiver: oneshot::Receiver<Option<ImageSize>>,
}

pub fn completion() -> (Completion, CompletionReceiver) {
    let (sender, receiver) = oneshot::channel();
    (
        Completion {
            sender: Some(sender),
        },
        CompletionReceiver { receiver },
    )
}

impl Completion {
    /// Delivers `outcome`, returning `false` if an outcome already went out.
    pub fn complete(&mut self, outcome: Option<ImageSize>) -> bool {
        match self.sender.take() {
            Some(sender) => {
                // The receiver may already be gone; the outcome is still settled.
                let _ = sender.send(outcome);
                true
            }
            None => {
                trace!("completion already delivered, ignoring");
                false
            }
        }
    }
}

impl Drop for Completion {
    fn drop(&mut self) {
        if self.sender.is_some() {
            self.complete(None);
        }
    }
}

impl CompletionReceiver {
    pub async fn wait(self) -> Option<ImageSize> {
        self.receiver.await.unwrap_or(None)
    }
}
