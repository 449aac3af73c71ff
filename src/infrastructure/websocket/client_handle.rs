use futures::channel::oneshot;

use crate::domain::events::FeedKind;
use crate::domain::logging::{LogComponent, get_logger};

/// Owner's side of a running feed task.
///
/// Closing (or dropping) the handle signals the task, which then closes its
/// socket with a normal closure code.
#[derive(Debug)]
pub struct FeedSubscription {
    kind: FeedKind,
    shutdown: Option<oneshot::Sender<()>>,
}

impl FeedSubscription {
    pub fn new(kind: FeedKind, shutdown: oneshot::Sender<()>) -> Self {
        Self { kind, shutdown: Some(shutdown) }
    }

    pub fn is_open(&self) -> bool {
        self.shutdown.as_ref().is_some_and(|tx| !tx.is_canceled())
    }

    /// Idempotent
    pub fn close(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            get_logger().debug(
                LogComponent::Infrastructure("FeedHandle"),
                &format!("Releasing {} feed", self.kind),
            );
            // The task may already be gone after a dropped connection
            let _ = tx.send(());
        }
    }
}

impl Drop for FeedSubscription {
    fn drop(&mut self) {
        self.close();
    }
}
