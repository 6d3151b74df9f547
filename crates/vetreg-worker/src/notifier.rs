//! Broadcasting worker events to open pages.

use std::sync::Arc;

use tokio::sync::broadcast;
use vetreg_queue::{QueuedSubmission, ReplayObserver, SubmissionId};

use crate::messages::ClientNotification;

/// Posts notifications to all attached page clients.
///
/// Fire-and-forget: no delivery guarantee and no acknowledgement; sending
/// with zero clients attached is not an error.
pub trait ClientNotifier: Send + Sync {
    /// Broadcast a notification.
    fn notify(&self, notification: ClientNotification);
}

/// Channel-backed notifier; each page subscribes for its own receiver.
pub struct BroadcastNotifier {
    sender: broadcast::Sender<ClientNotification>,
}

impl BroadcastNotifier {
    /// Create a notifier buffering up to `capacity` undelivered messages
    /// per client.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Attach a new page client.
    pub fn subscribe(&self) -> broadcast::Receiver<ClientNotification> {
        self.sender.subscribe()
    }

    /// Number of currently attached clients.
    pub fn client_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for BroadcastNotifier {
    fn default() -> Self {
        Self::new(16)
    }
}

impl ClientNotifier for BroadcastNotifier {
    fn notify(&self, notification: ClientNotification) {
        // Send fails only when no client is attached; that is fine.
        let _ = self.sender.send(notification);
    }
}

/// Adapts queue lifecycle events into client notifications.
pub struct NotifyingObserver {
    notifier: Arc<dyn ClientNotifier>,
}

impl NotifyingObserver {
    /// Create an adapter over a notifier.
    pub fn new(notifier: Arc<dyn ClientNotifier>) -> Self {
        Self { notifier }
    }
}

impl ReplayObserver for NotifyingObserver {
    fn on_queued(&self, record: &QueuedSubmission) {
        self.notifier.notify(ClientNotification::FormQueued {
            id: record.id.to_string(),
            message: "Form saved offline. Will submit when connection is restored.".to_string(),
        });
    }

    fn on_submitted(&self, id: &SubmissionId) {
        self.notifier.notify(ClientNotification::FormSubmitted {
            id: id.to_string(),
            message: "Offline form submitted successfully!".to_string(),
        });
    }
}
