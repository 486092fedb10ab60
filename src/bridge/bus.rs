use tokio::sync::{broadcast, mpsc, oneshot};

use crate::domain::CountsSnapshot;

use super::messages::{InboundMessage, OutboundMessage};

/// A counts request routed into the watcher loop; answered from its state
/// without forcing a scan.
pub struct CountsQuery {
    pub reply: oneshot::Sender<CountsSnapshot>,
}

/// Stand-in for the extension runtime message channel: broadcast fan-out for
/// updates, a request path for queries. Sending with nobody listening is not
/// an error on either side.
#[derive(Clone)]
pub struct RuntimeBus {
    updates: broadcast::Sender<OutboundMessage>,
    queries: mpsc::Sender<CountsQuery>,
}

impl RuntimeBus {
    pub fn new(query_capacity: usize) -> (Self, mpsc::Receiver<CountsQuery>) {
        let (updates, _) = broadcast::channel(16);
        let (queries, query_rx) = mpsc::channel(query_capacity);
        (Self { updates, queries }, query_rx)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<OutboundMessage> {
        self.updates.subscribe()
    }

    /// Fire-and-forget publish. A missing listener is swallowed quietly.
    pub fn publish(&self, message: OutboundMessage) {
        if self.updates.send(message).is_err() {
            tracing::debug!(target: "bridge", "no listener for runtime message");
        }
    }

    /// Sends a query to the watcher and waits for the reply. `None` when the
    /// watcher side is gone.
    pub async fn request(&self, message: InboundMessage) -> Option<CountsSnapshot> {
        match message {
            InboundMessage::GetUnreadCounts => {
                let (reply, response) = oneshot::channel();
                self.queries.send(CountsQuery { reply }).await.ok()?;
                response.await.ok()
            }
        }
    }
}
