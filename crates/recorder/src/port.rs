//! Port - named channel between the page and the background side
//!
//! Design decisions:
//! 1. One port per page, named after the page host
//! 2. Unbounded message passing - posting never blocks the event handler
//! 3. Disconnects are pushed to subscribers, exactly once
//! 4. Fail fast - no retries, no queuing. Let the caller decide.

use dashmap::DashMap;
use protocol::ParsedEvent;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;
use uuid::Uuid;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PortError {
    #[error("Port '{0}' is disconnected")]
    Disconnected(String),
}

/// Result type for port operations
pub type Result<T> = std::result::Result<T, PortError>;

/// Disconnect subscriber callback
pub type DisconnectCallback = Arc<dyn Fn() + Send + Sync>;

/// Subscription handle returned by [`Port::on_disconnect`]
pub type SubscriptionId = u64;

/// State both ends of the channel look at
struct PortShared {
    connected: AtomicBool,

    next_id: AtomicU64,

    /// Key: subscription id, Value: callback
    subscribers: DashMap<SubscriptionId, DisconnectCallback>,
}

impl PortShared {
    /// Flip to disconnected and notify subscribers. Only the first call
    /// notifies.
    fn disconnect(&self) -> bool {
        if !self.connected.swap(false, Ordering::SeqCst) {
            return false;
        }

        // Collect first so callbacks run without holding map shards
        let callbacks: Vec<DisconnectCallback> = self
            .subscribers
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        self.subscribers.clear();

        for callback in callbacks {
            callback();
        }
        true
    }
}

/// Content side of the channel
pub struct Port {
    id: Uuid,
    name: String,
    tx: mpsc::UnboundedSender<ParsedEvent>,
    shared: Arc<PortShared>,
}

impl Port {
    /// Open a port. Returns the page end and the background end.
    pub fn connect(name: impl Into<String>) -> (Port, PortReceiver) {
        let name = name.into();
        let (tx, rx) = mpsc::unbounded_channel();
        let shared = Arc::new(PortShared {
            connected: AtomicBool::new(true),
            next_id: AtomicU64::new(1),
            subscribers: DashMap::new(),
        });

        let port = Port {
            id: Uuid::now_v7(),
            name: name.clone(),
            tx,
            shared: Arc::clone(&shared),
        };
        tracing::info!("Port '{}' connected ({})", port.name, port.id);

        (port, PortReceiver { name, rx, shared })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_connected(&self) -> bool {
        self.shared.connected.load(Ordering::SeqCst)
    }

    /// Send one record to the background side
    pub fn post_message(&self, message: ParsedEvent) -> Result<()> {
        if !self.is_connected() {
            return Err(PortError::Disconnected(self.name.clone()));
        }

        if self.tx.send(message).is_err() {
            // Receiver is gone even though nobody told us
            self.shared.disconnect();
            return Err(PortError::Disconnected(self.name.clone()));
        }

        Ok(())
    }

    /// Register a callback for when the background side goes away
    pub fn on_disconnect(&self, callback: DisconnectCallback) -> SubscriptionId {
        let id = self.shared.next_id.fetch_add(1, Ordering::SeqCst);
        self.shared.subscribers.insert(id, callback);
        id
    }

    pub fn remove_disconnect_listener(&self, id: SubscriptionId) -> bool {
        self.shared.subscribers.remove(&id).is_some()
    }

    /// Close from the page side. Our own disconnect subscribers are not
    /// notified; the receiver sees the end of the stream.
    pub fn disconnect(self) {
        self.shared.connected.store(false, Ordering::SeqCst);
        self.shared.subscribers.clear();
        tracing::info!("Port '{}' closed by page", self.name);
    }
}

/// Background side of the channel
pub struct PortReceiver {
    name: String,
    rx: mpsc::UnboundedReceiver<ParsedEvent>,
    shared: Arc<PortShared>,
}

impl PortReceiver {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_connected(&self) -> bool {
        self.shared.connected.load(Ordering::SeqCst)
    }

    /// Wait for the next record. `None` once the page side is gone and the
    /// queue is drained.
    pub async fn recv(&mut self) -> Option<ParsedEvent> {
        self.rx.recv().await
    }

    pub fn try_recv(&mut self) -> Option<ParsedEvent> {
        self.rx.try_recv().ok()
    }

    /// Everything queued right now
    pub fn drain(&mut self) -> Vec<ParsedEvent> {
        std::iter::from_fn(|| self.rx.try_recv().ok()).collect()
    }

    /// Close from the background side and notify the page
    pub fn disconnect(&mut self) {
        self.rx.close();
        if self.shared.disconnect() {
            tracing::info!("Port '{}' disconnected by background", self.name);
        }
    }
}

impl Drop for PortReceiver {
    fn drop(&mut self) {
        self.disconnect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use protocol::EventType;
    use std::sync::atomic::AtomicUsize;

    fn record(selector: &str) -> ParsedEvent {
        ParsedEvent::new(selector, EventType::Click, "BUTTON")
    }

    #[test]
    fn test_post_and_drain() {
        let (port, mut receiver) = Port::connect("example.com");
        assert_eq!(port.name(), "example.com");
        assert_eq!(receiver.name(), "example.com");

        port.post_message(record("#a")).unwrap();
        port.post_message(record("#b")).unwrap();

        let received: Vec<_> = receiver.drain().into_iter().map(|e| e.selector).collect();
        assert_eq!(received, vec!["#a", "#b"]);
        assert!(receiver.try_recv().is_none());
    }

    #[test]
    fn test_disconnect_notifies_once() {
        let (port, mut receiver) = Port::connect("example.com");
        let calls = Arc::new(AtomicUsize::new(0));

        let counter = calls.clone();
        port.on_disconnect(Arc::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        }));

        receiver.disconnect();
        receiver.disconnect();
        drop(receiver);

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(!port.is_connected());
        assert_eq!(
            port.post_message(record("#late")),
            Err(PortError::Disconnected("example.com".to_string()))
        );
    }

    #[test]
    fn test_dropping_receiver_disconnects() {
        let (port, receiver) = Port::connect("example.com");
        let fired = Arc::new(AtomicBool::new(false));

        let flag = fired.clone();
        port.on_disconnect(Arc::new(move || flag.store(true, Ordering::SeqCst)));

        drop(receiver);
        assert!(fired.load(Ordering::SeqCst));
        assert!(port.post_message(record("#x")).is_err());
    }

    #[test]
    fn test_removed_listener_is_not_called() {
        let (port, mut receiver) = Port::connect("example.com");
        let fired = Arc::new(AtomicBool::new(false));

        let flag = fired.clone();
        let id = port.on_disconnect(Arc::new(move || flag.store(true, Ordering::SeqCst)));
        assert!(port.remove_disconnect_listener(id));

        receiver.disconnect();
        assert!(!fired.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_page_side_close_ends_stream() {
        let (port, mut receiver) = Port::connect("example.com");
        port.post_message(record("#last")).unwrap();
        port.disconnect();

        assert_eq!(receiver.recv().await.map(|e| e.selector), Some("#last".to_string()));
        assert!(receiver.recv().await.is_none());
    }
}
