use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Result};

/// Outbound side of one client connection.
///
/// The trait seam keeps broadcast/eviction semantics testable without
/// sockets; the production implementation wraps a WebSocket.
pub trait ClientSink: Send + Sync {
    fn send_text(&self, payload: &str) -> Result<()>;
}

/// Registry of connected clients.
///
/// Clients are registered on connect and removed on disconnect or on
/// the first failed send. Broadcast snapshots the member set under the
/// lock and releases it before sending, so one slow client cannot
/// stall frame processing or delivery to the others.
pub struct ClientRegistry<S: ClientSink> {
    clients: Mutex<HashMap<u64, Arc<S>>>,
    next_id: AtomicU64,
}

impl<S: ClientSink> ClientRegistry<S> {
    pub fn new() -> Self {
        Self {
            clients: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Add a client; returns its registry id.
    pub fn register(&self, sink: Arc<S>) -> Result<u64> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let mut clients = self.lock()?;
        clients.insert(id, sink);
        Ok(id)
    }

    /// Remove a client. Returns true when it was still registered.
    pub fn unregister(&self, id: u64) -> Result<bool> {
        let mut clients = self.lock()?;
        Ok(clients.remove(&id).is_some())
    }

    pub fn len(&self) -> usize {
        self.lock().map(|clients| clients.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Deliver a payload to every registered client independently.
    ///
    /// A failed send is isolated: the client is evicted and the
    /// remaining members still receive the payload. Returns the ids of
    /// evicted clients.
    pub fn broadcast(&self, payload: &str) -> Result<Vec<u64>> {
        let snapshot: Vec<(u64, Arc<S>)> = {
            let clients = self.lock()?;
            clients
                .iter()
                .map(|(&id, sink)| (id, sink.clone()))
                .collect()
        };

        let mut evicted = Vec::new();
        for (id, sink) in snapshot {
            if let Err(e) = sink.send_text(payload) {
                log::info!("evicting client {}: {}", id, e);
                evicted.push(id);
            }
        }

        if !evicted.is_empty() {
            let mut clients = self.lock()?;
            for id in &evicted {
                clients.remove(id);
            }
        }
        Ok(evicted)
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<u64, Arc<S>>>> {
        self.clients
            .lock()
            .map_err(|_| anyhow!("client registry lock poisoned"))
    }
}

impl<S: ClientSink> Default for ClientRegistry<S> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicBool;

    struct FakeSink {
        delivered: Mutex<Vec<String>>,
        fail: AtomicBool,
    }

    impl FakeSink {
        fn new() -> Self {
            Self {
                delivered: Mutex::new(Vec::new()),
                fail: AtomicBool::new(false),
            }
        }

        fn failing() -> Self {
            let sink = Self::new();
            sink.fail.store(true, Ordering::SeqCst);
            sink
        }

        fn delivered(&self) -> Vec<String> {
            self.delivered.lock().unwrap().clone()
        }
    }

    impl ClientSink for FakeSink {
        fn send_text(&self, payload: &str) -> Result<()> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(anyhow!("connection closed"));
            }
            self.delivered.lock().unwrap().push(payload.to_string());
            Ok(())
        }
    }

    #[test]
    fn broadcast_reaches_all_healthy_clients() {
        let registry = ClientRegistry::new();
        let a = Arc::new(FakeSink::new());
        let b = Arc::new(FakeSink::new());
        registry.register(a.clone()).unwrap();
        registry.register(b.clone()).unwrap();

        let evicted = registry.broadcast("hello").unwrap();
        assert!(evicted.is_empty());
        assert_eq!(a.delivered(), vec!["hello"]);
        assert_eq!(b.delivered(), vec!["hello"]);
    }

    #[test]
    fn failed_send_is_isolated_and_evicts_only_that_client() {
        let registry = ClientRegistry::new();
        let first = Arc::new(FakeSink::new());
        let second = Arc::new(FakeSink::failing());
        let third = Arc::new(FakeSink::new());
        registry.register(first.clone()).unwrap();
        let second_id = registry.register(second.clone()).unwrap();
        registry.register(third.clone()).unwrap();

        let evicted = registry.broadcast("event").unwrap();
        assert_eq!(evicted, vec![second_id]);
        assert_eq!(first.delivered(), vec!["event"]);
        assert_eq!(third.delivered(), vec!["event"]);
        assert!(second.delivered().is_empty());
        assert_eq!(registry.len(), 2);

        // The evicted client receives nothing further.
        registry.broadcast("again").unwrap();
        assert!(second.delivered().is_empty());
        assert_eq!(first.delivered(), vec!["event", "again"]);
    }

    #[test]
    fn unregister_is_idempotent() {
        let registry = ClientRegistry::new();
        let id = registry.register(Arc::new(FakeSink::new())).unwrap();
        assert!(registry.unregister(id).unwrap());
        assert!(!registry.unregister(id).unwrap());
        assert!(registry.is_empty());
    }
}
