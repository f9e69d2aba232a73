use std::collections::HashMap;
use std::sync::Arc;

use hive_common::{EventId, HiveId};
use tokio::sync::{Mutex, RwLock};
use tracing::warn;

use crate::event::ProposedEvent;

/// In-memory store of events, one lock per event.
///
/// The outer map lock is only held to find or insert an entry; all work on
/// an event happens under that event's own mutex.
#[derive(Debug, Default, Clone)]
pub struct EventPool {
    events: Arc<RwLock<HashMap<EventId, Arc<Mutex<ProposedEvent>>>>>,
}

impl EventPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an event; an existing event with the same id is kept.
    pub async fn add(&self, event: ProposedEvent) -> bool {
        let mut events = self.events.write().await;
        if events.contains_key(&event.id) {
            warn!("⚠️ Event with id [{}] already exists in the pool", event.id);
            return false;
        }
        events.insert(event.id.clone(), Arc::new(Mutex::new(event)));
        true
    }

    /// Handle to the event's lock.
    pub async fn handle(&self, id: &EventId) -> Option<Arc<Mutex<ProposedEvent>>> {
        self.events.read().await.get(id).cloned()
    }

    pub async fn snapshot(&self, id: &EventId) -> Option<ProposedEvent> {
        let handle = self.handle(id).await?;
        let event = handle.lock().await;
        Some(event.clone())
    }

    pub async fn remove(&self, id: &EventId) -> Option<ProposedEvent> {
        let handle = self.events.write().await.remove(id)?;
        let event = handle.lock().await;
        Some(event.clone())
    }

    /// Events of a hive, newest first.
    pub async fn by_hive(&self, hive: &HiveId) -> Vec<ProposedEvent> {
        let handles: Vec<_> = self.events.read().await.values().cloned().collect();
        let mut out = Vec::new();
        for handle in handles {
            let event = handle.lock().await;
            if &event.hive_id == hive {
                out.push(event.clone());
            }
        }
        out.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        out
    }

    pub async fn len(&self) -> usize {
        self.events.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
