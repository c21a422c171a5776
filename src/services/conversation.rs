// src/services/conversation.rs
use std::{
    collections::HashMap,
    fmt::Debug,
    sync::Arc,
    time::{Duration, Instant},
};

use tokio::sync::RwLock;
use uuid::Uuid;

use crate::message::{HistoryTurn, TurnRole};

#[derive(Clone, Debug)]
struct Conversation {
    turns: Vec<HistoryTurn>,
    last_active: Instant,
}

impl Conversation {
    fn new() -> Self {
        Self { turns: Vec::new(), last_active: Instant::now() }
    }
}

/// Server-side conversation history, keyed by conversation id. Entries expire
/// after `ttl` of inactivity.
#[derive(Clone)]
pub struct ConversationStore {
    inner: Arc<RwLock<HashMap<String, Conversation>>>,
    ttl: Duration,
}

impl Debug for ConversationStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConversationStore")
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl ConversationStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    /// Create a fresh conversation and return its id.
    pub async fn create(&self) -> String {
        let id = Uuid::new_v4().to_string();
        let mut guard = self.inner.write().await;
        guard.insert(id.clone(), Conversation::new());
        id
    }

    /// Ensure there's a conversation with this id.
    pub async fn ensure(&self, id: &str) {
        {
            let guard = self.inner.read().await;
            if guard.contains_key(id) {
                return;
            }
        }
        let mut guard = self.inner.write().await;
        guard.entry(id.to_string()).or_insert_with(Conversation::new);
    }

    /// Append a turn and touch last_active. Returns the new turn count.
    pub async fn append_turn(
        &self,
        id: &str,
        role: TurnRole,
        content: impl Into<String>,
    ) -> usize {
        let mut guard = self.inner.write().await;
        let entry = guard
            .entry(id.to_string())
            .or_insert_with(Conversation::new);
        entry.turns.push(HistoryTurn { role, content: content.into() });
        entry.last_active = Instant::now();
        entry.turns.len()
    }

    /// Get a copy of the stored turns, oldest first.
    pub async fn history(&self, id: &str) -> Option<Vec<HistoryTurn>> {
        let guard = self.inner.read().await;
        guard.get(id).map(|c| c.turns.clone())
    }

    /// Remove a conversation by id.
    pub async fn remove(&self, id: &str) -> bool {
        let mut guard = self.inner.write().await;
        guard.remove(id).is_some()
    }

    /// Remove conversations idle longer than ttl. Returns number removed.
    pub async fn purge_expired(&self) -> usize {
        let mut guard = self.inner.write().await;
        let now = Instant::now();
        let before = guard.len();
        guard.retain(|_, c| now.duration_since(c.last_active) < self.ttl);
        before - guard.len()
    }

    pub async fn len(&self) -> usize {
        let guard = self.inner.read().await;
        guard.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
