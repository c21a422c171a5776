// src/state.rs
use std::sync::Arc;
use std::time::Duration;

use crate::services::chatbot::ChatService;
use crate::services::conversation::ConversationStore;
use crate::services::metrics_manager::MetricsManager;
use crate::services::provider::ProviderClient;

pub type SharedState = Arc<AppState>;

pub struct AppState {
    pub chat: ChatService,
    pub conversations: ConversationStore,
    pub metrics: MetricsManager,
    /// Kept for grading, which talks to the provider directly.
    pub provider: Option<ProviderClient>,
    /// Admin routes stay locked when this is `None`.
    pub admin_api_key: Option<String>,
}

impl AppState {
    pub fn new(
        chat: ChatService,
        provider: Option<ProviderClient>,
        admin_api_key: Option<String>,
        conversation_ttl: Duration,
    ) -> Self {
        Self {
            chat,
            conversations: ConversationStore::new(conversation_ttl),
            metrics: MetricsManager::new(),
            provider,
            admin_api_key,
        }
    }
}
