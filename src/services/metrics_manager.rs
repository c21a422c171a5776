use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Debug, Default, Clone, Serialize)]
pub struct MetricsData {
    /// Replies by producing branch: provider / knowledge_base / unmatched.
    pub origin_usage: HashMap<String, u64>,
    /// Hit counts per matched lesson name.
    pub lesson_usage: HashMap<String, u64>,
}

#[derive(Debug, Clone)]
pub struct MetricsManager {
    inner: Arc<RwLock<MetricsData>>,
}

impl Default for MetricsManager {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsManager {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(MetricsData::default())),
        }
    }

    pub async fn increment_origin(&self, origin: &str) {
        let mut data = self.inner.write().await;
        *data.origin_usage.entry(origin.to_string()).or_insert(0) += 1;
    }

    pub async fn increment_lesson(&self, lesson_name: &str) {
        let mut data = self.inner.write().await;
        *data.lesson_usage.entry(lesson_name.to_string()).or_insert(0) += 1;
    }

    pub async fn get_metrics(&self) -> MetricsData {
        self.inner.read().await.clone()
    }
}
