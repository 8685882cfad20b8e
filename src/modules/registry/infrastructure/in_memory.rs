use crate::modules::registry::domain::repository::RegistryRepository;
use crate::shared::errors::ScalingResult;
use async_trait::async_trait;
use std::collections::{BTreeMap, HashSet};
use tokio::sync::RwLock;
use tracing::debug;

/// Process-local registry backed by an ordered map.
///
/// Every operation takes the lock once, so single-key operations are
/// linearizable within the process.
#[derive(Debug, Default)]
pub struct InMemoryRegistryRepository {
    entries: RwLock<BTreeMap<String, String>>,
}

impl InMemoryRegistryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// All stored keys in order
    pub async fn keys(&self) -> Vec<String> {
        self.entries.read().await.keys().cloned().collect()
    }
}

fn normalize(key: &str) -> &str {
    key.trim_end_matches('/')
}

#[async_trait]
impl RegistryRepository for InMemoryRegistryRepository {
    async fn get(&self, key: &str) -> ScalingResult<Option<String>> {
        let value = self.entries.read().await.get(normalize(key)).cloned();
        debug!(key, hit = value.is_some(), "registry get");
        Ok(value)
    }

    async fn persist(&self, key: &str, value: &str) -> ScalingResult<()> {
        self.entries
            .write()
            .await
            .insert(normalize(key).to_string(), value.to_string());
        debug!(key, bytes = value.len(), "registry persist");
        Ok(())
    }

    async fn delete(&self, key: &str) -> ScalingResult<()> {
        let key = normalize(key);
        let prefix = format!("{}/", key);
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|k, _| k != key && !k.starts_with(&prefix));
        debug!(key, removed = before - entries.len(), "registry delete");
        Ok(())
    }

    async fn get_children_keys(&self, key: &str) -> ScalingResult<Vec<String>> {
        let prefix = format!("{}/", normalize(key));
        let entries = self.entries.read().await;
        let mut seen = HashSet::new();
        let children: Vec<String> = entries
            .range(prefix.clone()..)
            .take_while(|(k, _)| k.starts_with(&prefix))
            .filter_map(|(k, _)| k[prefix.len()..].split('/').next())
            .filter(|child| !child.is_empty())
            .filter(|child| seen.insert(child.to_string()))
            .map(str::to_string)
            .collect();
        debug!(key, count = children.len(), "registry children");
        Ok(children)
    }
}
