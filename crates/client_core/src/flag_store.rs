use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;
use storage::Storage;
use tokio::sync::Mutex;

/// Keyed durable boolean store holding the client's local state.
#[async_trait]
pub trait FlagStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<bool>;
    async fn set(&self, key: &str, value: bool) -> Result<()>;
}

#[async_trait]
impl FlagStore for Storage {
    async fn get(&self, key: &str) -> Result<bool> {
        self.get_flag(key).await
    }

    async fn set(&self, key: &str, value: bool) -> Result<()> {
        self.set_flag(key, value).await
    }
}

#[derive(Default)]
pub struct MemoryFlagStore {
    flags: Mutex<HashMap<String, bool>>,
}

impl MemoryFlagStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_flag(key: &str, value: bool) -> Self {
        Self {
            flags: Mutex::new(HashMap::from([(key.to_string(), value)])),
        }
    }
}

#[async_trait]
impl FlagStore for MemoryFlagStore {
    async fn get(&self, key: &str) -> Result<bool> {
        Ok(self.flags.lock().await.get(key).copied().unwrap_or(false))
    }

    async fn set(&self, key: &str, value: bool) -> Result<()> {
        self.flags.lock().await.insert(key.to_string(), value);
        Ok(())
    }
}
