//! In-process storage tiers, used for ephemeral runs and tests.

use super::store::{DurableStore, LocalMirror};
use crate::domain::{CredentialDocument, SportConfig, SportConfigPatch, DEFAULT_REFRESH_INTERVAL_SECS};
use crate::error::{OddsError, Result};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;

/// Durable store kept in memory
#[derive(Default)]
pub struct MemoryStore {
    credential: RwLock<Option<CredentialDocument>>,
    sports: RwLock<HashMap<String, SportConfig>>,
    unavailable: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_credential(doc: CredentialDocument) -> Self {
        Self {
            credential: RwLock::new(Some(doc)),
            ..Self::default()
        }
    }

    /// Simulate an outage: every operation fails until cleared.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(OddsError::Storage("memory store unavailable".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl DurableStore for MemoryStore {
    async fn load_credential(&self) -> Result<Option<CredentialDocument>> {
        self.check_available()?;
        Ok(self.credential.read().await.clone())
    }

    async fn save_credential(&self, doc: &CredentialDocument) -> Result<()> {
        self.check_available()?;
        *self.credential.write().await = Some(doc.clone());
        Ok(())
    }

    async fn load_sports(&self) -> Result<HashMap<String, SportConfig>> {
        self.check_available()?;
        Ok(self.sports.read().await.clone())
    }

    async fn merge_sport(&self, sport_id: &str, patch: &SportConfigPatch) -> Result<SportConfig> {
        self.check_available()?;
        let now = Utc::now();
        let mut sports = self.sports.write().await;
        let merged = match sports.get(sport_id) {
            Some(existing) => existing.merged(patch, now),
            None => SportConfig {
                enabled: patch.enabled.unwrap_or(false),
                refresh_interval_seconds: patch
                    .refresh_interval_seconds
                    .unwrap_or(DEFAULT_REFRESH_INTERVAL_SECS),
                last_updated: now,
            },
        };
        sports.insert(sport_id.to_string(), merged.clone());
        Ok(merged)
    }
}

/// Local mirror kept in memory
#[derive(Default)]
pub struct MemoryMirror {
    snapshot: RwLock<Option<CredentialDocument>>,
}

impl MemoryMirror {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LocalMirror for MemoryMirror {
    async fn load(&self) -> Result<Option<CredentialDocument>> {
        Ok(self.snapshot.read().await.clone())
    }

    async fn save(&self, doc: &CredentialDocument) -> Result<()> {
        *self.snapshot.write().await = Some(doc.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_merge_sport_preserves_unspecified_fields() {
        let store = MemoryStore::new();
        store
            .merge_sport("soccer_epl", &SportConfigPatch::full(true, 15))
            .await
            .unwrap();

        let merged = store
            .merge_sport(
                "soccer_epl",
                &SportConfigPatch {
                    enabled: Some(false),
                    refresh_interval_seconds: None,
                },
            )
            .await
            .unwrap();

        assert!(!merged.enabled);
        assert_eq!(merged.refresh_interval_seconds, 15);
        assert_eq!(store.load_sports().await.unwrap()["soccer_epl"], merged);
    }

    #[tokio::test]
    async fn test_unavailable_store_errors() {
        let store = MemoryStore::new();
        store.set_unavailable(true);
        assert!(store.load_credential().await.is_err());
        store.set_unavailable(false);
        assert!(store.load_credential().await.unwrap().is_none());
    }
}
