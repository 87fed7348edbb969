//! Two-tier configuration store.
//!
//! Reads come from the durable store and degrade to "nothing stored" when it
//! fails, so a storage outage never blocks odds retrieval. Writes go to both
//! tiers; only durable-store write failures are reported to the caller.

use super::store::{DurableStore, LocalMirror};
use crate::domain::{ClientConfig, CredentialDocument, SportConfig, SportConfigPatch, SportRegistry};
use crate::error::Result;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

pub struct ConfigurationStore {
    durable: Arc<dyn DurableStore>,
    mirror: Arc<dyn LocalMirror>,
    registry: SportRegistry,
}

impl ConfigurationStore {
    pub fn new(
        durable: Arc<dyn DurableStore>,
        mirror: Arc<dyn LocalMirror>,
        registry: SportRegistry,
    ) -> Self {
        Self {
            durable,
            mirror,
            registry,
        }
    }

    pub fn registry(&self) -> &SportRegistry {
        &self.registry
    }

    /// Stored configuration merged over registry defaults, `None` on first run.
    #[instrument(skip(self))]
    pub async fn load_active_configuration(&self) -> Option<ClientConfig> {
        let credential = match self.durable.load_credential().await {
            Ok(Some(doc)) => doc,
            Ok(None) => {
                debug!("No stored odds configuration yet");
                return None;
            }
            Err(e) => {
                warn!("Failed to load odds configuration: {}", e);
                return None;
            }
        };

        let sports = self.load_sports_configurations().await;
        Some(ClientConfig::from_credential(credential, sports))
    }

    /// Credential snapshot from the local mirror.
    pub async fn load_mirror(&self) -> Option<CredentialDocument> {
        match self.mirror.load().await {
            Ok(doc) => doc,
            Err(e) => {
                warn!("Failed to read local credential mirror: {}", e);
                None
            }
        }
    }

    /// Write the sanitized credential fields to both tiers.
    ///
    /// The mirror is only touched once the durable write succeeded.
    #[instrument(skip_all)]
    pub async fn persist_credential(&self, config: &ClientConfig) -> Result<()> {
        let doc = config.credential();

        if let Err(e) = self.durable.save_credential(&doc).await {
            error!("Failed to persist odds credential: {}", e);
            return Err(e);
        }

        if let Err(e) = self.mirror.save(&doc).await {
            warn!("Failed to update local credential mirror: {}", e);
        }

        info!(active = doc.is_active, "Persisted odds credential");
        Ok(())
    }

    /// Upsert one sport's settings.
    #[instrument(skip(self))]
    pub async fn save_sport_config(
        &self,
        sport_id: &str,
        patch: SportConfigPatch,
    ) -> Result<SportConfig> {
        let patch = patch.sanitized();
        match self.durable.merge_sport(sport_id, &patch).await {
            Ok(stored) => {
                info!(
                    sport = sport_id,
                    enabled = stored.enabled,
                    interval = stored.refresh_interval_seconds,
                    "Saved sport config"
                );
                Ok(stored)
            }
            Err(e) => {
                error!("Failed to save sport config for {}: {}", sport_id, e);
                Err(e)
            }
        }
    }

    /// Stored sport overrides over registry defaults.
    pub async fn load_sports_configurations(&self) -> HashMap<String, SportConfig> {
        let mut sports = self.registry.defaults();
        match self.durable.load_sports().await {
            Ok(stored) => sports.extend(stored),
            Err(e) => warn!("Failed to load sport configs, using defaults: {}", e),
        }
        sports
    }
}
