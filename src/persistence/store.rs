//! Storage seams for the two configuration tiers.

use crate::domain::{CredentialDocument, SportConfig, SportConfigPatch};
use crate::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;

/// Authoritative store, shared across sessions and processes
#[async_trait]
pub trait DurableStore: Send + Sync {
    /// Current credential document, `None` before first configuration
    async fn load_credential(&self) -> Result<Option<CredentialDocument>>;

    /// Merge the credential document into the store
    async fn save_credential(&self, doc: &CredentialDocument) -> Result<()>;

    /// Every stored sport override
    async fn load_sports(&self) -> Result<HashMap<String, SportConfig>>;

    /// Upsert one sport with merge semantics, returning the stored record.
    /// The store assigns `last_updated`.
    async fn merge_sport(&self, sport_id: &str, patch: &SportConfigPatch) -> Result<SportConfig>;
}

/// Fast local copy of the credential snapshot
#[async_trait]
pub trait LocalMirror: Send + Sync {
    async fn load(&self) -> Result<Option<CredentialDocument>>;

    async fn save(&self, doc: &CredentialDocument) -> Result<()>;
}
