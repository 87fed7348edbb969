use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Refresh interval applied when a sport has none, or a zero one.
pub const DEFAULT_REFRESH_INTERVAL_SECS: u32 = 30;

/// Per-sport polling settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SportConfig {
    pub enabled: bool,
    pub refresh_interval_seconds: u32,
    pub last_updated: DateTime<Utc>,
}

impl SportConfig {
    pub fn new(enabled: bool, refresh_interval_seconds: u32) -> Self {
        Self {
            enabled,
            refresh_interval_seconds,
            last_updated: Utc::now(),
        }
    }

    /// Fallback for sports neither stored nor known to the registry.
    pub fn disabled_fallback() -> Self {
        Self::new(false, DEFAULT_REFRESH_INTERVAL_SECS)
    }

    /// Apply a partial update; absent fields keep their current value.
    pub fn merged(&self, patch: &SportConfigPatch, now: DateTime<Utc>) -> Self {
        Self {
            enabled: patch.enabled.unwrap_or(self.enabled),
            refresh_interval_seconds: patch
                .refresh_interval_seconds
                .unwrap_or(self.refresh_interval_seconds),
            last_updated: now,
        }
    }
}

/// Partial sport settings written with merge semantics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SportConfigPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_interval_seconds: Option<u32>,
}

impl SportConfigPatch {
    pub fn full(enabled: bool, refresh_interval_seconds: u32) -> Self {
        Self {
            enabled: Some(enabled),
            refresh_interval_seconds: Some(refresh_interval_seconds),
        }
    }

    /// A zero interval is coerced to the default cadence.
    pub fn sanitized(self) -> Self {
        Self {
            enabled: self.enabled,
            refresh_interval_seconds: self.refresh_interval_seconds.map(|secs| {
                if secs == 0 {
                    DEFAULT_REFRESH_INTERVAL_SECS
                } else {
                    secs
                }
            }),
        }
    }
}

/// Credential snapshot persisted to both storage tiers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialDocument {
    #[serde(default)]
    pub api_key: String,
    pub last_updated: DateTime<Utc>,
    #[serde(default)]
    pub is_active: bool,
}

/// Process-wide client configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientConfig {
    pub api_key: String,
    pub sports: HashMap<String, SportConfig>,
    pub last_updated: DateTime<Utc>,
    pub is_active: bool,
}

impl ClientConfig {
    /// Unconfigured state with the given sport table.
    pub fn empty(sports: HashMap<String, SportConfig>) -> Self {
        Self {
            api_key: String::new(),
            sports,
            last_updated: Utc::now(),
            is_active: false,
        }
    }

    pub fn from_credential(doc: CredentialDocument, sports: HashMap<String, SportConfig>) -> Self {
        Self {
            api_key: doc.api_key,
            sports,
            last_updated: doc.last_updated,
            is_active: doc.is_active,
        }
    }

    /// Sanitized credential fields, stamped now.
    pub fn credential(&self) -> CredentialDocument {
        CredentialDocument {
            api_key: self.api_key.clone(),
            last_updated: Utc::now(),
            is_active: self.is_active,
        }
    }

    pub fn has_api_key(&self) -> bool {
        !self.api_key.is_empty()
    }
}
