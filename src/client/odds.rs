//! Odds client
//!
//! Public entry point for odds consumers. Every data call follows the same
//! path: sport gate, credential check, fresh cache lookup, then a throttled
//! and deduplicated provider call whose failures are classified here.

use super::cache::{CacheKey, RequestCache};
use super::poll::PollKind;
use super::stats::{ClientStats, ClientStatsSnapshot};
use super::throttle::RequestThrottler;
use super::transport::{OddsTransport, TransportResponse};
use crate::config::AppConfig;
use crate::domain::{ClientConfig, Event, Sport, SportConfig, SportConfigPatch, SportRegistry};
use crate::error::{ApiError, Result};
use crate::persistence::ConfigurationStore;
use chrono::Utc;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::{Arc, RwLock, RwLockReadGuard};
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

/// Client lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientState {
    Uninitialized,
    Initializing,
    Ready,
}

/// Tunables for [`OddsClient`]
#[derive(Debug, Clone)]
pub struct OddsClientOptions {
    pub region: String,
    pub market: String,
    pub scores_days_from: u32,
    pub probe_timeout: Duration,
    pub request_timeout: Duration,
    pub cache_ttl: Duration,
    pub request_delay: Duration,
    /// Used only when neither storage tier holds a credential
    pub bootstrap_api_key: Option<String>,
}

impl Default for OddsClientOptions {
    fn default() -> Self {
        Self::from_config(&AppConfig::default_config())
    }
}

impl OddsClientOptions {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            region: config.provider.region.clone(),
            market: config.provider.market.clone(),
            scores_days_from: config.client.scores_days_from,
            probe_timeout: config.provider.probe_timeout(),
            request_timeout: config.provider.request_timeout(),
            cache_ttl: config.client.cache_ttl(),
            request_delay: config.client.request_delay(),
            bootstrap_api_key: config
                .provider
                .api_key
                .clone()
                .filter(|k| !k.trim().is_empty()),
        }
    }
}

/// Checks that a payload decodes as the caller's response type.
type ShapeCheck = fn(&Value) -> std::result::Result<(), String>;

fn decodes_as<T: DeserializeOwned>(value: &Value) -> std::result::Result<(), String> {
    T::deserialize(value).map(|_| ()).map_err(|e| e.to_string())
}

/// Everything one provider call needs, owned so it can outlive the caller.
struct Fetch {
    transport: Arc<dyn OddsTransport>,
    config: Arc<RwLock<ClientConfig>>,
    cache: Arc<RequestCache>,
    stats: Arc<ClientStats>,
    key: CacheKey,
    path: String,
    params: Vec<(&'static str, String)>,
    shape: ShapeCheck,
    timeout: Duration,
}

impl Fetch {
    /// Fresh cached answer, consulted once the call reaches the lane.
    fn cached(&self) -> Option<Value> {
        let hit = self.cache.get(&self.key)?;
        self.stats.inc_cache_hits();
        Some(hit)
    }

    async fn execute(&self) -> std::result::Result<Value, ApiError> {
        // Generation first, then the credential: a key change in between
        // makes this result uncacheable
        let generation = self.cache.generation();
        let api_key = {
            let config = self.config.read().unwrap_or_else(|e| e.into_inner());
            if !config.has_api_key() {
                return Err(ApiError::KeyRequired);
            }
            config.api_key.clone()
        };

        let mut query: Vec<(String, String)> = self
            .params
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect();
        query.push(("apiKey".to_string(), api_key));

        self.stats.inc_network_calls();
        let response = match self.transport.get(&self.path, &query, self.timeout).await {
            Ok(response) => response,
            Err(e) => {
                self.stats.inc_failures();
                warn!(key = %self.key, "Odds request failed: {}", e);
                return Err(ApiError::Connection(e.to_string()));
            }
        };

        self.classify(response, generation)
    }

    fn classify(
        &self,
        response: TransportResponse,
        generation: u64,
    ) -> std::result::Result<Value, ApiError> {
        if response.is_success() {
            if let Err(e) = (self.shape)(&response.body) {
                self.stats.inc_failures();
                warn!(key = %self.key, "Unexpected odds payload: {}", e);
                return Err(ApiError::Connection(format!("unexpected response body: {}", e)));
            }
            self.cache
                .set_if_current(self.key.clone(), response.body.clone(), generation);
            return Ok(response.body);
        }

        match response.status {
            401 => {
                self.stats.inc_failures();
                warn!(key = %self.key, "Odds provider rejected the API key");
                Err(ApiError::KeyInvalid)
            }
            429 => {
                self.stats.inc_rate_limited();
                match self.cache.get_stale(&self.key) {
                    Some(stale) => {
                        self.stats.inc_stale_fallbacks();
                        warn!(key = %self.key, "Rate limited, serving cached data");
                        Ok(stale)
                    }
                    None => {
                        warn!(key = %self.key, "Rate limited with nothing cached");
                        Err(ApiError::RateLimited)
                    }
                }
            }
            404 => {
                // Provider answers 404 for sports without current events
                self.stats.inc_not_found();
                debug!(key = %self.key, "Not found, caching empty result");
                let empty = Value::Array(Vec::new());
                self.cache
                    .set_if_current(self.key.clone(), empty.clone(), generation);
                Ok(empty)
            }
            status => {
                self.stats.inc_failures();
                warn!(key = %self.key, status, "Unexpected odds provider status");
                Err(ApiError::Connection(format!("unexpected status {}", status)))
            }
        }
    }
}

pub struct OddsClient {
    transport: Arc<dyn OddsTransport>,
    store: Arc<ConfigurationStore>,
    options: OddsClientOptions,
    config: Arc<RwLock<ClientConfig>>,
    state: RwLock<ClientState>,
    init: OnceCell<()>,
    cache: Arc<RequestCache>,
    throttler: RequestThrottler<Value>,
    stats: Arc<ClientStats>,
}

impl OddsClient {
    /// Create a client; stored configuration is loaded on first use.
    pub fn new(
        transport: Arc<dyn OddsTransport>,
        store: Arc<ConfigurationStore>,
        options: OddsClientOptions,
    ) -> Self {
        let defaults = store.registry().defaults();
        Self {
            transport,
            cache: Arc::new(RequestCache::new(options.cache_ttl)),
            throttler: RequestThrottler::new(options.request_delay),
            stats: Arc::new(ClientStats::new()),
            config: Arc::new(RwLock::new(ClientConfig::empty(defaults))),
            state: RwLock::new(ClientState::Uninitialized),
            init: OnceCell::new(),
            store,
            options,
        }
    }

    /// Load stored configuration and probe the stored credential, once.
    pub async fn initialize(&self) {
        self.init.get_or_init(|| self.hydrate()).await;
    }

    async fn hydrate(&self) {
        self.set_state(ClientState::Initializing);

        let mut config = match self.store.load_active_configuration().await {
            Some(config) => config,
            None => {
                let sports = self.store.load_sports_configurations().await;
                match self.store.load_mirror().await {
                    Some(doc) => {
                        debug!("Using credential from local mirror");
                        ClientConfig::from_credential(doc, sports)
                    }
                    None => ClientConfig::empty(sports),
                }
            }
        };

        if !config.has_api_key() {
            if let Some(key) = &self.options.bootstrap_api_key {
                debug!("Using bootstrap API key from configuration");
                config.api_key = key.clone();
            }
        }

        if config.has_api_key() {
            match self.probe(&config.api_key).await {
                Ok(()) => {
                    config.is_active = true;
                    info!("Odds API credential verified");
                }
                Err(e) => {
                    config.is_active = false;
                    warn!("Stored odds API credential unusable ({}): {}", e.code(), e);
                }
            }
        }

        *self.config.write().unwrap_or_else(|e| e.into_inner()) = config;
        self.set_state(ClientState::Ready);
    }

    pub fn state(&self) -> ClientState {
        *self.state.read().unwrap_or_else(|e| e.into_inner())
    }

    fn set_state(&self, state: ClientState) {
        *self.state.write().unwrap_or_else(|e| e.into_inner()) = state;
    }

    fn read_config(&self) -> RwLockReadGuard<'_, ClientConfig> {
        self.config.read().unwrap_or_else(|e| e.into_inner())
    }

    /// Initialized with a verified, active credential.
    pub fn is_configured(&self) -> bool {
        let config = self.read_config();
        self.state() == ClientState::Ready && config.has_api_key() && config.is_active
    }

    pub fn api_key(&self) -> String {
        self.read_config().api_key.clone()
    }

    /// Stored override, then registry default, then disabled.
    pub fn get_sport_config(&self, sport_id: &str) -> SportConfig {
        self.store
            .registry()
            .resolve(sport_id, &self.read_config().sports)
    }

    /// Every registry sport plus any stored override, resolved and sorted by id.
    pub fn sport_configs(&self) -> Vec<(String, SportConfig)> {
        let config = self.read_config();
        let registry = self.store.registry();
        let mut ids: Vec<String> = registry.keys().into_iter().map(String::from).collect();
        ids.extend(config.sports.keys().cloned());
        ids.sort();
        ids.dedup();
        ids.into_iter()
            .map(|id| {
                let resolved = registry.resolve(&id, &config.sports);
                (id, resolved)
            })
            .collect()
    }

    /// How often a consumer should refresh `kind` for a sport.
    pub fn poll_interval(&self, kind: PollKind, sport_id: &str) -> Duration {
        kind.interval_for(&self.get_sport_config(sport_id))
    }

    pub fn stats(&self) -> ClientStatsSnapshot {
        self.stats.snapshot(self.throttler.joined())
    }

    pub fn cache(&self) -> &RequestCache {
        &self.cache
    }

    /// Minimum spacing between provider calls.
    pub fn request_delay(&self) -> Duration {
        self.throttler.min_delay()
    }

    pub fn registry(&self) -> &SportRegistry {
        self.store.registry()
    }

    /// Live connectivity check for a credential.
    async fn probe(&self, api_key: &str) -> std::result::Result<(), ApiError> {
        self.stats.inc_probes();
        let query = vec![("apiKey".to_string(), api_key.to_string())];
        match self
            .transport
            .get("", &query, self.options.probe_timeout)
            .await
        {
            Ok(response) if response.is_success() => Ok(()),
            Ok(response) if response.status == 401 => Err(ApiError::KeyInvalid),
            Ok(response) if response.status == 429 => Err(ApiError::RateLimited),
            Ok(response) => Err(ApiError::Connection(format!(
                "probe returned status {}",
                response.status
            ))),
            Err(e) => Err(ApiError::Connection(e.to_string())),
        }
    }

    /// Verify, persist and activate a new credential.
    ///
    /// On probe failure nothing changes and `API_KEY_INVALID` is returned.
    pub async fn set_api_key(&self, key: &str) -> Result<()> {
        self.initialize().await;

        let key = key.trim();
        if key.is_empty() {
            return Err(ApiError::KeyInvalid.into());
        }

        if let Err(e) = self.probe(key).await {
            warn!("New odds API key failed verification: {}", e);
            return Err(ApiError::KeyInvalid.into());
        }

        let mut updated = self.read_config().clone();
        updated.api_key = key.to_string();
        updated.is_active = true;
        updated.last_updated = Utc::now();

        self.store.persist_credential(&updated).await?;
        *self.config.write().unwrap_or_else(|e| e.into_inner()) = updated;
        self.cache.clear();

        info!("Odds API key updated");
        Ok(())
    }

    /// Persist one sport's settings; cached results are dropped.
    pub async fn set_sport_config(
        &self,
        sport_id: &str,
        enabled: bool,
        refresh_interval_seconds: u32,
    ) -> Result<SportConfig> {
        self.initialize().await;

        let stored = self
            .store
            .save_sport_config(
                sport_id,
                SportConfigPatch::full(enabled, refresh_interval_seconds),
            )
            .await?;

        self.config
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .sports
            .insert(sport_id.to_string(), stored.clone());
        self.cache.clear();

        Ok(stored)
    }

    pub async fn list_sports(&self) -> Result<Vec<Sport>> {
        self.initialize().await;
        self.request("/".to_string(), Vec::new()).await
    }

    /// Upcoming odds in the configured region.
    pub async fn get_odds(&self, sport_id: &str) -> Result<Vec<Event>> {
        let region = self.options.region.clone();
        self.get_odds_in_region(sport_id, &region).await
    }

    pub async fn get_odds_in_region(&self, sport_id: &str, region: &str) -> Result<Vec<Event>> {
        self.ensure_enabled(sport_id).await?;
        self.request(
            format!("/{}/odds", sport_id),
            self.odds_params(region),
        )
        .await
    }

    pub async fn get_live_events(&self, sport_id: &str) -> Result<Vec<Event>> {
        self.ensure_enabled(sport_id).await?;
        self.request(
            format!("/{}/odds-live", sport_id),
            vec![("markets", self.options.market.clone())],
        )
        .await
    }

    pub async fn get_scores(&self, sport_id: &str) -> Result<Vec<Event>> {
        self.get_scores_since(sport_id, self.options.scores_days_from)
            .await
    }

    pub async fn get_scores_since(&self, sport_id: &str, days_from: u32) -> Result<Vec<Event>> {
        self.ensure_enabled(sport_id).await?;
        self.request(
            format!("/{}/scores", sport_id),
            vec![("daysFrom", days_from.to_string())],
        )
        .await
    }

    /// Fresh cached odds for a sport in the default region, without any
    /// network activity.
    pub fn cached_odds(&self, sport_id: &str) -> Option<Vec<Event>> {
        let key = CacheKey::new(
            &format!("/{}/odds", sport_id),
            &self.odds_params(&self.options.region),
        );
        let value = self.cache.get(&key)?;
        serde_json::from_value(value).ok()
    }

    fn odds_params(&self, region: &str) -> Vec<(&'static str, String)> {
        vec![
            ("regions", region.to_string()),
            ("markets", self.options.market.clone()),
        ]
    }

    async fn ensure_enabled(&self, sport_id: &str) -> Result<()> {
        self.initialize().await;
        if self.get_sport_config(sport_id).enabled {
            Ok(())
        } else {
            debug!(sport = sport_id, "Sport disabled, skipping request");
            Err(ApiError::SportDisabled {
                sport: sport_id.to_string(),
            }
            .into())
        }
    }

    async fn request<T: DeserializeOwned>(
        &self,
        endpoint: String,
        params: Vec<(&'static str, String)>,
    ) -> Result<T> {
        if !self.read_config().has_api_key() {
            return Err(ApiError::KeyRequired.into());
        }

        let key = CacheKey::new(&endpoint, &params);
        if let Some(hit) = self.cache.get(&key) {
            self.stats.inc_cache_hits();
            return decode(hit);
        }

        let fetch = Arc::new(Fetch {
            transport: self.transport.clone(),
            config: self.config.clone(),
            cache: self.cache.clone(),
            stats: self.stats.clone(),
            key: key.clone(),
            path: endpoint,
            params,
            shape: decodes_as::<T>,
            timeout: self.options.request_timeout,
        });
        let queued = fetch.clone();

        let value = self
            .throttler
            .run(
                &key,
                move || queued.cached(),
                move || async move { fetch.execute().await },
            )
            .await?;
        decode(value)
    }
}

/// A payload that does not match the response type is a provider failure.
fn decode<T: DeserializeOwned>(value: Value) -> Result<T> {
    serde_json::from_value(value)
        .map_err(|e| ApiError::Connection(format!("unexpected response body: {}", e)).into())
}

