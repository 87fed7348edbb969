pub mod adapters;
pub mod cli;
pub mod client;
pub mod config;
pub mod domain;
pub mod error;
pub mod persistence;

pub use adapters::{FileMirror, HttpTransport, PostgresStore};
pub use client::{
    CacheKey, ClientState, ClientStatsSnapshot, OddsClient, OddsClientOptions, OddsTransport,
    PollKind, RequestCache, RequestThrottler, TransportError, TransportResponse,
};
pub use config::AppConfig;
pub use domain::{ClientConfig, Event, Sport, SportConfig, SportConfigPatch, SportRegistry};
pub use error::{ApiError, OddsError, Result};
pub use persistence::{ConfigurationStore, DurableStore, LocalMirror, MemoryMirror, MemoryStore};
