//! Configuration persistence
//!
//! - `DurableStore`: authoritative tier (PostgreSQL in production)
//! - `LocalMirror`: fast credential snapshot read once at startup
//! - `ConfigurationStore`: composes both tiers with registry defaults

pub mod config_store;
pub mod memory;
pub mod store;

pub use config_store::ConfigurationStore;
pub use memory::{MemoryMirror, MemoryStore};
pub use store::{DurableStore, LocalMirror};
