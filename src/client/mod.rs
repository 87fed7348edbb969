//! Odds data-access layer
//!
//! - `RequestCache`: last response per request signature, 30 s freshness
//! - `RequestThrottler`: one global request lane plus in-flight deduplication
//! - `OddsClient`: the policy layer consumers talk to

pub mod cache;
pub mod odds;
pub mod poll;
pub mod stats;
pub mod throttle;
pub mod transport;

pub use cache::{CacheKey, RequestCache};
pub use odds::{ClientState, OddsClient, OddsClientOptions};
pub use poll::PollKind;
pub use stats::{ClientStats, ClientStatsSnapshot};
pub use throttle::RequestThrottler;
pub use transport::{OddsTransport, TransportError, TransportResponse};
