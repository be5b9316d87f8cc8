//! An embeddable, sharded in-memory cache that sits in front of a slower
//! backing store.
//!
//! # Features
//! - **Sharded**: keys are partitioned across independently locked shards, so
//!   writes to different shards never contend.
//! - **Lock-free reads**: each shard keeps its entries in a copy-on-write
//!   snapshot; lookups never take a lock.
//! - **Pluggable eviction**: LRU, LFU and FIFO, chosen once at construction.
//! - **Sliding TTL**: an optional expire-after-access strategy, plus explicit
//!   per-entry TTLs. Expiry is checked lazily on access.
//! - **Write propagation**: write-through (synchronous) or write-back
//!   (bounded queue drained by a background worker, drop-on-full).
//! - **Read-through loading**: concurrent misses on the same key share a
//!   single backing-store load.

// Public modules that form the API
pub mod builder;
pub mod config;
pub mod entry;
pub mod error;
pub mod expiration;
pub mod handles;
pub mod loader;
pub mod metrics;
pub mod policy;
pub mod refresh;
pub mod shard;
pub mod write_policy;

// Internal, crate-only modules
mod engine;
mod shared;
mod store;
mod time;

// Re-export the primary user-facing types for convenience
pub use builder::CacheBuilder;
pub use config::{CacheConfig, WritePolicyMode};
pub use entry::{CacheEntry, Timestamps};
pub use error::{BuildError, CacheError};
pub use expiration::{ExpirationStrategy, ExpireAfterAccess};
pub use handles::{Cache, Ttl};
pub use loader::{BoxError, Loader};
pub use metrics::{CacheMetrics, MetricsSink, MetricsSnapshot, NoopMetrics};
pub use policy::{EvictionPolicy, EvictionPolicyKind};
pub use refresh::RefreshHook;
pub use shard::{PowerOfTwoSelector, ShardSelector};
pub use write_policy::{WriteBack, WritePolicy, WriteThrough};
