//! A distributed, bounded, blocking queue layered on a Redis backing store.
//!
//! Producers and consumers across arbitrarily many processes and hosts share a
//! named queue by pointing at the same Redis instance and agreeing on a
//! (prefix, name) pair. All mutual exclusion and blocking is implemented with
//! atomic Redis primitives -- there is no in-process coordinator and no
//! client-side locking.

mod connection;
mod identity;
mod keys;
mod queue;

pub use connection::{connect, Config};
pub use queue::{stats::Stats, Handle};

/// The conventional queue name prefix used by the reference CLI front-ends.
pub const DEFAULT_PREFIX: &str = "__pressure__";

/// Redis's standard TCP port.
pub const DEFAULT_PORT: u16 = 6379;

/// `0` as a `bound` means the queue never blocks producers.
pub const UNBOUNDED: i64 = 0;

pub type Result<T> = std::result::Result<T, Error>;

/// Every fallible outcome of the queue protocol, plus transport failures.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The queue's `bound` key was absent at the entry check.
    #[error("queue does not exist")]
    QueueDoesNotExist,

    /// `create`'s set-if-absent did not take effect.
    #[error("queue already exists")]
    QueueAlreadyExists,

    /// The `closed` flag is set, and the caller either cannot produce or has
    /// drained the remaining backlog as a consumer.
    #[error("queue is closed")]
    QueueClosed,

    /// A server primitive returned a value inconsistent with an invariant,
    /// e.g. a seed push reporting a post-length other than 1.
    #[error("unexpected server response: {0}")]
    UnexpectedFailure(String),

    /// A transport-level failure from the backing Redis connection: reset,
    /// DNS failure, protocol error. Distinct from the protocol's own
    /// indefinite blocking waits, which never time out.
    #[error(transparent)]
    Redis(#[from] redis::RedisError),
}
