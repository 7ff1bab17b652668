pub mod stats;

mod get;
mod lifecycle;
mod put;

use crate::identity::client_identity;
use crate::keys::Keys;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;

/// A client-side handle onto one queue identity.
///
/// Owns the derived keyset and this client's identity tag, and caches the
/// last-observed `exists`/`bound`/`closed` flags. Every protocol operation
/// re-verifies the flags it depends on against the server rather than
/// trusting the cache; the cache exists for cheap inspection (`Handle`'s
/// `Debug` impl, callers wanting a best-effort peek) and is refreshed as a
/// side effect of each call.
///
/// Operations take `&mut self`: a `Handle` is not meant to be driven by two
/// concurrent operations at once. Share the cheaply-cloneable
/// `ConnectionManager` across tasks and give each task its own `Handle`.
pub struct Handle {
    conn: ConnectionManager,
    keys: Keys,
    identity: String,
    prefix: String,
    name: String,
    connected: bool,
    exists: bool,
    bound: Option<i64>,
    closed: bool,
}

impl std::fmt::Debug for Handle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Handle")
            .field("prefix", &self.prefix)
            .field("name", &self.name)
            .field("connected", &self.connected)
            .field("exists", &self.exists)
            .field("bound", &self.bound)
            .field("closed", &self.closed)
            .finish()
    }
}

impl Handle {
    /// Opens a handle onto `prefix:name`, probing (without mutating) its
    /// current existence, bound, and closed flags.
    pub async fn open(
        mut conn: ConnectionManager,
        prefix: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        let prefix = prefix.into();
        let name = name.into();
        let keys = Keys::new(&prefix, &name);

        let connected = matches!(
            redis::cmd("PING")
                .query_async::<String>(&mut conn)
                .await
                .as_deref(),
            Ok("PONG")
        );

        let bound: Option<i64> = conn.get(&keys.bound).await.unwrap_or(None);
        let closed: bool = conn.exists(&keys.closed).await.unwrap_or(false);

        tracing::debug!(prefix, name, connected, exists = bound.is_some(), "opened queue handle");

        Handle {
            conn,
            keys,
            identity: client_identity(),
            prefix,
            name,
            connected,
            exists: bound.is_some(),
            bound,
            closed,
        }
    }

    /// This queue's name, as given to `open`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether `open`'s initial `PING` was answered with `PONG`.
    pub fn connected(&self) -> bool {
        self.connected
    }

    /// Releases this handle's resources. Never mutates queue state.
    pub fn disconnect(self) {}
}

/// Blocks indefinitely until `key` holds at least one token, and consumes one.
pub(crate) async fn blocking_pop(conn: &mut ConnectionManager, key: &str) -> crate::Result<()> {
    let _: (String, i64) = redis::cmd("BRPOP")
        .arg(key)
        .arg(0)
        .query_async(conn)
        .await?;
    Ok(())
}

/// Signals "not full" by pushing a token and trimming the semaphore list back
/// to at most one token, per the binary-semaphore idiom (§9, "push then
/// trim").
pub(crate) async fn signal_not_full(conn: &mut ConnectionManager, not_full_key: &str) -> crate::Result<()> {
    let _: i64 = conn.lpush(not_full_key, 0).await?;
    let _: () = conn.ltrim(not_full_key, 0, 0).await?;
    Ok(())
}
