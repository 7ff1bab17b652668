//! Connection setup to the backing Redis server. This is explicitly out of
//! the core queue protocol, but a complete crate still needs it: the queue
//! protocol itself only ever consumes an already-open `ConnectionManager`.

use redis::aio::ConnectionManager;

/// Host/port/prefix defaults for connecting to the backing store and
/// addressing queues on it.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub prefix: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: crate::DEFAULT_PORT,
            prefix: crate::DEFAULT_PREFIX.to_string(),
        }
    }
}

impl Config {
    /// Opens a reconnecting connection using this config's `host`/`port`.
    /// The `prefix` is not consumed here -- it's handed to `Handle::open`
    /// alongside a queue name, not to the connection itself.
    pub async fn connect(&self) -> crate::Result<ConnectionManager> {
        connect(&self.host, self.port).await
    }
}

/// Opens a reconnecting connection to the Redis instance at `host:port`.
///
/// The returned `ConnectionManager` is cheap to clone and safe to share
/// across concurrently-running `Handle`s; it transparently reconnects on
/// transport failure rather than surfacing every blip as an error.
pub async fn connect(host: &str, port: u16) -> crate::Result<ConnectionManager> {
    let url = format!("redis://{host}:{port}/");
    tracing::debug!(host, port, "connecting to backing store");

    let client = redis::Client::open(url)?;
    let conn = client.get_connection_manager().await?;
    Ok(conn)
}

#[cfg(test)]
mod tests {
    use super::Config;

    #[test]
    fn default_config_matches_documented_defaults() {
        let config = Config::default();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, crate::DEFAULT_PORT);
        assert_eq!(config.prefix, crate::DEFAULT_PREFIX);
    }
}
