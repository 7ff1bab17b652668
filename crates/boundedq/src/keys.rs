//! Deterministic key derivation from (prefix, name, suffix).

/// The full Redis keyset addressed by a single queue identity.
///
/// Caller-supplied `prefix` and `name` must not contain `:`; this is a caller
/// invariant, not something this crate validates or escapes.
#[derive(Debug, Clone)]
pub(crate) struct Keys {
    pub queue: String,
    pub bound: String,
    pub producer: String,
    pub consumer: String,
    pub producer_free: String,
    pub consumer_free: String,
    pub not_full: String,
    pub closed: String,
    pub stats_produced_messages: String,
    pub stats_produced_bytes: String,
    pub stats_consumed_messages: String,
    pub stats_consumed_bytes: String,
}

impl Keys {
    pub fn new(prefix: &str, name: &str) -> Self {
        Self {
            queue: key(prefix, name, ""),
            bound: key(prefix, name, "bound"),
            producer: key(prefix, name, "producer"),
            consumer: key(prefix, name, "consumer"),
            producer_free: key(prefix, name, "producer_free"),
            consumer_free: key(prefix, name, "consumer_free"),
            not_full: key(prefix, name, "not_full"),
            closed: key(prefix, name, "closed"),
            stats_produced_messages: key(prefix, name, "stats:produced_messages"),
            stats_produced_bytes: key(prefix, name, "stats:produced_bytes"),
            stats_consumed_messages: key(prefix, name, "stats:consumed_messages"),
            stats_consumed_bytes: key(prefix, name, "stats:consumed_bytes"),
        }
    }

    /// All keys owned by this queue identity, for bulk deletion on `delete`.
    pub fn bookkeeping(&self) -> [&str; 10] {
        [
            self.producer.as_str(),
            self.consumer.as_str(),
            self.producer_free.as_str(),
            self.consumer_free.as_str(),
            self.not_full.as_str(),
            self.closed.as_str(),
            self.stats_produced_messages.as_str(),
            self.stats_produced_bytes.as_str(),
            self.stats_consumed_messages.as_str(),
            self.stats_consumed_bytes.as_str(),
        ]
    }
}

fn key(prefix: &str, name: &str, suffix: &str) -> String {
    if suffix.is_empty() {
        format!("{prefix}:{name}")
    } else {
        format!("{prefix}:{name}:{suffix}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_key_has_no_suffix() {
        let keys = Keys::new("__pressure__", "orders");
        assert_eq!(keys.queue, "__pressure__:orders");
    }

    #[test]
    fn suffixed_keys_append_the_suffix() {
        let keys = Keys::new("__pressure__", "orders");
        assert_eq!(keys.bound, "__pressure__:orders:bound");
        assert_eq!(
            keys.stats_produced_messages,
            "__pressure__:orders:stats:produced_messages"
        );
    }

    #[test]
    fn bookkeeping_excludes_queue_and_bound() {
        let keys = Keys::new("p", "n");
        let bookkeeping = keys.bookkeeping();
        assert!(!bookkeeping.contains(&keys.queue.as_str()));
        assert!(!bookkeeping.contains(&keys.bound.as_str()));
        assert_eq!(bookkeeping.len(), 10);
    }
}
