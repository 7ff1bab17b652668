//! Monotonic counters for message/byte counts on both sides of the queue.

use redis::AsyncCommands;

use super::Handle;

/// A point-in-time snapshot of a queue's four monotone counters.
///
/// Readers see at-least their own prior observations (the counters never
/// decrease) but no total-order guarantee relative to other queue state, or
/// between the four fields themselves -- a snapshot may be torn, e.g.
/// `produced_messages` incremented but `consumed_messages` not yet, and that
/// is consistent with counters being advisory rather than transactional.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
    pub produced_messages: i64,
    pub produced_bytes: i64,
    pub consumed_messages: i64,
    pub consumed_bytes: i64,
}

impl Handle {
    /// Samples the four stats counters. A queue that has never seen a
    /// put/get on one side simply reads zero for that side's counters,
    /// rather than erroring on an absent key.
    pub async fn stats(&mut self) -> crate::Result<Stats> {
        let produced_messages: Option<i64> =
            self.conn.get(&self.keys.stats_produced_messages).await?;
        let produced_bytes: Option<i64> = self.conn.get(&self.keys.stats_produced_bytes).await?;
        let consumed_messages: Option<i64> =
            self.conn.get(&self.keys.stats_consumed_messages).await?;
        let consumed_bytes: Option<i64> = self.conn.get(&self.keys.stats_consumed_bytes).await?;

        Ok(Stats {
            produced_messages: produced_messages.unwrap_or(0),
            produced_bytes: produced_bytes.unwrap_or(0),
            consumed_messages: consumed_messages.unwrap_or(0),
            consumed_bytes: consumed_bytes.unwrap_or(0),
        })
    }
}
