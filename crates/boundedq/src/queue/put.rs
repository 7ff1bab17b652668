//! Bounded blocking enqueue with close detection and stats.

use redis::AsyncCommands;

use super::{blocking_pop, signal_not_full, Handle};

impl Handle {
    /// Enqueues `message`, blocking indefinitely on the producer ticket and,
    /// for bounded queues, on room becoming available.
    ///
    /// Every exit below ticket acquisition releases `producer_free` before
    /// returning -- the liveness rule from the error design: a producer that
    /// acquired the ticket must give it back, on success, on `QueueClosed`,
    /// or on a propagated transport error.
    pub async fn put(&mut self, message: &[u8]) -> crate::Result<()> {
        // Fetched fresh rather than trusting the handle's cached `bound`:
        // another client may have created the queue (or we may simply be
        // stale) since this handle last observed it, and step 5 below needs
        // the actual bound, not just its presence.
        let bound: Option<i64> = self.conn.get(&self.keys.bound).await?;
        let Some(bound) = bound else {
            return Err(crate::Error::QueueDoesNotExist);
        };
        self.exists = true;
        self.bound = Some(bound);

        tracing::trace!(prefix = %self.prefix, name = %self.name, "producer waiting for ticket");
        blocking_pop(&mut self.conn, &self.keys.producer_free).await?;
        tracing::trace!(prefix = %self.prefix, name = %self.name, "producer holds ticket");

        let result = self.put_locked(bound, message).await;
        let _: i64 = self.conn.lpush(&self.keys.producer_free, 0).await?;
        result
    }

    async fn put_locked(&mut self, bound: i64, message: &[u8]) -> crate::Result<()> {
        let _: () = self.conn.set(&self.keys.producer, &self.identity).await?;

        let closed: bool = self.conn.exists(&self.keys.closed).await?;
        if closed {
            self.closed = true;
            return Err(crate::Error::QueueClosed);
        }

        if bound > 0 {
            tracing::trace!(prefix = %self.prefix, name = %self.name, "producer waiting for room");
            blocking_pop(&mut self.conn, &self.keys.not_full).await?;
        }

        let length: i64 = self.conn.lpush(&self.keys.queue, message).await?;

        if bound > 0 && length < bound {
            signal_not_full(&mut self.conn, &self.keys.not_full).await?;
        }

        let _: i64 = self
            .conn
            .incr(&self.keys.stats_produced_messages, 1)
            .await?;
        let _: i64 = self
            .conn
            .incr(&self.keys.stats_produced_bytes, message.len() as i64)
            .await?;

        tracing::trace!(prefix = %self.prefix, name = %self.name, bytes = message.len(), "produced message");
        Ok(())
    }
}
