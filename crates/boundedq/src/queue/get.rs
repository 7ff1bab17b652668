//! Blocking dequeue with drain-then-stop on close, and stats.

use bytes::Bytes;
use redis::AsyncCommands;

use super::{blocking_pop, signal_not_full, Handle};

impl Handle {
    /// Dequeues the oldest message, blocking indefinitely on the consumer
    /// ticket and then on data (or close) becoming available.
    ///
    /// Every exit below ticket acquisition releases `consumer_free` before
    /// returning, mirroring the same liveness rule `put` honors for
    /// `producer_free`.
    pub async fn get(&mut self) -> crate::Result<Bytes> {
        let exists: bool = self.conn.exists(&self.keys.bound).await?;
        if !exists {
            return Err(crate::Error::QueueDoesNotExist);
        }

        tracing::trace!(prefix = %self.prefix, name = %self.name, "consumer waiting for ticket");
        blocking_pop(&mut self.conn, &self.keys.consumer_free).await?;
        tracing::trace!(prefix = %self.prefix, name = %self.name, "consumer holds ticket");

        let result = self.get_locked().await;
        let _: i64 = self.conn.lpush(&self.keys.consumer_free, 0).await?;
        result
    }

    async fn get_locked(&mut self) -> crate::Result<Bytes> {
        let _: () = self.conn.set(&self.keys.consumer, &self.identity).await?;

        let closed: bool = self.conn.exists(&self.keys.closed).await?;
        let payload = if closed {
            self.closed = true;
            self.drain_after_close().await?
        } else {
            self.wait_for_data_or_close().await?
        };

        signal_not_full(&mut self.conn, &self.keys.not_full).await?;

        let _: i64 = self
            .conn
            .incr(&self.keys.stats_consumed_messages, 1)
            .await?;
        let _: i64 = self
            .conn
            .incr(&self.keys.stats_consumed_bytes, payload.len() as i64)
            .await?;

        tracing::trace!(prefix = %self.prefix, name = %self.name, bytes = payload.len(), "consumed message");
        Ok(payload)
    }

    /// The queue is already marked closed: serve residual backlog until the
    /// list is drained, then report `QueueClosed` instead of blocking.
    async fn drain_after_close(&mut self) -> crate::Result<Bytes> {
        let has_messages: bool = self.conn.exists(&self.keys.queue).await?;
        if !has_messages {
            return Err(crate::Error::QueueClosed);
        }

        let (_, value): (String, Vec<u8>) = redis::cmd("BRPOP")
            .arg(&self.keys.queue)
            .arg(0)
            .query_async(&mut self.conn)
            .await?;
        Ok(value.into())
    }

    /// The queue is open: block on whichever of the queue list or `closed`
    /// fires first. If `closed` fires, this consumes one of the two tokens
    /// `close` pushed -- the second remains so later arrivals still observe
    /// closure via their own existence probe.
    async fn wait_for_data_or_close(&mut self) -> crate::Result<Bytes> {
        let (fired, value): (String, Vec<u8>) = redis::cmd("BRPOP")
            .arg(&self.keys.queue)
            .arg(&self.keys.closed)
            .arg(0)
            .query_async(&mut self.conn)
            .await?;

        if fired == self.keys.closed {
            self.closed = true;
            return Err(crate::Error::QueueClosed);
        }

        Ok(value.into())
    }
}
