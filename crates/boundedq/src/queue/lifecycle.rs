//! create / open-existing / close / delete / exists / length / is-closed.

use redis::AsyncCommands;

use super::{blocking_pop, Handle};

impl Handle {
    /// Attempts an atomic set-if-absent of the `bound` key, then seeds the
    /// three binary semaphores with a single token each. Idempotent against
    /// concurrent creators: of any number of racing `create` calls, exactly
    /// one observes success and the rest observe `QueueAlreadyExists`.
    pub async fn create(&mut self, bound: i64) -> crate::Result<()> {
        let created: bool = self.conn.set_nx(&self.keys.bound, bound).await?;
        if !created {
            return Err(crate::Error::QueueAlreadyExists);
        }

        for key in [
            &self.keys.producer_free,
            &self.keys.consumer_free,
            &self.keys.not_full,
        ] {
            let length: i64 = self.conn.lpush(key, 0).await?;
            if length != 1 {
                return Err(crate::Error::UnexpectedFailure(format!(
                    "seed push to {key} reported post-length {length}, expected 1"
                )));
            }
        }

        self.exists = true;
        self.bound = Some(bound);
        self.closed = false;
        tracing::debug!(prefix = %self.prefix, name = %self.name, bound, "created queue");
        Ok(())
    }

    /// A privileged producer that, instead of adding a message, pushes the
    /// close sentinel. See the module-level notes on the close double-push:
    /// one token for a consumer already blocked in the combined
    /// queue-or-closed wait, one durable token for every later arrival's
    /// existence probe.
    pub async fn close(&mut self) -> crate::Result<()> {
        blocking_pop(&mut self.conn, &self.keys.producer_free).await?;
        let result = self.close_locked().await;
        let _: i64 = self.conn.lpush(&self.keys.producer_free, 0).await?;
        result
    }

    async fn close_locked(&mut self) -> crate::Result<()> {
        let _: () = self.conn.set(&self.keys.producer, &self.identity).await?;

        let already_closed: bool = self.conn.exists(&self.keys.closed).await?;
        if already_closed {
            self.closed = true;
            return Err(crate::Error::QueueClosed);
        }

        let _: i64 = self.conn.lpush(&self.keys.closed, vec![0, 0]).await?;
        self.closed = true;
        tracing::debug!(prefix = %self.prefix, name = %self.name, "closed queue");
        Ok(())
    }

    /// Tears down every key this queue identity owns. Blocks until both the
    /// producer and consumer tickets can be acquired, so any `put`/`get`
    /// already in flight completes (or observes the close sentinel) first.
    pub async fn delete(&mut self) -> crate::Result<()> {
        let existed: bool = self.conn.exists(&self.keys.bound).await?;
        if !existed {
            return Err(crate::Error::QueueDoesNotExist);
        }

        let _: () = self.conn.del(&self.keys.bound).await?;
        let _: i64 = self.conn.lpush(&self.keys.not_full, 0).await?;
        let _: i64 = self.conn.lpush(&self.keys.closed, vec![0, 0]).await?;

        blocking_pop(&mut self.conn, &self.keys.producer_free).await?;
        blocking_pop(&mut self.conn, &self.keys.consumer_free).await?;

        let bookkeeping = self.keys.bookkeeping();
        let _: () = self.conn.del(bookkeeping.as_slice()).await?;
        let _: () = self.conn.del(&self.keys.queue).await?;

        self.exists = false;
        self.bound = None;
        self.closed = false;
        tracing::debug!(prefix = %self.prefix, name = %self.name, "deleted queue");
        Ok(())
    }

    /// Presence of the `bound` key; refreshes the handle's cached `exists`.
    pub async fn exists(&mut self) -> crate::Result<bool> {
        let exists: bool = self.conn.exists(&self.keys.bound).await?;
        self.exists = exists;
        Ok(exists)
    }

    /// List length of the queue's message list. `0` if the queue exists but
    /// nothing has been pushed to it yet (the list key is absent until the
    /// first `put`).
    pub async fn length(&mut self) -> crate::Result<i64> {
        if !self.exists().await? {
            return Err(crate::Error::QueueDoesNotExist);
        }
        let length: i64 = self.conn.llen(&self.keys.queue).await?;
        Ok(length)
    }

    /// Whether the `closed` flag has been set. Requires the queue to exist.
    pub async fn is_closed(&mut self) -> crate::Result<bool> {
        if !self.exists().await? {
            return Err(crate::Error::QueueDoesNotExist);
        }
        let closed: bool = self.conn.exists(&self.keys.closed).await?;
        self.closed = closed;
        Ok(closed)
    }
}
