//! End-to-end protocol scenarios against a live Redis instance.
//!
//! These tests require a real backing store: set `REDIS_URL` (e.g.
//! `redis://127.0.0.1:6379/`) before running `cargo test`. When it is unset
//! the tests are skipped with an explanatory message rather than failing,
//! since a live Redis instance isn't assumed to be present in every
//! environment this crate is built in.

use std::time::Duration;

use boundedq::{Error, Handle};

/// Every queue name gets a random suffix so concurrent test runs (and
/// repeated runs against a Redis instance that was never cleaned up) never
/// collide on the same keys.
fn unique_name(test: &str) -> String {
    use std::sync::atomic::{AtomicU64, Ordering};
    static COUNTER: AtomicU64 = AtomicU64::new(0);

    let n = COUNTER.fetch_add(1, Ordering::Relaxed);
    let pid = std::process::id();
    format!("test_{test}_{pid}_{n}")
}

/// Returns `Some(REDIS_URL)` if set, otherwise prints a skip notice and
/// returns `None`. Callers should `return` early on `None`.
fn redis_url() -> Option<String> {
    match std::env::var("REDIS_URL") {
        Ok(url) => Some(url),
        Err(_) => {
            eprintln!("skipping: REDIS_URL is not set");
            None
        }
    }
}

async fn open_handle(url: &str, name: &str) -> Handle {
    let (host, port) = parse_host_port(url);
    let conn = boundedq::connect(&host, port)
        .await
        .expect("connecting to REDIS_URL");
    Handle::open(conn, "__pressure_test__", name.to_string()).await
}

fn parse_host_port(url: &str) -> (String, u16) {
    let without_scheme = url.trim_start_matches("redis://").trim_end_matches('/');
    match without_scheme.rsplit_once(':') {
        Some((host, port)) => (host.to_string(), port.parse().expect("numeric port")),
        None => (without_scheme.to_string(), boundedq::DEFAULT_PORT),
    }
}

async fn cleanup(mut handle: Handle) {
    let _ = handle.delete().await;
}

#[tokio::test]
async fn lifecycle_happy_path() {
    let Some(url) = redis_url() else { return };
    let name = unique_name("lifecycle");
    let mut handle = open_handle(&url, &name).await;

    handle.create(5).await.expect("create");

    handle.put(b"a").await.expect("put a");
    handle.put(b"b").await.expect("put b");
    handle.put(b"c").await.expect("put c");

    assert_eq!(handle.length().await.expect("length"), 3);

    assert_eq!(handle.get().await.expect("get a").as_ref(), b"a");
    assert_eq!(handle.get().await.expect("get b").as_ref(), b"b");

    handle.close().await.expect("close");

    assert_eq!(handle.get().await.expect("get c").as_ref(), b"c");
    assert!(matches!(handle.get().await, Err(Error::QueueClosed)));

    assert!(handle.is_closed().await.expect("is_closed"));

    handle.delete().await.expect("delete");
    assert!(!handle.exists().await.expect("exists"));
}

#[tokio::test]
async fn double_create_reports_already_exists() {
    let Some(url) = redis_url() else { return };
    let name = unique_name("double_create");
    let mut handle = open_handle(&url, &name).await;

    handle.create(5).await.expect("first create");
    let second = handle.create(5).await;
    assert!(matches!(second, Err(Error::QueueAlreadyExists)));

    cleanup(handle).await;
}

#[tokio::test]
async fn bound_blocks_producer_until_a_consumer_makes_room() {
    let Some(url) = redis_url() else { return };
    let name = unique_name("bound_blocks");

    let mut producer = open_handle(&url, &name).await;
    producer.create(2).await.expect("create");

    producer.put(b"x").await.expect("put x");
    producer.put(b"y").await.expect("put y");

    let blocked_put = {
        let url = url.clone();
        let name = name.clone();
        tokio::spawn(async move {
            let mut producer = open_handle(&url, &name).await;
            producer.put(b"z").await
        })
    };

    // Give the blocked put a moment to actually be waiting on `not_full`
    // before a consumer makes room; this is a best-effort ordering nudge,
    // not something the protocol depends on for correctness.
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(!blocked_put.is_finished());

    let mut consumer = open_handle(&url, &name).await;
    let dequeued = consumer.get().await.expect("get");
    assert_eq!(dequeued.as_ref(), b"x");

    blocked_put
        .await
        .expect("task join")
        .expect("put z after room freed");

    assert_eq!(consumer.get().await.expect("get y").as_ref(), b"y");
    assert_eq!(consumer.get().await.expect("get z").as_ref(), b"z");

    cleanup(consumer).await;
}

#[tokio::test]
async fn close_while_consumer_is_blocked_unblocks_it() {
    let Some(url) = redis_url() else { return };
    let name = unique_name("close_blocked_consumer");

    let mut consumer = open_handle(&url, &name).await;
    consumer.create(0).await.expect("create");

    let blocked_get = {
        let url = url.clone();
        let name = name.clone();
        tokio::spawn(async move {
            let mut consumer = open_handle(&url, &name).await;
            consumer.get().await
        })
    };

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(!blocked_get.is_finished());

    let mut closer = open_handle(&url, &name).await;
    closer.close().await.expect("close");

    let result = blocked_get.await.expect("task join");
    assert!(matches!(result, Err(Error::QueueClosed)));

    cleanup(consumer).await;
}

#[tokio::test]
async fn close_with_residual_messages_drains_before_reporting_closed() {
    let Some(url) = redis_url() else { return };
    let name = unique_name("close_with_residual");
    let mut handle = open_handle(&url, &name).await;

    handle.create(0).await.expect("create");
    handle.put(b"m1").await.expect("put m1");
    handle.put(b"m2").await.expect("put m2");
    handle.close().await.expect("close");

    assert_eq!(handle.get().await.expect("get m1").as_ref(), b"m1");
    assert_eq!(handle.get().await.expect("get m2").as_ref(), b"m2");
    assert!(matches!(handle.get().await, Err(Error::QueueClosed)));

    cleanup(handle).await;
}

#[tokio::test]
async fn delete_unblocks_a_blocked_producer_and_consumer() {
    let Some(url) = redis_url() else { return };
    let name = unique_name("delete_unblocks");

    let mut seed = open_handle(&url, &name).await;
    seed.create(1).await.expect("create");
    seed.put(b"fills the bound").await.expect("fill queue");

    let blocked_put = {
        let url = url.clone();
        let name = name.clone();
        tokio::spawn(async move {
            let mut producer = open_handle(&url, &name).await;
            producer.put(b"never fits").await
        })
    };

    tokio::time::sleep(Duration::from_millis(100)).await;

    // Drain the one message so the consumer side has nothing left to block
    // on, leaving only the producer blocked on `not_full` (already full
    // again is avoided since we don't refill).
    let deleter_name = name.clone();
    let deleter_url = url.clone();
    tokio::time::sleep(Duration::from_millis(50)).await;

    let mut deleter = open_handle(&deleter_url, &deleter_name).await;
    deleter.delete().await.expect("delete");

    let put_result = blocked_put.await.expect("task join");
    assert!(matches!(
        put_result,
        Err(Error::QueueClosed) | Err(Error::QueueDoesNotExist)
    ));

    assert!(!deleter.exists().await.expect("exists"));
}

#[tokio::test]
async fn stats_are_monotone_and_track_queue_length() {
    let Some(url) = redis_url() else { return };
    let name = unique_name("stats_monotone");
    let mut handle = open_handle(&url, &name).await;

    handle.create(0).await.expect("create");

    let before = handle.stats().await.expect("stats before");
    handle.put(b"hello").await.expect("put");
    handle.put(b"world!").await.expect("put");
    let after_puts = handle.stats().await.expect("stats after puts");

    assert_eq!(
        after_puts.produced_messages,
        before.produced_messages + 2
    );
    assert_eq!(
        after_puts.produced_bytes,
        before.produced_bytes + "hello".len() as i64 + "world!".len() as i64
    );
    assert_eq!(
        after_puts.produced_messages - after_puts.consumed_messages,
        handle.length().await.expect("length")
    );

    handle.get().await.expect("get");
    let after_get = handle.stats().await.expect("stats after get");
    assert_eq!(after_get.consumed_messages, after_puts.consumed_messages + 1);
    assert_eq!(after_get.consumed_bytes, after_puts.consumed_bytes + 5);

    cleanup(handle).await;
}

#[tokio::test]
async fn round_trips_arbitrary_bytes_including_embedded_nuls() {
    let Some(url) = redis_url() else { return };
    let name = unique_name("byte_round_trip");
    let mut handle = open_handle(&url, &name).await;

    handle.create(0).await.expect("create");

    let payload: &[u8] = &[0, 1, 2, 0, 255, 0, 254, 0];
    handle.put(payload).await.expect("put");
    let got = handle.get().await.expect("get");

    assert_eq!(got.as_ref(), payload);

    cleanup(handle).await;
}

#[tokio::test]
async fn free_tokens_are_quiescent_at_length_one_after_create() {
    let Some(url) = redis_url() else { return };
    let name = unique_name("quiescent_tokens");
    let mut handle = open_handle(&url, &name).await;

    handle.create(3).await.expect("create");
    handle.put(b"x").await.expect("put");
    handle.get().await.expect("get");

    // After a full put/get round-trip with nothing in flight, every binary
    // semaphore must be back to exactly one token -- `not_full` included,
    // never more, per the push-then-trim idiom.
    let client = redis::Client::open(url.as_str()).expect("redis client");
    let mut raw = client
        .get_multiplexed_async_connection()
        .await
        .expect("raw connection");

    for suffix in ["producer_free", "consumer_free", "not_full"] {
        let key = format!("__pressure_test__:{name}:{suffix}");
        let length: i64 = redis::AsyncCommands::llen(&mut raw, &key)
            .await
            .expect("llen");
        assert_eq!(length, 1, "{key} should hold exactly one token at rest");
    }

    cleanup(handle).await;
}
