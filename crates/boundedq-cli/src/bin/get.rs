//! Thin stdout front-end for `boundedq`: creates (or opens) a queue and
//! writes each consumed message to standard output with a trailing newline,
//! until the queue is closed and drained.
//!
//! This binary is a thin example driving the library, not part of the core
//! queue protocol.

use anyhow::Context;
use clap::Parser;
use tokio::io::AsyncWriteExt;

use boundedq::{Config, UNBOUNDED};

/// Consumes messages from a queue until it is closed, writing each to
/// standard output.
#[derive(Parser, Debug)]
#[command(about, version)]
struct Args {
    /// Backing Redis host.
    #[arg(long, env = "BOUNDEDQ_HOST", default_value_t = Config::default().host)]
    host: String,

    /// Backing Redis port.
    #[arg(long, env = "BOUNDEDQ_PORT", default_value_t = Config::default().port)]
    port: u16,

    /// Queue name prefix.
    #[arg(long, env = "BOUNDEDQ_PREFIX", default_value_t = Config::default().prefix)]
    prefix: String,

    /// Name of the queue to consume messages from.
    queue: String,

    /// Bound to create the queue with, if it does not already exist.
    /// 0 means unbounded.
    #[arg(long, default_value_t = UNBOUNDED)]
    bound: i64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    tracing::debug!(?args, "starting bq-get");

    let config = Config {
        host: args.host.clone(),
        port: args.port,
        prefix: args.prefix.clone(),
    };
    let conn = config
        .connect()
        .await
        .context("connecting to the backing Redis store")?;
    let mut handle = boundedq::Handle::open(conn, args.prefix.clone(), args.queue.clone()).await;

    match handle.create(args.bound).await {
        Ok(()) | Err(boundedq::Error::QueueAlreadyExists) => {}
        Err(err) => return Err(err).context("creating queue"),
    }

    let mut stdout = tokio::io::stdout();
    let mut consumed = 0u64;

    loop {
        match handle.get().await {
            Ok(message) => {
                stdout
                    .write_all(&message)
                    .await
                    .context("writing message to standard output")?;
                stdout
                    .write_all(b"\n")
                    .await
                    .context("writing message to standard output")?;
                consumed += 1;
            }
            Err(boundedq::Error::QueueClosed) => break,
            Err(err) => return Err(err).context("getting message"),
        }
    }

    stdout.flush().await.context("flushing standard output")?;
    tracing::info!(consumed, queue = %args.queue, "queue closed and drained");
    Ok(())
}
