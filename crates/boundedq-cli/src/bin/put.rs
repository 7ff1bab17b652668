//! Thin stdin front-end for `boundedq`: creates (or opens) a queue, reads
//! lines from standard input, puts each stripped of its trailing newline as
//! one message, and closes the queue at end-of-input.
//!
//! This binary is a thin example driving the library, not part of the core
//! queue protocol.

use anyhow::Context;
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};

use boundedq::{Config, UNBOUNDED};

/// Reads lines from standard input and enqueues each as one message.
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

    /// Name of the queue to put messages onto.
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
    tracing::debug!(?args, "starting bq-put");

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

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut produced = 0u64;

    while let Some(line) = lines.next_line().await.context("reading standard input")? {
        match handle.put(line.as_bytes()).await {
            Ok(()) => produced += 1,
            Err(boundedq::Error::QueueClosed) => {
                anyhow::bail!("queue {:?} was closed by another client", args.queue)
            }
            Err(err) => return Err(err).context("putting message"),
        }
    }

    match handle.close().await {
        Ok(()) | Err(boundedq::Error::QueueClosed) => {}
        Err(err) => return Err(err).context("closing queue"),
    }
    tracing::info!(produced, queue = %args.queue, "end of input; closed queue");
    Ok(())
}
