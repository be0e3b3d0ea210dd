//! samsara-pipe - Binary Entry Point
//!
//! Reads newline-delimited JSON events from stdin and records them through
//! a Samsara client. Configuration comes from an optional JSON file given as
//! the first argument, then `SAMSARA_*` environment variables. On EOF or
//! Ctrl+C the worker is stopped and whatever is still queued is published.

use std::env;
use std::io::{self, BufRead};
use std::sync::Arc;

use samsara_sdk::{Client, Config, Event, Publisher, SdkResult};
use serde_json::Value;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

fn load_config() -> SdkResult<Config> {
    let config = match env::args().nth(1) {
        Some(path) => Config::from_json_file(path)?,
        None => Config::default(),
    };
    Ok(config.apply_env_overrides()?)
}

/// Record every NDJSON event read from `reader`, returning how many were queued
///
/// Bad lines are logged and skipped. A read error ends the input early so the
/// caller still gets to flush what was recorded.
fn record_lines<P, R>(client: &Client<P>, mut reader: R) -> usize
where
    P: Publisher + 'static,
    R: BufRead,
{
    let mut recorded = 0usize;
    let mut raw = Vec::new();
    let mut line_num = 0usize;

    loop {
        raw.clear();
        match reader.read_until(b'\n', &mut raw) {
            Ok(0) => break,
            Ok(_) => line_num += 1,
            Err(e) => {
                warn!(line = line_num + 1, error = %e, "stopped reading input");
                break;
            }
        }

        let line = match std::str::from_utf8(&raw) {
            Ok(line) => line.trim(),
            Err(e) => {
                warn!(line = line_num, error = %e, "skipping unreadable line");
                continue;
            }
        };
        if line.is_empty() {
            continue;
        }

        let event = match serde_json::from_str::<Value>(line).map(Event::try_from) {
            Ok(Ok(event)) => event,
            Ok(Err(_)) => {
                warn!(line = line_num, "skipping non-object JSON value");
                continue;
            }
            Err(e) => {
                warn!(line = line_num, error = %e, "skipping malformed JSON");
                continue;
            }
        };

        match client.record_event(event) {
            Ok(()) => recorded += 1,
            Err(e) => error!(line = line_num, error = %e, "event rejected"),
        }
    }

    recorded
}

fn main() -> SdkResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let config = load_config()?;
    let client = Arc::new(Client::new(config)?);

    {
        let client = Arc::clone(&client);
        if let Err(e) = ctrlc::set_handler(move || {
            client.stop_publishing();
            let sent = client.flush_buffer();
            info!(sent, "interrupted, final flush done");
            std::process::exit(0);
        }) {
            warn!(error = %e, "could not install Ctrl+C handler");
        }
    }

    let recorded = record_lines(&*client, io::stdin().lock());

    client.stop_publishing();
    let sent = client.flush_buffer();
    info!(recorded, sent, remaining = client.buffered_count(), "input finished");

    Ok(())
}
