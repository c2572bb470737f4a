//! Tracing setup shared by the Lambda entry and the local runner.
//!
//! Everything goes to stdout through a compact formatter. Lambda ships stdout to CloudWatch
//! Logs one line per event, and CloudWatch stamps each line on ingestion, so when
//! `AWS_LAMBDA_FUNCTION_NAME` is present the formatter drops timestamps and ANSI escapes (which
//! CloudWatch would otherwise show as raw `\x1b[..m` noise). The `invocation` span opened per
//! request in `main.rs` carries the Lambda request id, so every line of a record's trail can be
//! correlated with the platform's `START`/`END`/`REPORT` lines.
//!
//! Off Lambda the usual local format (timestamps, colours) is kept. `DOCPIPE_LOG_FILE` adds a
//! second, uncoloured sink appended through a non-blocking writer; its guard lives for the
//! rest of the process so buffered lines are flushed on exit.
use std::sync::OnceLock;

use tracing::Subscriber;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::{EnvFilter, Layer, fmt, prelude::*, registry::LookupSpan};

const LAMBDA_MARKER: &str = "AWS_LAMBDA_FUNCTION_NAME";
const LOG_FILE_VAR: &str = "DOCPIPE_LOG_FILE";

static FILE_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

/// Install the global subscriber. Filtering follows `RUST_LOG` and defaults to `info`.
///
/// Call once, before the first invocation is served.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let in_lambda = std::env::var_os(LAMBDA_MARKER).is_some();

    tracing_subscriber::registry()
        .with(filter)
        .with(stdout_layer(in_lambda))
        .with(file_writer().map(|writer| {
            fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .compact()
        }))
        .init();
}

fn stdout_layer<S>(in_lambda: bool) -> Box<dyn Layer<S> + Send + Sync>
where
    S: Subscriber + for<'span> LookupSpan<'span>,
{
    let layer = fmt::layer().with_target(false).compact();
    if in_lambda {
        layer.with_ansi(false).without_time().boxed()
    } else {
        layer.boxed()
    }
}

/// Non-blocking writer for `DOCPIPE_LOG_FILE`. An unopenable path is reported on stderr and
/// skipped so logging to stdout still works.
fn file_writer() -> Option<NonBlocking> {
    let path = std::env::var(LOG_FILE_VAR)
        .ok()
        .filter(|value| !value.trim().is_empty())?;
    let file = match std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
    {
        Ok(file) => file,
        Err(err) => {
            eprintln!("Failed to open log file {path}: {err}");
            return None;
        }
    };
    let (writer, guard) = tracing_appender::non_blocking(file);
    let _ = FILE_GUARD.set(guard);
    Some(writer)
}
