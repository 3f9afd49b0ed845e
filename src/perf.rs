//! Opt-in timing and render event logging.
//!
//! Timing scopes report through `tracing` when enabled. The render event
//! log is a separate plain file that records image fetches and failures
//! with a millisecond offset from when the log was opened.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{LazyLock, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use tracing_subscriber::EnvFilter;

const TARGET: &str = "marklet::perf";

static ENABLED: AtomicBool = AtomicBool::new(false);
static EVENT_LOG: LazyLock<Mutex<Option<EventLog>>> = LazyLock::new(|| Mutex::new(None));

/// Times a region of code; reports when dropped.
#[derive(Debug)]
pub struct Scope {
    name: &'static str,
    start: Instant,
}

impl Drop for Scope {
    fn drop(&mut self) {
        if !is_enabled() {
            return;
        }
        let elapsed_ms = self.start.elapsed().as_secs_f64() * 1000.0;
        tracing::info!(target: TARGET, scope = self.name, elapsed_ms, "timing");
    }
}

#[derive(Debug)]
struct EventLog {
    start: Instant,
    writer: BufWriter<File>,
}

impl EventLog {
    fn write(&mut self, name: &str, detail: &str) -> std::io::Result<()> {
        let elapsed_ms = self.start.elapsed().as_secs_f64() * 1000.0;
        writeln!(self.writer, "[{elapsed_ms:>10.3} ms] {name}: {detail}")?;
        self.writer.flush()
    }
}

fn event_log() -> MutexGuard<'static, Option<EventLog>> {
    EVENT_LOG.lock().unwrap_or_else(PoisonError::into_inner)
}

pub fn set_enabled(enabled: bool) {
    ENABLED.store(enabled, Ordering::Relaxed);
}

pub fn is_enabled() -> bool {
    ENABLED.load(Ordering::Relaxed)
}

/// Filter for the binary's subscriber: `RUST_LOG` plus a `warn` default.
///
/// With `perf` set, timing events pass even when `RUST_LOG` is unset.
pub fn log_filter(perf: bool) -> EnvFilter {
    let filter = EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into());
    if !perf {
        return filter;
    }
    match format!("{TARGET}=info").parse() {
        Ok(directive) => filter.add_directive(directive),
        Err(err) => {
            tracing::debug!(%err, "invalid perf log directive");
            filter
        }
    }
}

pub fn scope(name: &'static str) -> Scope {
    Scope {
        name,
        start: Instant::now(),
    }
}

/// Open (or with `None`, close) the render event log.
pub fn set_debug_log_path(path: Option<&Path>) -> std::io::Result<()> {
    let mut log = event_log();
    *log = None;
    if let Some(path) = path {
        let mut opened = EventLog {
            start: Instant::now(),
            writer: BufWriter::new(File::create(path)?),
        };
        opened.write("log.start", "marklet render debug log")?;
        *log = Some(opened);
    }
    Ok(())
}

/// Append an event to the render log, if one is open.
pub fn log_event(name: &str, detail: impl AsRef<str>) {
    if let Some(log) = event_log().as_mut() {
        if let Err(err) = log.write(name, detail.as_ref()) {
            tracing::debug!(%err, "render debug log write failed");
        }
    }
}
