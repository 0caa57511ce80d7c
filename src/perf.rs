//! Timing and change-batch tracing.
//!
//! [`scope`] timers report through `tracing` when enabled. Separately, every
//! batch the change pipeline handles can be appended to an event log file,
//! one line per batch listing its records.

use std::fmt::Write as _;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use crate::editor::Change;

static ENABLED: AtomicBool = AtomicBool::new(false);
static EVENT_LOG: Mutex<Option<EventLog>> = Mutex::new(None);

pub fn set_enabled(enabled: bool) {
    ENABLED.store(enabled, Ordering::Relaxed);
}

pub fn is_enabled() -> bool {
    ENABLED.load(Ordering::Relaxed)
}

#[derive(Debug)]
pub struct Scope {
    name: &'static str,
    start: Instant,
}

/// Time the enclosing block; reported on drop when enabled.
pub fn scope(name: &'static str) -> Scope {
    Scope {
        name,
        start: Instant::now(),
    }
}

impl Drop for Scope {
    fn drop(&mut self) {
        if is_enabled() {
            let elapsed_ms = self.start.elapsed().as_secs_f64() * 1000.0;
            tracing::info!(target: "keyline::perf", scope = self.name, elapsed_ms, "timing");
        }
    }
}

#[derive(Debug)]
struct EventLog {
    opened: Instant,
    batches: u64,
    out: BufWriter<File>,
}

fn event_log() -> MutexGuard<'static, Option<EventLog>> {
    EVENT_LOG.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Start appending change batches to a fresh file at `path`; `None` stops.
///
/// # Errors
/// The file cannot be created or its header written.
pub fn open_event_log(path: Option<&Path>) -> io::Result<()> {
    let mut log = event_log();
    let Some(path) = path else {
        *log = None;
        return Ok(());
    };
    let mut out = BufWriter::new(File::create(path)?);
    writeln!(out, "# keyline change log")?;
    out.flush()?;
    *log = Some(EventLog {
        opened: Instant::now(),
        batches: 0,
        out,
    });
    Ok(())
}

pub fn event_log_enabled() -> bool {
    event_log().is_some()
}

/// Append one delivered batch. A no-op while no log is open.
pub fn record_batch(changes: &[Change]) {
    let mut guard = event_log();
    let Some(log) = guard.as_mut() else {
        return;
    };
    log.batches += 1;
    let elapsed_ms = log.opened.elapsed().as_secs_f64() * 1000.0;
    let line = format!(
        "[{elapsed_ms:>10.3} ms] batch {}: {}",
        log.batches,
        describe_batch(changes)
    );
    if writeln!(log.out, "{line}").and_then(|()| log.out.flush()).is_err() {
        tracing::warn!("change log write failed, closing it");
        *guard = None;
    }
}

/// `"3 records: edited L0, inserted L1, removed L2"`.
fn describe_batch(changes: &[Change]) -> String {
    let mut text = format!(
        "{} record{}",
        changes.len(),
        if changes.len() == 1 { "" } else { "s" }
    );
    for (i, change) in changes.iter().enumerate() {
        let verb = match change {
            Change::TextEdited(_) => "edited",
            Change::LineInserted(_) => "inserted",
            Change::LineRemoved(_) => "removed",
        };
        let sep = if i == 0 { ": " } else { ", " };
        let _ = write!(text, "{sep}{verb} {}", change.line());
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::LineBuffer;
    use tempfile::NamedTempFile;

    #[test]
    fn test_set_enabled_toggles_runtime_flag() {
        set_enabled(true);
        assert!(is_enabled());

        set_enabled(false);
        assert!(!is_enabled());
    }

    #[test]
    fn test_describe_batch_lists_records_in_order() {
        let mut buffer = LineBuffer::from_lines(["a", "b"]);
        let first = buffer.line_at(0).unwrap().id();
        let second = buffer.line_at(1).unwrap().id();
        buffer.insert_str(first, 1, "x").unwrap();
        let added = buffer.insert_line(2, "c").unwrap();
        buffer.remove_line(second).unwrap();

        assert_eq!(
            describe_batch(buffer.pending_changes()),
            format!("3 records: edited {first}, inserted {added}, removed {second}")
        );
        assert_eq!(describe_batch(&[]), "0 records");
    }

    #[test]
    fn test_event_log_records_batches() {
        let temp_file = NamedTempFile::new().unwrap();
        let mut buffer = LineBuffer::from_lines(["todo"]);
        let id = buffer.line_at(0).unwrap().id();
        buffer.insert_str(id, 4, " later").unwrap();

        open_event_log(Some(temp_file.path())).unwrap();
        assert!(event_log_enabled());
        record_batch(buffer.pending_changes());
        open_event_log(None).unwrap();
        assert!(!event_log_enabled());

        let content = std::fs::read_to_string(temp_file.path()).unwrap();
        assert!(content.starts_with("# keyline change log"));
        assert!(content.contains(&format!("1 record: edited {id}")));
    }
}
