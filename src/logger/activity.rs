//! Activity logger: a dedicated thread owns the [`JsonlWriter`].
//!
//! Callers send [`ActivityEvent`]s through a bounded crossbeam channel with
//! `try_send`, so browsing never waits on log I/O. Events that do not fit are
//! counted and reported by the logger thread on its next write.

#![allow(missing_docs)]

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;

use crossbeam_channel::{Receiver, Sender, TrySendError, bounded};

use crate::core::errors::{MflixError, Result};
use crate::logger::jsonl::{EventType, JsonlConfig, JsonlWriter, LogEntry, Severity};

const CHANNEL_CAPACITY: usize = 512;

/// Something worth recording about a browsing session.
#[derive(Debug, Clone, PartialEq)]
pub enum ActivityEvent {
    SessionStarted {
        version: String,
        config_hash: String,
        store: String,
    },
    SessionEnded {
        reason: String,
    },
    QueryExecuted {
        filter: serde_json::Value,
        page: u64,
        page_size: u32,
        returned: usize,
        total: u64,
        duration_ms: u64,
    },
    PreloadFilled {
        page: u64,
        generation: u64,
        returned: usize,
    },
    /// A refill finished after a newer request superseded it.
    PreloadDiscarded {
        page: u64,
        generation: u64,
    },
    MovieInserted {
        id: i64,
        title: String,
    },
    MoviesImported {
        inserted: usize,
        skipped: usize,
        duration_ms: u64,
    },
    Error {
        code: String,
        message: String,
    },
    /// Stops the logger thread.
    Shutdown,
}

impl ActivityEvent {
    pub fn error(err: &MflixError) -> Self {
        Self::Error {
            code: err.code().to_string(),
            message: err.to_string(),
        }
    }
}

/// Cloneable, non-blocking sender for activity events.
#[derive(Debug, Clone)]
pub struct ActivityLoggerHandle {
    tx: Sender<ActivityEvent>,
    dropped_events: Arc<AtomicU64>,
}

impl ActivityLoggerHandle {
    /// A handle whose events go nowhere (logging disabled).
    pub fn disabled() -> Self {
        let (handle, _rx) = Self::detached(1);
        handle
    }

    /// A handle plus the raw receiving end, without a logger thread.
    pub fn detached(capacity: usize) -> (Self, Receiver<ActivityEvent>) {
        let (tx, rx) = bounded(capacity);
        (
            Self {
                tx,
                dropped_events: Arc::new(AtomicU64::new(0)),
            },
            rx,
        )
    }

    /// Queue an event; drops it (and counts the drop) if the channel is full.
    pub fn send(&self, event: ActivityEvent) {
        if let Err(TrySendError::Full(_)) = self.tx.try_send(event) {
            self.dropped_events.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn dropped_events(&self) -> u64 {
        self.dropped_events.load(Ordering::Relaxed)
    }

    /// Ask the logger thread to flush and exit. Blocks only if the queue is full.
    pub fn shutdown(&self) {
        let _ = self.tx.send(ActivityEvent::Shutdown);
    }
}

/// Spawn the logger thread writing JSONL according to `config`.
pub fn spawn_logger(
    config: JsonlConfig,
) -> Result<(ActivityLoggerHandle, thread::JoinHandle<()>)> {
    let (handle, rx) = ActivityLoggerHandle::detached(CHANNEL_CAPACITY);
    let dropped = Arc::clone(&handle.dropped_events);

    let join = thread::Builder::new()
        .name("mflix-logger".to_string())
        .spawn(move || logger_thread_main(&rx, config, &dropped))
        .map_err(|e| MflixError::Runtime {
            details: format!("failed to spawn logger thread: {e}"),
        })?;

    Ok((handle, join))
}

fn logger_thread_main(rx: &Receiver<ActivityEvent>, config: JsonlConfig, dropped: &AtomicU64) {
    let mut jsonl = JsonlWriter::open(config);

    while let Ok(event) = rx.recv() {
        let lost = dropped.swap(0, Ordering::Relaxed);
        if lost > 0 {
            let mut warn = LogEntry::new(EventType::Error, Severity::Warning);
            warn.details = Some(format!("{lost} log events dropped due to back-pressure"));
            jsonl.write_entry(&warn);
        }

        if event == ActivityEvent::Shutdown {
            break;
        }
        jsonl.write_entry(&event_to_log_entry(&event));
    }

    jsonl.flush();
    jsonl.fsync();
}

/// Flatten an event into its JSONL representation.
pub fn event_to_log_entry(event: &ActivityEvent) -> LogEntry {
    match event {
        ActivityEvent::SessionStarted {
            version,
            config_hash,
            store,
        } => {
            let mut e = LogEntry::new(EventType::SessionStart, Severity::Info);
            e.details = Some(format!(
                "version={version} config_hash={config_hash} store={store}"
            ));
            e.ok = Some(true);
            e
        }
        ActivityEvent::SessionEnded { reason } => {
            let mut e = LogEntry::new(EventType::SessionEnd, Severity::Info);
            e.details = Some(reason.clone());
            e
        }
        ActivityEvent::QueryExecuted {
            filter,
            page,
            page_size,
            returned,
            total,
            duration_ms,
        } => {
            let mut e = LogEntry::new(EventType::QueryExecuted, Severity::Info);
            e.filter = Some(filter.clone());
            e.page = Some(*page);
            e.page_size = Some(*page_size);
            e.returned = Some(*returned);
            e.total = Some(*total);
            e.duration_ms = Some(*duration_ms);
            e.ok = Some(true);
            e
        }
        ActivityEvent::PreloadFilled {
            page,
            generation,
            returned,
        } => {
            let mut e = LogEntry::new(EventType::PreloadFilled, Severity::Info);
            e.page = Some(*page);
            e.generation = Some(*generation);
            e.returned = Some(*returned);
            e
        }
        ActivityEvent::PreloadDiscarded { page, generation } => {
            let mut e = LogEntry::new(EventType::PreloadDiscarded, Severity::Info);
            e.page = Some(*page);
            e.generation = Some(*generation);
            e.details = Some("superseded by a newer request".to_string());
            e
        }
        ActivityEvent::MovieInserted { id, title } => {
            let mut e = LogEntry::new(EventType::MovieInserted, Severity::Info);
            e.movie_id = Some(*id);
            e.title = Some(title.clone());
            e.ok = Some(true);
            e
        }
        ActivityEvent::MoviesImported {
            inserted,
            skipped,
            duration_ms,
        } => {
            let mut e = LogEntry::new(EventType::MoviesImported, Severity::Info);
            e.returned = Some(*inserted);
            e.skipped = Some(*skipped);
            e.duration_ms = Some(*duration_ms);
            e.ok = Some(true);
            e
        }
        ActivityEvent::Error { code, message } => {
            let mut e = LogEntry::new(EventType::Error, Severity::Error);
            e.error_code = Some(code.clone());
            e.error_message = Some(message.clone());
            e.ok = Some(false);
            e
        }
        ActivityEvent::Shutdown => LogEntry::new(EventType::SessionEnd, Severity::Info),
    }
}
