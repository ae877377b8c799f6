//! Coverflow preload buffer.
//!
//! Holds at most one page of records fetched ahead of navigation. Every fill,
//! refill request or invalidation bumps a generation counter; a background
//! refill stores its result only if its generation is still current, so under
//! rapid navigation the last request wins and stale pages are dropped.

#![allow(missing_docs)]

use std::sync::Arc;
use std::thread;

use parking_lot::{Condvar, Mutex};

use crate::catalog::movie::Movie;
use crate::core::errors::{MflixError, Result};
use crate::logger::activity::{ActivityEvent, ActivityLoggerHandle};
use crate::paging::page::{PageSize, fetch_page};
use crate::query::builder::QueryDocument;
use crate::store::SharedStore;

#[derive(Debug, Default)]
enum Slot {
    #[default]
    Empty,
    Pending {
        page: u64,
    },
    Ready {
        page: u64,
        records: Vec<Movie>,
    },
}

#[derive(Debug, Default)]
struct State {
    generation: u64,
    slot: Slot,
}

/// What happened to a background refill.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefillOutcome {
    Stored,
    /// A newer request or an invalidation superseded this refill.
    Discarded,
    /// The retrieval failed; the buffer was left empty.
    Failed,
}

/// Shared next-page buffer. Clones refer to the same buffer.
#[derive(Debug, Clone, Default)]
pub struct PreloadBuffer {
    inner: Arc<(Mutex<State>, Condvar)>,
}

impl PreloadBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn generation(&self) -> u64 {
        self.inner.0.lock().generation
    }

    /// Page currently buffered or being fetched.
    pub fn page(&self) -> Option<u64> {
        match self.inner.0.lock().slot {
            Slot::Empty => None,
            Slot::Pending { page } | Slot::Ready { page, .. } => Some(page),
        }
    }

    pub fn is_ready_for(&self, page: u64) -> bool {
        matches!(self.inner.0.lock().slot, Slot::Ready { page: p, .. } if p == page)
    }

    /// Drop whatever is buffered and supersede any in-flight refill.
    pub fn invalidate(&self) -> u64 {
        let (lock, cvar) = &*self.inner;
        let mut state = lock.lock();
        state.generation += 1;
        state.slot = Slot::Empty;
        cvar.notify_all();
        state.generation
    }

    /// Store records that arrived with a foreground fetch.
    pub fn fill(&self, page: u64, records: Vec<Movie>) -> u64 {
        let (lock, cvar) = &*self.inner;
        let mut state = lock.lock();
        state.generation += 1;
        state.slot = Slot::Ready { page, records };
        cvar.notify_all();
        state.generation
    }

    /// Take the records for `page`, waiting if a refill for that page is in flight.
    ///
    /// Returns `None` when the buffer holds a different page, nothing at all,
    /// or the refill failed or was superseded while waiting.
    pub fn take(&self, page: u64) -> Option<Vec<Movie>> {
        let (lock, cvar) = &*self.inner;
        let mut state = lock.lock();
        loop {
            let (ready, pending) = match &state.slot {
                Slot::Ready { page: p, .. } => (*p == page, false),
                Slot::Pending { page: p } => (false, *p == page),
                Slot::Empty => (false, false),
            };
            if ready {
                return match std::mem::take(&mut state.slot) {
                    Slot::Ready { records, .. } => Some(records),
                    _ => None,
                };
            }
            if !pending {
                return None;
            }
            cvar.wait(&mut state);
        }
    }

    /// Fetch `page` on a background thread and buffer it if still current.
    ///
    /// Fire-and-forget: callers may drop the returned handle.
    pub fn request_refill(
        &self,
        store: SharedStore,
        query: QueryDocument,
        page: u64,
        size: PageSize,
        logger: ActivityLoggerHandle,
    ) -> Result<thread::JoinHandle<RefillOutcome>> {
        let generation = {
            let mut state = self.inner.0.lock();
            state.generation += 1;
            state.slot = Slot::Pending { page };
            state.generation
        };

        let buffer = self.clone();
        let spawned = thread::Builder::new()
            .name("mflix-preload".to_string())
            .spawn(move || {
                let fetched = fetch_page(store.as_ref(), &query, page, size, false);
                buffer.complete(generation, page, fetched.map(|f| f.records), &logger)
            });

        spawned.map_err(|e| {
            self.complete_failed(generation);
            MflixError::Runtime {
                details: format!("failed to spawn preload thread: {e}"),
            }
        })
    }

    fn complete(
        &self,
        generation: u64,
        page: u64,
        fetched: Result<Vec<Movie>>,
        logger: &ActivityLoggerHandle,
    ) -> RefillOutcome {
        let (lock, cvar) = &*self.inner;
        let mut state = lock.lock();
        if state.generation != generation {
            drop(state);
            logger.send(ActivityEvent::PreloadDiscarded { page, generation });
            return RefillOutcome::Discarded;
        }

        let outcome = match fetched {
            Ok(records) => {
                logger.send(ActivityEvent::PreloadFilled {
                    page,
                    generation,
                    returned: records.len(),
                });
                state.slot = Slot::Ready { page, records };
                RefillOutcome::Stored
            }
            Err(err) => {
                logger.send(ActivityEvent::error(&err));
                state.slot = Slot::Empty;
                RefillOutcome::Failed
            }
        };
        cvar.notify_all();
        outcome
    }

    fn complete_failed(&self, generation: u64) {
        let (lock, cvar) = &*self.inner;
        let mut state = lock.lock();
        if state.generation == generation {
            state.slot = Slot::Empty;
        }
        cvar.notify_all();
    }
}
