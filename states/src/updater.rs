use std::any::{Any, TypeId};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use flume::Sender;

/// Publishes replacement values for registered states and computes.
///
/// `set` never blocks; values travel over the context's flume channel and are
/// applied on the UI thread by `StateCtx::sync_computes`.
#[derive(Debug, Clone)]
pub struct Updater {
    send: Sender<(TypeId, Box<dyn Any + Send>)>,
}

impl Updater {
    pub(crate) fn new(send: Sender<(TypeId, Box<dyn Any + Send>)>) -> Self {
        Self { send }
    }

    pub fn set<T: Any + Send>(&self, value: T) {
        // Send fails only when the context is gone; nothing left to update.
        let _ = self.send.send((TypeId::of::<T>(), Box::new(value)));
    }
}

/// An [`Updater`] gated on a command generation.
///
/// Every dispatch of a command bumps that command's generation counter. A
/// `LatestOnlyUpdater` captured by an earlier dispatch silently drops its
/// updates once a newer dispatch exists, so a slow response can never clobber
/// the result of the run that superseded it.
#[derive(Debug, Clone)]
pub struct LatestOnlyUpdater {
    inner: Updater,
    generation: u64,
    latest: Arc<AtomicU64>,
}

impl LatestOnlyUpdater {
    pub(crate) fn new(inner: Updater, generation: u64, latest: Arc<AtomicU64>) -> Self {
        Self {
            inner,
            generation,
            latest,
        }
    }

    pub fn set<T: Any + Send>(&self, value: T) {
        if self.latest.load(Ordering::Acquire) == self.generation {
            self.inner.set(value);
        } else {
            log::debug!(
                "dropping stale update for {} (generation {} superseded)",
                std::any::type_name::<T>(),
                self.generation
            );
        }
    }
}
