//! The slot holding the active context.

use std::path::Path;
use std::sync::Arc;
use std::thread::{self, ThreadId};

use once_cell::sync::Lazy;
use parking_lot::Mutex;
use tracing::{debug, info};

use super::{AnalysisContext, Loader};
use crate::error::{AssayError, Result};

static GLOBAL: Lazy<ContextHolder> = Lazy::new(ContextHolder::new);

/// Holds at most one published [`AnalysisContext`].
///
/// `get_or_create` and `destroy` are the only mutators. The slot lock is
/// held from the emptiness check through loading to publication, so two
/// callers can never both load.
///
/// Providers run under that lock. Called from inside a provider, the holder
/// looks empty: `current` returns `None`, `destroy` does nothing and
/// `get_or_create` fails with [`AssayError::ReentrantLoad`].
#[derive(Debug, Default)]
pub struct ContextHolder {
    slot: Mutex<Option<Arc<AnalysisContext>>>,
    /// Thread running the providers, while a load is in progress.
    loading_on: Mutex<Option<ThreadId>>,
}

/// Marks the current thread as loading until dropped.
struct LoadingGuard<'a>(&'a Mutex<Option<ThreadId>>);

impl<'a> LoadingGuard<'a> {
    fn enter(marker: &'a Mutex<Option<ThreadId>>) -> Self {
        *marker.lock() = Some(thread::current().id());
        Self(marker)
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        *self.0.lock() = None;
    }
}

impl ContextHolder {
    /// An empty holder, independent of the process-wide one.
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide holder.
    pub fn global() -> &'static ContextHolder {
        &GLOBAL
    }

    /// Return the active context, constructing it if the slot is empty.
    ///
    /// While a context is active the supplied paths are ignored and the
    /// existing instance is returned unchanged. On an empty slot
    /// `config_path` is required; `output_path` defaults to the config's
    /// output directory. A failed load leaves the slot empty.
    pub fn get_or_create(
        &self,
        loader: &Loader,
        config_path: Option<&Path>,
        output_path: Option<&Path>,
    ) -> Result<Arc<AnalysisContext>> {
        if self.loading_here() {
            return Err(AssayError::ReentrantLoad);
        }
        let mut slot = self.slot.lock();

        if let Some(active) = slot.as_ref() {
            let differs = config_path.is_some_and(|p| p != active.config_path())
                || output_path.is_some_and(|p| p != active.output_path());
            if differs {
                debug!(
                    active_config = %active.config_path().display(),
                    "Context already active; ignoring supplied paths"
                );
            }
            return Ok(Arc::clone(active));
        }

        let config_path = config_path.ok_or(AssayError::NotInitialized)?;
        let context = {
            let _loading = LoadingGuard::enter(&self.loading_on);
            Arc::new(AnalysisContext::load(loader, config_path, output_path)?)
        };

        info!(
            config = %context.config_path().display(),
            output = %context.output_path().display(),
            template = context.template(),
            rows = context.dataset().row_count(),
            columns = context.dataset().column_count(),
            "Analysis context created"
        );

        *slot = Some(Arc::clone(&context));
        Ok(context)
    }

    /// The active context, if any.
    pub fn current(&self) -> Option<Arc<AnalysisContext>> {
        if self.loading_here() {
            return None;
        }
        self.slot.lock().clone()
    }

    pub fn is_active(&self) -> bool {
        self.current().is_some()
    }

    /// Clear the slot. Always succeeds, including when already empty.
    ///
    /// Outstanding `Arc`s stay valid but are no longer reachable through
    /// this holder.
    pub fn destroy(&self) {
        // The slot is empty for the whole load
        if self.loading_here() {
            return;
        }
        if let Some(previous) = self.slot.lock().take() {
            debug!(
                config = %previous.config_path().display(),
                "Analysis context destroyed"
            );
        }
    }

    fn loading_here(&self) -> bool {
        *self.loading_on.lock() == Some(thread::current().id())
    }
}
