//! Asynchronous asset loader - worker-thread build, render-thread swap.
//!
//! Uses `rayon::spawn` for fire-and-forget task submission with poll-based
//! retrieval on the render thread:
//! - Native: rayon's thread pool (std::thread based)
//! - wasm32: rayon via wasm-bindgen-rayon / pthreads (Web Workers)
//!
//! Tasks must be pure: they build plain data (model bytes, decoded cube-map
//! faces) from inputs captured at submission time and never touch nodes that
//! are already part of the live graph. The owning subsystem polls each frame
//! and performs the attach on the render thread, which is the single
//! synchronization point of the swap protocol.
//!
//! There is no cancellation and no timeout. A destroyed owner simply stops
//! polling and discards its tickets; the task still runs to completion on
//! the worker and its result is dropped.
//!
//! # Usage
//!
//! ```ignore
//! let loader = AssetLoader::new();
//!
//! // Queue work (non-blocking)
//! let ticket = loader.submit(move || read_model(&path));
//!
//! // Poll on the render thread each frame
//! if let Some(completion) = loader.poll::<ModelData>(ticket) {
//!     // Attach under the placeholder, or drop if the owner is gone
//! }
//! ```

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use web_time::Instant;

/// Error produced by a load task.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
  #[error("failed to read {path}: {source}")]
  Io {
    path: String,
    source: std::io::Error,
  },

  #[error("failed to load image {path}: {source}")]
  Image {
    path: String,
    source: image::ImageError,
  },
}

/// Unique identifier for a submitted load task.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct LoadTicket(u64);

impl LoadTicket {
  fn next() -> Self {
    static COUNTER: AtomicU64 = AtomicU64::new(0);
    Self(COUNTER.fetch_add(1, Ordering::Relaxed))
  }
}

/// Completed load with build timing.
pub struct Completion<T> {
  /// The task's output, or the error it failed with.
  pub result: Result<T, LoadError>,
  /// Wall-clock task time in microseconds.
  pub load_time_us: u64,
}

/// Type-erased completion container.
struct Slot {
  data: Box<dyn std::any::Any + Send>,
}

/// Cloneable handle over rayon's pool for asset load tasks.
///
/// Clones share the same result map, so a single loader can be handed to
/// several subsystems (controllers, skybox) while each polls only its own
/// tickets.
pub struct AssetLoader {
  /// Completed results waiting to be polled.
  results: Arc<Mutex<HashMap<LoadTicket, Slot>>>,
  /// Currently in-flight tickets.
  pending: Arc<Mutex<HashSet<LoadTicket>>>,
}

impl AssetLoader {
  pub fn new() -> Self {
    Self {
      results: Arc::new(Mutex::new(HashMap::new())),
      pending: Arc::new(Mutex::new(HashSet::new())),
    }
  }

  /// Submit a load task to the worker pool (non-blocking).
  ///
  /// Returns a ticket used to poll for the completion.
  pub fn submit<F, T>(&self, task: F) -> LoadTicket
  where
    F: FnOnce() -> Result<T, LoadError> + Send + 'static,
    T: Send + 'static,
  {
    let ticket = LoadTicket::next();

    {
      let mut pending = self.pending.lock().unwrap();
      pending.insert(ticket);
    }

    let results = Arc::clone(&self.results);
    let pending = Arc::clone(&self.pending);

    rayon::spawn(move || {
      let start = Instant::now();
      let result = task();
      let load_time_us = start.elapsed().as_micros() as u64;

      // Publish only if the ticket is still live; `discard` removes it
      // from `pending` first, so a discarded task's result is dropped
      // here instead of landing. Lock order (pending, then results)
      // matches `discard`.
      let mut pending = pending.lock().unwrap();
      if pending.remove(&ticket) {
        let mut results = results.lock().unwrap();
        results.insert(
          ticket,
          Slot {
            data: Box::new(Completion {
              result,
              load_time_us,
            }),
          },
        );
      }
    });

    ticket
  }

  /// Poll for a completion (non-blocking).
  ///
  /// Returns `Some` exactly once per finished ticket; `None` while the task
  /// is still running or if the ticket was already consumed or discarded.
  pub fn poll<T: 'static>(&self, ticket: LoadTicket) -> Option<Completion<T>> {
    let mut results = self.results.lock().unwrap();
    let slot = results.remove(&ticket)?;
    slot.data.downcast::<Completion<T>>().ok().map(|b| *b)
  }

  /// Drop a ticket's result without consuming it.
  ///
  /// Called by owners on destruction so completions for dead placeholders
  /// do not accumulate. Discarding an in-flight ticket is sticky: the
  /// worker drops its result instead of publishing it. Discarding twice
  /// is harmless.
  pub fn discard(&self, ticket: LoadTicket) {
    let mut pending = self.pending.lock().unwrap();
    pending.remove(&ticket);
    let mut results = self.results.lock().unwrap();
    results.remove(&ticket);
  }

  /// True while the task behind `ticket` has not finished.
  pub fn is_pending(&self, ticket: LoadTicket) -> bool {
    let pending = self.pending.lock().unwrap();
    pending.contains(&ticket)
  }

  /// Number of tasks currently queued or running.
  pub fn pending_count(&self) -> usize {
    let pending = self.pending.lock().unwrap();
    pending.len()
  }

  /// Number of worker threads in rayon's pool.
  pub fn num_threads(&self) -> usize {
    rayon::current_num_threads()
  }
}

impl Default for AssetLoader {
  fn default() -> Self {
    Self::new()
  }
}

impl Clone for AssetLoader {
  fn clone(&self) -> Self {
    Self {
      results: Arc::clone(&self.results),
      pending: Arc::clone(&self.pending),
    }
  }
}

// =============================================================================
// Tests
// =============================================================================
