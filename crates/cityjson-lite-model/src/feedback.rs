// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Host notification sinks

use std::sync::atomic::{AtomicBool, Ordering};

/// Progress callback type for parsing operations
pub type ProgressCallback = Box<dyn Fn(&str, f32) + Send>;

/// One-way notification sink implemented by the host
///
/// The loader calls `set_progress` and checks `is_cancelled` after every city
/// object. All methods are optional to honour.
pub trait LoadFeedback: Send + Sync {
    /// Report progress in percent (0.0 - 100.0)
    fn set_progress(&self, _percent: f32) {}

    /// Report an informational message
    fn push_info(&self, _text: &str) {}

    /// Check whether the host asked to stop
    fn is_cancelled(&self) -> bool {
        false
    }
}

/// Feedback sink that ignores everything
#[derive(Clone, Copy, Debug, Default)]
pub struct NullFeedback;

impl LoadFeedback for NullFeedback {}

/// Cancellation flag that can be shared with another thread
#[derive(Debug, Default)]
pub struct CancelFlag(AtomicBool);

impl CancelFlag {
    /// Create an unset flag
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Check whether cancellation was requested
    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

impl LoadFeedback for CancelFlag {
    fn is_cancelled(&self) -> bool {
        self.is_set()
    }
}
