use log::{log_enabled, Level};
use std::time::Instant;

/// Scoped timer tracing how long a broad-phase or contact pass took and how
/// many items it processed.
pub struct ScopedTimer {
    label: &'static str,
    start: Option<Instant>,
    items: usize,
}

impl ScopedTimer {
    pub fn new(label: &'static str) -> Self {
        let start = if log_enabled!(Level::Trace) {
            log::trace!("start {label}");
            Some(Instant::now())
        } else {
            None
        };
        Self {
            label,
            start,
            items: 0,
        }
    }

    /// Records the number of items handled inside the scope.
    pub fn set_items(&mut self, items: usize) {
        self.items = items;
    }
}

impl Drop for ScopedTimer {
    fn drop(&mut self) {
        if let Some(start) = self.start {
            log::trace!(
                "end {} ({} items, {} µs)",
                self.label,
                self.items,
                start.elapsed().as_micros()
            );
        }
    }
}
