use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tracing::debug;

use crate::{validate, ValidationReport};

/// Ticket handed out for each validation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Generation(u64);

/// Coalesces overlapping validations of one editing session: only the
/// result of the most recent request is delivered.
#[derive(Debug, Clone, Default)]
pub struct ValidationSession {
    latest: Arc<AtomicU64>,
}

impl ValidationSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the next generation, superseding all earlier ones.
    pub fn begin(&self) -> Generation {
        Generation(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn is_current(&self, generation: Generation) -> bool {
        self.latest.load(Ordering::SeqCst) == generation.0
    }

    /// Validate `text`. The generation is taken when this is called, so
    /// the result is `None` if another submission was made before it
    /// completed.
    pub fn submit(&self, text: &str) -> impl Future<Output = Option<ValidationReport>> + '_ {
        let generation = self.begin();
        let text = text.to_string();
        async move {
            let report = validate(&text).await;
            if self.is_current(generation) {
                Some(report)
            } else {
                debug!(generation = generation.0, "discarding superseded validation");
                None
            }
        }
    }
}
