//! Template clock: the "network time" handed to template-time estimators.

use retarget_types::Timestamp;
use std::cell::Cell;

/// A deterministic clock for block templates.
///
/// Time only advances when you tell it to.
pub struct TemplateClock {
    current: Cell<u64>,
}

impl TemplateClock {
    pub fn new(initial_secs: u64) -> Self {
        Self {
            current: Cell::new(initial_secs),
        }
    }

    /// Start one second after `newest`, the earliest time a template can carry.
    pub fn after(newest: Timestamp) -> Self {
        Self::new(newest.as_secs().saturating_add(1))
    }

    pub fn now(&self) -> Timestamp {
        Timestamp::new(self.current.get())
    }

    pub fn advance(&self, secs: u64) {
        self.current.set(self.current.get().saturating_add(secs));
    }

    pub fn set(&self, secs: u64) {
        self.current.set(secs);
    }
}
