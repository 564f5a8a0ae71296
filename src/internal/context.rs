//! State shared by every scope of one tree.

use std::cell::Cell;

use crate::config::RuntimeConfig;
use crate::observer::Observers;
use crate::scope::ScopeId;

pub(crate) struct RuntimeContext {
    pub(crate) config: RuntimeConfig,
    pub(crate) observers: Observers,
    next_scope_id: Cell<u64>,
}

impl RuntimeContext {
    pub(crate) fn new(config: RuntimeConfig) -> Self {
        Self {
            config,
            observers: Observers::new(),
            next_scope_id: Cell::new(0),
        }
    }

    /// Allocates the next scope id; the first call (the root) gets `0`.
    pub(crate) fn allocate_scope_id(&self) -> ScopeId {
        let id = self.next_scope_id.get();
        self.next_scope_id.set(id + 1);
        ScopeId(id)
    }
}
