//! Watcher records and value snapshots.

use std::rc::Rc;

use crate::equality::{deep_clone, deep_equals, ensure_comparable};
use crate::error::RtResult;
use crate::expr::Expression;
use crate::value::Value;

use super::Scope;

/// Listener invoked with the new value and the scope that owns the watcher.
pub type Listener = dyn Fn(&Value, &Scope) -> RtResult<()>;

/// Baseline a watcher compares against.
///
/// Values containing functions cannot be copied, so they are recorded as
/// `Opaque`: opaque against opaque is unchanged, opaque against data (or
/// data against opaque) is a change.
#[derive(Debug, Clone)]
pub(crate) enum Snapshot {
    Data(Value),
    Opaque,
}

impl Snapshot {
    pub(crate) fn capture(value: &Value) -> Self {
        match deep_clone(value) {
            Ok(copy) => Snapshot::Data(copy),
            Err(_) => Snapshot::Opaque,
        }
    }

    pub(crate) fn matches(&self, current: &Value) -> bool {
        match self {
            Snapshot::Data(last) => deep_equals(last, current).unwrap_or(false),
            Snapshot::Opaque => ensure_comparable(current).is_err(),
        }
    }
}

pub(crate) struct Watcher {
    pub(crate) expression: Expression,
    pub(crate) listener: Rc<Listener>,
    pub(crate) last: Snapshot,
}
