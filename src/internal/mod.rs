//! Internal implementation details.

pub(crate) mod context;

pub(crate) use context::RuntimeContext;
