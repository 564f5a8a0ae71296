//! Error types for the runtime.

use thiserror::Error;

use crate::scope::ScopeId;

/// Runtime errors
///
/// Represents the failure conditions of provider resolution, change detection
/// and expression evaluation.
///
/// Unregistered lookups never abort the caller on their own: `Registry::get`
/// reports them as [`RtError::UnregisteredDependency`] and `Registry::invoke`
/// passes the missing dependency through as an absent argument, so the error
/// only surfaces where the factory actually uses it.
///
/// # Examples
///
/// ```rust
/// use nglite::{Registry, Locals, RtError};
///
/// let registry = Registry::new();
/// match registry.get("missing", &Locals::new()) {
///     Err(RtError::UnregisteredDependency(name)) => assert_eq!(name, "missing"),
///     _ => unreachable!(),
/// }
/// ```
#[derive(Debug, Clone, Error)]
pub enum RtError {
    /// No provider registered under the name
    #[error("unregistered dependency: {0}")]
    UnregisteredDependency(String),
    /// Resolved value has a different type than requested
    #[error("type mismatch for {name}: expected {expected}")]
    TypeMismatch { name: String, expected: &'static str },
    /// Watchers kept changing past the configured pass limit
    #[error("digest did not converge on scope {scope} after {passes} passes")]
    DigestDivergence { scope: ScopeId, passes: usize },
    /// Value outside the comparable/cloneable set
    #[error("value is not comparable: contains a {0}")]
    NotComparable(&'static str),
    /// Expression evaluation failed (strict mode only)
    #[error("expression error: {0}")]
    Eval(#[from] EvalError),
    /// Invalid configuration value
    #[error("config error: {0}")]
    Config(String),
    /// Failure raised by user code (factories, listeners, link functions)
    #[error("{0}")]
    Custom(String),
}

impl RtError {
    pub fn custom(message: impl Into<String>) -> Self {
        Self::Custom(message.into())
    }

    pub fn type_mismatch<T: ?Sized>(name: impl Into<String>) -> Self {
        Self::TypeMismatch {
            name: name.into(),
            expected: std::any::type_name::<T>(),
        }
    }
}

/// Typed expression evaluation failures.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    #[error("syntax error at {offset}: {message}")]
    Syntax { offset: usize, message: String },
    #[error("unknown reference: {0}")]
    UnknownReference(String),
    #[error("{0} is not a function")]
    NotCallable(String),
    #[error("type error: {0}")]
    Type(String),
    #[error("invalid assignment target")]
    InvalidAssignment,
    #[error("call failed: {0}")]
    Call(String),
}

impl EvalError {
    pub(crate) fn syntax(offset: usize, message: impl Into<String>) -> Self {
        Self::Syntax {
            offset,
            message: message.into(),
        }
    }
}

/// Result type for runtime operations
pub type RtResult<T> = Result<T, RtError>;
