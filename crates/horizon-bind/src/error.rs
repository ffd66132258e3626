//! Error types for binders.

use horizon_bind_core::DomError;
use thiserror::Error;

/// Errors produced while creating or extending a binder.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindError {
    /// An element tree operation failed, e.g. the view's context node is not
    /// part of its document.
    #[error(transparent)]
    Dom(#[from] DomError),
    /// Property names must not be empty.
    #[error("property name must not be empty")]
    EmptyPropertyName,
    /// The binder has been destroyed and can no longer be extended.
    #[error("binder for `{0}` has been destroyed")]
    Destroyed(String),
}

/// Result type for binder operations.
pub type BindResult<T> = std::result::Result<T, BindError>;
