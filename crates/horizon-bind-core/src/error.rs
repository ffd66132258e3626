//! Error types for Horizon Bind core systems.

use thiserror::Error;

/// Errors produced by element tree operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomError {
    /// The node ID is invalid or the node has been removed.
    #[error("invalid or removed node ID")]
    InvalidNode,
    /// The operation requires an element but the node is a text node.
    #[error("node is not an element")]
    NotAnElement,
    /// Attempted to append a node to itself or one of its descendants.
    #[error("cannot append a node to itself or one of its descendants")]
    CircularParentage,
    /// A selector could not be parsed.
    #[error("invalid selector: {0}")]
    Selector(#[from] SelectorError),
    /// A markup fragment could not be parsed.
    #[error("invalid markup: {0}")]
    Markup(String),
}

/// Errors produced while parsing a selector string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectorError {
    /// The selector (or one of its comma-separated groups) is empty.
    #[error("empty selector")]
    Empty,
    /// The selector ended in the middle of a component.
    #[error("unexpected end of selector")]
    UnexpectedEnd,
    /// A token that cannot appear at this position.
    #[error("unexpected `{token}` at column {column}")]
    UnexpectedToken {
        /// The offending token, serialized.
        token: String,
        /// Column of the token in the selector, starting at 1.
        column: u32,
    },
    /// Combinators (descendant, child, sibling) are not supported.
    #[error("combinators are not supported (column {column})")]
    UnsupportedCombinator {
        /// Column of the combinator, starting at 1.
        column: u32,
    },
}

/// Errors produced by model operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    /// Model attributes must be built from a JSON object.
    #[error("model attributes must be a JSON object, got {0}")]
    NotAnObject(&'static str),
}

/// Result type for element tree operations.
pub type DomResult<T> = std::result::Result<T, DomError>;

/// Result type for model operations.
pub type ModelResult<T> = std::result::Result<T, ModelError>;
