//! Element trees.
//!
//! The binder does not talk to a browser; it works on a [`Document`], an
//! arena of element and text nodes with the operations a view layer needs:
//! attribute, data-attribute, text and class mutation, and selector queries
//! over a subtree.
//!
//! # Key Types
//!
//! - [`Document`] - The node arena
//! - [`SharedDocument`] - `Arc<RwLock<Document>>` handle shared with listeners
//! - [`NodeId`] - Stable node handle; node identity is handle identity
//! - [`Selector`] - Parsed or programmatically built selector
//!
//! # Example
//!
//! ```
//! use horizon_bind_core::dom::Document;
//!
//! let mut doc = Document::new();
//! let list = doc
//!     .parse_element(r#"<ul><li class="done">a</li><li>b</li></ul>"#)
//!     .unwrap();
//!
//! let done = doc.query_selector_all(list, "li.done").unwrap();
//! assert_eq!(done.len(), 1);
//! doc.add_class(done[0], "archived").unwrap();
//! assert_eq!(doc.outer_html(done[0]).unwrap(), r#"<li class="done archived">a</li>"#);
//! ```

mod document;
mod markup;
mod selector;

pub use document::{Document, ElementData, NodeId, NodeKind, SharedDocument};
pub use selector::{AttributeOperator, AttributeSelector, CompoundSelector, Selector};
