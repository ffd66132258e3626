//! Core systems for Horizon Bind.
//!
//! This crate provides the collaborators a binder works against:
//!
//! - **Signal/Slot System**: Type-safe change notification ([`Signal`])
//! - **Observable Model**: Property map with per-property change events ([`Model`])
//! - **Element Tree**: Arena-backed nodes with selector queries ([`dom::Document`])
//! - **Value Rendering**: Coercion of model values into element state ([`value`])
//!
//! # Model Example
//!
//! ```
//! use horizon_bind_core::Model;
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//!
//! let model = Model::new();
//! let changes = Arc::new(AtomicUsize::new(0));
//!
//! let counter = changes.clone();
//! let listener = model.on_change("status", move |event| {
//!     println!("status: {:?} -> {:?}", event.previous, event.value);
//!     counter.fetch_add(1, Ordering::SeqCst);
//! });
//!
//! model.set("status", "online");
//! model.off(&listener);
//! model.set("status", "offline");
//!
//! assert_eq!(changes.load(Ordering::SeqCst), 1);
//! ```

pub mod dom;
mod error;
pub mod logging;
pub mod model;
pub mod signal;
pub mod value;

pub use dom::{Document, NodeId, Selector, SharedDocument};
pub use error::{DomError, DomResult, ModelError, ModelResult, SelectorError};
pub use model::{ChangeEvent, ListenerId, Model};
pub use signal::{ConnectionId, Signal};
pub use value::{render_text, render_value};

// Model values are plain JSON values.
pub use serde_json::Value;
