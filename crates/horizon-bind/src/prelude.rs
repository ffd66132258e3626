//! Convenient re-exports for applications.
//!
//! ```
//! use horizon_bind::prelude::*;
//! ```

pub use crate::{BasicView, BindError, BindResult, Binder, BinderConfig, Teardown, View};
pub use horizon_bind_core::dom::{Document, NodeId, SharedDocument};
pub use horizon_bind_core::{ChangeEvent, ListenerId, Model, Value};
