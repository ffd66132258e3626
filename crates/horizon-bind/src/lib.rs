//! Declarative one-way data binding for Horizon views.
//!
//! Elements declare how they follow a model with markup attributes; a
//! [`Binder`] finds them and keeps them in sync:
//!
//! ```html
//! <div class="foo" data-mcp-target="=bar">baz</div>
//! ```
//!
//! ```
//! use std::sync::Arc;
//! use horizon_bind::prelude::*;
//!
//! let model = Arc::new(Model::new());
//! let view = BasicView::from_markup(
//!     r#"<div class="foo" data-mcp-target="=bar">baz</div>"#,
//!     model.clone(),
//! )?;
//!
//! let mut binder = view.bind("bar")?;
//! model.set("bar", "someval");
//!
//! assert_eq!(
//!     view.html(view.el())?,
//!     r#"<div class="foo" data-mcp-target="=bar">someval</div>"#
//! );
//!
//! binder.destroy();
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Directives
//!
//! | directive    | effect of `model.set("bar", v)`                  |
//! |--------------|--------------------------------------------------|
//! | `^bar`       | `data-bar="v"`                                   |
//! | `=bar`       | text content becomes `v`                         |
//! | `.bar`       | `bar-*` classes are replaced by `bar-v`          |
//!
//! Directives match by suffix: `=parent.bar` is bound under `bar`, and so is
//! `=foobar`.
//!
//! # Related Crates
//!
//! - [`horizon_bind_core`] - Signals, models and element trees

mod binder;
mod config;
mod directive;
mod error;
pub mod prelude;
mod view;

pub use binder::{Binder, BinderState, bind, bind_with_config};
pub use config::{BinderConfig, DEFAULT_NAMESPACE, Teardown};
pub use directive::{Mutation, Operator};
pub use error::{BindError, BindResult};
pub use view::{BasicView, View};

pub use horizon_bind_core;
