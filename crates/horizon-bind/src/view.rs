//! Views: the context a binder works in.

use std::sync::Arc;

use horizon_bind_core::dom::{Document, NodeId, SharedDocument};
use horizon_bind_core::{DomResult, Model};

use crate::binder::Binder;
use crate::error::BindResult;

/// Anything that owns a root element and an observable model.
///
/// A binder searches the subtree rooted at [`el`](View::el) and observes
/// [`model`](View::model). Neither is owned by the binder.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use horizon_bind::{BasicView, View};
/// use horizon_bind_core::Model;
///
/// let model = Arc::new(Model::new());
/// model.set("bar", "someval");
///
/// let view = BasicView::from_markup(
///     r#"<div class="foo" data-mcp-target="=bar">baz</div>"#,
///     model,
/// )
/// .unwrap();
/// let _binder = view.bind("bar").unwrap();
///
/// assert_eq!(view.text(view.el()).unwrap(), "someval");
/// ```
pub trait View {
    /// The root element of the view.
    fn el(&self) -> NodeId;

    /// The document the root element lives in.
    fn document(&self) -> &SharedDocument;

    /// The model the view renders.
    fn model(&self) -> &Arc<Model>;

    /// Bind a model property to this view's annotated elements.
    fn bind(&self, name: &str) -> BindResult<Binder> {
        Binder::new(self, name)
    }
}

/// A plain [`View`] implementation.
#[derive(Debug, Clone)]
pub struct BasicView {
    document: SharedDocument,
    el: NodeId,
    model: Arc<Model>,
}

impl BasicView {
    /// Create a view over an existing element.
    pub fn new(document: SharedDocument, el: NodeId, model: Arc<Model>) -> Self {
        Self {
            document,
            el,
            model,
        }
    }

    /// Create a view whose root element is parsed from markup into a new
    /// document.
    pub fn from_markup(markup: &str, model: Arc<Model>) -> DomResult<Self> {
        let mut document = Document::new();
        let el = document.parse_element(markup)?;
        Ok(Self::new(SharedDocument::from_document(document), el, model))
    }

    /// Text content of a node in this view's document.
    pub fn text(&self, node: NodeId) -> DomResult<String> {
        self.document.read().text_content(node)
    }

    /// Serialized markup of a node in this view's document.
    pub fn html(&self, node: NodeId) -> DomResult<String> {
        self.document.read().outer_html(node)
    }
}

impl View for BasicView {
    fn el(&self) -> NodeId {
        self.el
    }

    fn document(&self) -> &SharedDocument {
        &self.document
    }

    fn model(&self) -> &Arc<Model> {
        &self.model
    }
}
