//! The binder: keeps annotated elements in sync with a model property.
//!
//! A [`Binder`] is created for one view and one property name. On creation
//! it collects
//!
//! - **inputs**: descendants whose source attribute equals the property name,
//!   plus the view's root if it carries the source marker;
//! - **targets**: descendants whose target directive *ends with* the property
//!   name (so `=parent.bar` is bound under `bar`), plus the root if its own
//!   directive does.
//!
//! Every target gets a listener on the model's `change:<name>` event and is
//! immediately rendered with the property's current value. Inputs are
//! collected but not wired; model updates flow one way only.
//!
//! Listeners stay registered until [`Binder::destroy`] is called. Dropping a
//! binder does not unregister them.
//!
//! Listeners take the document's write lock when they fire, so the model
//! must not be written while the caller holds a lock on the same document.

use std::collections::HashSet;
use std::sync::Arc;

use horizon_bind_core::dom::{AttributeOperator, NodeId, Selector, SharedDocument};
use horizon_bind_core::logging::targets;
use horizon_bind_core::{ListenerId, Model};

use crate::config::{BinderConfig, Teardown};
use crate::directive::Mutation;
use crate::error::{BindError, BindResult};
use crate::view::View;

/// Lifecycle of a binder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinderState {
    /// Listeners are registered and targets follow the model.
    Active,
    /// Listeners were removed; terminal.
    Destroyed,
}

/// One-way binding between model properties and annotated elements.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use horizon_bind::{BasicView, Binder};
/// use horizon_bind_core::Model;
///
/// let model = Arc::new(Model::new());
/// let view = BasicView::from_markup(
///     r#"<section>
///          <h1 data-mcp-target="=title"></h1>
///          <p class="state state-idle" data-mcp-target=".state"></p>
///        </section>"#,
///     model.clone(),
/// )
/// .unwrap();
///
/// let mut binder = Binder::new(&view, "title").unwrap();
/// binder.add_targets("state").unwrap();
///
/// model.set("title", "Inbox");
/// model.set("state", "busy");
///
/// let html = view.html(binder.targets()[1]).unwrap();
/// assert_eq!(html, r#"<p class="state state-busy" data-mcp-target=".state"></p>"#);
///
/// binder.destroy();
/// ```
#[derive(Debug)]
pub struct Binder {
    name: String,
    context: NodeId,
    document: SharedDocument,
    model: Arc<Model>,
    config: BinderConfig,
    inputs: Vec<NodeId>,
    targets: Vec<NodeId>,
    properties: Vec<String>,
    /// (element, property) pairs that have been bound.
    bound: HashSet<(NodeId, String)>,
    listeners: Vec<ListenerId>,
    state: BinderState,
}

impl Binder {
    /// Bind `name` on a view using the default configuration.
    pub fn new<V: View + ?Sized>(view: &V, name: &str) -> BindResult<Self> {
        Self::with_config(view, name, BinderConfig::default())
    }

    /// Bind `name` on a view.
    ///
    /// Fails if `name` is empty or the view's root element is not part of
    /// its document.
    #[tracing::instrument(
        skip(view, config),
        target = "horizon_bind::binder",
        level = "debug"
    )]
    pub fn with_config<V: View + ?Sized>(
        view: &V,
        name: &str,
        config: BinderConfig,
    ) -> BindResult<Self> {
        if name.is_empty() {
            return Err(BindError::EmptyPropertyName);
        }

        let mut binder = Self {
            name: name.to_string(),
            context: view.el(),
            document: view.document().clone(),
            model: view.model().clone(),
            config,
            inputs: Vec::new(),
            targets: Vec::new(),
            properties: vec![name.to_string()],
            bound: HashSet::new(),
            listeners: Vec::new(),
            state: BinderState::Active,
        };

        binder.collect_inputs(name)?;
        let found = binder.collect_targets(name)?;
        binder.wire(&found, name)?;

        tracing::debug!(
            target: targets::BINDER,
            property = name,
            inputs = binder.inputs.len(),
            targets = binder.targets.len(),
            listeners = binder.listeners.len(),
            "binder created"
        );
        Ok(binder)
    }

    /// The property this binder was created for.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Every property bound so far, in binding order.
    pub fn properties(&self) -> &[String] {
        &self.properties
    }

    /// The root element queries are scoped to.
    pub fn context(&self) -> NodeId {
        self.context
    }

    /// The configuration in use.
    pub fn config(&self) -> &BinderConfig {
        &self.config
    }

    /// Collected input (source) elements, without duplicates.
    pub fn inputs(&self) -> &[NodeId] {
        &self.inputs
    }

    /// Collected target elements, without duplicates.
    pub fn targets(&self) -> &[NodeId] {
        &self.targets
    }

    /// Current lifecycle state.
    pub fn state(&self) -> BinderState {
        self.state
    }

    /// Returns true until [`destroy`](Self::destroy) is called.
    pub fn is_active(&self) -> bool {
        self.state == BinderState::Active
    }

    /// Number of model listeners this binder holds.
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Bind another property on the same view.
    ///
    /// Matching targets are merged into [`targets`](Self::targets). Elements
    /// not yet bound under `name` are wired and rendered with the current
    /// value; elements already bound under `name` are left alone. Returns
    /// the elements that were newly bound.
    pub fn add_targets(&mut self, name: &str) -> BindResult<Vec<NodeId>> {
        if !self.is_active() {
            return Err(BindError::Destroyed(self.name.clone()));
        }
        if name.is_empty() {
            return Err(BindError::EmptyPropertyName);
        }

        let known = self.targets.len();
        let added = self
            .collect_targets(name)
            .and_then(|found| self.wire(&found, name));
        let added = match added {
            Ok(added) => added,
            Err(err) => {
                self.targets.truncate(known);
                return Err(err);
            }
        };
        if !self.properties.iter().any(|p| p == name) {
            self.properties.push(name.to_string());
        }
        tracing::debug!(
            target: targets::BINDER,
            property = name,
            added = added.len(),
            "targets added"
        );
        Ok(added)
    }

    /// Reserved for model updates driven by input elements. Does nothing.
    pub fn add_inputs(&self, name: &str) {
        tracing::trace!(target: targets::BINDER, property = name, "add_inputs is a no-op");
    }

    /// Stop updating elements.
    ///
    /// With [`Teardown::Scoped`] only this binder's listeners are removed.
    /// With [`Teardown::Global`] every change listener on the model is
    /// removed, including those of other binders. Calling this twice is
    /// harmless.
    pub fn destroy(&mut self) {
        if !self.is_active() {
            return;
        }
        let count = self.listeners.len();
        match self.config.teardown {
            Teardown::Scoped => {
                for listener in self.listeners.drain(..) {
                    self.model.off(&listener);
                }
            }
            Teardown::Global => {
                self.model.off_all_changes();
                self.listeners.clear();
            }
        }
        self.state = BinderState::Destroyed;
        tracing::debug!(
            target: targets::BINDER,
            property = %self.name,
            listeners = count,
            teardown = ?self.config.teardown,
            "binder destroyed"
        );
    }

    fn collect_inputs(&mut self, name: &str) -> BindResult<Vec<NodeId>> {
        let selector = Selector::attribute(
            self.config.source_attribute.as_str(),
            AttributeOperator::Equals,
            name,
        );
        let found = self.document.with_read(|doc| {
            let mut found = doc.query_all(self.context, &selector)?;
            if doc.has_attribute(self.context, &self.config.source_marker)? {
                found.push(self.context);
            }
            Ok::<_, BindError>(found)
        })?;
        merge_unique(&mut self.inputs, &found);
        Ok(found)
    }

    fn collect_targets(&mut self, name: &str) -> BindResult<Vec<NodeId>> {
        let selector = Selector::attribute(
            self.config.target_attribute.as_str(),
            AttributeOperator::EndsWith,
            name,
        );
        let found = self.document.with_read(|doc| {
            let mut found = doc.query_all(self.context, &selector)?;
            if doc.matches(self.context, &selector)? {
                found.push(self.context);
            }
            Ok::<_, BindError>(found)
        })?;
        merge_unique(&mut self.targets, &found);
        Ok(found)
    }

    /// Register listeners for elements not yet bound under `property` and
    /// render the current value into them.
    ///
    /// Either every element is wired or, on error, none of the listeners
    /// registered by this call remain on the model.
    fn wire(&mut self, nodes: &[NodeId], property: &str) -> BindResult<Vec<NodeId>> {
        let mut added = Vec::new();
        let mut registered = Vec::new();
        for &node in nodes {
            if self.bound.contains(&(node, property.to_string())) {
                continue;
            }
            if !self.document.with_read(|doc| doc.contains(node)) {
                tracing::warn!(
                    target: targets::BINDER,
                    ?node,
                    property,
                    "target removed before it could be bound, skipping"
                );
                continue;
            }
            match self.wire_node(node, property) {
                Ok(listener) => {
                    registered.extend(listener);
                    added.push(node);
                }
                Err(err) => {
                    for listener in &registered {
                        self.model.off(listener);
                    }
                    return Err(err);
                }
            }
        }
        for &node in &added {
            self.bound.insert((node, property.to_string()));
        }
        self.listeners.extend(registered);
        Ok(added)
    }

    /// Wire one element. Returns `None` when its directive has no known
    /// operator.
    fn wire_node(&self, node: NodeId, property: &str) -> BindResult<Option<ListenerId>> {
        let directive = self.document.with_read(|doc| {
            doc.attribute(node, &self.config.target_attribute)
                .map(|value| value.unwrap_or_default().to_string())
        })?;
        let Some(mutation) = Mutation::parse(&directive, property) else {
            tracing::debug!(
                target: targets::BINDER,
                ?node,
                directive = %directive,
                "unrecognized directive operator, element left untouched"
            );
            return Ok(None);
        };

        let document = self.document.clone();
        let listener_mutation = mutation.clone();
        let listener = self.model.on_change(property, move |event| {
            let result = document
                .with_write(|doc| listener_mutation.apply(doc, node, event.value.as_ref()));
            match result {
                Ok(()) => tracing::trace!(
                    target: targets::BINDER,
                    ?node,
                    property = %event.property,
                    "target updated"
                ),
                Err(err) => tracing::warn!(
                    target: targets::BINDER,
                    ?node,
                    property = %event.property,
                    %err,
                    "failed to update bound element"
                ),
            }
        });

        let current = self.model.get(property);
        if let Err(err) = self
            .document
            .with_write(|doc| mutation.apply(doc, node, current.as_ref()))
        {
            self.model.off(&listener);
            return Err(err.into());
        }
        Ok(Some(listener))
    }
}

/// Append the nodes of `found` that `list` does not contain yet.
fn merge_unique(list: &mut Vec<NodeId>, found: &[NodeId]) {
    for &node in found {
        if !list.contains(&node) {
            list.push(node);
        }
    }
}

/// Bind `name` on a view using the default configuration.
pub fn bind<V: View + ?Sized>(view: &V, name: &str) -> BindResult<Binder> {
    Binder::new(view, name)
}

/// Bind `name` on a view with an explicit configuration.
pub fn bind_with_config<V: View + ?Sized>(
    view: &V,
    name: &str,
    config: BinderConfig,
) -> BindResult<Binder> {
    Binder::with_config(view, name, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::BasicView;
    use horizon_bind_core::DomError;
    use horizon_bind_core::dom::Document;
    use serde_json::json;

    fn view(markup: &str) -> (BasicView, Arc<Model>) {
        let model = Arc::new(Model::new());
        (BasicView::from_markup(markup, model.clone()).unwrap(), model)
    }

    #[test]
    fn test_empty_property_name_rejected() {
        let (view, _) = view("<div></div>");
        assert_eq!(Binder::new(&view, "").unwrap_err(), BindError::EmptyPropertyName);
    }

    #[test]
    fn test_missing_context_is_fatal() {
        let (view, model) = view("<div></div>");
        let detached = BasicView::new(SharedDocument::new(), view.el(), model);

        assert_eq!(
            Binder::new(&detached, "bar").unwrap_err(),
            BindError::Dom(DomError::InvalidNode)
        );
    }

    #[test]
    fn test_unknown_operator_is_collected_but_not_wired() {
        let (view, model) = view(r#"<div><b data-mcp-target="!bar">keep</b></div>"#);
        let binder = Binder::new(&view, "bar").unwrap();

        assert_eq!(binder.targets().len(), 1);
        assert_eq!(binder.listener_count(), 0);

        model.set("bar", "changed");
        assert_eq!(view.text(binder.targets()[0]).unwrap(), "keep");
    }

    #[test]
    fn test_context_input_via_marker() {
        let (view, _) = view(
            r#"<form data-mcp-source="other"><input data-mcp-source="bar"/><input data-mcp-source="baz"/></form>"#,
        );
        let binder = Binder::new(&view, "bar").unwrap();

        assert_eq!(binder.inputs().len(), 2);
        assert_eq!(binder.inputs()[1], view.el());
        binder.add_inputs("baz");
        assert_eq!(binder.inputs().len(), 2);
    }

    #[test]
    fn test_add_targets_after_destroy_fails() {
        let (view, _) = view("<div></div>");
        let mut binder = Binder::new(&view, "bar").unwrap();
        binder.destroy();
        binder.destroy();

        assert_eq!(binder.state(), BinderState::Destroyed);
        assert_eq!(
            binder.add_targets("baz").unwrap_err(),
            BindError::Destroyed("bar".into())
        );
    }

    #[test]
    fn test_removed_target_does_not_panic() {
        let (view, model) = view(r#"<div><i data-mcp-target="=bar"></i></div>"#);
        let binder = Binder::new(&view, "bar").unwrap();
        let target = binder.targets()[0];
        view.document().with_write(|doc: &mut Document| doc.remove(target)).unwrap();

        assert!(model.set("bar", "ignored"));
        assert_eq!(view.text(view.el()).unwrap(), "");
    }

    #[test]
    fn test_properties_track_add_targets() {
        let (view, model) = view(r#"<div data-mcp-target="^baz"></div>"#);
        model.set("baz", json!(7));
        let mut binder = Binder::new(&view, "bar").unwrap();

        assert!(binder.targets().is_empty());
        assert_eq!(binder.add_targets("baz").unwrap(), vec![view.el()]);
        assert_eq!(binder.properties(), &["bar".to_string(), "baz".to_string()]);
        assert_eq!(
            view.document().read().data(view.el(), "baz").unwrap(),
            Some("7")
        );
    }
}
