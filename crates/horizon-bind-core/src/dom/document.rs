//! Arena-backed element tree.

use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use slotmap::{SlotMap, new_key_type};

use super::selector::Selector;
use crate::error::{DomError, DomResult};
use crate::logging::targets;

new_key_type! {
    /// A stable handle to a node in a [`Document`].
    ///
    /// Node identity is handle identity: two elements with identical tags and
    /// attributes are still different nodes. A `NodeId` becomes invalid when
    /// its node (or an ancestor) is removed.
    pub struct NodeId;
}

/// Tag name and attributes of an element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementData {
    tag: String,
    /// Attributes in insertion order.
    attributes: Vec<(String, String)>,
}

impl ElementData {
    fn new(tag: String) -> Self {
        Self {
            tag,
            attributes: Vec::new(),
        }
    }

    /// The element's tag name.
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Look up an attribute value.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// All attributes in insertion order.
    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    fn set_attribute(&mut self, name: &str, value: String) {
        match self.attributes.iter_mut().find(|(key, _)| key == name) {
            Some((_, existing)) => *existing = value,
            None => self.attributes.push((name.to_string(), value)),
        }
    }

    fn remove_attribute(&mut self, name: &str) -> Option<String> {
        let index = self.attributes.iter().position(|(key, _)| key == name)?;
        Some(self.attributes.remove(index).1)
    }

    /// Test the element against a selector.
    pub fn matches(&self, selector: &Selector) -> bool {
        selector.matches(&self.tag, |name| self.attribute(name))
    }
}

/// The payload of a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// An element with a tag and attributes.
    Element(ElementData),
    /// A run of text.
    Text(String),
}

#[derive(Debug)]
struct NodeData {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// An element tree.
///
/// Nodes live in an arena and are addressed by [`NodeId`]. Nodes created
/// with [`create_element`](Self::create_element) or
/// [`create_text`](Self::create_text) start detached and are attached with
/// [`append_child`](Self::append_child). Removing a node removes its whole
/// subtree.
///
/// Queries ([`query_all`](Self::query_all) and friends) search the
/// descendants of a root in document order and never include the root
/// itself.
#[derive(Debug, Default)]
pub struct Document {
    nodes: SlotMap<NodeId, NodeData>,
}

impl Document {
    /// Create an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a detached element.
    pub fn create_element(&mut self, tag: impl Into<String>) -> NodeId {
        self.insert(NodeKind::Element(ElementData::new(tag.into())))
    }

    /// Create a detached text node.
    pub fn create_text(&mut self, text: impl Into<String>) -> NodeId {
        self.insert(NodeKind::Text(text.into()))
    }

    fn insert(&mut self, kind: NodeKind) -> NodeId {
        self.nodes.insert(NodeData {
            kind,
            parent: None,
            children: Vec::new(),
        })
    }

    /// Number of live nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Check if a node exists.
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    fn node(&self, id: NodeId) -> DomResult<&NodeData> {
        self.nodes.get(id).ok_or(DomError::InvalidNode)
    }

    /// The payload of a node.
    pub fn kind(&self, id: NodeId) -> DomResult<&NodeKind> {
        Ok(&self.node(id)?.kind)
    }

    /// The element data of a node.
    pub fn element(&self, id: NodeId) -> DomResult<&ElementData> {
        match &self.node(id)?.kind {
            NodeKind::Element(element) => Ok(element),
            NodeKind::Text(_) => Err(DomError::NotAnElement),
        }
    }

    fn element_mut(&mut self, id: NodeId) -> DomResult<&mut ElementData> {
        let node = self.nodes.get_mut(id).ok_or(DomError::InvalidNode)?;
        match &mut node.kind {
            NodeKind::Element(element) => Ok(element),
            NodeKind::Text(_) => Err(DomError::NotAnElement),
        }
    }

    /// Returns true if the node is an element.
    pub fn is_element(&self, id: NodeId) -> bool {
        matches!(self.kind(id), Ok(NodeKind::Element(_)))
    }

    /// The tag name of an element.
    pub fn tag_name(&self, id: NodeId) -> DomResult<&str> {
        Ok(self.element(id)?.tag())
    }

    // =========================================================================
    // Tree structure
    // =========================================================================

    /// The parent of a node.
    pub fn parent(&self, id: NodeId) -> DomResult<Option<NodeId>> {
        Ok(self.node(id)?.parent)
    }

    /// The children of a node.
    pub fn children(&self, id: NodeId) -> DomResult<&[NodeId]> {
        Ok(&self.node(id)?.children)
    }

    /// Append `child` as the last child of `parent`, detaching it from its
    /// previous parent first.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> DomResult<()> {
        self.element(parent)?;
        self.node(child)?;
        if self.is_ancestor_of(child, parent) {
            return Err(DomError::CircularParentage);
        }

        self.detach(child);
        if let Some(data) = self.nodes.get_mut(child) {
            data.parent = Some(parent);
        }
        if let Some(data) = self.nodes.get_mut(parent) {
            data.children.push(child);
        }
        Ok(())
    }

    /// Check if `ancestor` is `id` or one of its ancestors.
    fn is_ancestor_of(&self, ancestor: NodeId, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(current_id) = current {
            if current_id == ancestor {
                return true;
            }
            current = self.nodes.get(current_id).and_then(|d| d.parent);
        }
        false
    }

    fn detach(&mut self, id: NodeId) {
        let parent = self.nodes.get_mut(id).and_then(|d| d.parent.take());
        if let Some(parent_data) = parent.and_then(|p| self.nodes.get_mut(p)) {
            parent_data.children.retain(|&child| child != id);
        }
    }

    /// Remove a node and its whole subtree.
    #[tracing::instrument(skip(self), target = "horizon_bind_core::dom", level = "trace")]
    pub fn remove(&mut self, id: NodeId) -> DomResult<()> {
        let subtree = self.descendants(id)?;
        self.detach(id);
        for node in subtree {
            self.nodes.remove(node);
        }
        self.nodes.remove(id);
        Ok(())
    }

    /// All descendants of a node in document (pre-)order, excluding the node.
    pub fn descendants(&self, id: NodeId) -> DomResult<Vec<NodeId>> {
        let mut result = Vec::new();
        let mut stack: Vec<NodeId> = self.node(id)?.children.iter().rev().copied().collect();
        while let Some(current) = stack.pop() {
            result.push(current);
            if let Some(data) = self.nodes.get(current) {
                stack.extend(data.children.iter().rev().copied());
            }
        }
        Ok(result)
    }

    // =========================================================================
    // Attributes
    // =========================================================================

    /// Get an attribute value.
    pub fn attribute(&self, id: NodeId, name: &str) -> DomResult<Option<&str>> {
        Ok(self.element(id)?.attribute(name))
    }

    /// Returns true if the element carries the attribute (any value).
    pub fn has_attribute(&self, id: NodeId, name: &str) -> DomResult<bool> {
        Ok(self.element(id)?.attribute(name).is_some())
    }

    /// Set an attribute, replacing any existing value.
    pub fn set_attribute(
        &mut self,
        id: NodeId,
        name: &str,
        value: impl Into<String>,
    ) -> DomResult<()> {
        self.element_mut(id)?.set_attribute(name, value.into());
        Ok(())
    }

    /// Remove an attribute, returning its previous value.
    pub fn remove_attribute(&mut self, id: NodeId, name: &str) -> DomResult<Option<String>> {
        Ok(self.element_mut(id)?.remove_attribute(name))
    }

    /// Attribute names in insertion order.
    pub fn attribute_names(&self, id: NodeId) -> DomResult<Vec<String>> {
        Ok(self
            .element(id)?
            .attributes()
            .map(|(name, _)| name.to_string())
            .collect())
    }

    /// Get a `data-<key>` attribute.
    pub fn data(&self, id: NodeId, key: &str) -> DomResult<Option<&str>> {
        self.attribute(id, &data_attribute_name(key))
    }

    /// Set a `data-<key>` attribute.
    pub fn set_data(&mut self, id: NodeId, key: &str, value: impl Into<String>) -> DomResult<()> {
        self.set_attribute(id, &data_attribute_name(key), value)
    }

    // =========================================================================
    // Text
    // =========================================================================

    /// The concatenated text of a node and its descendants.
    pub fn text_content(&self, id: NodeId) -> DomResult<String> {
        if let NodeKind::Text(text) = &self.node(id)?.kind {
            return Ok(text.clone());
        }
        let mut text = String::new();
        for node in self.descendants(id)? {
            if let Some(NodeData {
                kind: NodeKind::Text(chunk),
                ..
            }) = self.nodes.get(node)
            {
                text.push_str(chunk);
            }
        }
        Ok(text)
    }

    /// Replace the content of a node with text.
    ///
    /// For an element, text children are removed and element children are
    /// detached (their IDs stay valid), then, unless `text` is empty, a single
    /// text node is appended. For a text node its text is replaced.
    pub fn set_text_content(&mut self, id: NodeId, text: impl Into<String>) -> DomResult<()> {
        let text = text.into();
        let node = self.nodes.get_mut(id).ok_or(DomError::InvalidNode)?;
        if let NodeKind::Text(existing) = &mut node.kind {
            *existing = text;
            return Ok(());
        }

        let children = std::mem::take(&mut node.children);
        for child in children {
            match self.nodes.get(child).map(|data| &data.kind) {
                Some(NodeKind::Text(_)) => {
                    self.nodes.remove(child);
                }
                Some(NodeKind::Element(_)) => {
                    if let Some(data) = self.nodes.get_mut(child) {
                        data.parent = None;
                    }
                }
                None => {}
            }
        }
        if !text.is_empty() {
            let text_node = self.create_text(text);
            self.append_child(id, text_node)?;
        }
        Ok(())
    }

    // =========================================================================
    // Classes
    // =========================================================================

    /// The element's classes in attribute order.
    pub fn class_list(&self, id: NodeId) -> DomResult<Vec<String>> {
        Ok(self
            .attribute(id, "class")?
            .map(|class| class.split_whitespace().map(str::to_string).collect())
            .unwrap_or_default())
    }

    /// Returns true if the element has the class.
    pub fn has_class(&self, id: NodeId, name: &str) -> DomResult<bool> {
        Ok(self
            .attribute(id, "class")?
            .is_some_and(|class| class.split_whitespace().any(|c| c == name)))
    }

    /// Add a class if it is not already present.
    pub fn add_class(&mut self, id: NodeId, name: &str) -> DomResult<()> {
        let mut classes = self.class_list(id)?;
        if !classes.iter().any(|c| c == name) {
            classes.push(name.to_string());
        }
        self.set_attribute(id, "class", classes.join(" "))
    }

    /// Remove every occurrence of a class.
    pub fn remove_class(&mut self, id: NodeId, name: &str) -> DomResult<()> {
        let mut classes = self.class_list(id)?;
        let before = classes.len();
        classes.retain(|c| c != name);
        if classes.len() != before {
            self.set_attribute(id, "class", classes.join(" "))?;
        }
        Ok(())
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Test a node against a selector. Text nodes never match.
    pub fn matches(&self, id: NodeId, selector: &Selector) -> DomResult<bool> {
        Ok(match &self.node(id)?.kind {
            NodeKind::Element(element) => element.matches(selector),
            NodeKind::Text(_) => false,
        })
    }

    /// All descendant elements of `root` matching `selector`, in document order.
    pub fn query_all(&self, root: NodeId, selector: &Selector) -> DomResult<Vec<NodeId>> {
        let found: Vec<NodeId> = self
            .descendants(root)?
            .into_iter()
            .filter(|&node| self.matches(node, selector).unwrap_or(false))
            .collect();
        tracing::trace!(target: targets::DOM, %selector, matches = found.len(), "query");
        Ok(found)
    }

    /// Parse `selector` and return all matching descendants of `root`.
    pub fn query_selector_all(&self, root: NodeId, selector: &str) -> DomResult<Vec<NodeId>> {
        let selector = Selector::parse(selector)?;
        self.query_all(root, &selector)
    }

    /// Parse `selector` and return the first matching descendant of `root`.
    pub fn query_selector(&self, root: NodeId, selector: &str) -> DomResult<Option<NodeId>> {
        let selector = Selector::parse(selector)?;
        Ok(self
            .descendants(root)?
            .into_iter()
            .find(|&node| self.matches(node, &selector).unwrap_or(false)))
    }
}

fn data_attribute_name(key: &str) -> String {
    format!("data-{key}")
}

/// A shared, lockable [`Document`].
///
/// Binders keep a clone of this handle inside their listeners so they can
/// update elements when the model changes.
#[derive(Debug, Clone, Default)]
pub struct SharedDocument {
    inner: Arc<RwLock<Document>>,
}

impl SharedDocument {
    /// Create a handle to an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an existing document.
    pub fn from_document(document: Document) -> Self {
        Self {
            inner: Arc::new(RwLock::new(document)),
        }
    }

    /// Acquire shared read access.
    pub fn read(&self) -> RwLockReadGuard<'_, Document> {
        self.inner.read()
    }

    /// Acquire exclusive write access.
    pub fn write(&self) -> RwLockWriteGuard<'_, Document> {
        self.inner.write()
    }

    /// Execute a function with read access to the document.
    pub fn with_read<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&Document) -> R,
    {
        f(&self.inner.read())
    }

    /// Execute a function with write access to the document.
    pub fn with_write<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut Document) -> R,
    {
        f(&mut self.inner.write())
    }

    /// Returns true if both handles refer to the same document.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}
