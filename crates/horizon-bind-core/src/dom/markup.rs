//! Markup fragments: parsing into and serializing out of a [`Document`].
//!
//! Fragments are XML-style markup with a few HTML conveniences: attributes
//! may omit their value (`<input disabled/>`) and a void element (`br`,
//! `input`, ...) opened without a closing tag is closed implicitly. Childless
//! void elements serialize self-closing. Only the XML entities are understood.

use quick_xml::Reader;
use quick_xml::escape::escape;
use quick_xml::events::{BytesStart, Event};

use super::document::{Document, NodeId, NodeKind};
use crate::error::{DomError, DomResult};
use crate::logging::targets;

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source",
    "track", "wbr",
];

fn is_void(tag: &str) -> bool {
    VOID_ELEMENTS.iter().any(|v| v.eq_ignore_ascii_case(tag))
}

fn markup_error(err: impl std::fmt::Display) -> DomError {
    DomError::Markup(err.to_string())
}

impl Document {
    /// Parse a markup fragment, returning its top-level nodes (detached).
    ///
    /// ```
    /// use horizon_bind_core::dom::Document;
    ///
    /// let mut doc = Document::new();
    /// let nodes = doc
    ///     .parse_fragment(r#"<div class="foo" data-mcp-target="=bar">baz</div>"#)
    ///     .unwrap();
    /// assert_eq!(doc.text_content(nodes[0]).unwrap(), "baz");
    /// ```
    pub fn parse_fragment(&mut self, markup: &str) -> DomResult<Vec<NodeId>> {
        let mut reader = Reader::from_str(markup);
        reader.config_mut().check_end_names = false;

        let mut roots = Vec::new();
        let mut open: Vec<NodeId> = Vec::new();

        loop {
            let event = reader.read_event().map_err(markup_error)?;
            let node = match event {
                Event::Start(start) => {
                    let (node, tag) = self.element_from(&start)?;
                    self.attach(node, &open, &mut roots)?;
                    if !is_void(&tag) {
                        open.push(node);
                    }
                    continue;
                }
                Event::Empty(start) => self.element_from(&start)?.0,
                Event::End(end) => {
                    let name = String::from_utf8_lossy(end.name().as_ref()).into_owned();
                    if is_void(&name) {
                        continue;
                    }
                    let Some(current) = open.pop() else {
                        return Err(DomError::Markup(format!("unexpected closing tag </{name}>")));
                    };
                    let tag = self.tag_name(current)?;
                    if !tag.eq_ignore_ascii_case(&name) {
                        return Err(DomError::Markup(format!(
                            "expected </{tag}>, found </{name}>"
                        )));
                    }
                    continue;
                }
                Event::Text(text) => {
                    let text = text.unescape().map_err(markup_error)?;
                    self.create_text(text.into_owned())
                }
                Event::CData(data) => {
                    let text = String::from_utf8_lossy(&data.into_inner()).into_owned();
                    self.create_text(text)
                }
                Event::Eof => break,
                _ => continue,
            };
            self.attach(node, &open, &mut roots)?;
        }

        if let Some(&unclosed) = open.last() {
            return Err(DomError::Markup(format!(
                "unclosed element <{}>",
                self.tag_name(unclosed)?
            )));
        }
        tracing::debug!(target: targets::DOM, roots = roots.len(), "parsed fragment");
        Ok(roots)
    }

    /// Parse a fragment that holds exactly one element.
    ///
    /// Whitespace-only text around the element is discarded.
    pub fn parse_element(&mut self, markup: &str) -> DomResult<NodeId> {
        let roots = self.parse_fragment(markup)?;
        let mut element = None;
        for node in roots {
            let keep = match self.kind(node)? {
                NodeKind::Element(_) => element.is_none(),
                NodeKind::Text(text) => !text.trim().is_empty(),
            };
            match (keep, self.is_element(node)) {
                (true, true) => element = Some(node),
                (false, false) => self.remove(node)?,
                _ => {
                    return Err(DomError::Markup(
                        "expected a single element".to_string(),
                    ));
                }
            }
        }
        element.ok_or_else(|| DomError::Markup("expected a single element".to_string()))
    }

    fn element_from(&mut self, start: &BytesStart<'_>) -> DomResult<(NodeId, String)> {
        let tag = String::from_utf8_lossy(start.name().as_ref()).into_owned();
        let node = self.create_element(tag.clone());
        for attribute in start.html_attributes() {
            let attribute = attribute.map_err(markup_error)?;
            let name = String::from_utf8_lossy(attribute.key.as_ref()).into_owned();
            let value = attribute.unescape_value().map_err(markup_error)?;
            self.set_attribute(node, &name, value.into_owned())?;
        }
        Ok((node, tag))
    }

    fn attach(&mut self, node: NodeId, open: &[NodeId], roots: &mut Vec<NodeId>) -> DomResult<()> {
        match open.last() {
            Some(&parent) => self.append_child(parent, node),
            None => {
                roots.push(node);
                Ok(())
            }
        }
    }

    /// Serialize a node and its subtree.
    pub fn outer_html(&self, id: NodeId) -> DomResult<String> {
        let mut output = String::new();
        self.write_node(id, &mut output)?;
        Ok(output)
    }

    /// Serialize the children of a node.
    pub fn inner_html(&self, id: NodeId) -> DomResult<String> {
        let mut output = String::new();
        for &child in self.children(id)? {
            self.write_node(child, &mut output)?;
        }
        Ok(output)
    }

    fn write_node(&self, id: NodeId, output: &mut String) -> DomResult<()> {
        match self.kind(id)? {
            NodeKind::Text(text) => output.push_str(&escape(text.as_str())),
            NodeKind::Element(element) => {
                output.push('<');
                output.push_str(element.tag());
                for (name, value) in element.attributes() {
                    output.push(' ');
                    output.push_str(name);
                    output.push_str("=\"");
                    output.push_str(&escape(value));
                    output.push('"');
                }
                let children = self.children(id)?;
                if children.is_empty() && is_void(element.tag()) {
                    output.push_str("/>");
                    return Ok(());
                }
                output.push('>');
                for &child in children {
                    self.write_node(child, output)?;
                }
                output.push_str("</");
                output.push_str(element.tag());
                output.push('>');
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_nested_fragment() {
        let mut doc = Document::new();
        let root = doc
            .parse_element(
                r#"
                <section data-mcp-source="title">
                    <h1 data-mcp-target="=title">Draft</h1>
                    <input data-mcp-source="title" disabled/>
                    <p class="state state-idle" data-mcp-target=".state"/>
                </section>
                "#,
            )
            .unwrap();

        let elements: Vec<_> = doc
            .descendants(root)
            .unwrap()
            .into_iter()
            .filter(|&n| doc.is_element(n))
            .collect();
        assert_eq!(elements.len(), 3);
        assert_eq!(doc.tag_name(elements[0]).unwrap(), "h1");
        assert_eq!(doc.text_content(elements[0]).unwrap(), "Draft");
        assert_eq!(doc.attribute(elements[1], "disabled").unwrap(), Some(""));
        assert_eq!(doc.parent(elements[2]).unwrap(), Some(root));
    }

    #[test]
    fn test_entities_are_unescaped() {
        let mut doc = Document::new();
        let node = doc
            .parse_element(r#"<p title="a &amp; b">1 &lt; 2</p>"#)
            .unwrap();

        assert_eq!(doc.attribute(node, "title").unwrap(), Some("a & b"));
        assert_eq!(doc.text_content(node).unwrap(), "1 < 2");
        assert_eq!(
            doc.outer_html(node).unwrap(),
            r#"<p title="a &amp; b">1 &lt; 2</p>"#
        );
    }

    #[test]
    fn test_serialization_round_trip() {
        let markup = r#"<div class="foo" data-mcp-target="=bar">baz<br/><span></span></div>"#;
        let mut doc = Document::new();
        let node = doc.parse_element(markup).unwrap();

        assert_eq!(doc.outer_html(node).unwrap(), markup);
        assert_eq!(doc.inner_html(node).unwrap(), "baz<br/><span></span>");
    }

    #[test]
    fn test_mismatched_tags_fail() {
        let mut doc = Document::new();
        assert!(matches!(
            doc.parse_fragment("<div><span></div>"),
            Err(DomError::Markup(_))
        ));
        assert!(matches!(doc.parse_fragment("<div>"), Err(DomError::Markup(_))));
        assert!(matches!(doc.parse_fragment("</div>"), Err(DomError::Markup(_))));
    }

    #[test]
    fn test_parse_element_requires_single_element() {
        let mut doc = Document::new();
        assert!(doc.parse_element("<a></a><b></b>").is_err());
        assert!(doc.parse_element("just text").is_err());
        assert!(doc.parse_element("  <a></a>\n").is_ok());
    }
}
