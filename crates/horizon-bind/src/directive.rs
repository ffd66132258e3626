//! Target directives and their mutation strategies.
//!
//! A target element carries a directive of the form `<operator><path>`, for
//! example `=title`, `^state` or `.parent.status`. The operator decides how
//! the bound property's value reaches the element:
//!
//! | operator | mutation                                                      |
//! |----------|---------------------------------------------------------------|
//! | `^`      | set the `data-<property>` attribute                           |
//! | `=`      | replace the element's text content                            |
//! | `.`      | swap any `<property>-*` class for `<property>-<value>`        |
//!
//! Directives are parsed once when an element is bound. The property name a
//! mutation uses is always the name the element was bound under, never the
//! tail of the directive.

use horizon_bind_core::dom::{Document, NodeId};
use horizon_bind_core::{DomResult, Value, render_text, render_value};

/// The leading character of a directive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    /// `^`
    DataAttribute,
    /// `=`
    Text,
    /// `.`
    Class,
}

impl Operator {
    /// Read the operator of a directive. Unknown operators yield `None`.
    pub fn from_directive(directive: &str) -> Option<Self> {
        match directive.chars().next()? {
            '^' => Some(Self::DataAttribute),
            '=' => Some(Self::Text),
            '.' => Some(Self::Class),
            _ => None,
        }
    }

    /// The operator character.
    pub fn as_char(self) -> char {
        match self {
            Self::DataAttribute => '^',
            Self::Text => '=',
            Self::Class => '.',
        }
    }
}

/// A mutation strategy bound to one property.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Mutation {
    /// Set the attribute `data-<name>`.
    DataAttribute {
        /// The bound property name.
        name: String,
    },
    /// Replace the element's text content.
    Text,
    /// Replace classes starting with `prefix` by `prefix` + value.
    Class {
        /// `<property>-`
        prefix: String,
    },
}

impl Mutation {
    /// Parse a directive for an element bound under `property`.
    ///
    /// Returns `None` when the operator is not recognized; such elements are
    /// left untouched.
    pub fn parse(directive: &str, property: &str) -> Option<Self> {
        Some(match Operator::from_directive(directive)? {
            Operator::DataAttribute => Self::DataAttribute {
                name: property.to_string(),
            },
            Operator::Text => Self::Text,
            Operator::Class => Self::Class {
                prefix: format!("{property}-"),
            },
        })
    }

    /// The operator this strategy was parsed from.
    pub fn operator(&self) -> Operator {
        match self {
            Self::DataAttribute { .. } => Operator::DataAttribute,
            Self::Text => Operator::Text,
            Self::Class { .. } => Operator::Class,
        }
    }

    /// Apply a value to an element.
    pub fn apply(&self, doc: &mut Document, node: NodeId, value: Option<&Value>) -> DomResult<()> {
        match self {
            Self::DataAttribute { name } => doc.set_data(node, name, render_value(value)),
            Self::Text => doc.set_text_content(node, render_text(value)),
            Self::Class { prefix } => {
                for class in doc.class_list(node)? {
                    if class.starts_with(prefix.as_str()) {
                        doc.remove_class(node, &class)?;
                    }
                }
                doc.add_class(node, &format!("{prefix}{}", render_value(value)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn element(markup: &str) -> (Document, NodeId) {
        let mut doc = Document::new();
        let node = doc.parse_element(markup).unwrap();
        (doc, node)
    }

    #[test]
    fn test_parse_operators() {
        assert_eq!(
            Mutation::parse("^anything", "bar"),
            Some(Mutation::DataAttribute { name: "bar".into() })
        );
        assert_eq!(Mutation::parse("=parent.bar", "bar"), Some(Mutation::Text));
        assert_eq!(
            Mutation::parse(".bar", "bar"),
            Some(Mutation::Class { prefix: "bar-".into() })
        );
        assert_eq!(Mutation::parse("!bar", "bar"), None);
        assert_eq!(Mutation::parse("", "bar"), None);
    }

    #[test]
    fn test_data_attribute_uses_property_name() {
        let (mut doc, node) = element(r#"<div data-mcp-target="^parent.state"></div>"#);
        let mutation = Mutation::parse("^parent.state", "state").unwrap();

        mutation.apply(&mut doc, node, Some(&json!("busy"))).unwrap();

        assert_eq!(doc.data(node, "state").unwrap(), Some("busy"));
        assert_eq!(doc.data(node, "parent.state").unwrap(), None);
    }

    #[test]
    fn test_text_mutation() {
        let (mut doc, node) = element(r#"<div data-mcp-target="=bar">baz</div>"#);

        Mutation::Text.apply(&mut doc, node, Some(&json!("someval"))).unwrap();
        assert_eq!(doc.text_content(node).unwrap(), "someval");

        Mutation::Text.apply(&mut doc, node, None).unwrap();
        assert_eq!(doc.text_content(node).unwrap(), "");
    }

    #[test]
    fn test_class_mutation_replaces_prefixed_classes() {
        let (mut doc, node) =
            element(r#"<div class="card foo-bar foo-qux foobar" data-mcp-target=".foo"></div>"#);
        let mutation = Mutation::parse(".foo", "foo").unwrap();

        mutation.apply(&mut doc, node, Some(&json!("baz"))).unwrap();

        assert_eq!(doc.class_list(node).unwrap(), vec!["card", "foobar", "foo-baz"]);
    }

    #[test]
    fn test_missing_value_propagates() {
        let (mut doc, node) = element(r#"<div class="foo-bar"></div>"#);
        Mutation::parse(".foo", "foo")
            .unwrap()
            .apply(&mut doc, node, None)
            .unwrap();
        Mutation::parse("^foo", "foo")
            .unwrap()
            .apply(&mut doc, node, None)
            .unwrap();

        assert!(doc.has_class(node, "foo-undefined").unwrap());
        assert_eq!(doc.data(node, "foo").unwrap(), Some("undefined"));
    }

    #[test]
    fn test_operator_round_trip() {
        for op in [Operator::DataAttribute, Operator::Text, Operator::Class] {
            let directive = format!("{}x", op.as_char());
            assert_eq!(Operator::from_directive(&directive), Some(op));
            assert_eq!(Mutation::parse(&directive, "x").unwrap().operator(), op);
        }
    }
}
