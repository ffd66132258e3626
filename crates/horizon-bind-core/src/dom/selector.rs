//! Element selectors.
//!
//! A small subset of CSS selectors, enough to find annotated elements:
//! comma-separated compound selectors without combinators. Each compound is
//! an optional tag name (or `*`) followed by any number of `.class`, `#id`
//! and attribute components:
//!
//! | syntax         | matches when the attribute...                      |
//! |----------------|----------------------------------------------------|
//! | `[attr]`       | is present                                         |
//! | `[attr=v]`     | equals `v`                                         |
//! | `[attr$=v]`    | ends with `v`                                      |
//! | `[attr^=v]`    | starts with `v`                                    |
//! | `[attr*=v]`    | contains `v`                                       |
//! | `[attr~=v]`    | has `v` as one of its whitespace-separated words   |
//! | `[attr\|=v]`   | equals `v` or starts with `v-`                     |
//!
//! Selector strings are tokenized with `cssparser`, so values may be quoted
//! strings with CSS escapes or bare identifiers. As in CSS, `$=`, `^=` and `*=`
//! with an empty value never match.
//!
//! Selectors can be parsed from strings or built directly, which avoids
//! escaping values that come from user data:
//!
//! ```
//! use horizon_bind_core::dom::{AttributeOperator, Selector};
//!
//! let parsed: Selector = r#"[data-mcp-target$="bar"]"#.parse().unwrap();
//! let built = Selector::attribute("data-mcp-target", AttributeOperator::EndsWith, "bar");
//! assert_eq!(parsed, built);
//! ```

use std::fmt;
use std::str::FromStr;

use cssparser::{
    BasicParseErrorKind, ParseError, ParseErrorKind, Parser, ParserInput, ToCss, Token,
};

use crate::error::SelectorError;

/// How an attribute component compares the attribute value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeOperator {
    /// `[attr]`
    Exists,
    /// `[attr=v]`
    Equals,
    /// `[attr$=v]`
    EndsWith,
    /// `[attr^=v]`
    StartsWith,
    /// `[attr*=v]`
    Contains,
    /// `[attr~=v]`
    Includes,
    /// `[attr|=v]`
    DashMatch,
}

impl AttributeOperator {
    fn as_str(self) -> &'static str {
        match self {
            Self::Exists => "",
            Self::Equals => "=",
            Self::EndsWith => "$=",
            Self::StartsWith => "^=",
            Self::Contains => "*=",
            Self::Includes => "~=",
            Self::DashMatch => "|=",
        }
    }
}

/// A single `[name op value]` component.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AttributeSelector {
    name: String,
    operator: AttributeOperator,
    value: String,
}

impl AttributeSelector {
    /// Create an attribute component.
    pub fn new(
        name: impl Into<String>,
        operator: AttributeOperator,
        value: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            operator,
            value: value.into(),
        }
    }

    /// The attribute name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The comparison operator.
    pub fn operator(&self) -> AttributeOperator {
        self.operator
    }

    /// The comparison value (empty for [`AttributeOperator::Exists`]).
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Test an attribute value (`None` if the attribute is absent).
    pub fn matches_value(&self, actual: Option<&str>) -> bool {
        let Some(actual) = actual else {
            return false;
        };
        let expected = self.value.as_str();
        match self.operator {
            AttributeOperator::Exists => true,
            AttributeOperator::Equals => actual == expected,
            AttributeOperator::EndsWith => !expected.is_empty() && actual.ends_with(expected),
            AttributeOperator::StartsWith => !expected.is_empty() && actual.starts_with(expected),
            AttributeOperator::Contains => !expected.is_empty() && actual.contains(expected),
            AttributeOperator::Includes => {
                !expected.is_empty()
                    && !expected.contains(char::is_whitespace)
                    && actual.split_whitespace().any(|word| word == expected)
            }
            AttributeOperator::DashMatch => {
                actual == expected
                    || actual
                        .strip_prefix(expected)
                        .is_some_and(|rest| rest.starts_with('-'))
            }
        }
    }
}

/// One comma-separated group: tag, ids, classes and attribute components,
/// all of which must match.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct CompoundSelector {
    tag: Option<String>,
    ids: Vec<String>,
    classes: Vec<String>,
    attributes: Vec<AttributeSelector>,
}

impl CompoundSelector {
    /// Test the compound against an element's tag and attribute lookup.
    pub fn matches<'a, F>(&self, tag: &str, attribute: F) -> bool
    where
        F: Fn(&str) -> Option<&'a str>,
    {
        if let Some(expected) = &self.tag
            && expected != "*"
            && !expected.eq_ignore_ascii_case(tag)
        {
            return false;
        }
        if !self.ids.is_empty() {
            let id = attribute("id");
            if !self.ids.iter().all(|expected| id == Some(expected.as_str())) {
                return false;
            }
        }
        if !self.classes.is_empty() {
            let class = attribute("class").unwrap_or_default();
            let has = |name: &str| class.split_whitespace().any(|c| c == name);
            if !self.classes.iter().all(|name| has(name)) {
                return false;
            }
        }
        self.attributes
            .iter()
            .all(|component| component.matches_value(attribute(&component.name)))
    }

    fn is_empty(&self) -> bool {
        self.tag.is_none()
            && self.ids.is_empty()
            && self.classes.is_empty()
            && self.attributes.is_empty()
    }
}

/// A parsed selector: a list of alternatives.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Selector {
    groups: Vec<CompoundSelector>,
}

impl Selector {
    /// Parse a selector string.
    pub fn parse(source: &str) -> Result<Self, SelectorError> {
        let mut input = ParserInput::new(source);
        let mut parser = Parser::new(&mut input);
        Ok(Self {
            groups: parse_groups(&mut parser)?,
        })
    }

    /// A selector with a single attribute component.
    pub fn attribute(
        name: impl Into<String>,
        operator: AttributeOperator,
        value: impl Into<String>,
    ) -> Self {
        Self {
            groups: vec![CompoundSelector {
                attributes: vec![AttributeSelector::new(name, operator, value)],
                ..Default::default()
            }],
        }
    }

    /// A selector matching every element with the given tag name.
    pub fn tag(name: impl Into<String>) -> Self {
        Self {
            groups: vec![CompoundSelector {
                tag: Some(name.into()),
                ..Default::default()
            }],
        }
    }

    /// The comma-separated alternatives.
    pub fn groups(&self) -> &[CompoundSelector] {
        &self.groups
    }

    /// Test the selector against an element's tag and attribute lookup.
    pub fn matches<'a, F>(&self, tag: &str, attribute: F) -> bool
    where
        F: Fn(&str) -> Option<&'a str>,
    {
        self.groups
            .iter()
            .any(|group| group.matches(tag, &attribute))
    }
}

impl FromStr for Selector {
    type Err = SelectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, group) in self.groups.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            if let Some(tag) = &group.tag {
                f.write_str(tag)?;
            }
            for id in &group.ids {
                write!(f, "#{id}")?;
            }
            for class in &group.classes {
                write!(f, ".{class}")?;
            }
            for attr in &group.attributes {
                match attr.operator {
                    AttributeOperator::Exists => write!(f, "[{}]", attr.name)?,
                    op => write!(
                        f,
                        "[{}{}\"{}\"]",
                        attr.name,
                        op.as_str(),
                        attr.value.replace('\\', "\\\\").replace('"', "\\\"")
                    )?,
                }
            }
        }
        Ok(())
    }
}

fn parse_groups<'i>(parser: &mut Parser<'i, '_>) -> Result<Vec<CompoundSelector>, SelectorError> {
    let mut groups = Vec::new();
    loop {
        parser.skip_whitespace();
        let (group, boundary) = parse_compound(parser)?;
        if group.is_empty() {
            return Err(SelectorError::Empty);
        }
        groups.push(group);
        if boundary == Boundary::End {
            return Ok(groups);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Boundary {
    Comma,
    End,
}

fn parse_compound<'i>(
    parser: &mut Parser<'i, '_>,
) -> Result<(CompoundSelector, Boundary), SelectorError> {
    let mut compound = CompoundSelector::default();
    loop {
        let location = parser.current_source_location();
        let token = match parser.next_including_whitespace() {
            Ok(token) => token.clone(),
            Err(_) => return Ok((compound, Boundary::End)),
        };
        match token {
            Token::Ident(name) if compound.is_empty() => compound.tag = Some(name.to_string()),
            Token::Delim('*') if compound.is_empty() => compound.tag = Some("*".to_string()),
            Token::Delim('.') => {
                let location = parser.current_source_location();
                match parser.next_including_whitespace() {
                    Ok(Token::Ident(class)) => compound.classes.push(class.to_string()),
                    Ok(other) => return Err(unexpected(other, location.column)),
                    Err(_) => return Err(SelectorError::UnexpectedEnd),
                }
            }
            Token::IDHash(id) => compound.ids.push(id.to_string()),
            Token::SquareBracketBlock => {
                let attribute = parser
                    .parse_nested_block(|p| parse_attribute(p))
                    .map_err(from_parse_error)?;
                compound.attributes.push(attribute);
            }
            Token::Comma => return Ok((compound, Boundary::Comma)),
            Token::WhiteSpace(_) => {
                parser.skip_whitespace();
                let location = parser.current_source_location();
                return match parser.next() {
                    Err(_) => Ok((compound, Boundary::End)),
                    Ok(Token::Comma) => Ok((compound, Boundary::Comma)),
                    Ok(_) => Err(SelectorError::UnsupportedCombinator {
                        column: location.column,
                    }),
                };
            }
            Token::Delim('>' | '+' | '~') => {
                return Err(SelectorError::UnsupportedCombinator {
                    column: location.column,
                });
            }
            other => return Err(unexpected(&other, location.column)),
        }
    }
}

fn parse_attribute<'i>(
    parser: &mut Parser<'i, '_>,
) -> Result<AttributeSelector, ParseError<'i, SelectorError>> {
    let name = parser.expect_ident()?.to_string();
    let operator = match parser.next() {
        Err(_) => return Ok(AttributeSelector::new(name, AttributeOperator::Exists, "")),
        Ok(Token::Delim('=')) => AttributeOperator::Equals,
        Ok(Token::SuffixMatch) => AttributeOperator::EndsWith,
        Ok(Token::PrefixMatch) => AttributeOperator::StartsWith,
        Ok(Token::SubstringMatch) => AttributeOperator::Contains,
        Ok(Token::IncludeMatch) => AttributeOperator::Includes,
        Ok(Token::DashMatch) => AttributeOperator::DashMatch,
        Ok(other) => {
            let other = other.clone();
            return Err(parser.new_unexpected_token_error(other));
        }
    };
    let value = parser.expect_ident_or_string()?.to_string();
    Ok(AttributeSelector::new(name, operator, value))
}

fn unexpected(token: &Token<'_>, column: u32) -> SelectorError {
    SelectorError::UnexpectedToken {
        token: token.to_css_string(),
        column,
    }
}

fn from_parse_error(err: ParseError<'_, SelectorError>) -> SelectorError {
    match err.kind {
        ParseErrorKind::Custom(err) => err,
        ParseErrorKind::Basic(BasicParseErrorKind::EndOfInput) => SelectorError::UnexpectedEnd,
        ParseErrorKind::Basic(BasicParseErrorKind::UnexpectedToken(token)) => {
            unexpected(&token, err.location.column)
        }
        ParseErrorKind::Basic(other) => SelectorError::UnexpectedToken {
            token: format!("{other:?}"),
            column: err.location.column,
        },
    }
}
