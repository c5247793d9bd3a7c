//! Selector fingerprints
//!
//! Parses the CSS selector subset used by overlay and video fingerprints and
//! matches it against any element tree exposed through [`ElementView`].
//! Browser hosts hand [`SelectorList::as_str`] to `querySelectorAll`; the
//! in-memory document walks its tree with [`SelectorList::matches`].
//!
//! Supported grammar:
//! - type selectors and `*`
//! - `#id` and `.class`
//! - `[attr]`, `[attr="v"]`, `[attr*="v"]`, `[attr^="v"]`, `[attr$="v"]`
//! - the descendant combinator (whitespace)
//! - selector lists separated by commas
//!
//! Quoted attribute values are taken literally; backslash escapes are not
//! interpreted.

use std::borrow::Cow;
use std::fmt;
use std::iter::Peekable;
use std::str::{CharIndices, FromStr};

use thiserror::Error;

/// Errors while parsing a selector fingerprint
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectorError {
    #[error("empty selector")]
    Empty,

    #[error("unexpected {found:?} at byte {position} in {selector:?}")]
    UnexpectedChar {
        selector: String,
        position: usize,
        found: char,
    },

    #[error("selector {selector:?} ends unexpectedly")]
    UnexpectedEnd { selector: String },

    #[error("unterminated attribute selector in {selector:?}")]
    UnterminatedAttribute { selector: String },

    #[error("unsupported combinator {combinator:?} in {selector:?}")]
    UnsupportedCombinator { selector: String, combinator: char },
}

// ═══════════════════════════════════════════════════════════════════════════
// Element View
// ═══════════════════════════════════════════════════════════════════════════

/// Read-only view of an element, enough to evaluate a selector.
pub trait ElementView: Sized {
    /// Lowercase tag name
    fn tag_name(&self) -> Cow<'_, str>;

    /// Attribute value as serialized in markup (`class` and `style` included)
    fn attribute(&self, name: &str) -> Option<Cow<'_, str>>;

    fn has_class(&self, class: &str) -> bool;

    fn parent_element(&self) -> Option<Self>;
}

// ═══════════════════════════════════════════════════════════════════════════
// Selector Types
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AttrOp {
    Exists,
    Equals,
    Contains,
    Prefix,
    Suffix,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct AttributeMatch {
    name: String,
    op: AttrOp,
    value: String,
}

impl AttributeMatch {
    fn matches(&self, actual: Option<&str>) -> bool {
        let Some(actual) = actual else {
            return false;
        };
        match self.op {
            AttrOp::Exists => true,
            AttrOp::Equals => actual == self.value,
            // Empty needles never match for substring operators
            AttrOp::Contains => !self.value.is_empty() && actual.contains(&self.value),
            AttrOp::Prefix => !self.value.is_empty() && actual.starts_with(&self.value),
            AttrOp::Suffix => !self.value.is_empty() && actual.ends_with(&self.value),
        }
    }
}

/// One compound selector: `tag#id.class[attr*="v"]`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attributes: Vec<AttributeMatch>,
}

impl Compound {
    fn matches<E: ElementView>(&self, element: &E) -> bool {
        if let Some(tag) = &self.tag
            && !element.tag_name().eq_ignore_ascii_case(tag)
        {
            return false;
        }
        if let Some(id) = &self.id
            && element.attribute("id").as_deref() != Some(id.as_str())
        {
            return false;
        }
        if !self.classes.iter().all(|class| element.has_class(class)) {
            return false;
        }
        self.attributes
            .iter()
            .all(|attr| attr.matches(element.attribute(&attr.name).as_deref()))
    }
}

/// A chain of compounds joined by descendant combinators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    compounds: Vec<Compound>,
}

impl Selector {
    pub fn matches<E: ElementView>(&self, element: &E) -> bool {
        let Some((subject, ancestors)) = self.compounds.split_last() else {
            return false;
        };
        if !subject.matches(element) {
            return false;
        }

        // Descendant-only chains: nearest matching ancestor is always the best choice
        let mut cursor = element.parent_element();
        'compounds: for compound in ancestors.iter().rev() {
            while let Some(candidate) = cursor.take() {
                cursor = candidate.parent_element();
                if compound.matches(&candidate) {
                    continue 'compounds;
                }
            }
            return false;
        }
        true
    }
}

/// A parsed, comma-separated selector list that remembers its source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorList {
    source: String,
    selectors: Vec<Selector>,
}

impl SelectorList {
    pub fn parse(source: &str) -> Result<Self, SelectorError> {
        let mut parser = Parser::new(source);
        let mut selectors = Vec::new();
        loop {
            selectors.push(parser.selector()?);
            parser.skip_ws();
            match parser.peek() {
                None => break,
                Some((_, ',')) => {
                    parser.bump();
                }
                Some((position, found)) => return Err(parser.unexpected(position, found)),
            }
        }

        Ok(Self {
            source: source.trim().to_string(),
            selectors,
        })
    }

    /// Source text, suitable for native `querySelectorAll`
    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn matches<E: ElementView>(&self, element: &E) -> bool {
        self.selectors.iter().any(|s| s.matches(element))
    }

    pub fn len(&self) -> usize {
        self.selectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selectors.is_empty()
    }
}

impl FromStr for SelectorList {
    type Err = SelectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for SelectorList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Parser
// ═══════════════════════════════════════════════════════════════════════════

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_' || !c.is_ascii()
}

struct Parser<'a> {
    source: &'a str,
    chars: Peekable<CharIndices<'a>>,
}

impl<'a> Parser<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            chars: source.char_indices().peekable(),
        }
    }

    fn peek(&mut self) -> Option<(usize, char)> {
        self.chars.peek().copied()
    }

    fn bump(&mut self) -> Option<(usize, char)> {
        self.chars.next()
    }

    /// Skip whitespace, returning whether any was consumed
    fn skip_ws(&mut self) -> bool {
        let mut skipped = false;
        while let Some((_, c)) = self.peek()
            && c.is_whitespace()
        {
            self.bump();
            skipped = true;
        }
        skipped
    }

    fn unexpected(&self, position: usize, found: char) -> SelectorError {
        SelectorError::UnexpectedChar {
            selector: self.source.to_string(),
            position,
            found,
        }
    }

    fn unexpected_end(&self) -> SelectorError {
        SelectorError::UnexpectedEnd {
            selector: self.source.to_string(),
        }
    }

    fn unterminated(&self) -> SelectorError {
        SelectorError::UnterminatedAttribute {
            selector: self.source.to_string(),
        }
    }

    fn ident(&mut self) -> String {
        let mut out = String::new();
        while let Some((_, c)) = self.peek()
            && is_ident_char(c)
        {
            out.push(c);
            self.bump();
        }
        out
    }

    fn required_ident(&mut self) -> Result<String, SelectorError> {
        let ident = self.ident();
        if !ident.is_empty() {
            return Ok(ident);
        }
        match self.peek() {
            Some((position, found)) => Err(self.unexpected(position, found)),
            None => Err(self.unexpected_end()),
        }
    }

    fn selector(&mut self) -> Result<Selector, SelectorError> {
        self.skip_ws();
        let mut compounds = vec![self.compound()?];
        loop {
            let had_ws = self.skip_ws();
            match self.peek() {
                None | Some((_, ',')) => break,
                Some((_, combinator @ ('>' | '+' | '~'))) => {
                    return Err(SelectorError::UnsupportedCombinator {
                        selector: self.source.to_string(),
                        combinator,
                    });
                }
                Some(_) if had_ws => compounds.push(self.compound()?),
                Some((position, found)) => return Err(self.unexpected(position, found)),
            }
        }
        Ok(Selector { compounds })
    }

    fn compound(&mut self) -> Result<Compound, SelectorError> {
        let mut compound = Compound::default();
        let mut consumed = false;

        match self.peek() {
            Some((_, '*')) => {
                self.bump();
                consumed = true;
            }
            Some((_, c)) if is_ident_char(c) => {
                compound.tag = Some(self.ident().to_ascii_lowercase());
                consumed = true;
            }
            _ => {}
        }

        loop {
            match self.peek() {
                Some((_, '#')) => {
                    self.bump();
                    compound.id = Some(self.required_ident()?);
                }
                Some((_, '.')) => {
                    self.bump();
                    compound.classes.push(self.required_ident()?);
                }
                Some((_, '[')) => {
                    self.bump();
                    compound.attributes.push(self.attribute()?);
                }
                _ => break,
            }
            consumed = true;
        }

        if consumed {
            return Ok(compound);
        }
        match self.peek() {
            None | Some((_, ',')) => Err(SelectorError::Empty),
            Some((position, found)) => Err(self.unexpected(position, found)),
        }
    }

    fn attribute(&mut self) -> Result<AttributeMatch, SelectorError> {
        self.skip_ws();
        let name = self.required_ident()?.to_ascii_lowercase();
        self.skip_ws();

        let op = match self.bump() {
            Some((_, ']')) => {
                return Ok(AttributeMatch {
                    name,
                    op: AttrOp::Exists,
                    value: String::new(),
                });
            }
            Some((_, '=')) => AttrOp::Equals,
            Some((_, prefix @ ('*' | '^' | '$'))) => {
                match self.bump() {
                    Some((_, '=')) => {}
                    Some((position, found)) => return Err(self.unexpected(position, found)),
                    None => return Err(self.unterminated()),
                }
                match prefix {
                    '*' => AttrOp::Contains,
                    '^' => AttrOp::Prefix,
                    _ => AttrOp::Suffix,
                }
            }
            Some((position, found)) => return Err(self.unexpected(position, found)),
            None => return Err(self.unterminated()),
        };

        self.skip_ws();
        let value = match self.peek() {
            Some((_, quote @ ('"' | '\''))) => {
                self.bump();
                let mut value = String::new();
                loop {
                    match self.bump() {
                        Some((_, c)) if c == quote => break,
                        Some((_, c)) => value.push(c),
                        None => return Err(self.unterminated()),
                    }
                }
                value
            }
            Some(_) => self.required_ident()?,
            None => return Err(self.unterminated()),
        };

        self.skip_ws();
        match self.bump() {
            Some((_, ']')) => Ok(AttributeMatch { name, op, value }),
            Some((position, found)) => Err(self.unexpected(position, found)),
            None => Err(self.unterminated()),
        }
    }
}
