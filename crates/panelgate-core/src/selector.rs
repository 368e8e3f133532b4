//! The selector language used to name panel controls.
//!
//! Supported: compound selectors made of an optional tag (or `*`), any number
//! of `.class` tests and `[attr]` / `[attr="value"]` tests, joined into lists
//! with `,`. Combinators (descendant, `>`, `+`, `~`) and pseudo-classes are
//! rejected at parse time.
//!
//! ```text
//! sk-menu-item.env-preview
//! span[slot="description"]
//! button, sp-switch
//! ```

use std::fmt;
use std::str::FromStr;

use panelgate_contracts::error::{GateError, GateResult};

use crate::traits::ElementView;

/// A parsed selector list. Matches an element if any alternative matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    source: String,
    alternatives: Vec<Compound>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Compound {
    /// Lower-case tag; `None` for `*` or an omitted tag.
    tag: Option<String>,
    classes: Vec<String>,
    attributes: Vec<AttributeTest>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct AttributeTest {
    name: String,
    /// `None` tests presence only.
    value: Option<String>,
}

impl Selector {
    pub fn parse(source: &str) -> GateResult<Self> {
        let mut alternatives = Vec::new();
        for part in source.split(',') {
            alternatives.push(Parser::new(source, part.trim()).compound()?);
        }
        Ok(Self {
            source: source.to_string(),
            alternatives,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// True if `node` is an element matching any alternative.
    pub fn matches<T: ElementView + ?Sized>(&self, tree: &T, node: T::Node) -> bool {
        let Some(tag) = tree.tag_name(node) else {
            return false;
        };
        self.alternatives.iter().any(|c| c.matches(tree, node, tag))
    }
}

impl Compound {
    fn matches<T: ElementView + ?Sized>(&self, tree: &T, node: T::Node, tag: &str) -> bool {
        if let Some(expected) = &self.tag {
            if !expected.eq_ignore_ascii_case(tag) {
                return false;
            }
        }
        self.classes.iter().all(|c| tree.has_class(node, c))
            && self.attributes.iter().all(|a| match (&a.value, tree.attribute(node, &a.name)) {
                (_, None) => false,
                (None, Some(_)) => true,
                (Some(expected), Some(actual)) => expected == actual,
            })
    }
}

impl FromStr for Selector {
    type Err = GateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Selector::parse(s)
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

// ── Parser ────────────────────────────────────────────────────────────────────

struct Parser<'a> {
    source: &'a str,
    chars: std::iter::Peekable<std::str::Chars<'a>>,
}

impl<'a> Parser<'a> {
    fn new(source: &'a str, part: &'a str) -> Self {
        Self {
            source,
            chars: part.chars().peekable(),
        }
    }

    fn error(&self, reason: impl Into<String>) -> GateError {
        GateError::Selector {
            selector: self.source.to_string(),
            reason: reason.into(),
        }
    }

    fn compound(&mut self) -> GateResult<Compound> {
        let mut compound = Compound {
            tag: None,
            classes: Vec::new(),
            attributes: Vec::new(),
        };
        let mut empty = true;

        match self.chars.peek().copied() {
            Some('*') => {
                self.chars.next();
                empty = false;
            }
            Some(c) if is_ident_char(c) => {
                compound.tag = Some(self.ident()?.to_ascii_lowercase());
                empty = false;
            }
            _ => {}
        }

        while let Some(c) = self.chars.next() {
            match c {
                '.' => compound.classes.push(self.ident()?),
                '[' => compound.attributes.push(self.attribute()?),
                c if c.is_whitespace() || matches!(c, '>' | '+' | '~') => {
                    return Err(self.error("combinators are not supported"));
                }
                ':' => return Err(self.error("pseudo-classes are not supported")),
                other => return Err(self.error(format!("unexpected character '{other}'"))),
            }
            empty = false;
        }

        if empty {
            return Err(self.error("empty selector"));
        }
        Ok(compound)
    }

    fn ident(&mut self) -> GateResult<String> {
        let mut out = String::new();
        while let Some(c) = self.chars.peek() {
            if !is_ident_char(*c) {
                break;
            }
            out.push(*c);
            self.chars.next();
        }
        if out.is_empty() {
            return Err(self.error("expected an identifier"));
        }
        Ok(out)
    }

    fn attribute(&mut self) -> GateResult<AttributeTest> {
        let name = self.ident()?;
        match self.chars.next() {
            Some(']') => Ok(AttributeTest { name, value: None }),
            Some('=') => {
                let value = match self.chars.peek().copied() {
                    Some(quote) if quote == '"' || quote == '\'' => {
                        self.chars.next();
                        self.quoted(quote)?
                    }
                    _ => self.ident()?,
                };
                match self.chars.next() {
                    Some(']') => Ok(AttributeTest {
                        name,
                        value: Some(value),
                    }),
                    _ => Err(self.error("unterminated attribute test")),
                }
            }
            _ => Err(self.error("unterminated attribute test")),
        }
    }

    fn quoted(&mut self, quote: char) -> GateResult<String> {
        let mut out = String::new();
        for c in self.chars.by_ref() {
            if c == quote {
                return Ok(out);
            }
            out.push(c);
        }
        Err(self.error("unterminated string"))
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}
