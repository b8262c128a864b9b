//! Context templates with strict named-placeholder substitution.
//!
//! Template syntax follows the familiar `{name}` form. `{{` and `}}` are
//! literal braces. Placeholder names are identifiers (`[A-Za-z_][A-Za-z0-9_]*`).
//!
//! Substituted values are opaque text: [`sanitize_value`] rewrites anything
//! that could act as template syntax or as a prompt-structure delimiter, so
//! a caller-supplied value cannot leave its slot.

use crate::core::error::DomainError;
use std::collections::{BTreeSet, HashMap};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Placeholder(String),
}

/// A parsed context template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextTemplate {
    source: String,
    segments: Vec<Segment>,
}

/// Template syntax error, reported at configuration time
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TemplateError {
    #[error("unclosed placeholder starting at byte {0}")]
    Unclosed(usize),

    #[error("unmatched '}}' at byte {0}")]
    UnmatchedClose(usize),

    #[error("invalid placeholder name '{0}'")]
    InvalidName(String),
}

impl ContextTemplate {
    pub fn parse(source: &str) -> Result<Self, TemplateError> {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut chars = source.char_indices().peekable();

        while let Some((pos, c)) = chars.next() {
            match c {
                '{' if chars.peek().map(|&(_, n)| n) == Some('{') => {
                    chars.next();
                    literal.push('{');
                }
                '}' if chars.peek().map(|&(_, n)| n) == Some('}') => {
                    chars.next();
                    literal.push('}');
                }
                '{' => {
                    let mut name = String::new();
                    let mut closed = false;
                    for (_, n) in chars.by_ref() {
                        if n == '}' {
                            closed = true;
                            break;
                        }
                        name.push(n);
                    }
                    if !closed {
                        return Err(TemplateError::Unclosed(pos));
                    }
                    if !is_identifier(&name) {
                        return Err(TemplateError::InvalidName(name));
                    }
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(Segment::Placeholder(name));
                }
                '}' => return Err(TemplateError::UnmatchedClose(pos)),
                other => literal.push(other),
            }
        }
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Ok(Self {
            source: source.to_string(),
            segments,
        })
    }

    /// The template text as configured
    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn is_empty(&self) -> bool {
        self.source.trim().is_empty()
    }

    /// Placeholder names in order of first appearance
    pub fn placeholders(&self) -> Vec<&str> {
        let mut seen = BTreeSet::new();
        self.segments
            .iter()
            .filter_map(|s| match s {
                Segment::Placeholder(name) if seen.insert(name.as_str()) => Some(name.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Substitute every placeholder with its sanitized value.
    ///
    /// Fails with [`DomainError::MissingVariables`] listing every unresolved
    /// name (sorted) if any placeholder has no entry. Extra variables are
    /// ignored. Pure: identical inputs always render identically.
    pub fn render(&self, variables: &HashMap<String, String>) -> Result<String, DomainError> {
        let missing: BTreeSet<&str> = self
            .segments
            .iter()
            .filter_map(|s| match s {
                Segment::Placeholder(name) if !variables.contains_key(name) => Some(name.as_str()),
                _ => None,
            })
            .collect();
        if !missing.is_empty() {
            return Err(DomainError::MissingVariables(
                missing.into_iter().map(String::from).collect(),
            ));
        }

        let mut out = String::with_capacity(self.source.len());
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Placeholder(name) => {
                    if let Some(value) = variables.get(name) {
                        out.push_str(&sanitize_value(value));
                    }
                }
            }
        }
        Ok(out)
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Neutralize a caller-supplied value before it is spliced into a prompt.
///
/// - braces become parentheses (no template syntax survives)
/// - `<` / `>` become `‹` / `›` (no role or section tags)
/// - runs of backticks become single quotes (no fenced blocks)
/// - control characters, including newlines, collapse to one space
///   (a value cannot start a new prompt line)
pub fn sanitize_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut pending_space = false;

    for c in value.chars() {
        let mapped = match c {
            '{' => '(',
            '}' => ')',
            '<' => '‹',
            '>' => '›',
            '`' => '\'',
            c if c.is_control() || c.is_whitespace() => {
                pending_space = true;
                continue;
            }
            c => c,
        };
        if pending_space && !out.is_empty() {
            out.push(' ');
        }
        pending_space = false;
        out.push(mapped);
    }
    out
}
