//! Argument literals and context templating.
//!
//! The raw text between a callable reference's parentheses is a literal
//! argument list: comma-separated values, each optionally `name=value`.
//! Before parsing, `{key}` placeholders are expanded against an ambient
//! context mapping (student name, resolved working directory).

use std::collections::BTreeMap;

use thiserror::Error;

/// String-keyed values available for `{key}` substitution in argument text.
#[derive(Debug, Clone, Default)]
pub struct Context {
    values: BTreeMap<String, String>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, key: &str, value: impl Into<String>) -> Self {
        self.values.insert(key.to_string(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }
}

/// A single bound argument value.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl Literal {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Literal::Str(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Literal::Bool(value) => Some(*value),
            _ => None,
        }
    }
}

/// Parsed argument list: positional values plus `name=value` pairs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Args {
    positional: Vec<Literal>,
    named: BTreeMap<String, Literal>,
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ArgError {
    #[error("unknown placeholder '{{{key}}}' in argument text")]
    MissingKey { key: String },
    #[error("unterminated string in argument text at offset {offset}")]
    UnterminatedString { offset: usize },
    #[error("invalid argument literal '{text}'")]
    InvalidLiteral { text: String },
    #[error("duplicate argument name '{name}'")]
    DuplicateName { name: String },
}

impl Args {
    /// Parse an argument source string. Empty or whitespace-only input
    /// yields an empty argument list.
    pub fn parse(source: &str) -> Result<Self, ArgError> {
        let mut args = Args::default();
        for item in split_items(source)? {
            let item = item.trim();
            if item.is_empty() {
                continue;
            }
            match split_named(item) {
                Some((name, value)) => {
                    let literal = parse_literal(value.trim())?;
                    if args.named.insert(name.to_string(), literal).is_some() {
                        return Err(ArgError::DuplicateName {
                            name: name.to_string(),
                        });
                    }
                }
                None => args.positional.push(parse_literal(item)?),
            }
        }
        Ok(args)
    }

    pub fn is_empty(&self) -> bool {
        self.positional.is_empty() && self.named.is_empty()
    }

    pub fn positional(&self, index: usize) -> Option<&Literal> {
        self.positional.get(index)
    }

    pub fn named(&self, name: &str) -> Option<&Literal> {
        self.named.get(name)
    }

    /// Look up a string argument by name, falling back to position.
    pub fn str_arg(&self, name: &str, index: usize) -> Option<&str> {
        self.named(name)
            .or_else(|| self.positional(index))
            .and_then(Literal::as_str)
    }
}

/// Expand `{key}` placeholders against the context. `{{` and `}}` are
/// literal braces.
pub fn expand(template: &str, ctx: &Context) -> Result<String, ArgError> {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                out.push('{');
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                out.push('}');
            }
            '{' => {
                let mut key = String::new();
                loop {
                    match chars.next() {
                        Some('}') => break,
                        Some(ch) => key.push(ch),
                        None => return Err(ArgError::MissingKey { key }),
                    }
                }
                match ctx.get(&key) {
                    Some(value) => out.push_str(value),
                    None => return Err(ArgError::MissingKey { key }),
                }
            }
            _ => out.push(ch),
        }
    }
    Ok(out)
}

/// Split the argument source on commas, respecting quoted strings.
fn split_items(source: &str) -> Result<Vec<String>, ArgError> {
    let mut items = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    let mut quote_start = 0;
    for (offset, ch) in source.char_indices() {
        match quote {
            Some(open) => {
                current.push(ch);
                if ch == open {
                    quote = None;
                }
            }
            None => match ch {
                '"' | '\'' => {
                    quote = Some(ch);
                    quote_start = offset;
                    current.push(ch);
                }
                ',' => {
                    items.push(std::mem::take(&mut current));
                }
                _ => current.push(ch),
            },
        }
    }
    if quote.is_some() {
        return Err(ArgError::UnterminatedString {
            offset: quote_start,
        });
    }
    if !current.trim().is_empty() {
        items.push(current);
    }
    Ok(items)
}

/// Split `name=value` items; quoted text never starts a named item.
fn split_named(item: &str) -> Option<(&str, &str)> {
    let eq = item.find('=')?;
    let name = item[..eq].trim();
    let is_ident = !name.is_empty()
        && name
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || ch == '_')
        && name.chars().next().is_some_and(|ch| !ch.is_ascii_digit());
    if is_ident { Some((name, &item[eq + 1..])) } else { None }
}

fn parse_literal(text: &str) -> Result<Literal, ArgError> {
    if text.len() >= 2 {
        let first = text.chars().next();
        let last = text.chars().last();
        if (first == Some('"') && last == Some('"'))
            || (first == Some('\'') && last == Some('\''))
        {
            return Ok(Literal::Str(text[1..text.len() - 1].to_string()));
        }
    }
    match text {
        "true" | "True" => return Ok(Literal::Bool(true)),
        "false" | "False" => return Ok(Literal::Bool(false)),
        _ => {}
    }
    if let Ok(value) = text.parse::<i64>() {
        return Ok(Literal::Int(value));
    }
    if let Ok(value) = text.parse::<f64>() {
        return Ok(Literal::Float(value));
    }
    Err(ArgError::InvalidLiteral {
        text: text.to_string(),
    })
}
