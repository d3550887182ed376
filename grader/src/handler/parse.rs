//! Handler reference parsing.
//!
//! A check's `handler` field is one of three things: the reserved word
//! `manual`, a callable reference following the grammar
//! `module ":" function ["(" arg-literals ")"]`, or a shell command. Any
//! string without a `:` falls back to a shell command; a string with a `:`
//! must match the callable grammar exactly.

use thiserror::Error;

/// A parsed handler reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandlerRef {
    /// Result is entered by the grader through an interactive review.
    Manual,
    /// Run the string as a shell command; pass iff it exits 0.
    Shell { command: String },
    /// Call a registered function, optionally with literal arguments.
    Callable {
        module: String,
        function: String,
        /// Raw text between the outermost parentheses, unparsed.
        args: Option<String>,
    },
}

/// Grammar violation in a handler reference containing a `:`.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("invalid handler '{input}': unexpected character at offset {offset}")]
    UnexpectedChar { input: String, offset: usize },
    #[error("invalid handler '{input}': unclosed argument list opened at offset {offset}")]
    UnclosedArgs { input: String, offset: usize },
}

/// Parse a handler specification string.
pub fn parse(input: &str) -> Result<HandlerRef, ParseError> {
    if input == "manual" {
        return Ok(HandlerRef::Manual);
    }
    if !input.contains(':') {
        return Ok(HandlerRef::Shell {
            command: input.to_string(),
        });
    }
    parse_callable(input)
}

/// Parse `module:function` or `module:function(args)`.
///
/// Module names allow `.` as a namespace separator; function names do not,
/// so `pkg:sub.fn` is rejected at the `.`.
fn parse_callable(input: &str) -> Result<HandlerRef, ParseError> {
    let chars: Vec<char> = input.chars().collect();
    let mut pos = 0;

    let module = scan_name(input, &chars, &mut pos, true)?;

    if chars.get(pos) != Some(&':') {
        return Err(unexpected(input, pos));
    }
    pos += 1;

    let function = scan_name(input, &chars, &mut pos, false)?;

    match chars.get(pos) {
        None => Ok(HandlerRef::Callable {
            module,
            function,
            args: None,
        }),
        Some('(') => {
            if chars.last() != Some(&')') || pos + 1 == chars.len() {
                return Err(ParseError::UnclosedArgs {
                    input: input.to_string(),
                    offset: pos,
                });
            }
            let args: String = chars[pos + 1..chars.len() - 1].iter().collect();
            Ok(HandlerRef::Callable {
                module,
                function,
                args: Some(args),
            })
        }
        Some(_) => Err(unexpected(input, pos)),
    }
}

/// Scan an identifier starting at `pos`, advancing past it.
///
/// Identifiers start with a letter or `_`; module names additionally accept
/// `.` in their tail.
fn scan_name(
    input: &str,
    chars: &[char],
    pos: &mut usize,
    allow_dots: bool,
) -> Result<String, ParseError> {
    let start = *pos;
    match chars.get(*pos) {
        Some(ch) if ch.is_ascii_alphabetic() || *ch == '_' => *pos += 1,
        _ => return Err(unexpected(input, *pos)),
    }
    while let Some(ch) = chars.get(*pos) {
        let tail = ch.is_ascii_alphanumeric() || *ch == '_' || (allow_dots && *ch == '.');
        if !tail {
            break;
        }
        *pos += 1;
    }
    Ok(chars[start..*pos].iter().collect())
}

fn unexpected(input: &str, offset: usize) -> ParseError {
    ParseError::UnexpectedChar {
        input: input.to_string(),
        offset,
    }
}
