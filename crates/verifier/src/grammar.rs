//! Lexical grammar of IPPcode19 operands.
//!
//! Identifiers start with an ASCII letter or one of `_ - $ & % * ! ?`
//! and continue with letters, digits or the same punctuation. Variables
//! are `GF@id`, `LF@id` or `TF@id`. String literal bodies may not contain
//! whitespace, `#`, or a backslash that does not start a `\DDD` escape.

use ippcode_common::{FrameKind, Value, ValueType, VarRef};

const IDENT_PUNCT: [char; 8] = ['_', '-', '$', '&', '%', '*', '!', '?'];

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || IDENT_PUNCT.contains(&c)
}

fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || IDENT_PUNCT.contains(&c)
}

/// Returns true if `text` is a valid label or variable name.
pub fn is_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) if is_ident_start(first) => chars.all(is_ident_continue),
        _ => false,
    }
}

/// Parse `FRAME@name` into a variable reference.
pub fn parse_var(text: &str) -> Option<VarRef> {
    let (prefix, name) = text.split_once('@')?;
    let frame: FrameKind = prefix.parse().ok()?;
    is_identifier(name).then(|| VarRef::new(frame, name))
}

/// Parse the body of an `int@` literal: optional sign, then decimal digits.
pub fn parse_int(text: &str) -> Option<i64> {
    let digits = text.strip_prefix(['+', '-']).unwrap_or(text);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}

/// Parse the body of a `bool@` literal.
pub fn parse_bool(text: &str) -> Option<bool> {
    match text {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

/// Check and decode the body of a `string@` literal.
///
/// Each `\DDD` escape becomes the character with code point `DDD`.
/// Returns `None` if the body violates the grammar.
pub fn decode_string(text: &str) -> Option<String> {
    let mut decoded = String::with_capacity(text.len());
    let mut chars = text.chars();

    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                let mut code = 0u32;
                for _ in 0..3 {
                    let digit = chars.next()?.to_digit(10)?;
                    code = code * 10 + digit;
                }
                decoded.push(char::from_u32(code)?);
            }
            '#' => return None,
            c if c.is_whitespace() => return None,
            c => decoded.push(c),
        }
    }

    Some(decoded)
}

/// Parse a typed literal given its kind tag and body text.
pub fn parse_literal(kind: &str, text: &str) -> Option<Value> {
    match kind {
        "int" => parse_int(text).map(Value::Int),
        "bool" => parse_bool(text).map(Value::Bool),
        "string" => decode_string(text).map(Value::Str),
        "nil" => (text == "nil").then_some(Value::Nil),
        _ => None,
    }
}

/// Parse a type-name operand. Only `int`, `string` and `bool` are accepted.
pub fn parse_type(text: &str) -> Option<ValueType> {
    text.parse::<ValueType>().ok().filter(ValueType::is_readable)
}
