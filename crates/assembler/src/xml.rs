//! XML transport: `<program>` documents in and out.
//!
//! The writer produces the canonical document (4-space indentation,
//! entities escaped). The reader is a small well-formedness parser that
//! builds an element tree, followed by the structural checks on that tree.
//! Only what the transport needs is supported: prolog, comments,
//! processing instructions, a simple DOCTYPE, CDATA, character and the
//! five predefined entity references. No namespaces, no DTD entities.

use crate::error::XmlError;
use ippcode_common::{RawArg, RawInstruction};
use std::fmt::Write as _;

// ===========================================================
// Writer
// ===========================================================

/// Escape text for use in element content or a double-quoted attribute.
fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            c => out.push(c),
        }
    }
    out
}

/// Serialize instructions as a program document.
pub fn to_xml(instructions: &[RawInstruction]) -> String {
    let mut xml = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    if instructions.is_empty() {
        xml.push_str("<program language=\"IPPcode19\"/>\n");
        return xml;
    }

    xml.push_str("<program language=\"IPPcode19\">\n");
    for instr in instructions {
        // Writing to a String cannot fail.
        let _ = write!(
            xml,
            "    <instruction order=\"{}\" opcode=\"{}\"",
            instr.order,
            escape(&instr.opcode)
        );
        if instr.args.is_empty() {
            xml.push_str("/>\n");
            continue;
        }
        xml.push_str(">\n");
        for (i, arg) in instr.args.iter().enumerate() {
            let _ = writeln!(
                xml,
                "        <arg{n} type=\"{kind}\">{text}</arg{n}>",
                n = i + 1,
                kind = escape(&arg.kind),
                text = escape(&arg.text)
            );
        }
        xml.push_str("    </instruction>\n");
    }
    xml.push_str("</program>\n");
    xml
}

// ===========================================================
// Well-formedness parser
// ===========================================================

/// An element of the parsed document.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
struct Element {
    name: String,
    attrs: Vec<(String, String)>,
    children: Vec<Element>,
    /// Concatenated character data directly inside this element.
    text: String,
}

impl Element {
    fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

struct Parser<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(src: &'a str) -> Self {
        let src = src.strip_prefix('\u{feff}').unwrap_or(src);
        Self { src, pos: 0 }
    }

    fn error(&self, message: impl Into<String>) -> XmlError {
        XmlError::Malformed {
            line: self.src[..self.pos].matches('\n').count() + 1,
            message: message.into(),
        }
    }

    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn starts_with(&self, s: &str) -> bool {
        self.rest().starts_with(s)
    }

    fn advance(&mut self, n: usize) {
        self.pos += n;
    }

    fn expect(&mut self, s: &str) -> Result<(), XmlError> {
        if self.starts_with(s) {
            self.advance(s.len());
            Ok(())
        } else {
            Err(self.error(format!("expected '{s}'")))
        }
    }

    fn skip_whitespace(&mut self) {
        let trimmed = self.rest().trim_start_matches([' ', '\t', '\r', '\n']);
        self.pos = self.src.len() - trimmed.len();
    }

    /// Consume up to and including `end`, returning what came before it.
    fn take_until(&mut self, end: &str, what: &str) -> Result<&'a str, XmlError> {
        match self.rest().find(end) {
            Some(i) => {
                let body = &self.rest()[..i];
                self.advance(i + end.len());
                Ok(body)
            }
            None => Err(self.error(format!("unterminated {what}"))),
        }
    }

    fn name(&mut self) -> Result<String, XmlError> {
        let rest = self.rest();
        let mut chars = rest.char_indices();
        match chars.next() {
            Some((_, c)) if c.is_alphabetic() || c == '_' || c == ':' => {}
            _ => return Err(self.error("expected a name")),
        }
        let end = chars
            .find(|&(_, c)| !(c.is_alphanumeric() || matches!(c, '_' | ':' | '.' | '-')))
            .map_or(rest.len(), |(i, _)| i);
        self.advance(end);
        Ok(rest[..end].to_string())
    }

    /// Comments, processing instructions and whitespace between markup.
    fn skip_misc(&mut self) -> Result<(), XmlError> {
        loop {
            self.skip_whitespace();
            if self.starts_with("<!--") {
                self.advance(4);
                let body = self.take_until("-->", "comment")?;
                if body.contains("--") {
                    return Err(self.error("'--' inside comment"));
                }
            } else if self.starts_with("<?") {
                self.advance(2);
                self.take_until("?>", "processing instruction")?;
            } else {
                return Ok(());
            }
        }
    }

    fn document(&mut self) -> Result<Element, XmlError> {
        if self.starts_with("<?xml") {
            self.advance(5);
            self.take_until("?>", "XML declaration")?;
        }
        self.skip_misc()?;
        if self.starts_with("<!DOCTYPE") {
            self.advance(9);
            let body = self.take_until(">", "DOCTYPE")?;
            if body.contains('[') {
                return Err(self.error("internal DTD subsets are not supported"));
            }
            self.skip_misc()?;
        }
        if self.peek() != Some('<') {
            return Err(self.error("expected root element"));
        }
        let root = self.element()?;
        self.skip_misc()?;
        if self.pos != self.src.len() {
            return Err(self.error("content after root element"));
        }
        Ok(root)
    }

    fn element(&mut self) -> Result<Element, XmlError> {
        self.expect("<")?;
        let mut element = Element {
            name: self.name()?,
            ..Element::default()
        };

        loop {
            let before = self.pos;
            self.skip_whitespace();
            if self.starts_with("/>") {
                self.advance(2);
                return Ok(element);
            }
            if self.starts_with(">") {
                self.advance(1);
                break;
            }
            if self.pos == before {
                return Err(self.error("expected whitespace before attribute"));
            }
            let key = self.name()?;
            self.skip_whitespace();
            self.expect("=")?;
            self.skip_whitespace();
            let value = self.attr_value()?;
            if element.attr(&key).is_some() {
                return Err(self.error(format!("duplicate attribute '{key}'")));
            }
            element.attrs.push((key, value));
        }

        self.content(&mut element)?;
        Ok(element)
    }

    fn attr_value(&mut self) -> Result<String, XmlError> {
        let quote = match self.peek() {
            Some(q @ ('"' | '\'')) => q,
            _ => return Err(self.error("expected quoted attribute value")),
        };
        self.advance(1);
        let end = self
            .rest()
            .find(quote)
            .ok_or_else(|| self.error("unterminated attribute value"))?;
        let raw = &self.rest()[..end];
        if raw.contains('<') {
            return Err(self.error("'<' in attribute value"));
        }
        let value = self.unescape(raw)?;
        self.advance(end + 1);
        Ok(value)
    }

    /// Children and text up to and including the matching end tag.
    fn content(&mut self, element: &mut Element) -> Result<(), XmlError> {
        loop {
            let text_end = self.rest().find('<').unwrap_or(self.rest().len());
            if text_end > 0 {
                let raw = &self.rest()[..text_end];
                let text = self.unescape(raw)?;
                element.text.push_str(&text);
                self.advance(text_end);
            }

            if self.pos == self.src.len() {
                return Err(self.error(format!("unclosed element <{}>", element.name)));
            } else if self.starts_with("</") {
                self.advance(2);
                let name = self.name()?;
                if name != element.name {
                    return Err(self.error(format!(
                        "mismatched end tag </{name}> for <{}>",
                        element.name
                    )));
                }
                self.skip_whitespace();
                return self.expect(">");
            } else if self.starts_with("<![CDATA[") {
                self.advance(9);
                let data = self.take_until("]]>", "CDATA section")?;
                element.text.push_str(data);
            } else if self.starts_with("<!--") || self.starts_with("<?") {
                self.skip_misc_once()?;
            } else {
                let child = self.element()?;
                element.children.push(child);
            }
        }
    }

    fn skip_misc_once(&mut self) -> Result<(), XmlError> {
        if self.starts_with("<!--") {
            self.advance(4);
            let body = self.take_until("-->", "comment")?;
            if body.contains("--") {
                return Err(self.error("'--' inside comment"));
            }
        } else {
            self.advance(2);
            self.take_until("?>", "processing instruction")?;
        }
        Ok(())
    }

    /// Resolve entity and character references in `raw`.
    fn unescape(&self, raw: &str) -> Result<String, XmlError> {
        let mut out = String::with_capacity(raw.len());
        let mut rest = raw;
        while let Some(amp) = rest.find('&') {
            out.push_str(&rest[..amp]);
            rest = &rest[amp + 1..];
            let semi = rest
                .find(';')
                .ok_or_else(|| self.error("unterminated entity reference"))?;
            let entity = &rest[..semi];
            let c = match entity {
                "amp" => '&',
                "lt" => '<',
                "gt" => '>',
                "quot" => '"',
                "apos" => '\'',
                _ => {
                    let code = if let Some(hex) = entity.strip_prefix("#x") {
                        u32::from_str_radix(hex, 16).ok()
                    } else if let Some(dec) = entity.strip_prefix('#') {
                        dec.parse().ok()
                    } else {
                        None
                    };
                    code.and_then(char::from_u32)
                        .ok_or_else(|| self.error(format!("unknown entity '&{entity};'")))?
                }
            };
            out.push(c);
            rest = &rest[semi + 1..];
        }
        out.push_str(rest);
        Ok(out)
    }
}

// ===========================================================
// Structure
// ===========================================================

fn structure(message: impl Into<String>) -> XmlError {
    XmlError::Structure(message.into())
}

fn read_instruction(element: &Element) -> Result<RawInstruction, XmlError> {
    if element.name != "instruction" {
        return Err(structure(format!("unexpected element <{}>", element.name)));
    }
    let (Some(order), Some(opcode)) = (element.attr("order"), element.attr("opcode")) else {
        return Err(structure("<instruction> needs attributes order and opcode"));
    };
    if element.attrs.len() != 2 {
        return Err(structure("<instruction> may only have order and opcode"));
    }
    let order: i64 = order
        .trim()
        .parse()
        .map_err(|_| structure(format!("order '{order}' is not an integer")))?;

    let mut slots: [Option<RawArg>; 3] = [None, None, None];
    for arg in &element.children {
        let slot = match arg.name.as_str() {
            "arg1" => 0,
            "arg2" => 1,
            "arg3" => 2,
            other => {
                return Err(structure(format!(
                    "instruction {order}: unexpected element <{other}>"
                )))
            }
        };
        if !arg.children.is_empty() {
            return Err(structure(format!(
                "instruction {order}: <{}> cannot have child elements",
                arg.name
            )));
        }
        let kind = arg.attr("type").ok_or_else(|| {
            structure(format!(
                "instruction {order}: <{}> needs attribute type",
                arg.name
            ))
        })?;
        if slots[slot].is_some() {
            return Err(structure(format!(
                "instruction {order}: duplicate <{}>",
                arg.name
            )));
        }
        slots[slot] = Some(RawArg::new(kind, arg.text.trim()));
    }

    let mut args = Vec::new();
    let mut gap = false;
    for (i, slot) in slots.into_iter().enumerate() {
        match slot {
            Some(_) if gap => {
                return Err(structure(format!(
                    "instruction {order}: <arg{}> without <arg{i}>",
                    i + 1
                )))
            }
            Some(arg) => args.push(arg),
            None => gap = true,
        }
    }

    Ok(RawInstruction::new(order, opcode, args))
}

/// Parse a program document into raw instructions, in document order.
///
/// # Errors
///
/// [`XmlError::Malformed`] if the text is not well-formed XML,
/// [`XmlError::Structure`] if it is not a valid program document.
pub fn read_xml(text: &str) -> Result<Vec<RawInstruction>, XmlError> {
    let root = Parser::new(text).document()?;

    if root.name != "program" {
        return Err(structure(format!(
            "root element must be <program>, found <{}>",
            root.name
        )));
    }
    for (key, value) in &root.attrs {
        match key.as_str() {
            "language" if !value.eq_ignore_ascii_case("IPPcode19") => {
                return Err(structure(format!("unsupported language '{value}'")))
            }
            "language" | "name" | "description" => {}
            other => return Err(structure(format!("<program> cannot have attribute '{other}'"))),
        }
    }

    root.children.iter().map(read_instruction).collect()
}
