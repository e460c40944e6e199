//! Minimal XML reader for legacy API responses
//!
//! Legacy responses are small, flat documents, so a recursive descent over
//! the text is enough. Mapping to JSON:
//!
//! - an element with only text becomes a string, an empty one `null`
//! - attributes become `@name` keys and mixed text goes under `#text`
//! - repeated child elements collapse into an array
//!
//! Text is never coerced into numbers; ids such as `0123` stay intact.

use crate::error::{Error, Result};
use serde_json::{Map, Value};

/// Key holding text content of an element that also has attributes or children
pub const TEXT_KEY: &str = "#text";

/// Parse an XML document into JSON, returning the root element's content
pub fn xml_to_json(xml: &str) -> Result<Value> {
    let mut parser = Parser { input: xml, pos: 0 };
    parser.skip_misc()?;

    if !parser.rest().starts_with('<') {
        return Err(Error::xml_parse("Input does not appear to be XML"));
    }

    let (_, value) = parser.element()?;
    Ok(value)
}

/// Text of a converted element, whether it was text-only or carried attributes
pub fn text_of(value: &Value) -> Option<&str> {
    match value {
        Value::String(s) => Some(s),
        Value::Object(map) => map.get(TEXT_KEY).and_then(Value::as_str),
        _ => None,
    }
}

/// A converted child that may be a single element or a repeated one
pub fn as_list(value: Option<&Value>) -> Vec<&Value> {
    match value {
        Some(Value::Array(items)) => items.iter().collect(),
        Some(Value::Null) | None => Vec::new(),
        Some(other) => vec![other],
    }
}

/// Escape text for use in element content
///
/// Quotes are left alone: legacy queries such as `{'3'.EX.'a'}` are full of
/// them and are valid as element text.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

/// Decode predefined and numeric character references
///
/// Unrecognized references are kept verbatim.
pub fn unescape(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }

    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];

        let decoded = rest
            .find(';')
            .and_then(|semi| decode_entity(&rest[1..semi]).map(|c| (c, semi)));
        match decoded {
            Some((c, semi)) => {
                out.push(c);
                rest = &rest[semi + 1..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn decode_entity(entity: &str) -> Option<char> {
    match entity {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        _ => {
            let code = if let Some(hex) = entity
                .strip_prefix("#x")
                .or_else(|| entity.strip_prefix("#X"))
            {
                u32::from_str_radix(hex, 16).ok()?
            } else {
                entity.strip_prefix('#')?.parse().ok()?
            };
            char::from_u32(code)
        }
    }
}

// ============================================================================
// Parser
// ============================================================================

struct Parser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn skip_whitespace(&mut self) {
        let trimmed = self.rest().trim_start();
        self.pos = self.input.len() - trimmed.len();
    }

    /// Skip declarations, comments and doctype before the root
    fn skip_misc(&mut self) -> Result<()> {
        loop {
            self.skip_whitespace();
            let rest = self.rest();
            if rest.starts_with("<?") {
                self.skip_past("?>")?;
            } else if rest.starts_with("<!--") {
                self.skip_past("-->")?;
            } else if rest.starts_with("<!DOCTYPE") || rest.starts_with("<!doctype") {
                self.skip_past(">")?;
            } else {
                return Ok(());
            }
        }
    }

    /// Advance past `marker`, returning the text before it
    fn skip_past(&mut self, marker: &str) -> Result<&'a str> {
        let rest = self.rest();
        let idx = rest
            .find(marker)
            .ok_or_else(|| Error::xml_parse(format!("Unterminated construct, expected '{marker}'")))?;
        self.pos += idx + marker.len();
        Ok(&rest[..idx])
    }

    fn expect(&mut self, token: &str) -> Result<()> {
        if self.rest().starts_with(token) {
            self.pos += token.len();
            Ok(())
        } else {
            Err(Error::xml_parse(format!(
                "Expected '{token}' at offset {}",
                self.pos
            )))
        }
    }

    fn name(&mut self) -> Result<&'a str> {
        let rest = self.rest();
        let end = rest
            .find(|c: char| c.is_whitespace() || matches!(c, '>' | '/' | '='))
            .unwrap_or(rest.len());
        if end == 0 {
            return Err(Error::xml_parse(format!(
                "Malformed tag at offset {}",
                self.pos
            )));
        }
        self.pos += end;
        Ok(&rest[..end])
    }

    /// Parse one element starting at `<`
    fn element(&mut self) -> Result<(&'a str, Value)> {
        self.expect("<")?;
        let name = self.name()?;

        let mut attrs = Map::new();
        loop {
            self.skip_whitespace();
            if self.rest().starts_with("/>") {
                self.pos += 2;
                return Ok((name, finish(attrs, Map::new(), "")));
            }
            if self.rest().starts_with('>') {
                self.pos += 1;
                break;
            }

            let key = self.name()?;
            self.skip_whitespace();
            self.expect("=")?;
            self.skip_whitespace();
            let quote = match self.rest().as_bytes().first() {
                Some(b'"') => "\"",
                Some(b'\'') => "'",
                _ => {
                    return Err(Error::xml_parse(format!(
                        "Unquoted value for attribute '{key}' on <{name}>"
                    )))
                }
            };
            self.pos += 1;
            let raw = self.skip_past(quote)?;
            attrs.insert(format!("@{key}"), Value::String(unescape(raw)));
        }

        let mut children = Map::new();
        let mut text = String::new();
        loop {
            let rest = self.rest();
            if rest.is_empty() {
                return Err(Error::xml_parse(format!("Missing closing tag for {name}")));
            }

            if rest.starts_with("</") {
                self.pos += 2;
                let close = self.name()?;
                if close != name {
                    return Err(Error::xml_parse(format!(
                        "Mismatched closing tag: expected </{name}>, found </{close}>"
                    )));
                }
                self.skip_whitespace();
                self.expect(">")?;
                return Ok((name, finish(attrs, children, text.trim())));
            }

            if rest.starts_with("<!--") {
                self.skip_past("-->")?;
            } else if rest.starts_with("<![CDATA[") {
                self.pos += "<![CDATA[".len();
                text.push_str(self.skip_past("]]>")?);
            } else if rest.starts_with("<?") {
                self.skip_past("?>")?;
            } else if rest.starts_with('<') {
                let (child, value) = self.element()?;
                push_child(&mut children, child, value);
            } else {
                let end = rest.find('<').unwrap_or(rest.len());
                text.push_str(&unescape(&rest[..end]));
                self.pos += end;
            }
        }
    }
}

/// Handle arrays (multiple elements with same name)
fn push_child(children: &mut Map<String, Value>, name: &str, value: Value) {
    match children.get_mut(name) {
        Some(Value::Array(items)) => items.push(value),
        Some(existing) => {
            let first = existing.take();
            *existing = Value::Array(vec![first, value]);
        }
        None => {
            children.insert(name.to_string(), value);
        }
    }
}

fn finish(mut attrs: Map<String, Value>, children: Map<String, Value>, text: &str) -> Value {
    if attrs.is_empty() && children.is_empty() {
        return if text.is_empty() {
            Value::Null
        } else {
            Value::String(text.to_string())
        };
    }

    attrs.extend(children);
    if !text.is_empty() {
        attrs.insert(TEXT_KEY.to_string(), Value::String(text.to_string()));
    }
    Value::Object(attrs)
}
