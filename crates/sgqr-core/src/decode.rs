//! TLV decoding
//!
//! Each element is a 2-character tag, a 2-digit decimal length and exactly
//! that many characters of value, repeated until the input runs out:
//!
//! ```text
//! 00 02 01 | 01 02 12 | 26 37 0009SG.PAYNOW... | 63 04 A1B2
//! ```
//!
//! Decoding never fails as a whole. A structural problem ends the walk and is
//! kept in [`ParseResult::error`] next to every element decoded before it.

use serde::Serialize;

use crate::context::Context;
use crate::error::ParseError;
use crate::tag::Tag;

/// Human description of an element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "text", rename_all = "camelCase")]
pub enum Description {
    Known(&'static str),
    Unknown,
}

/// Meaning attached to an element's raw value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum Interpretation {
    /// Lookup of a coded value, e.g. `12` -> dynamic QR
    Text(&'static str),
    /// Value re-parsed as TLV under another context
    Nested(Box<ParseResult>),
    /// An interpreter exists but did not recognise the value
    Unknown,
    /// No interpreter for this element
    Absent,
}

/// One decoded element.
///
/// `raw_value` always holds exactly `length` characters.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedElement {
    /// The two tag characters as read. Unknown tags are kept verbatim even
    /// when they are not digits.
    pub element_id: String,
    pub length: usize,
    pub raw_value: String,
    pub description: Description,
    pub interpretation: Interpretation,
}

impl ParsedElement {
    /// The element's tag, if it is a well-formed two-digit tag.
    pub fn tag(&self) -> Option<Tag> {
        Tag::parse(&self.element_id)
    }

    /// Nested parse of this element, if its value was re-parsed as TLV.
    pub fn nested(&self) -> Option<&ParseResult> {
        match &self.interpretation {
            Interpretation::Nested(result) => Some(result),
            _ => None,
        }
    }
}

/// Elements decoded under one context, in input order
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseResult {
    pub context: Context,
    pub elements: Vec<ParsedElement>,
    /// Terminal structural error. Nothing was decoded past it.
    pub error: Option<ParseError>,
}

/// Ordered view over a [`ParseResult`]: its elements, then its error if any.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Entry<'a> {
    Element(&'a ParsedElement),
    Error(&'a ParseError),
}

impl ParseResult {
    /// Whether the whole input decoded without a structural error.
    pub fn is_complete(&self) -> bool {
        self.error.is_none()
    }

    /// First element carrying `tag`
    pub fn get(&self, tag: &str) -> Option<&ParsedElement> {
        self.elements.iter().find(|e| e.element_id == tag)
    }

    pub fn entries(&self) -> impl Iterator<Item = Entry<'_>> {
        self.elements
            .iter()
            .map(Entry::Element)
            .chain(self.error.iter().map(Entry::Error))
    }
}

/// Decodes `data` as a TLV stream under `context`.
pub fn decode(context: Context, data: &str) -> ParseResult {
    let mut elements = Vec::new();
    let mut error = None;
    let mut rest = data;

    while !rest.is_empty() {
        let (header, after_header, header_len) = split_chars(rest, 4);
        if header_len < 4 {
            error = Some(ParseError::InvalidElement {
                raw_tag_and_length: header.to_string(),
            });
            break;
        }

        let (element_id, length_digits, _) = split_chars(header, 2);
        let length = match parse_length(length_digits) {
            Some(length) => length,
            None => {
                error = Some(ParseError::InvalidElement {
                    raw_tag_and_length: header.to_string(),
                });
                break;
            }
        };

        let (value, after_value, available) = split_chars(after_header, length);
        if available < length {
            error = Some(ParseError::InvalidLength {
                requested: length,
                available,
            });
            break;
        }

        let known = Tag::parse(element_id).and_then(|tag| context.known_element(tag));
        let element = match known {
            Some(known) => ParsedElement {
                element_id: element_id.to_string(),
                length,
                raw_value: value.to_string(),
                description: Description::Known(known.description),
                interpretation: known
                    .interpreter
                    .map(|interpreter| interpreter.interpret(value))
                    .unwrap_or(Interpretation::Absent),
            },
            None => ParsedElement {
                element_id: element_id.to_string(),
                length,
                raw_value: value.to_string(),
                description: Description::Unknown,
                interpretation: Interpretation::Absent,
            },
        };

        log::debug!("{}: {} {:?}", context.name(), element.element_id, element.raw_value);
        elements.push(element);
        rest = after_value;
    }

    if let Some(e) = &error {
        log::debug!("{}: decoding stopped: {}", context.name(), e);
    }

    ParseResult {
        context,
        elements,
        error,
    }
}

/// Parses exactly two ASCII digits.
fn parse_length(digits: &str) -> Option<usize> {
    match digits.as_bytes() {
        [a, b] if a.is_ascii_digit() && b.is_ascii_digit() => {
            Some(usize::from(a - b'0') * 10 + usize::from(b - b'0'))
        }
        _ => None,
    }
}

/// Splits off up to `n` characters. Returns the head, the tail and how many
/// characters the head holds (fewer than `n` when `s` ran out).
fn split_chars(s: &str, n: usize) -> (&str, &str, usize) {
    match s.char_indices().nth(n) {
        Some((idx, _)) => (&s[..idx], &s[idx..], n),
        None => (s, "", s.chars().count()),
    }
}
