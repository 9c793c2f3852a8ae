//! Error types shared across the codec

use serde::Serialize;
use thiserror::Error;

use crate::tag::Tag;

/// Structural decode failure.
///
/// These are data, not exceptions: a `ParseError` terminates a
/// [`ParseResult`](crate::decode::ParseResult) and is stored alongside the
/// elements that decoded before it.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ParseError {
    /// The stream ended inside a tag+length header, or the length was not two digits.
    #[error("An invalid element+length indicator of {raw_tag_and_length} was encountered")]
    #[serde(rename_all = "camelCase")]
    InvalidElement { raw_tag_and_length: String },

    /// The declared length runs past the end of the input.
    #[error("A length of {requested} was requested, but only {available} chars are left in the payload")]
    #[serde(rename_all = "camelCase")]
    InvalidLength { requested: usize, available: usize },
}

/// Encoding precondition violations. The caller controls the input shape, so
/// no partial output is ever produced alongside one of these.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EncodeError {
    #[error("Key should be a 2-digit numeric key code, got {0:?}")]
    InvalidTag(String),

    #[error("Encoded length of tag {tag} is {length}, which exceeds 99")]
    ValueTooLong { tag: Tag, length: usize },

    #[error("{count} payment methods do not fit in tags 26 to 50")]
    TooManyPaymentMethods { count: usize },
}

/// CRC trailer validation errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChecksumError {
    #[error("Missing Checksum (Tag 63)")]
    MissingChecksum,

    #[error("Invalid CRC: expected {expected}, got {actual}")]
    InvalidCrc { expected: String, actual: String },
}

/// Edits to a composition that point outside the list
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ComposeError {
    #[error("Index {index} is out of range for {len} payment methods")]
    IndexOutOfRange { index: usize, len: usize },
}

/// QR rendering failure at the output boundary
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    #[error("Payload does not fit in a QR symbol: {0}")]
    DataTooLong(String),

    #[error("QR rendering failed: {0}")]
    Failed(String),
}
