//! TLV encoding
//!
//! [`QrData`] is a tag-keyed set of fields. Fields are written in tag order,
//! so the output does not depend on insertion order. A `None` field is left
//! out entirely, and a nested [`QrData`] is encoded first and then wrapped by
//! its parent tag.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::BTreeMap;

use crate::checksum;
use crate::error::EncodeError;
use crate::tag::Tag;

/// Largest value the 2-digit length field can describe.
pub const MAX_VALUE_LEN: usize = 99;

/// Value of one field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Component {
    Text(String),
    Nested(QrData),
}

impl From<&str> for Component {
    fn from(value: &str) -> Self {
        Component::Text(value.to_string())
    }
}

impl From<String> for Component {
    fn from(value: String) -> Self {
        Component::Text(value)
    }
}

impl From<QrData> for Component {
    fn from(value: QrData) -> Self {
        Component::Nested(value)
    }
}

/// Tag-keyed fields of a TLV payload
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QrData {
    components: BTreeMap<Tag, Option<Component>>,
}

impl QrData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds from string-keyed entries, rejecting any key that is not two digits.
    pub fn from_entries<'a, I>(entries: I) -> Result<Self, EncodeError>
    where
        I: IntoIterator<Item = (&'a str, Option<Component>)>,
    {
        let mut data = Self::new();
        for (key, value) in entries {
            let tag: Tag = key.parse()?;
            data.components.insert(tag, value);
        }
        Ok(data)
    }

    /// Sets a field, replacing any previous value for the tag.
    pub fn set(&mut self, tag: Tag, value: impl Into<Component>) -> &mut Self {
        self.components.insert(tag, Some(value.into()));
        self
    }

    /// Marks a field as present but omitted from the output.
    pub fn omit(&mut self, tag: Tag) -> &mut Self {
        self.components.insert(tag, None);
        self
    }

    pub fn with(mut self, tag: Tag, value: impl Into<Component>) -> Self {
        self.set(tag, value);
        self
    }

    /// Sets `tag` when `value` is `Some`, otherwise marks it omitted.
    pub fn with_opt(mut self, tag: Tag, value: Option<impl Into<Component>>) -> Self {
        self.components.insert(tag, value.map(Into::into));
        self
    }

    /// Copies every field of `other` over this one.
    pub fn merge(mut self, other: QrData) -> Self {
        self.components.extend(other.components);
        self
    }

    pub fn get(&self, tag: Tag) -> Option<&Component> {
        self.components.get(&tag).and_then(Option::as_ref)
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Serializes the fields in tag order.
    pub fn encode(&self) -> Result<String, EncodeError> {
        let mut out = String::new();

        for (tag, component) in &self.components {
            let encoded = match component {
                None => continue,
                Some(Component::Text(text)) => Cow::Borrowed(text.as_str()),
                Some(Component::Nested(nested)) => Cow::Owned(nested.encode()?),
            };

            let length = encoded.chars().count();
            if length > MAX_VALUE_LEN {
                return Err(EncodeError::ValueTooLong { tag: *tag, length });
            }

            out.push_str(tag.as_str());
            out.push_str(&format!("{:02}", length));
            out.push_str(&encoded);
        }

        Ok(out)
    }

    /// Serializes the fields and appends the `6304` CRC trailer.
    pub fn encode_with_checksum(&self) -> Result<String, EncodeError> {
        let encoded = self.encode()?;
        Ok(checksum::append_checksum(&encoded))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tag(s: &str) -> Tag {
        Tag::parse(s).unwrap()
    }

    fn paynow_uen() -> QrData {
        QrData::new()
            .with(tag("00"), "SG.PAYNOW")
            .with(tag("01"), "2")
            .with(tag("02"), "201403121W")
            .with(tag("03"), "1")
            .with_opt(tag("04"), None::<String>)
    }

    #[test]
    fn test_fields_are_written_in_tag_order() {
        let data = QrData::new()
            .with(tag("59"), "NA")
            .with(tag("00"), "01")
            .with(tag("26"), "x");
        assert_eq!(data.encode().unwrap(), "0002012601x5902NA");
    }

    #[test]
    fn test_omitted_field_is_not_written() {
        assert_eq!(
            paynow_uen().encode().unwrap(),
            "0009SG.PAYNOW010120210201403121W03011"
        );
    }

    #[test]
    fn test_payload_with_checksum() {
        let data = QrData::new()
            .with(tag("00"), "01")
            .with(tag("01"), "11")
            .with(tag("26"), paynow_uen())
            .with(tag("52"), "0000")
            .with(tag("53"), "702")
            .with(tag("58"), "SG")
            .with(tag("59"), "NA")
            .with(tag("60"), "Singapore");

        assert_eq!(
            data.encode_with_checksum().unwrap(),
            "00020101021126370009SG.PAYNOW010120210201403121W030115204000053037025802SG5902NA6009Singapore63045132"
        );
    }

    #[test]
    fn test_empty_value_is_written() {
        let data = QrData::new().with(tag("05"), "");
        assert_eq!(data.encode().unwrap(), "0500");
    }

    #[test]
    fn test_value_too_long() {
        let data = QrData::new()
            .with(tag("01"), "a".repeat(99))
            .with(tag("02"), "b".repeat(100));
        assert_eq!(
            data.encode(),
            Err(EncodeError::ValueTooLong {
                tag: tag("02"),
                length: 100
            })
        );
    }

    #[test]
    fn test_nested_value_too_long() {
        let inner = QrData::new().with(tag("00"), "x".repeat(96));
        let data = QrData::new().with(tag("26"), inner);
        assert_eq!(
            data.encode(),
            Err(EncodeError::ValueTooLong {
                tag: tag("26"),
                length: 100
            })
        );
    }

    #[test]
    fn test_from_entries_rejects_bad_keys() {
        let result = QrData::from_entries([("00", Some("01".into())), ("1", Some("x".into()))]);
        assert_eq!(result, Err(EncodeError::InvalidTag("1".to_string())));

        let data = QrData::from_entries([("04", None), ("00", Some("01".into()))]).unwrap();
        assert_eq!(data.encode().unwrap(), "000201");
    }

    #[test]
    fn test_json_shape() {
        let data: QrData = serde_json::from_str(
            r#"{"26": {"00": "SG.PAYNOW", "04": null}, "00": "01"}"#,
        )
        .unwrap();
        assert_eq!(data.encode().unwrap(), "00020126130009SG.PAYNOW");

        assert!(serde_json::from_str::<QrData>(r#"{"0A": "x"}"#).is_err());
    }
}
