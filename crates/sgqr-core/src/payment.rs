//! Модуль платёжных методов (merchant account information, теги 26-51)
//!
//! - Извлечение списка [`PaymentMethod`] из разобранного EMVCo payload
//! - Объединение методов из нескольких сканирований
//! - Обратное преобразование списка методов в поля верхнего уровня
//!
//! Блок метода хранится в `raw_data` как есть и не перекодируется.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::context::Protocol;
use crate::decode::ParsedElement;
use crate::encode::QrData;
use crate::error::EncodeError;
use crate::tag::Tag;

/// Протокол для блока без format indicator (`00`)
pub const UNKNOWN_PROTOCOL: &str = "Unknown";

/// Платёжный метод, извлечённый из блока 26-51
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentMethod {
    /// The still-encoded TLV block, re-embedded as is
    pub raw_data: String,
    /// Display name of the schema that decoded the block
    pub description: String,
    /// Format indicator (sub-tag `00`) as it appeared in the block
    pub protocol: String,
    #[serde(default, rename = "iconURL")]
    pub icon_url: String,
}

impl PaymentMethod {
    /// Блок метаданных SGQR (всегда занимает тег 51)
    pub fn is_sgqr(&self) -> bool {
        Protocol::from_indicator(&self.protocol) == Some(Protocol::Sgqr)
    }
}

/// Projects decoded top-level elements onto payment methods.
///
/// Only elements in the 26-51 range whose value was re-parsed as TLV count.
pub fn extract<'a, I>(elements: I) -> Vec<PaymentMethod>
where
    I: IntoIterator<Item = &'a ParsedElement>,
{
    elements
        .into_iter()
        .filter(|e| e.tag().is_some_and(|t| t.is_merchant_account()))
        .filter_map(|e| {
            let nested = e.nested()?;
            let protocol = nested
                .get("00")
                .map(|f| f.raw_value.clone())
                .unwrap_or_else(|| UNKNOWN_PROTOCOL.to_string());

            Some(PaymentMethod {
                raw_data: e.raw_value.clone(),
                description: nested.context.name().to_string(),
                protocol,
                icon_url: String::new(),
            })
        })
        .collect()
}

/// Keeps the first occurrence of each key.
fn uniq_by<K, F>(methods: Vec<PaymentMethod>, key: F) -> Vec<PaymentMethod>
where
    K: Eq + std::hash::Hash,
    F: Fn(&PaymentMethod) -> K,
{
    let mut seen = HashSet::new();
    methods.into_iter().filter(|m| seen.insert(key(m))).collect()
}

/// Keeps the last occurrence of each key, in the survivors' original order.
fn uniq_by_last<K, F>(methods: Vec<PaymentMethod>, key: F) -> Vec<PaymentMethod>
where
    K: Eq + std::hash::Hash,
    F: Fn(&PaymentMethod) -> K,
{
    let mut reversed = methods;
    reversed.reverse();
    let mut kept = uniq_by(reversed, key);
    kept.reverse();
    kept
}

/// Replaces earlier methods of the same protocol with later ones.
pub fn dedup_by_protocol(methods: Vec<PaymentMethod>) -> Vec<PaymentMethod> {
    uniq_by_last(methods, |m| m.protocol.clone())
}

/// Combines methods already collected with newly scanned ones.
///
/// Exact re-scans (same `raw_data`) collapse to the first copy, then the last
/// method of each protocol wins.
pub fn merge(existing: Vec<PaymentMethod>, incoming: Vec<PaymentMethod>) -> Vec<PaymentMethod> {
    let (before, scanned) = (existing.len(), incoming.len());
    let mut all = existing;
    all.extend(incoming);
    let unique = uniq_by(all, |m| m.raw_data.clone());
    let merged = dedup_by_protocol(unique);
    log::debug!("Merged {} + {} payment methods into {}", before, scanned, merged.len());
    merged
}

/// Assigns payment methods to top-level tags.
///
/// Methods take tags 26, 27, ... in list order; the SGQR block always takes
/// tag 51.
pub fn to_field_map(methods: &[PaymentMethod]) -> Result<QrData, EncodeError> {
    let (sgqr, payment): (Vec<_>, Vec<_>) = methods.iter().partition(|m| m.is_sgqr());

    let first = Tag::MERCHANT_ACCOUNT_FIRST.number();
    let last = Tag::MERCHANT_ACCOUNT_LAST.number() - 1;
    if payment.len() > usize::from(last - first + 1) {
        return Err(EncodeError::TooManyPaymentMethods {
            count: payment.len(),
        });
    }

    let mut data = QrData::new();
    for (n, method) in (first..=last).zip(payment) {
        if let Some(tag) = Tag::from_number(n) {
            data.set(tag, method.raw_data.as_str());
        }
    }
    if let Some(sgqr) = sgqr.first() {
        data.set(Tag::MERCHANT_ACCOUNT_LAST, sgqr.raw_data.as_str());
    }

    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Context;
    use crate::decode::decode;

    fn method(raw_data: &str, protocol: &str) -> PaymentMethod {
        PaymentMethod {
            raw_data: raw_data.to_string(),
            description: String::new(),
            protocol: protocol.to_string(),
            icon_url: String::new(),
        }
    }

    #[test]
    fn test_extract_uses_nested_context() {
        let result = decode(
            Context::EmvcoMpm,
            "00020126340008COM.GRAB01183c0d2fa1-b6a4-4c8f5802SG",
        );
        let methods = extract(&result.elements);
        assert_eq!(methods.len(), 1);
        assert_eq!(methods[0].description, "GrabPay");
        assert_eq!(methods[0].protocol, "COM.GRAB");
        assert_eq!(methods[0].raw_data, "0008COM.GRAB01183c0d2fa1-b6a4-4c8f");
    }

    #[test]
    fn test_extract_keeps_protocol_case_and_falls_back() {
        let result = decode(Context::EmvcoMpm, "26130009sg.paynow2706010201");
        let methods = extract(&result.elements);
        assert_eq!(methods[0].protocol, "sg.paynow");
        assert_eq!(methods[0].description, "PayNow Merchant Information");
        assert_eq!(methods[1].protocol, UNKNOWN_PROTOCOL);
        assert_eq!(methods[1].description, "Generic merchant account information");
    }

    #[test]
    fn test_merge_ignores_exact_rescans() {
        let a = method("A", "P1");
        let b = method("B", "P2");
        let merged = merge(vec![a.clone(), b.clone()], vec![a.clone()]);
        assert_eq!(merged, vec![a, b]);
    }

    #[test]
    fn test_merge_replaces_same_protocol() {
        let a = method("A", "P1");
        let a2 = method("A'", "P1");
        assert_eq!(merge(vec![a], vec![a2.clone()]), vec![a2]);
    }

    #[test]
    fn test_merge_keeps_survivor_order() {
        let merged = merge(
            vec![method("A", "P1"), method("B", "P2"), method("C", "P3")],
            vec![method("A2", "P1")],
        );
        let raw: Vec<_> = merged.iter().map(|m| m.raw_data.as_str()).collect();
        assert_eq!(raw, vec!["B", "C", "A2"]);
    }

    #[test]
    fn test_sgqr_is_pinned_to_51() {
        let methods = vec![
            method("S", "sg.sgqr"),
            method("N", "SG.COM.NETS"),
            method("G", "COM.GRAB"),
        ];
        let data = to_field_map(&methods).unwrap();
        assert_eq!(data.encode().unwrap(), "2601N2701G5101S");
    }

    #[test]
    fn test_too_many_methods() {
        let methods: Vec<_> = (0..26).map(|i| method(&i.to_string(), &format!("P{i}"))).collect();
        assert_eq!(
            to_field_map(&methods),
            Err(EncodeError::TooManyPaymentMethods { count: 26 })
        );
        assert!(to_field_map(&methods[..25]).is_ok());
    }
}
