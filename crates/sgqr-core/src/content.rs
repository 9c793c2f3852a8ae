//! Классификация отсканированного текста

use serde::{Deserialize, Serialize};

use crate::context::Context;
use crate::decode::decode;

/// Тип контента QR-кода
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum ContentType {
    Url,
    /// EMVCo merchant-presented payload (SGQR, PayNow, NETS, ...)
    EmvMpm,
    Text,
}

impl ContentType {
    pub fn detect(content: &str) -> Self {
        if url_scheme_len(content).is_some() {
            return ContentType::Url;
        }

        // EMVCo payload обычно начинается с "000201" (Payload Format Indicator)
        let parsed = decode(Context::EmvcoMpm, content);
        match parsed.elements.first() {
            Some(first) if first.element_id == "00" && first.length == 2 => ContentType::EmvMpm,
            _ => ContentType::Text,
        }
    }
}

fn url_scheme_len(content: &str) -> Option<usize> {
    ["http://", "https://"].into_iter().find_map(|scheme| {
        content
            .get(..scheme.len())
            .filter(|prefix| prefix.eq_ignore_ascii_case(scheme))
            .map(|_| scheme.len())
    })
}

/// Хост URL, чтобы пользователь мог проверить домен перед переходом
pub fn url_host(content: &str) -> Option<&str> {
    let rest = &content[url_scheme_len(content)?..];
    let authority = rest
        .split(['/', '?', '#'])
        .next()
        .unwrap_or_default();
    let host_port = authority.rsplit('@').next().unwrap_or_default();
    let host = match host_port.rfind(':') {
        Some(idx) if !host_port[idx..].contains(']') => &host_port[..idx],
        _ => host_port,
    };

    (!host.is_empty()).then_some(host)
}
