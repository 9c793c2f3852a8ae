//! SGQR Core - разбор и сборка платёжных QR-кодов EMVCo (Merchant Presented Mode)
//!
//! Библиотека работает с уже распознанным текстом QR-кода:
//! - Рекурсивный разбор TLV с вложенными схемами (PayNow, NETS, GrabPay, SGQR)
//! - Сборка TLV с CRC16/CCITT (тег 63)
//! - Извлечение и объединение платёжных методов (теги 26-51)
//! - Сборка PayNow-методов вручную
//!
//! Распознавание изображения и отрисовка QR выполняются снаружи.

pub mod checksum;
pub mod compose;
pub mod content;
pub mod context;
pub mod decode;
pub mod encode;
pub mod error;
pub mod payment;
pub mod paynow;
pub mod render;
pub mod tag;

pub use compose::{Composer, Composition, MerchantDefaults};
pub use content::ContentType;
pub use context::{Context, Protocol};
pub use decode::{decode, Description, Entry, Interpretation, ParseResult, ParsedElement};
pub use encode::{Component, QrData};
pub use error::{ChecksumError, ComposeError, EncodeError, ParseError, RenderError};
pub use payment::PaymentMethod;
pub use paynow::{PayNowRequest, PayeeKind};
pub use render::{QrMatrix, QrRenderer};
#[cfg(feature = "render")]
pub use render::MatrixRenderer;
pub use tag::Tag;

use serde::Serialize;

/// Результат разбора отсканированного текста
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Inspection {
    /// Исходный текст
    pub content: String,
    /// Тип контента
    pub content_type: ContentType,
    /// Хост, если это URL
    pub url_host: Option<String>,
    /// Дерево разбора EMVCo
    pub parse: ParseResult,
    /// Платёжные методы из тегов 26-51
    pub payment_methods: Vec<PaymentMethod>,
    /// Результат проверки CRC (только для EMVCo payload)
    pub checksum_valid: Option<bool>,
}

impl Inspection {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Полный разбор отсканированного текста
pub fn inspect(content: &str) -> Inspection {
    log::info!("Inspecting {} chars", content.chars().count());

    let content_type = ContentType::detect(content);
    let parse = decode(Context::EmvcoMpm, content);
    if let Some(e) = &parse.error {
        log::warn!("Payload is not well-formed TLV: {}", e);
    }

    let payment_methods = payment::extract(&parse.elements);

    let checksum_valid = match content_type {
        ContentType::EmvMpm => match checksum::verify(content) {
            Ok(()) => Some(true),
            Err(e) => {
                log::warn!("Checksum check failed: {}", e);
                Some(false)
            }
        },
        _ => None,
    };

    log::info!(
        "Inspection done: {:?}, {} elements, {} payment methods",
        content_type,
        parse.elements.len(),
        payment_methods.len()
    );

    Inspection {
        content: content.to_string(),
        content_type,
        url_host: content::url_host(content).map(str::to_string),
        parse,
        payment_methods,
        checksum_valid,
    }
}
