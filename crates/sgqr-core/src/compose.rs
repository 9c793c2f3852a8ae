//! Модуль объединения нескольких платёжных QR в один SGQR payload
//!
//! [`Composition`] хранит упорядоченный список платёжных методов и не
//! изменяется на месте: каждая операция возвращает новое значение.

use serde::{Deserialize, Serialize};

use crate::context::Context;
use crate::decode::decode;
use crate::encode::QrData;
use crate::error::{ComposeError, EncodeError};
use crate::payment::{self, PaymentMethod};
use crate::tag::Tag;

/// Поля верхнего уровня, которые записываются вокруг платёжных методов
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MerchantDefaults {
    /// Версия payload (00)
    pub payload_format_indicator: String,
    /// 11 - статический, 12 - динамический (01)
    pub point_of_initiation: String,
    /// MCC (52)
    pub merchant_category_code: String,
    /// Валюта, ISO 4217 numeric (53)
    pub transaction_currency: String,
    /// Код страны (58)
    pub country_code: String,
    /// Название получателя (59). PayNow ищет получателя сам.
    pub merchant_name: String,
    /// Город (60)
    pub merchant_city: String,
}

impl Default for MerchantDefaults {
    fn default() -> Self {
        Self {
            payload_format_indicator: "01".to_string(),
            point_of_initiation: "11".to_string(),
            merchant_category_code: "0000".to_string(),
            transaction_currency: "702".to_string(),
            country_code: "SG".to_string(),
            merchant_name: "NA".to_string(),
            merchant_city: "Singapore".to_string(),
        }
    }
}

impl MerchantDefaults {
    /// Загрузка из JSON; отсутствующие поля берутся по умолчанию
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    fn to_qr_data(&self) -> QrData {
        QrData::new()
            .with(Tag::new(0), self.payload_format_indicator.as_str())
            .with(Tag::new(1), self.point_of_initiation.as_str())
            .with(Tag::new(52), self.merchant_category_code.as_str())
            .with(Tag::new(53), self.transaction_currency.as_str())
            .with(Tag::new(58), self.country_code.as_str())
            .with(Tag::new(59), self.merchant_name.as_str())
            .with(Tag::new(60), self.merchant_city.as_str())
    }
}

/// Упорядоченный список платёжных методов
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Composition {
    pub payment_methods: Vec<PaymentMethod>,
}

impl Composition {
    pub fn new(payment_methods: Vec<PaymentMethod>) -> Self {
        Self { payment_methods }
    }

    /// Методы из отсканированного payload
    pub fn from_scan(content: &str) -> Self {
        Self::default().with_scan(content)
    }

    /// Добавление методов из ещё одного сканирования
    pub fn with_scan(&self, content: &str) -> Self {
        let parsed = decode(Context::EmvcoMpm, content);
        let scanned = payment::extract(&parsed.elements);
        log::info!("Scanned {} payment methods", scanned.len());

        Self {
            payment_methods: payment::merge(self.payment_methods.clone(), scanned),
        }
    }

    /// Добавление одного метода; метод того же протокола заменяется
    pub fn with_method(&self, method: PaymentMethod) -> Self {
        let mut methods = self.payment_methods.clone();
        methods.push(method);
        Self {
            payment_methods: payment::dedup_by_protocol(methods),
        }
    }

    /// Перемещение метода `index` на место перед методом `before`.
    ///
    /// `before == len` переносит метод в конец.
    pub fn moved(&self, index: usize, before: usize) -> Result<Self, ComposeError> {
        let len = self.payment_methods.len();
        if index >= len {
            return Err(ComposeError::IndexOutOfRange { index, len });
        }
        if before > len {
            return Err(ComposeError::IndexOutOfRange { index: before, len });
        }

        let mut methods = self.payment_methods.clone();
        if index < before {
            methods[index..before].rotate_left(1);
        } else if index > before {
            methods[before..=index].rotate_right(1);
        }

        Ok(Self {
            payment_methods: methods,
        })
    }

    /// Удаление метода
    pub fn removed(&self, index: usize) -> Result<Self, ComposeError> {
        let len = self.payment_methods.len();
        if index >= len {
            return Err(ComposeError::IndexOutOfRange { index, len });
        }

        let mut methods = self.payment_methods.clone();
        methods.remove(index);
        Ok(Self {
            payment_methods: methods,
        })
    }

    pub fn len(&self) -> usize {
        self.payment_methods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.payment_methods.is_empty()
    }
}

/// Сборщик итогового payload
pub struct Composer {
    defaults: MerchantDefaults,
}

impl Default for Composer {
    fn default() -> Self {
        Self::new()
    }
}

impl Composer {
    /// Создание со значениями по умолчанию
    pub fn new() -> Self {
        Self {
            defaults: MerchantDefaults::default(),
        }
    }

    /// Создание с пользовательскими полями
    pub fn with_config(defaults: MerchantDefaults) -> Self {
        Self { defaults }
    }

    pub fn defaults(&self) -> &MerchantDefaults {
        &self.defaults
    }

    /// Поля payload без CRC
    pub fn fields(&self, composition: &Composition) -> Result<QrData, EncodeError> {
        let methods = payment::to_field_map(&composition.payment_methods)?;
        Ok(self.defaults.to_qr_data().merge(methods))
    }

    /// Итоговая строка для QR, с CRC
    pub fn payload(&self, composition: &Composition) -> Result<String, EncodeError> {
        let payload = self.fields(composition)?.encode_with_checksum()?;
        log::info!(
            "Composed payload with {} payment methods, {} chars",
            composition.len(),
            payload.chars().count()
        );
        Ok(payload)
    }
}
