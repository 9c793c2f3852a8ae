//! Hand-built PayNow payment methods
//!
//! A PayNow block needs only the payee: a Singapore mobile number or a UEN
//! (business registration number), optionally with a payment reference.

use serde::{Deserialize, Serialize};

use crate::context::Protocol;
use crate::encode::QrData;
use crate::error::EncodeError;
use crate::payment::PaymentMethod;
use crate::tag::Tag;

const SINGAPORE_PREFIX: &str = "+65";

const FORMAT_INDICATOR: Tag = Tag::new(0);
const PAYEE_TYPE: Tag = Tag::new(1);
const PAYEE: Tag = Tag::new(2);
const AMOUNT_EDITABLE: Tag = Tag::new(3);
const REFERENCE: Tag = Tag::new(4);

/// Kind of PayNow payee
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PayeeKind {
    MobileNumber,
    Uen,
}

impl PayeeKind {
    /// Guesses the payee kind from what the user typed.
    ///
    /// Eight digits, optionally after `+65`, is a mobile number. Anything
    /// mixing letters and digits is a UEN.
    pub fn classify(destination: &str) -> Option<Self> {
        let local = destination
            .strip_prefix(SINGAPORE_PREFIX)
            .unwrap_or(destination);
        if is_local_number(local) {
            return Some(PayeeKind::MobileNumber);
        }

        let has_letter = destination.chars().any(|c| c.is_ascii_alphabetic());
        let has_digit = destination.chars().any(|c| c.is_ascii_digit());
        if has_letter && has_digit {
            Some(PayeeKind::Uen)
        } else {
            None
        }
    }

    /// Value of PayNow sub-tag `01`
    pub fn code(&self) -> &'static str {
        match self {
            PayeeKind::MobileNumber => "0",
            PayeeKind::Uen => "2",
        }
    }
}

fn is_local_number(s: &str) -> bool {
    s.len() == 8 && s.bytes().all(|b| b.is_ascii_digit())
}

/// Adds the `+65` country prefix to a bare 8-digit mobile number.
pub fn standardize_phone(kind: PayeeKind, destination: &str) -> String {
    if kind == PayeeKind::MobileNumber && is_local_number(destination) {
        format!("{SINGAPORE_PREFIX}{destination}")
    } else {
        destination.to_string()
    }
}

/// Payee details for a new PayNow method
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayNowRequest {
    pub destination: String,
    pub kind: PayeeKind,
    /// Only used for UEN payees
    #[serde(default)]
    pub reference: Option<String>,
}

impl PayNowRequest {
    /// Classifies `destination` and builds a request without a reference.
    pub fn for_destination(destination: &str) -> Option<Self> {
        let kind = PayeeKind::classify(destination)?;
        Some(Self {
            destination: destination.to_string(),
            kind,
            reference: None,
        })
    }

    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }

    /// The PayNow block's fields. The amount is always marked editable.
    pub fn to_qr_data(&self) -> QrData {
        let reference = match self.kind {
            PayeeKind::Uen => self.reference.as_deref().filter(|r| !r.is_empty()),
            PayeeKind::MobileNumber => None,
        };

        QrData::new()
            .with(FORMAT_INDICATOR, Protocol::PayNow.identifier())
            .with(PAYEE_TYPE, self.kind.code())
            .with(
                PAYEE,
                standardize_phone(self.kind, &self.destination).to_uppercase(),
            )
            .with(AMOUNT_EDITABLE, "1")
            .with_opt(REFERENCE, reference)
    }

    pub fn to_payment_method(&self) -> Result<PaymentMethod, EncodeError> {
        let raw_data = self.to_qr_data().encode()?;
        Ok(PaymentMethod {
            raw_data,
            description: format!("PayNow ({})", self.destination.to_uppercase()),
            protocol: Protocol::PayNow.identifier().to_string(),
            icon_url: String::new(),
        })
    }
}
