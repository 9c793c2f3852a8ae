//! Interpretation contexts for EMVCo merchant-presented QR payloads
//!
//! A context names a TLV schema: which tags it knows, how to describe them and
//! whether a value should be interpreted further. The set of contexts is fixed:
//!
//! ```text
//! EMVCo MPM (root)
//! └── 26..=51 merchant account information (generic)
//!     ├── SG.PAYNOW   -> PayNow
//!     ├── SG.COM.NETS -> NETS
//!     ├── COM.GRAB    -> GrabPay
//!     └── SG.SGQR     -> SGQR merchant metadata
//! ```

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

use crate::decode::{decode, Interpretation};
use crate::tag::Tag;

/// Named TLV schema
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Context {
    /// Top level of an EMVCo merchant-presented payload
    EmvcoMpm,
    /// Merchant account information block whose network is not recognised
    MerchantAccountInformation,
    PayNow,
    Nets,
    GrabPay,
    SgqrMerchant,
}

/// What a context knows about one tag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KnownElement {
    pub description: &'static str,
    pub interpreter: Option<Interpreter>,
}

/// Re-interpretation applied to a known element's raw value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interpreter {
    PointOfInitiation,
    /// Nested TLV, dispatched on its own tag `00`
    MerchantAccountInformation,
    PayNowPayeeType,
    PayNowAmountEditable,
}

/// Payment networks recognised by their format indicator (sub-tag `00`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Protocol {
    PayNow,
    Nets,
    GrabPay,
    Sgqr,
}

const fn known(description: &'static str) -> KnownElement {
    KnownElement {
        description,
        interpreter: None,
    }
}

const fn interpreted(description: &'static str, interpreter: Interpreter) -> KnownElement {
    KnownElement {
        description,
        interpreter: Some(interpreter),
    }
}

const PAYLOAD_FORMAT_INDICATOR: KnownElement = known("Payload format indicator");

const MERCHANT_ACCOUNT_INFORMATION: KnownElement = interpreted(
    "Merchant account information",
    Interpreter::MerchantAccountInformation,
);

const EMVCO_MPM_ELEMENTS: &[(&str, KnownElement)] = &[
    ("00", PAYLOAD_FORMAT_INDICATOR),
    (
        "01",
        interpreted("Point of initiation", Interpreter::PointOfInitiation),
    ),
    ("52", known("Merchant category code")),
    ("53", known("Transaction currency")),
    ("54", known("Transaction amount")),
    ("58", known("Country code")),
    ("59", known("Merchant name")),
    ("60", known("Merchant city")),
    ("61", known("Postal code")),
    ("62", known("Additional data field template")),
    ("63", known("CRC")),
];

const GENERIC_ELEMENTS: &[(&str, KnownElement)] = &[("00", PAYLOAD_FORMAT_INDICATOR)];

const PAYNOW_ELEMENTS: &[(&str, KnownElement)] = &[
    ("00", PAYLOAD_FORMAT_INDICATOR),
    (
        "01",
        interpreted("Payee type", Interpreter::PayNowPayeeType),
    ),
    ("02", known("Payee")),
    (
        "03",
        interpreted("Is amount editable", Interpreter::PayNowAmountEditable),
    ),
    ("04", known("Transaction reference")),
    ("05", known("Expiry (YYYY/MM/DD)")),
];

const NETS_ELEMENTS: &[(&str, KnownElement)] = &[
    ("00", PAYLOAD_FORMAT_INDICATOR),
    ("01", known("QR metadata")),
    ("02", known("Merchant ID")),
    ("03", known("Terminal ID")),
    ("09", known("Transaction amount modifier")),
    ("99", known("Signature")),
];

const GRABPAY_ELEMENTS: &[(&str, KnownElement)] = &[
    ("00", PAYLOAD_FORMAT_INDICATOR),
    ("01", known("Merchant ID")),
];

const SGQR_ELEMENTS: &[(&str, KnownElement)] = &[
    ("00", PAYLOAD_FORMAT_INDICATOR),
    ("01", known("SGQR ID Number")),
    ("02", known("Version")),
    ("03", known("Postcode")),
    ("04", known("Level")),
    ("05", known("Unit number")),
    ("06", known("Misc")),
    ("07", known("Revision date (YYYYMMDD)")),
];

impl Context {
    /// Display name of the schema
    pub fn name(&self) -> &'static str {
        match self {
            Context::EmvcoMpm => "EMVCo Merchant Presented QR Code",
            Context::MerchantAccountInformation => "Generic merchant account information",
            Context::PayNow => "PayNow Merchant Information",
            Context::Nets => "NETS",
            Context::GrabPay => "GrabPay",
            Context::SgqrMerchant => "SG Merchant ID",
        }
    }

    /// Stable identifier, used when serializing
    pub fn id(&self) -> &'static str {
        match self {
            Context::EmvcoMpm => "emvcoMpm",
            Context::MerchantAccountInformation => "merchantAccountInformation",
            Context::PayNow => "payNow",
            Context::Nets => "nets",
            Context::GrabPay => "grabPay",
            Context::SgqrMerchant => "sgqrMerchant",
        }
    }

    /// Looks up what this context knows about `tag`.
    pub fn known_element(&self, tag: Tag) -> Option<KnownElement> {
        if *self == Context::EmvcoMpm && tag.is_merchant_account() {
            return Some(MERCHANT_ACCOUNT_INFORMATION);
        }

        self.elements()
            .iter()
            .find(|(t, _)| *t == tag.as_str())
            .map(|(_, element)| *element)
    }

    fn elements(&self) -> &'static [(&'static str, KnownElement)] {
        match self {
            Context::EmvcoMpm => EMVCO_MPM_ELEMENTS,
            Context::MerchantAccountInformation => GENERIC_ELEMENTS,
            Context::PayNow => PAYNOW_ELEMENTS,
            Context::Nets => NETS_ELEMENTS,
            Context::GrabPay => GRABPAY_ELEMENTS,
            Context::SgqrMerchant => SGQR_ELEMENTS,
        }
    }
}

impl Serialize for Context {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Context", 2)?;
        state.serialize_field("id", self.id())?;
        state.serialize_field("name", self.name())?;
        state.end()
    }
}

impl Protocol {
    pub const ALL: [Protocol; 4] = [
        Protocol::PayNow,
        Protocol::Nets,
        Protocol::GrabPay,
        Protocol::Sgqr,
    ];

    /// Canonical (uppercase) format indicator
    pub fn identifier(&self) -> &'static str {
        match self {
            Protocol::PayNow => "SG.PAYNOW",
            Protocol::Nets => "SG.COM.NETS",
            Protocol::GrabPay => "COM.GRAB",
            Protocol::Sgqr => "SG.SGQR",
        }
    }

    /// Matches a format indicator case-insensitively.
    pub fn from_indicator(indicator: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|p| p.identifier().eq_ignore_ascii_case(indicator))
    }

    /// Schema governing the rest of this network's block
    pub fn context(&self) -> Context {
        match self {
            Protocol::PayNow => Context::PayNow,
            Protocol::Nets => Context::Nets,
            Protocol::GrabPay => Context::GrabPay,
            Protocol::Sgqr => Context::SgqrMerchant,
        }
    }
}

impl Interpreter {
    pub fn interpret(&self, value: &str) -> Interpretation {
        match self {
            Interpreter::PointOfInitiation => match value {
                "11" => Interpretation::Text("Static -- can be used for multiple transactions"),
                "12" => Interpretation::Text("Dynamic -- to be used for a single transaction"),
                _ => Interpretation::Unknown,
            },
            Interpreter::PayNowPayeeType => match value {
                "0" => Interpretation::Text("Mobile number"),
                "2" => Interpretation::Text("UEN"),
                _ => Interpretation::Unknown,
            },
            Interpreter::PayNowAmountEditable => match value {
                "0" => Interpretation::Text("Not editable"),
                "1" => Interpretation::Text("Editable"),
                _ => Interpretation::Unknown,
            },
            Interpreter::MerchantAccountInformation => merchant_account_information(value),
        }
    }
}

/// Parses a merchant account block generically, then re-parses it with the
/// network's own schema when its leading `00` names a known network.
fn merchant_account_information(value: &str) -> Interpretation {
    let generic = decode(Context::MerchantAccountInformation, value);

    let protocol = generic
        .elements
        .first()
        .filter(|first| first.element_id == "00")
        .and_then(|first| Protocol::from_indicator(&first.raw_value));

    let result = match protocol {
        Some(protocol) => {
            log::debug!("Merchant account block uses {}", protocol.identifier());
            decode(protocol.context(), value)
        }
        None => generic,
    };

    Interpretation::Nested(Box::new(result))
}
