//! CRC trailer (tag 63) computation and validation

use crate::error::ChecksumError;

/// Header of the checksum element: tag `63`, length `04`.
pub const CRC_HEADER: &str = "6304";

// CRC-16/CCITT-FALSE
// Poly: 0x1021
// Init: 0xFFFF
pub fn crc16_ccitt(data: &[u8]) -> u16 {
    let mut crc: u16 = 0xFFFF;
    for &byte in data {
        let x = ((crc >> 8) ^ u16::from(byte)) & 0xFF;
        let x = x ^ (x >> 4);
        crc = (crc << 8) ^ (x << 12) ^ (x << 5) ^ x;
    }
    crc
}

/// CRC of the UTF-8 bytes of `text`, as 4 uppercase hex digits.
pub fn checksum_hex(text: &str) -> String {
    format!("{:04X}", crc16_ccitt(text.as_bytes()))
}

/// Appends the `6304` header and the CRC computed over everything up to and
/// including that header.
pub fn append_checksum(payload: &str) -> String {
    let mut result = String::with_capacity(payload.len() + 8);
    result.push_str(payload);
    result.push_str(CRC_HEADER);
    let crc = checksum_hex(&result);
    result.push_str(&crc);
    result
}

/// Validates the CRC trailer of a complete payload.
///
/// The CRC must be the last data object: `... 6304 XXXX`.
pub fn verify(payload: &str) -> Result<(), ChecksumError> {
    let len = payload.len();
    if len < 8 || !payload.is_char_boundary(len - 4) {
        return Err(ChecksumError::MissingChecksum);
    }

    let (data_to_check, provided_crc) = payload.split_at(len - 4);
    if !data_to_check.ends_with(CRC_HEADER) {
        return Err(ChecksumError::MissingChecksum);
    }

    let calculated = checksum_hex(data_to_check);
    if !provided_crc.eq_ignore_ascii_case(&calculated) {
        return Err(ChecksumError::InvalidCrc {
            expected: calculated,
            actual: provided_crc.to_string(),
        });
    }

    Ok(())
}
