use num_bigint::BigUint;
use serde::{Deserialize, Serialize};
use tiny_keccak::{Hasher, Keccak};

use crate::error::DecodeError;

/// Read-only ERC-20 metadata methods the resolver queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenMethod {
    Name,
    Symbol,
    Decimals,
}

impl TokenMethod {
    pub fn signature(&self) -> &'static str {
        match self {
            TokenMethod::Name => "name()",
            TokenMethod::Symbol => "symbol()",
            TokenMethod::Decimals => "decimals()",
        }
    }

    /// Calldata for the call. None of the methods take arguments.
    pub fn calldata(&self) -> Vec<u8> {
        selector_from_signature(self.signature()).to_vec()
    }
}

/// Compute the 4-byte selector from a canonical function signature.
pub fn selector_from_signature(canonical: &str) -> [u8; 4] {
    let mut hasher = Keccak::v256();
    hasher.update(canonical.as_bytes());
    let mut hash = [0u8; 32];
    hasher.finalize(&mut hash);
    [hash[0], hash[1], hash[2], hash[3]]
}

/// Decode an ABI-encoded dynamic `string` return value.
pub fn decode_string(data: &[u8]) -> Result<String, DecodeError> {
    let offset = read_u256_as_usize(data, 0)?;
    let len = read_u256_as_usize(data, offset)?;
    let start = offset
        .checked_add(32)
        .ok_or_else(|| DecodeError::InvalidEncoding("offset overflow".to_string()))?;
    ensure_bytes(data, start, len)?;
    std::str::from_utf8(&data[start..start + len])
        .map(str::to_string)
        .map_err(|e| DecodeError::InvalidEncoding(format!("invalid UTF-8: {e}")))
}

/// Decode an ABI-encoded `uint8` return value.
pub fn decode_uint8(data: &[u8]) -> Result<u8, DecodeError> {
    ensure_bytes(data, 0, 32)?;
    let value = BigUint::from_bytes_be(&data[..32]);
    u8::try_from(value).map_err(|_| DecodeError::Overflow("uint8"))
}

/// Hex form (`0x` + 64 chars) of the first return word, if there is one.
pub fn bytes32_hex(data: &[u8]) -> Option<String> {
    if data.len() < 32 {
        return None;
    }
    Some(format!("0x{}", hex::encode(&data[..32])))
}

/// Decode a null-terminated fixed 32-byte string.
///
/// The last byte must be zero. Trailing zero bytes are stripped; zeros
/// inside the string are kept.
pub fn parse_bytes32_string(bytes32: &str) -> Result<String, DecodeError> {
    let word = parse_bytes32(bytes32)?;
    if word[31] != 0 {
        return Err(DecodeError::InvalidEncoding(
            "bytes32 string has no null terminator".to_string(),
        ));
    }
    let len = word.iter().rposition(|&b| b != 0).map_or(0, |i| i + 1);
    std::str::from_utf8(&word[..len])
        .map(str::to_string)
        .map_err(|e| DecodeError::InvalidEncoding(format!("invalid UTF-8: {e}")))
}

/// Pick a display string from a `string` result, falling back to a bytes32
/// result, then to `default`.
pub fn parse_string_or_bytes32(
    value: Option<&str>,
    bytes32: Option<&str>,
    default: &str,
) -> String {
    if let Some(s) = value.filter(|s| !s.is_empty()) {
        return s.to_string();
    }
    bytes32
        .filter(|b| is_bytes32_hex(b))
        .and_then(|b| parse_bytes32_string(b).ok())
        .unwrap_or_else(|| default.to_string())
}

/// `^0x[a-fA-F0-9]{64}$`
fn is_bytes32_hex(s: &str) -> bool {
    s.len() == 66
        && s.starts_with("0x")
        && s[2..].chars().all(|c| c.is_ascii_hexdigit())
}

fn parse_bytes32(s: &str) -> Result<[u8; 32], DecodeError> {
    if !is_bytes32_hex(s) {
        return Err(DecodeError::InvalidEncoding(format!(
            "not a bytes32 hex string: {s}"
        )));
    }
    let mut word = [0u8; 32];
    hex::decode_to_slice(&s[2..], &mut word)
        .map_err(|e| DecodeError::InvalidEncoding(e.to_string()))?;
    Ok(word)
}

fn read_u256_as_usize(data: &[u8], offset: usize) -> Result<usize, DecodeError> {
    ensure_bytes(data, offset, 32)?;
    let word = &data[offset..offset + 32];
    // Check that high bytes are zero (offset should fit in usize)
    for &b in &word[..24] {
        if b != 0 {
            return Err(DecodeError::InvalidEncoding(
                "offset too large for usize".to_string(),
            ));
        }
    }
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&word[24..32]);
    usize::try_from(u64::from_be_bytes(bytes)).map_err(|_| DecodeError::Overflow("usize"))
}

fn ensure_bytes(data: &[u8], offset: usize, len: usize) -> Result<(), DecodeError> {
    match offset.checked_add(len) {
        Some(end) if end <= data.len() => Ok(()),
        _ => Err(DecodeError::TooShort {
            expected: offset.saturating_add(len),
            actual: data.len(),
        }),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// ABI-encode a single dynamic string return value.
    pub(crate) fn encode_string(s: &str) -> Vec<u8> {
        let mut out = vec![0u8; 64];
        out[31] = 0x20;
        let len = s.len() as u64;
        out[56..64].copy_from_slice(&len.to_be_bytes());
        out.extend_from_slice(s.as_bytes());
        let padded = (s.len() + 31) / 32 * 32;
        out.resize(64 + padded, 0);
        out
    }

    /// ABI-encode a single uint word.
    pub(crate) fn encode_uint(value: u64) -> Vec<u8> {
        let mut out = vec![0u8; 32];
        out[24..32].copy_from_slice(&value.to_be_bytes());
        out
    }

    /// Right-pad a short ASCII string into a bytes32 word.
    pub(crate) fn encode_bytes32(s: &str) -> Vec<u8> {
        let mut out = s.as_bytes().to_vec();
        out.resize(32, 0);
        out
    }

    #[test]
    fn test_token_method_selectors() {
        assert_eq!(hex::encode(TokenMethod::Name.calldata()), "06fdde03");
        assert_eq!(hex::encode(TokenMethod::Symbol.calldata()), "95d89b41");
        assert_eq!(hex::encode(TokenMethod::Decimals.calldata()), "313ce567");
    }

    #[test]
    fn test_decode_string() {
        let data = encode_string("Wrapped Ether");
        assert_eq!(decode_string(&data).unwrap(), "Wrapped Ether");
    }

    #[test]
    fn test_decode_string_rejects_bytes32_payload() {
        // MKR-style contracts return a bare bytes32 word
        let data = encode_bytes32("MKR");
        assert!(decode_string(&data).is_err());
    }

    #[test]
    fn test_decode_uint8() {
        assert_eq!(decode_uint8(&encode_uint(18)).unwrap(), 18);
        assert_eq!(
            decode_uint8(&encode_uint(256)),
            Err(DecodeError::Overflow("uint8"))
        );
        assert!(matches!(
            decode_uint8(&[0u8; 4]),
            Err(DecodeError::TooShort { expected: 32, actual: 4 })
        ));
    }

    #[test]
    fn test_bytes32_fallback_with_terminator() {
        let hex = bytes32_hex(&encode_bytes32("MKR")).unwrap();
        assert_eq!(parse_string_or_bytes32(None, Some(&hex), "UNKNOWN"), "MKR");
        assert_eq!(parse_string_or_bytes32(Some(""), Some(&hex), "UNKNOWN"), "MKR");
    }

    #[test]
    fn test_bytes32_fallback_without_terminator() {
        let mut word = encode_bytes32("MKR");
        word[31] = b'X';
        let hex = bytes32_hex(&word).unwrap();
        assert_eq!(parse_string_or_bytes32(None, Some(&hex), "UNKNOWN"), "UNKNOWN");
    }

    #[test]
    fn test_bytes32_keeps_inner_zero_bytes() {
        let mut word = encode_bytes32("A");
        word[2] = b'B';
        assert_eq!(parse_bytes32_string(&bytes32_hex(&word).unwrap()).unwrap(), "A\0B");
        assert_eq!(parse_bytes32_string(&bytes32_hex(&[0u8; 32]).unwrap()).unwrap(), "");
    }

    #[test]
    fn test_primary_string_wins() {
        let hex = bytes32_hex(&encode_bytes32("OLD")).unwrap();
        assert_eq!(
            parse_string_or_bytes32(Some("NEW"), Some(&hex), "UNKNOWN"),
            "NEW"
        );
    }

    #[test]
    fn test_malformed_bytes32_uses_default() {
        assert_eq!(
            parse_string_or_bytes32(None, Some("0x1234"), "Unknown Token"),
            "Unknown Token"
        );
        assert_eq!(parse_string_or_bytes32(None, None, "Unknown Token"), "Unknown Token");
    }
}
