use thiserror::Error;

/// Unified error type for the fraktal-tokens library.
#[derive(Debug, Error)]
pub enum Error {
    #[error("address error: {0}")]
    Address(#[from] AddressError),

    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    #[error("token list error: {0}")]
    List(#[from] ListError),

    #[error("contract call error: {0}")]
    Call(#[from] CallError),

    #[error("config error: {0}")]
    Config(String),
}

/// Errors while validating an address string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    #[error("address must be 40 hex characters, got {0}")]
    InvalidLength(usize),

    #[error("invalid hex in address: {0}")]
    InvalidHex(String),

    #[error("bad EIP-55 checksum: {0}")]
    BadChecksum(String),
}

/// Errors while decoding contract return data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("return data too short: expected at least {expected} bytes, got {actual}")]
    TooShort { expected: usize, actual: usize },

    #[error("invalid ABI encoding: {0}")]
    InvalidEncoding(String),

    #[error("value out of range for {0}")]
    Overflow(&'static str),
}

/// Errors while loading token lists and user token snapshots.
#[derive(Debug, Error)]
pub enum ListError {
    #[error("parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("unknown list: {0}")]
    UnknownList(String),
}

/// Errors reported by a contract reader.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CallError {
    #[error("call reverted: {0}")]
    Reverted(String),

    #[error("transport error: {0}")]
    Transport(String),
}
