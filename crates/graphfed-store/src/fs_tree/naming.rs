//! Mapping between segments and directory names
//!
//! Bytes outside `[A-Za-z0-9_-]`, the index brackets and non-leading dots are
//! written as `%XX`, so any segment maps to a portable, non-hidden name.

use graphfed_core::errors::GraphError;
use graphfed_core::model::Segment;

use crate::errors::Result;

pub fn encode_segment(segment: &Segment) -> String {
    let text = segment.to_string();
    let mut encoded = String::with_capacity(text.len());
    for (i, byte) in text.bytes().enumerate() {
        let keep = byte.is_ascii_alphanumeric()
            || matches!(byte, b'_' | b'-' | b'[' | b']')
            || (byte == b'.' && i > 0);
        if keep {
            encoded.push(byte as char);
        } else {
            encoded.push_str(&format!("%{:02X}", byte));
        }
    }
    encoded
}

/// # Errors
/// `BackingStore` if `name` is not a valid encoding of a segment
pub fn decode_segment(name: &str) -> Result<Segment> {
    let bad = || GraphError::store("decode_segment", format!("'{}' is not a node directory", name));
    let mut bytes = Vec::with_capacity(name.len());
    let mut rest = name.as_bytes();
    while let Some((&byte, tail)) = rest.split_first() {
        if byte == b'%' {
            let hex = tail.get(..2).ok_or_else(bad)?;
            let hex = std::str::from_utf8(hex).map_err(|_| bad())?;
            bytes.push(u8::from_str_radix(hex, 16).map_err(|_| bad())?);
            rest = &tail[2..];
        } else {
            bytes.push(byte);
            rest = tail;
        }
    }
    String::from_utf8(bytes).map_err(|_| bad())?.parse()
}
