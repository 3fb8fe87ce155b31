//! Canonical CBOR encoding for deterministic serialization.
//!
//! This module implements RFC 8949 Core Deterministic Encoding:
//! - Map keys sorted by encoded byte comparison
//! - Integers use smallest valid encoding
//! - Definite lengths only
//! - No floats, no tags
//!
//! Oracle requests and fulfilments are hashed and signed over these bytes,
//! so both sides must produce identical encodings for identical messages.

use ciborium::value::{Integer, Value};

use crate::error::CoreError;

/// Builder for a CBOR map with small integer keys.
///
/// Keys 0-23 encode as single bytes in CBOR.
#[derive(Debug, Default, Clone)]
pub struct CanonicalMap {
    entries: Vec<(Value, Value)>,
}

impl CanonicalMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a byte string field.
    pub fn bytes(mut self, key: u64, value: &[u8]) -> Self {
        self.entries.push((key_value(key), Value::Bytes(value.to_vec())));
        self
    }

    /// Add a text field.
    pub fn text(mut self, key: u64, value: &str) -> Self {
        self.entries.push((key_value(key), Value::Text(value.to_owned())));
        self
    }

    /// Add an unsigned integer field.
    pub fn uint(mut self, key: u64, value: u64) -> Self {
        self.entries.push((key_value(key), Value::Integer(value.into())));
        self
    }

    /// Add a signed integer field.
    pub fn int(mut self, key: u64, value: i64) -> Self {
        self.entries.push((key_value(key), Value::Integer(value.into())));
        self
    }

    /// Add a boolean field.
    pub fn bool(mut self, key: u64, value: bool) -> Self {
        self.entries.push((key_value(key), Value::Bool(value)));
        self
    }

    /// Add an arbitrary value.
    pub fn value(mut self, key: u64, value: Value) -> Self {
        self.entries.push((key_value(key), value));
        self
    }

    /// Finish into a CBOR value.
    pub fn into_value(self) -> Value {
        Value::Map(self.entries)
    }

    /// Encode to canonical bytes.
    pub fn encode(self) -> Result<Vec<u8>, CoreError> {
        encode_canonical(&self.into_value())
    }
}

fn key_value(key: u64) -> Value {
    Value::Integer(key.into())
}

/// Encode a CBOR value to canonical bytes.
///
/// Fails on floats, tags, and integers outside the 64-bit CBOR range.
pub fn encode_canonical(value: &Value) -> Result<Vec<u8>, CoreError> {
    let mut buf = Vec::new();
    encode_value_to(&mut buf, value)?;
    Ok(buf)
}

/// Recursively encode a CBOR value.
fn encode_value_to(buf: &mut Vec<u8>, value: &Value) -> Result<(), CoreError> {
    match value {
        Value::Integer(i) => encode_integer(buf, *i)?,
        Value::Bytes(b) => encode_bytes(buf, b),
        Value::Text(s) => encode_text(buf, s),
        Value::Array(arr) => encode_array(buf, arr)?,
        Value::Map(entries) => encode_map_canonical(buf, entries)?,
        Value::Bool(b) => buf.push(if *b { 0xf5 } else { 0xf4 }),
        Value::Null => buf.push(0xf6),
        Value::Float(_) => {
            return Err(CoreError::EncodingError(
                "floats not supported in canonical encoding".into(),
            ))
        }
        _ => {
            return Err(CoreError::EncodingError(
                "unsupported CBOR value type".into(),
            ))
        }
    }
    Ok(())
}

/// Encode a CBOR integer (major types 0 and 1).
fn encode_integer(buf: &mut Vec<u8>, i: Integer) -> Result<(), CoreError> {
    let n: i128 = i.into();

    if n >= 0 {
        let n = u64::try_from(n)
            .map_err(|_| CoreError::EncodingError(format!("integer {n} exceeds 64 bits")))?;
        encode_uint(buf, 0, n);
    } else {
        // CBOR encodes -1 as 0, -2 as 1, etc.
        let abs = u64::try_from(-1 - n)
            .map_err(|_| CoreError::EncodingError(format!("integer {n} exceeds 64 bits")))?;
        encode_uint(buf, 1, abs);
    }
    Ok(())
}

/// Encode an unsigned integer with the given major type.
fn encode_uint(buf: &mut Vec<u8>, major: u8, n: u64) {
    let mt = major << 5;
    if n < 24 {
        buf.push(mt | (n as u8));
    } else if n <= 0xff {
        buf.push(mt | 24);
        buf.push(n as u8);
    } else if n <= 0xffff {
        buf.push(mt | 25);
        buf.extend_from_slice(&(n as u16).to_be_bytes());
    } else if n <= 0xffff_ffff {
        buf.push(mt | 26);
        buf.extend_from_slice(&(n as u32).to_be_bytes());
    } else {
        buf.push(mt | 27);
        buf.extend_from_slice(&n.to_be_bytes());
    }
}

fn encode_bytes(buf: &mut Vec<u8>, bytes: &[u8]) {
    encode_uint(buf, 2, bytes.len() as u64);
    buf.extend_from_slice(bytes);
}

fn encode_text(buf: &mut Vec<u8>, s: &str) {
    encode_uint(buf, 3, s.len() as u64);
    buf.extend_from_slice(s.as_bytes());
}

fn encode_array(buf: &mut Vec<u8>, arr: &[Value]) -> Result<(), CoreError> {
    encode_uint(buf, 4, arr.len() as u64);
    for item in arr {
        encode_value_to(buf, item)?;
    }
    Ok(())
}

/// Encode a map canonically (major type 5).
///
/// Keys are sorted by their encoded bytes. Duplicate keys are rejected.
fn encode_map_canonical(buf: &mut Vec<u8>, entries: &[(Value, Value)]) -> Result<(), CoreError> {
    let mut pairs = Vec::with_capacity(entries.len());
    for (k, v) in entries {
        let mut key_buf = Vec::new();
        encode_value_to(&mut key_buf, k)?;
        pairs.push((key_buf, v));
    }

    pairs.sort_by(|a, b| a.0.cmp(&b.0));
    if pairs.windows(2).any(|w| w[0].0 == w[1].0) {
        return Err(CoreError::EncodingError("duplicate map key".into()));
    }

    encode_uint(buf, 5, pairs.len() as u64);
    for (key_bytes, value) in pairs {
        buf.extend_from_slice(&key_bytes);
        encode_value_to(buf, value)?;
    }
    Ok(())
}
