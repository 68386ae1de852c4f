//! Byte encoding for classified tokens
//!
//! Every numeric encode validates the value against its tag's declared
//! range before any bytes are written; out-of-range values never reach the
//! output buffer.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use sha2::{Digest, Sha256};

use crate::codec::pattern::{classify, TokenPattern};
use crate::codec::{BytesMode, TypeTag};
use crate::error::{Error, Result};
use crate::runtime::{Environment, Scalar, Value};

/// Converts a name to snake_case, matching the discriminator convention:
/// `InitializeLedger` becomes `initialize_ledger`.
pub fn snake_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    let chars: Vec<char> = name.chars().collect();
    for (i, c) in chars.iter().enumerate() {
        if c.is_ascii_uppercase() {
            let prev_lower = i > 0 && chars[i - 1].is_ascii_lowercase();
            let next_lower = i + 1 < chars.len() && chars[i + 1].is_ascii_lowercase();
            if i > 0 && (prev_lower || next_lower) && chars[i - 1] != '_' {
                out.push('_');
            }
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(*c);
        }
    }
    out
}

/// Computes the 8-byte instruction discriminator: the first 8 bytes of
/// SHA-256 over `"global:" + snake_case(name)`. Must match the well-known
/// Anchor scheme bit-for-bit.
pub fn sighash(name: &str) -> [u8; 8] {
    let preimage = format!("global:{}", snake_case(name));
    let digest = Sha256::digest(preimage.as_bytes());
    let mut out = [0u8; 8];
    out.copy_from_slice(&digest[..8]);
    out
}

fn range_error(name: &str, value: impl ToString, tag: TypeTag) -> Error {
    let (min, max) = tag.bounds();
    Error::RangeError {
        name: name.to_string(),
        value: value.to_string(),
        tag: tag.to_string(),
        min,
        max,
    }
}

/// Encodes an unsigned value into the tag's fixed width, range-checked
fn encode_uint(name: &str, tag: TypeTag, v: u128) -> Result<Vec<u8>> {
    match tag {
        TypeTag::U8 => u8::try_from(v)
            .map(|n| vec![n])
            .map_err(|_| range_error(name, v, tag)),
        TypeTag::U16 => u16::try_from(v)
            .map(|n| n.to_le_bytes().to_vec())
            .map_err(|_| range_error(name, v, tag)),
        TypeTag::U32 => u32::try_from(v)
            .map(|n| n.to_le_bytes().to_vec())
            .map_err(|_| range_error(name, v, tag)),
        TypeTag::U64 | TypeTag::Usize => u64::try_from(v)
            .map(|n| n.to_le_bytes().to_vec())
            .map_err(|_| range_error(name, v, tag)),
        TypeTag::U128 => Ok(v.to_le_bytes().to_vec()),
        // Signed tags accept non-negative unsigned input when it fits
        _ if tag.is_signed() => {
            let signed = i128::try_from(v).map_err(|_| range_error(name, v, tag))?;
            encode_int(name, tag, signed)
        }
        _ => Err(Error::TypeError {
            name: name.to_string(),
            expected: tag.to_string(),
            got: "number".to_string(),
        }),
    }
}

/// Encodes a signed value into the tag's fixed width, range-checked
fn encode_int(name: &str, tag: TypeTag, v: i128) -> Result<Vec<u8>> {
    match tag {
        TypeTag::I8 => i8::try_from(v)
            .map(|n| n.to_le_bytes().to_vec())
            .map_err(|_| range_error(name, v, tag)),
        TypeTag::I16 => i16::try_from(v)
            .map(|n| n.to_le_bytes().to_vec())
            .map_err(|_| range_error(name, v, tag)),
        TypeTag::I32 => i32::try_from(v)
            .map(|n| n.to_le_bytes().to_vec())
            .map_err(|_| range_error(name, v, tag)),
        TypeTag::I64 => i64::try_from(v)
            .map(|n| n.to_le_bytes().to_vec())
            .map_err(|_| range_error(name, v, tag)),
        TypeTag::I128 => Ok(v.to_le_bytes().to_vec()),
        // Unsigned tags reject negative input, otherwise defer
        _ if tag.is_numeric() => {
            let unsigned = u128::try_from(v).map_err(|_| range_error(name, v, tag))?;
            encode_uint(name, tag, unsigned)
        }
        _ => Err(Error::TypeError {
            name: name.to_string(),
            expected: tag.to_string(),
            got: "number".to_string(),
        }),
    }
}

/// Encodes an environment value against a declared type tag
pub fn encode_value(name: &str, tag: TypeTag, value: &Value) -> Result<Vec<u8>> {
    match (tag, value) {
        (TypeTag::Bool, Value::Scalar(Scalar::Bool(b))) => Ok(vec![u8::from(*b)]),
        (TypeTag::Bool, other) => Err(Error::TypeError {
            name: name.to_string(),
            expected: "bool".to_string(),
            got: other.type_name(),
        }),
        (TypeTag::Pubkey, Value::Pubkey(pk)) => Ok(pk.to_bytes().to_vec()),
        (TypeTag::Pubkey, other) => Err(Error::TypeError {
            name: name.to_string(),
            expected: "pubkey".to_string(),
            got: other.type_name(),
        }),
        (TypeTag::String, Value::Scalar(Scalar::String(s))) => Ok(s.as_bytes().to_vec()),
        (TypeTag::String, other) => Err(Error::TypeError {
            name: name.to_string(),
            expected: "string".to_string(),
            got: other.type_name(),
        }),
        (_, Value::Scalar(Scalar::Uint(v))) => encode_uint(name, tag, *v),
        (_, Value::Scalar(Scalar::Int(v))) => encode_int(name, tag, *v),
        (_, other) => Err(Error::TypeError {
            name: name.to_string(),
            expected: tag.to_string(),
            got: other.type_name(),
        }),
    }
}

/// Encodes a `bytes(..)` literal list under the configured mode.
///
/// Strict mode rejects entries outside 0..=255 with a range error; lenient
/// mode truncates to the low 8 bits, reproducing the original loose
/// behavior.
pub fn encode_byte_list(token: &str, values: &[i64], mode: BytesMode) -> Result<Vec<u8>> {
    match mode {
        BytesMode::Strict => values
            .iter()
            .map(|&v| {
                u8::try_from(v).map_err(|_| range_error(token, v, TypeTag::U8))
            })
            .collect(),
        BytesMode::Lenient => Ok(values.iter().map(|&v| v as u8).collect()),
    }
}

/// Fully resolves a data token to its byte encoding.
///
/// Variable tokens require the environment; every other form resolves from
/// the token alone.
pub fn resolve(token: &str, env: &Environment, mode: BytesMode) -> Result<Vec<u8>> {
    match classify(token)? {
        TokenPattern::Sighash { name } => Ok(sighash(&name).to_vec()),
        TokenPattern::Variable { name, tag } => {
            let value = env.get(&name)?;
            encode_value(&name, tag, value)
        }
        TokenPattern::Bytes { values } => encode_byte_list(token, &values, mode),
        TokenPattern::FromBase64 { payload } => {
            BASE64.decode(&payload).map_err(|_| Error::SyntaxError {
                token: token.to_string(),
            })
        }
        TokenPattern::Hex { payload } => hex::decode(&payload).map_err(|_| Error::SyntaxError {
            token: token.to_string(),
        }),
        TokenPattern::ScalarCall { tag, literal } => {
            let v = literal.parse::<u128>().map_err(|_| Error::SyntaxError {
                token: token.to_string(),
            })?;
            encode_uint(token, tag, v)
        }
    }
}
