//! Type tags for the token grammar
//!
//! Every tag has a fixed byte width and a signed/unsigned range. Multi-byte
//! integers encode little-endian; `usize` shares the 8-byte `u64` layout.

use std::fmt;

/// Type tag attached to a `$name:tag` variable token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeTag {
    /// Unsigned 8-bit integer (1 byte)
    U8,
    /// Unsigned 16-bit integer (2 bytes LE)
    U16,
    /// Unsigned 32-bit integer (4 bytes LE)
    U32,
    /// Unsigned 64-bit integer (8 bytes LE)
    U64,
    /// Unsigned 128-bit integer (16 bytes LE)
    U128,
    /// Platform-width unsigned integer, encoded identically to `u64`
    Usize,
    /// Signed 8-bit integer (1 byte, two's complement)
    I8,
    /// Signed 16-bit integer (2 bytes LE)
    I16,
    /// Signed 32-bit integer (4 bytes LE)
    I32,
    /// Signed 64-bit integer (8 bytes LE)
    I64,
    /// Signed 128-bit integer (16 bytes LE)
    I128,
    /// Boolean, one byte: 1 for true, 0 for false
    Bool,
    /// 32-byte account address
    Pubkey,
    /// Raw UTF-8 bytes, no length prefix
    String,
}

impl TypeTag {
    /// Parses a tag spelling from a token. `address` is accepted as an
    /// alias for `pubkey`.
    pub fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "u8" => TypeTag::U8,
            "u16" => TypeTag::U16,
            "u32" => TypeTag::U32,
            "u64" => TypeTag::U64,
            "u128" => TypeTag::U128,
            "usize" => TypeTag::Usize,
            "i8" => TypeTag::I8,
            "i16" => TypeTag::I16,
            "i32" => TypeTag::I32,
            "i64" => TypeTag::I64,
            "i128" => TypeTag::I128,
            "bool" => TypeTag::Bool,
            "pubkey" | "address" => TypeTag::Pubkey,
            "string" => TypeTag::String,
            _ => return None,
        })
    }

    /// Encoded byte width, where fixed. `string` has no fixed width.
    pub fn width(&self) -> Option<usize> {
        Some(match self {
            TypeTag::U8 | TypeTag::I8 | TypeTag::Bool => 1,
            TypeTag::U16 | TypeTag::I16 => 2,
            TypeTag::U32 | TypeTag::I32 => 4,
            TypeTag::U64 | TypeTag::Usize | TypeTag::I64 => 8,
            TypeTag::U128 | TypeTag::I128 => 16,
            TypeTag::Pubkey => 32,
            TypeTag::String => return None,
        })
    }

    /// True for the integer tags (signed or unsigned)
    pub fn is_numeric(&self) -> bool {
        !matches!(self, TypeTag::Bool | TypeTag::Pubkey | TypeTag::String)
    }

    /// True for the signed integer tags
    pub fn is_signed(&self) -> bool {
        matches!(
            self,
            TypeTag::I8 | TypeTag::I16 | TypeTag::I32 | TypeTag::I64 | TypeTag::I128
        )
    }

    /// Inclusive numeric bounds as display strings, for range errors
    pub fn bounds(&self) -> (String, String) {
        match self {
            TypeTag::U8 => ("0".into(), u8::MAX.to_string()),
            TypeTag::U16 => ("0".into(), u16::MAX.to_string()),
            TypeTag::U32 => ("0".into(), u32::MAX.to_string()),
            TypeTag::U64 | TypeTag::Usize => ("0".into(), u64::MAX.to_string()),
            TypeTag::U128 => ("0".into(), u128::MAX.to_string()),
            TypeTag::I8 => (i8::MIN.to_string(), i8::MAX.to_string()),
            TypeTag::I16 => (i16::MIN.to_string(), i16::MAX.to_string()),
            TypeTag::I32 => (i32::MIN.to_string(), i32::MAX.to_string()),
            TypeTag::I64 => (i64::MIN.to_string(), i64::MAX.to_string()),
            TypeTag::I128 => (i128::MIN.to_string(), i128::MAX.to_string()),
            _ => ("0".into(), "0".into()),
        }
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TypeTag::U8 => "u8",
            TypeTag::U16 => "u16",
            TypeTag::U32 => "u32",
            TypeTag::U64 => "u64",
            TypeTag::U128 => "u128",
            TypeTag::Usize => "usize",
            TypeTag::I8 => "i8",
            TypeTag::I16 => "i16",
            TypeTag::I32 => "i32",
            TypeTag::I64 => "i64",
            TypeTag::I128 => "i128",
            TypeTag::Bool => "bool",
            TypeTag::Pubkey => "pubkey",
            TypeTag::String => "string",
        };
        write!(f, "{}", s)
    }
}
