//! Binary codec and token pattern resolver
//!
//! Stateless functions that classify a token string against the fixed
//! grammar and emit an exact-width byte sequence. Classification is a
//! single pass into a closed [`TokenPattern`]; encoding is a separate
//! exhaustive dispatch over it.

mod encode;
mod pattern;
mod tag;

pub use encode::{encode_value, resolve, sighash, snake_case};
pub use pattern::{classify, variable_info, AccountToken, TokenPattern, VariableInfo};
pub use tag::TypeTag;

/// Handling of `bytes(..)` list entries outside 0..=255.
///
/// The original engine silently truncated out-of-range entries; strict
/// mode rejects them instead and is the default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BytesMode {
    /// Reject entries outside 0..=255 with a range error
    #[default]
    Strict,
    /// Truncate entries to their low 8 bits
    Lenient,
}
