//! Runtime value representation for the resolution environment

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use solana_sdk::instruction::Instruction;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Keypair;
use solana_sdk::signer::Signer;

/// A value stored in the resolution environment.
///
/// The environment is a closed sum type: every consumer pattern-matches
/// exhaustively instead of probing an untyped map.
#[derive(Clone)]
pub enum Value {
    /// 32-byte account or program address
    Pubkey(Pubkey),
    /// Test identity (full keypair), shared behind an Arc since `Keypair`
    /// is not `Clone`
    Keypair(Arc<Keypair>),
    /// Raw byte buffer
    Bytes(Vec<u8>),
    /// Fully resolved instruction ready for transaction assembly
    Instruction(Instruction),
    /// Typed scalar, set by prompting or scalar-call tokens
    Scalar(Scalar),
    /// File association for a named account artifact (`.so` / `.json`)
    FileRef(PathBuf),
}

/// Scalar values carried by the environment
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scalar {
    /// Unsigned integer, wide enough for any unsigned tag
    Uint(u128),
    /// Signed integer, wide enough for any signed tag
    Int(i128),
    /// Boolean
    Bool(bool),
    /// UTF-8 string
    String(String),
}

impl Value {
    /// Returns the type name as a string, for error messages
    pub fn type_name(&self) -> String {
        match self {
            Value::Pubkey(_) => "pubkey".to_string(),
            Value::Keypair(_) => "keypair".to_string(),
            Value::Bytes(_) => "bytes".to_string(),
            Value::Instruction(_) => "instruction".to_string(),
            Value::Scalar(Scalar::Uint(_)) | Value::Scalar(Scalar::Int(_)) => {
                "number".to_string()
            }
            Value::Scalar(Scalar::Bool(_)) => "bool".to_string(),
            Value::Scalar(Scalar::String(_)) => "string".to_string(),
            Value::FileRef(_) => "file-ref".to_string(),
        }
    }

    /// Address carried by the value, if it has one. Keypairs yield their
    /// public key.
    pub fn as_pubkey(&self) -> Option<Pubkey> {
        match self {
            Value::Pubkey(pk) => Some(*pk),
            Value::Keypair(kp) => Some(kp.pubkey()),
            _ => None,
        }
    }

    /// Unsigned scalar convenience constructor
    pub fn uint(v: u64) -> Self {
        Value::Scalar(Scalar::Uint(v as u128))
    }

    /// Signed scalar convenience constructor
    pub fn int(v: i64) -> Self {
        Value::Scalar(Scalar::Int(v as i128))
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Pubkey(pk) => write!(f, "Pubkey({})", pk),
            // Never print secret key material
            Value::Keypair(kp) => write!(f, "Keypair({})", kp.pubkey()),
            Value::Bytes(b) => write!(f, "Bytes({} bytes)", b.len()),
            Value::Instruction(ix) => write!(
                f,
                "Instruction(program={}, {} accounts, {} data bytes)",
                ix.program_id,
                ix.accounts.len(),
                ix.data.len()
            ),
            Value::Scalar(s) => write!(f, "Scalar({:?})", s),
            Value::FileRef(p) => write!(f, "FileRef({})", p.display()),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Pubkey(a), Value::Pubkey(b)) => a == b,
            // Keypairs compare by public key
            (Value::Keypair(a), Value::Keypair(b)) => a.pubkey() == b.pubkey(),
            (Value::Bytes(a), Value::Bytes(b)) => a == b,
            (Value::Instruction(a), Value::Instruction(b)) => a == b,
            (Value::Scalar(a), Value::Scalar(b)) => a == b,
            (Value::FileRef(a), Value::FileRef(b)) => a == b,
            _ => false,
        }
    }
}
