//! Error types for the solforge resolution engine

use thiserror::Error;

/// Errors raised while resolving a schema into concrete instructions,
/// snapshotting remote accounts, or running the local validator.
#[derive(Error, Debug)]
pub enum Error {
    // Token grammar errors
    /// Token matched no grammar rule
    ///
    /// **Triggered by:** A data or account token that is neither a function
    /// call form (`sighash(..)`, `bytes(..)`, ...) nor a `$name:tag` variable
    /// **Example:** `$amount` (missing type tag)
    #[error("'{token}' is not a valid variable syntax")]
    SyntaxError {
        /// The offending token, verbatim
        token: String,
    },

    /// Reference to a name absent from the environment
    ///
    /// **Triggered by:** Using `$name` before the phase that defines it has
    /// run, or restricting resolution to a subset that skips a dependency
    #[error("Undefined variable: {name}")]
    UndefinedVariable {
        /// Variable name (without the `$` sigil)
        name: String,
    },

    /// Value present in the environment but of the wrong kind
    ///
    /// **Example:** a string value supplied for a `$flag:bool` token
    #[error("Type error for '{name}': expected {expected}, got {got}")]
    TypeError {
        /// Variable name the token referenced
        name: String,
        /// Expected type
        expected: String,
        /// Actual type
        got: String,
    },

    /// Numeric value outside the declared bounds of its type tag
    ///
    /// Raised before any bytes are written to the output buffer.
    #[error("Value {value} for '{name}' is out of range for {tag} ({min}..={max})")]
    RangeError {
        /// Variable name the token referenced
        name: String,
        /// The supplied value, rendered as text
        value: String,
        /// Type tag the token declared
        tag: String,
        /// Lower bound (inclusive)
        min: String,
        /// Upper bound (inclusive)
        max: String,
    },

    // Resolution errors
    /// Malformed address literal
    #[error("Invalid address '{value}' for '{name}': {reason}")]
    InvalidAddress {
        /// Declared name the literal belongs to
        name: String,
        /// The literal that failed to parse
        value: String,
        /// Parse failure detail
        reason: String,
    },

    /// PDA seed variable did not resolve to an address-bearing value
    #[error("Invalid seed '{seed}' for PDA '{name}': {reason}")]
    InvalidSeed {
        /// PDA name being derived
        name: String,
        /// The seed token
        seed: String,
        /// Why the seed was rejected
        reason: String,
    },

    /// Literal PDA seed longer than the 32-byte maximum
    #[error("Seed '{seed}' for PDA '{name}' is {len} bytes, max is 32")]
    SeedTooLong {
        /// PDA name being derived
        name: String,
        /// The seed token
        seed: String,
        /// Actual byte length
        len: usize,
    },

    /// Account token matched no source (param map, named account, PDA, wallet)
    #[error("Cannot resolve account '{token}' for instruction '{name}'")]
    UnresolvedAccount {
        /// Instruction name being resolved
        name: String,
        /// The account token
        token: String,
    },

    /// Test wallet private key failed to decode into a keypair
    #[error("Invalid keypair for wallet '{name}': {reason}")]
    InvalidKeypair {
        /// Wallet name
        name: String,
        /// Decode failure detail
        reason: String,
    },

    // Schema errors
    /// Schema document failed structural validation
    #[error("Schema error: {0}")]
    SchemaError(String),

    // External errors
    /// RPC call failed
    #[error("RPC error: {message}")]
    RpcError {
        /// Error message
        message: String,
    },

    /// Filesystem operation failed
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Snapshot file (de)serialization failed
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// YAML schema parsing failed
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    // Validator lifecycle errors
    /// Local validator process could not be spawned or inspected
    #[error("Process error: {message}")]
    ProcessError {
        /// Error message
        message: String,
    },

    /// Readiness marker never appeared on the validator's stdout
    #[error("Validator not ready after {0:?}")]
    ReadinessTimeout(std::time::Duration),
}

impl Error {
    /// Create an RPC error with a message
    pub fn rpc(msg: impl Into<String>) -> Self {
        Error::RpcError {
            message: msg.into(),
        }
    }

    /// Create a process error with a message
    pub fn process(msg: impl Into<String>) -> Self {
        Error::ProcessError {
            message: msg.into(),
        }
    }
}

/// Result type for solforge operations
pub type Result<T> = std::result::Result<T, Error>;
