//! Schema document for declarative instruction and environment definitions
//!
//! The schema is a human-authored YAML or JSON document; parsing is
//! delegated entirely to serde. Section maps are order-preserving because
//! declaration order is part of the resolution contract (later PDAs may
//! seed from earlier ones).

use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default remote endpoint cloned accounts are fetched from
pub const DEFAULT_CLUSTER_URL: &str = "https://api.mainnet-beta.solana.com";

/// Top-level schema document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Schema {
    /// Named accounts: name → `"address[,fileRef]"`
    pub accounts: IndexMap<String, String>,
    /// Program-derived address definitions, in declaration order
    pub pda: IndexMap<String, PdaDefinition>,
    /// Instruction templates, in declaration order
    pub instruction_definition: IndexMap<String, InstructionDefinition>,
    /// Local test-environment settings
    pub local_development: LocalDevelopment,
}

/// A derived-address definition
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PdaDefinition {
    /// Owner program: a `$variable` or a literal address
    pub program_id: String,
    /// Ordered seeds: literal byte-strings (≤32 bytes) or `$variable`
    /// references to address-bearing values. Order is derivation input.
    #[serde(default)]
    pub seeds: Vec<String>,
}

/// An instruction template
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstructionDefinition {
    /// Owner program: a `$variable` or a literal address
    pub program_id: String,
    /// Ordered data tokens, concatenated after encoding
    #[serde(default)]
    pub data: Vec<String>,
    /// Ordered account-meta tokens
    #[serde(default)]
    pub accounts: Vec<String>,
    /// Wallet name that pays for and signs the transaction
    #[serde(default)]
    pub payer: Option<String>,
}

/// Local test-environment settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LocalDevelopment {
    /// Test identities: name → base64 private key and starting balance
    pub test_wallets: IndexMap<String, TestWallet>,
    /// Addresses that must always be re-cloned, never served from cache
    pub skip_cache: Vec<String>,
    /// Directory snapshot files are cached in
    pub accounts_folder: String,
    /// Ledger directory for the local validator
    pub ledger_folder: String,
    /// Remote endpoint used as the clone source
    pub cluster_url: String,
}

impl Default for LocalDevelopment {
    fn default() -> Self {
        LocalDevelopment {
            test_wallets: IndexMap::new(),
            skip_cache: Vec::new(),
            accounts_folder: ".accounts".to_string(),
            ledger_folder: "test-ledger".to_string(),
            cluster_url: DEFAULT_CLUSTER_URL.to_string(),
        }
    }
}

/// A configured test identity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestWallet {
    /// Base64-encoded 64-byte keypair secret
    pub private_key: String,
    /// Starting balance in SOL
    #[serde(default)]
    pub sol_amount: u64,
}

impl Schema {
    /// Parses a schema from a YAML string
    pub fn from_yaml_str(s: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(s)?)
    }

    /// Parses a schema from a JSON string
    pub fn from_json_str(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }

    /// Loads a schema file, dispatching on extension
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => Self::from_yaml_str(&contents),
            Some("json") => Self::from_json_str(&contents),
            other => Err(Error::SchemaError(format!(
                "unsupported schema extension: {:?}",
                other
            ))),
        }
    }
}
