//! Named-variable environment threaded through the resolution phases

use std::collections::HashMap;

use solana_sdk::pubkey::Pubkey;

use crate::error::{Error, Result};
use crate::runtime::Value;

/// Mutable name→value mapping shared by all resolution phases.
///
/// The `$` sigil is a reference convention at the boundary only: it is
/// stripped on both store and lookup, so internal keys never carry it.
/// Entries are write-once by convention but not enforced; later phases may
/// overwrite earlier entries under the same name (last write wins), which is
/// why resolution order is part of the contract.
#[derive(Debug, Clone, Default)]
pub struct Environment {
    vars: HashMap<String, Value>,
}

/// Strips a single leading `$`, if present
fn strip_sigil(name: &str) -> &str {
    name.strip_prefix('$').unwrap_or(name)
}

impl Environment {
    /// Creates an empty environment
    pub fn new() -> Self {
        Environment {
            vars: HashMap::new(),
        }
    }

    /// Stores a value under a name, overwriting any previous entry
    pub fn set(&mut self, name: &str, value: Value) {
        self.vars.insert(strip_sigil(name).to_string(), value);
    }

    /// Looks up a name, with or without its `$` sigil
    pub fn get(&self, name: &str) -> Result<&Value> {
        let key = strip_sigil(name);
        self.vars.get(key).ok_or_else(|| Error::UndefinedVariable {
            name: key.to_string(),
        })
    }

    /// Looks up a name and returns the address it carries. Keypairs yield
    /// their public key.
    pub fn get_pubkey(&self, name: &str) -> Result<Pubkey> {
        let value = self.get(name)?;
        value.as_pubkey().ok_or_else(|| Error::TypeError {
            name: strip_sigil(name).to_string(),
            expected: "pubkey".to_string(),
            got: value.type_name(),
        })
    }

    /// True if the name is present
    pub fn contains(&self, name: &str) -> bool {
        self.vars.contains_key(strip_sigil(name))
    }

    /// Iterates over all entries (arbitrary order)
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.vars.iter()
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.vars.len()
    }

    /// True if no entries exist
    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}
