//! Dependency-ordered schema resolution
//!
//! Resolution runs in four fixed phases, each completing before the next
//! starts: named accounts, test identities, derived addresses,
//! instructions. The phases are sequential method calls driven by
//! [`Resolver::resolve_all`], so they cannot be reordered by construction.
//! Later phases read values written by earlier ones through the shared
//! [`Environment`].

use std::collections::HashMap;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use solana_sdk::hash::Hash;
use solana_sdk::instruction::{AccountMeta, Instruction};
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Keypair;
use solana_sdk::signer::Signer;
use solana_sdk::transaction::Transaction;
use tracing::debug;

use crate::codec::{self, AccountToken, BytesMode};
use crate::error::{Error, Result};
use crate::runtime::{Environment, Value};
use crate::schema::Schema;

/// File extensions recognized as local artifacts for named accounts
const ARTIFACT_EXTENSIONS: [&str; 2] = ["so", "json"];

/// Explicit per-instruction account overrides: name → address literal
pub type ParamMap = HashMap<String, String>;

/// Drives the four resolution phases over a schema
pub struct Resolver<'a> {
    schema: &'a Schema,
    bytes_mode: BytesMode,
}

impl<'a> Resolver<'a> {
    /// Creates a resolver with strict `bytes(..)` validation
    pub fn new(schema: &'a Schema) -> Self {
        Resolver {
            schema,
            bytes_mode: BytesMode::Strict,
        }
    }

    /// Overrides the `bytes(..)` validation mode
    pub fn with_bytes_mode(mut self, mode: BytesMode) -> Self {
        self.bytes_mode = mode;
        self
    }

    /// Runs all four phases in order, unrestricted
    pub fn resolve_all(&self, env: &mut Environment) -> Result<()> {
        self.resolve_accounts(env)?;
        self.resolve_wallets(env)?;
        self.resolve_pdas(env, None)?;
        self.resolve_instructions(env, None, &ParamMap::new())
    }

    /// Phase 1: named accounts.
    ///
    /// Each descriptor is `"address[,fileRef]"`. The address is stored
    /// under the declared name; a file ref with a recognized artifact
    /// extension is additionally registered under the address string.
    pub fn resolve_accounts(&self, env: &mut Environment) -> Result<()> {
        for (name, descriptor) in &self.schema.accounts {
            let mut parts = descriptor.split(',').map(str::trim);
            let literal = parts.next().unwrap_or("");
            let address = parse_address(name, literal)?;
            env.set(name, Value::Pubkey(address));
            debug!(account = %name, %address, "resolved named account");

            if let Some(file_ref) = parts.next() {
                let is_artifact = file_ref
                    .rsplit('.')
                    .next()
                    .is_some_and(|ext| ARTIFACT_EXTENSIONS.contains(&ext));
                if is_artifact {
                    env.set(
                        &address.to_string(),
                        Value::FileRef(PathBuf::from(file_ref)),
                    );
                    debug!(account = %name, file = %file_ref, "registered file association");
                }
            }
        }
        Ok(())
    }

    /// Phase 2: test identities.
    ///
    /// Each configured base64 private key is decoded into a full keypair
    /// and stored under its declared name.
    pub fn resolve_wallets(&self, env: &mut Environment) -> Result<()> {
        for (name, wallet) in &self.schema.local_development.test_wallets {
            let secret = BASE64
                .decode(wallet.private_key.trim())
                .map_err(|e| Error::InvalidKeypair {
                    name: name.clone(),
                    reason: e.to_string(),
                })?;
            let keypair = Keypair::from_bytes(&secret).map_err(|e| Error::InvalidKeypair {
                name: name.clone(),
                reason: e.to_string(),
            })?;
            debug!(wallet = %name, pubkey = %keypair.pubkey(), "resolved test wallet");
            env.set(name, Value::Keypair(Arc::new(keypair)));
        }
        Ok(())
    }

    /// Phase 3: derived addresses.
    ///
    /// Definitions resolve in declaration order, so a PDA may seed from
    /// one declared earlier. `only` is a pure name filter: skipped entries
    /// produce no side effects, and anything that depended on them will
    /// later fail with an undefined-variable error. That is the documented
    /// behavior, not a bug.
    pub fn resolve_pdas(&self, env: &mut Environment, only: Option<&[String]>) -> Result<()> {
        for (name, def) in &self.schema.pda {
            if let Some(filter) = only {
                if !filter.contains(name) {
                    continue;
                }
            }
            let program_id = resolve_address_source(name, &def.program_id, env)?;

            // Seeds keep declaration order; it is part of the derivation
            // input.
            let mut seed_bytes: Vec<Vec<u8>> = Vec::with_capacity(def.seeds.len());
            for seed in &def.seeds {
                if seed.starts_with('$') {
                    let value = env.get(seed)?;
                    let pk = value.as_pubkey().ok_or_else(|| Error::InvalidSeed {
                        name: name.clone(),
                        seed: seed.clone(),
                        reason: format!("expected an address-bearing value, got {}", value.type_name()),
                    })?;
                    seed_bytes.push(pk.to_bytes().to_vec());
                } else {
                    let raw = seed.as_bytes();
                    if raw.len() > 32 {
                        return Err(Error::SeedTooLong {
                            name: name.clone(),
                            seed: seed.clone(),
                            len: raw.len(),
                        });
                    }
                    seed_bytes.push(raw.to_vec());
                }
            }

            let seed_slices: Vec<&[u8]> = seed_bytes.iter().map(|s| s.as_slice()).collect();
            let (pda, bump) = Pubkey::find_program_address(&seed_slices, &program_id);
            debug!(pda = %name, address = %pda, bump, "derived address");
            env.set(name, Value::Pubkey(pda));
        }
        Ok(())
    }

    /// Phase 4: instructions.
    ///
    /// Data tokens resolve through the codec and concatenate in declared
    /// order; each account token resolves through the fallback chain
    /// explicit param map → environment (named accounts, PDAs, wallets) →
    /// literal address.
    pub fn resolve_instructions(
        &self,
        env: &mut Environment,
        only: Option<&[String]>,
        params: &ParamMap,
    ) -> Result<()> {
        for (name, def) in &self.schema.instruction_definition {
            if let Some(filter) = only {
                if !filter.contains(name) {
                    continue;
                }
            }
            let program_id = resolve_address_source(name, &def.program_id, env)?;

            let mut data = Vec::new();
            for token in &def.data {
                data.extend(codec::resolve(token, env, self.bytes_mode)?);
            }

            let mut accounts = Vec::with_capacity(def.accounts.len());
            for token in &def.accounts {
                let parsed = AccountToken::parse(token);
                let address = resolve_account_source(name, token, &parsed.source, env, params)?;
                accounts.push(AccountMeta {
                    pubkey: address,
                    is_signer: parsed.is_signer,
                    is_writable: parsed.is_writable,
                });
            }

            debug!(
                instruction = %name,
                program = %program_id,
                data_len = data.len(),
                accounts = accounts.len(),
                "resolved instruction"
            );
            env.set(
                name,
                Value::Instruction(Instruction {
                    program_id,
                    accounts,
                    data,
                }),
            );
        }
        Ok(())
    }
}

/// Resolves a program-id source: `$variable` → environment lookup, anything
/// else → address literal.
fn resolve_address_source(owner: &str, source: &str, env: &Environment) -> Result<Pubkey> {
    if source.starts_with('$') {
        env.get_pubkey(source)
    } else {
        parse_address(owner, source)
    }
}

/// Resolves an account token's address source through the fallback chain.
fn resolve_account_source(
    instruction: &str,
    token: &str,
    source: &str,
    env: &Environment,
    params: &ParamMap,
) -> Result<Pubkey> {
    let name = source.strip_prefix('$').unwrap_or(source);

    // Explicit parameters win over everything
    if let Some(literal) = params.get(name) {
        return parse_address(name, literal);
    }

    // Named accounts, PDAs and wallets all live in the environment; earlier
    // phases have already populated it by the time instructions resolve.
    if let Ok(value) = env.get(name) {
        if let Some(pk) = value.as_pubkey() {
            return Ok(pk);
        }
    }

    // A variable that reached this point has no address anywhere
    if source.starts_with('$') {
        return Err(Error::UndefinedVariable {
            name: name.to_string(),
        });
    }

    // Bare literal address
    Pubkey::from_str(source).map_err(|_| Error::UnresolvedAccount {
        name: instruction.to_string(),
        token: token.to_string(),
    })
}

fn parse_address(name: &str, literal: &str) -> Result<Pubkey> {
    Pubkey::from_str(literal).map_err(|e| Error::InvalidAddress {
        name: name.to_string(),
        value: literal.to_string(),
        reason: e.to_string(),
    })
}

/// Builds a signed transaction from previously resolved instruction names.
///
/// The payer wallet must have been resolved in phase 2; it both pays the
/// fee and signs.
pub fn build_transaction(
    env: &Environment,
    instruction_names: &[&str],
    payer_wallet: &str,
    recent_blockhash: Hash,
) -> Result<Transaction> {
    let mut instructions = Vec::with_capacity(instruction_names.len());
    for name in instruction_names {
        match env.get(name)? {
            Value::Instruction(ix) => instructions.push(ix.clone()),
            other => {
                return Err(Error::TypeError {
                    name: (*name).to_string(),
                    expected: "instruction".to_string(),
                    got: other.type_name(),
                })
            }
        }
    }

    let payer = match env.get(payer_wallet)? {
        Value::Keypair(kp) => Arc::clone(kp),
        other => {
            return Err(Error::TypeError {
                name: payer_wallet.to_string(),
                expected: "keypair".to_string(),
                got: other.type_name(),
            })
        }
    };

    Ok(Transaction::new_signed_with_payer(
        &instructions,
        Some(&payer.pubkey()),
        &[payer.as_ref()],
        recent_blockhash,
    ))
}
