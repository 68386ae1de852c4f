//! Tests for the four-phase dependency resolver

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use solana_sdk::hash::Hash;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Keypair;
use solana_sdk::signer::Signer;
use solforge::{build_transaction, Environment, Error, ParamMap, Resolver, Schema, Value};

const TOKEN_PROGRAM: &str = "TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA";
const SYSTEM_PROGRAM: &str = "11111111111111111111111111111111";

fn wallet_b64() -> String {
    BASE64.encode(Keypair::new().to_bytes())
}

fn resolve_yaml(yaml: &str) -> solforge::Result<Environment> {
    let schema = Schema::from_yaml_str(yaml).unwrap();
    let mut env = Environment::new();
    Resolver::new(&schema).resolve_all(&mut env)?;
    Ok(env)
}

// ====================
// Phase 1: named accounts
// ====================

#[test]
fn test_account_address_stored_under_name() {
    let env = resolve_yaml(&format!("accounts:\n  tokenProgram: \"{}\"\n", TOKEN_PROGRAM)).unwrap();
    assert_eq!(env.get_pubkey("tokenProgram").unwrap().to_string(), TOKEN_PROGRAM);
}

#[test]
fn test_account_file_ref_registered_under_address() {
    let yaml = format!(
        "accounts:\n  myProgram: \"{}, target/deploy/my_program.so\"\n",
        TOKEN_PROGRAM
    );
    let env = resolve_yaml(&yaml).unwrap();
    match env.get(TOKEN_PROGRAM).unwrap() {
        Value::FileRef(path) => assert!(path.ends_with("my_program.so")),
        other => panic!("expected file ref, got {:?}", other),
    }
}

#[test]
fn test_malformed_account_literal_fails() {
    let err = resolve_yaml("accounts:\n  bad: \"not-an-address\"\n").unwrap_err();
    assert!(matches!(err, Error::InvalidAddress { name, .. } if name == "bad"));
}

// ====================
// Phase 2: test identities
// ====================

#[test]
fn test_wallet_decodes_to_keypair() {
    let kp = Keypair::new();
    let yaml = format!(
        "localDevelopment:\n  testWallets:\n    payer:\n      privateKey: \"{}\"\n      solAmount: 10\n",
        BASE64.encode(kp.to_bytes())
    );
    let env = resolve_yaml(&yaml).unwrap();
    assert_eq!(env.get_pubkey("payer").unwrap(), kp.pubkey());
}

#[test]
fn test_bad_private_key_fails() {
    let yaml = "localDevelopment:\n  testWallets:\n    payer:\n      privateKey: \"!!!\"\n";
    assert!(matches!(
        resolve_yaml(yaml),
        Err(Error::InvalidKeypair { name, .. }) if name == "payer"
    ));
}

// ====================
// Phase 3: derived addresses
// ====================

#[test]
fn test_pda_matches_canonical_derivation() {
    let yaml = format!(
        "accounts:\n  prog: \"{}\"\npda:\n  vault:\n    programId: \"$prog\"\n    seeds: [\"vault\"]\n",
        TOKEN_PROGRAM
    );
    let env = resolve_yaml(&yaml).unwrap();
    let program: Pubkey = TOKEN_PROGRAM.parse().unwrap();
    let (expected, _) = Pubkey::find_program_address(&[b"vault"], &program);
    assert_eq!(env.get_pubkey("vault").unwrap(), expected);
}

#[test]
fn test_seed_order_matters() {
    let yaml_ab = format!(
        "pda:\n  p:\n    programId: \"{}\"\n    seeds: [\"aaa\", \"bbb\"]\n",
        SYSTEM_PROGRAM
    );
    let yaml_ba = format!(
        "pda:\n  p:\n    programId: \"{}\"\n    seeds: [\"bbb\", \"aaa\"]\n",
        SYSTEM_PROGRAM
    );
    let a = resolve_yaml(&yaml_ab).unwrap().get_pubkey("p").unwrap();
    let b = resolve_yaml(&yaml_ba).unwrap().get_pubkey("p").unwrap();
    assert_ne!(a, b);
}

#[test]
fn test_seed_of_exactly_32_bytes_succeeds() {
    let seed = "a".repeat(32);
    let yaml = format!(
        "pda:\n  p:\n    programId: \"{}\"\n    seeds: [\"{}\"]\n",
        SYSTEM_PROGRAM, seed
    );
    assert!(resolve_yaml(&yaml).is_ok());
}

#[test]
fn test_seed_of_33_bytes_fails() {
    let seed = "a".repeat(33);
    let yaml = format!(
        "pda:\n  p:\n    programId: \"{}\"\n    seeds: [\"{}\"]\n",
        SYSTEM_PROGRAM, seed
    );
    assert!(matches!(
        resolve_yaml(&yaml),
        Err(Error::SeedTooLong { len: 33, .. })
    ));
}

#[test]
fn test_variable_seed_must_bear_an_address() {
    // A wallet (keypair) seed is address-bearing: its public key is used
    let yaml = format!(
        "localDevelopment:\n  testWallets:\n    payer:\n      privateKey: \"{}\"\npda:\n  p:\n    programId: \"{}\"\n    seeds: [\"$payer\"]\n",
        wallet_b64(),
        SYSTEM_PROGRAM
    );
    assert!(resolve_yaml(&yaml).is_ok());
}

#[test]
fn test_pda_can_seed_from_earlier_pda() {
    let yaml = format!(
        "pda:\n  inner:\n    programId: \"{}\"\n    seeds: [\"inner\"]\n  outer:\n    programId: \"{}\"\n    seeds: [\"$inner\"]\n",
        SYSTEM_PROGRAM, SYSTEM_PROGRAM
    );
    let env = resolve_yaml(&yaml).unwrap();
    let program: Pubkey = SYSTEM_PROGRAM.parse().unwrap();
    let (inner, _) = Pubkey::find_program_address(&[b"inner"], &program);
    let (outer, _) = Pubkey::find_program_address(&[inner.as_ref()], &program);
    assert_eq!(env.get_pubkey("outer").unwrap(), outer);
}

// ====================
// Phase 4: instructions
// ====================

fn full_schema() -> String {
    format!(
        r#"
accounts:
  prog: "{}"
localDevelopment:
  testWallets:
    payer:
      privateKey: "{}"
pda:
  vault:
    programId: "$prog"
    seeds: ["vault"]
instructionDefinition:
  init:
    programId: "$prog"
    data: ["sighash(initialize)", "u32(7)"]
    accounts: ["$vault, mut", "$payer, signer, mut"]
    payer: "payer"
"#,
        TOKEN_PROGRAM,
        wallet_b64()
    )
}

#[test]
fn test_instruction_data_concatenates_in_order() {
    let env = resolve_yaml(&full_schema()).unwrap();
    match env.get("init").unwrap() {
        Value::Instruction(ix) => {
            assert_eq!(&ix.data[..8], &[175, 175, 109, 31, 13, 152, 155, 237]);
            assert_eq!(&ix.data[8..], &[7, 0, 0, 0]);
        }
        other => panic!("expected instruction, got {:?}", other),
    }
}

#[test]
fn test_instruction_account_flags() {
    let env = resolve_yaml(&full_schema()).unwrap();
    match env.get("init").unwrap() {
        Value::Instruction(ix) => {
            assert_eq!(ix.accounts.len(), 2);
            assert!(!ix.accounts[0].is_signer);
            assert!(ix.accounts[0].is_writable);
            assert!(ix.accounts[1].is_signer);
            assert!(ix.accounts[1].is_writable);
            assert_eq!(ix.accounts[0].pubkey, env.get_pubkey("vault").unwrap());
        }
        other => panic!("expected instruction, got {:?}", other),
    }
}

#[test]
fn test_explicit_params_win_over_environment() {
    let schema = Schema::from_yaml_str(&full_schema()).unwrap();
    let resolver = Resolver::new(&schema);
    let mut env = Environment::new();
    resolver.resolve_accounts(&mut env).unwrap();
    resolver.resolve_wallets(&mut env).unwrap();
    resolver.resolve_pdas(&mut env, None).unwrap();

    let override_addr = Pubkey::new_unique();
    let mut params = ParamMap::new();
    params.insert("vault".to_string(), override_addr.to_string());
    resolver
        .resolve_instructions(&mut env, None, &params)
        .unwrap();

    match env.get("init").unwrap() {
        Value::Instruction(ix) => assert_eq!(ix.accounts[0].pubkey, override_addr),
        other => panic!("expected instruction, got {:?}", other),
    }
}

#[test]
fn test_literal_account_token() {
    let yaml = format!(
        "instructionDefinition:\n  t:\n    programId: \"{}\"\n    accounts: [\"{}, mut\"]\n",
        TOKEN_PROGRAM, SYSTEM_PROGRAM
    );
    let env = resolve_yaml(&yaml).unwrap();
    match env.get("t").unwrap() {
        Value::Instruction(ix) => {
            assert_eq!(ix.accounts[0].pubkey.to_string(), SYSTEM_PROGRAM)
        }
        other => panic!("expected instruction, got {:?}", other),
    }
}

// ====================
// Phase ordering and restriction sets
// ====================

#[test]
fn test_pda_cannot_reference_instruction_phase_name() {
    // Phases never resolve out of order: an instruction-phase name is
    // undefined while PDAs resolve
    let yaml = format!(
        "pda:\n  p:\n    programId: \"$init\"\n    seeds: [\"x\"]\ninstructionDefinition:\n  init:\n    programId: \"{}\"\n",
        TOKEN_PROGRAM
    );
    assert!(matches!(
        resolve_yaml(&yaml),
        Err(Error::UndefinedVariable { name }) if name == "init"
    ));
}

#[test]
fn test_restriction_set_skips_entries_entirely() {
    let schema = Schema::from_yaml_str(&full_schema()).unwrap();
    let resolver = Resolver::new(&schema);
    let mut env = Environment::new();
    resolver.resolve_accounts(&mut env).unwrap();
    resolver.resolve_wallets(&mut env).unwrap();
    // Restrict PDA resolution to a subset that excludes `vault`
    resolver.resolve_pdas(&mut env, Some(&[])).unwrap();
    assert!(!env.contains("vault"));

    // The in-scope instruction depending on it now fails, loudly
    let err = resolver
        .resolve_instructions(&mut env, None, &ParamMap::new())
        .unwrap_err();
    assert!(matches!(err, Error::UndefinedVariable { name } if name == "vault"));
}

#[test]
fn test_later_phase_overwrites_same_name() {
    // Last write wins: a PDA reusing an account's name replaces it
    let yaml = format!(
        "accounts:\n  spot: \"{}\"\npda:\n  spot:\n    programId: \"{}\"\n    seeds: [\"s\"]\n",
        TOKEN_PROGRAM, SYSTEM_PROGRAM
    );
    let env = resolve_yaml(&yaml).unwrap();
    let program: Pubkey = SYSTEM_PROGRAM.parse().unwrap();
    let (pda, _) = Pubkey::find_program_address(&[b"s"], &program);
    assert_eq!(env.get_pubkey("spot").unwrap(), pda);
}

// ====================
// Transaction assembly
// ====================

#[test]
fn test_build_transaction_signs_with_payer() {
    let env = resolve_yaml(&full_schema()).unwrap();
    let tx = build_transaction(&env, &["init"], "payer", Hash::default()).unwrap();
    assert_eq!(tx.signatures.len(), 1);
    assert_eq!(
        tx.message.account_keys[0],
        env.get_pubkey("payer").unwrap()
    );
}

#[test]
fn test_build_transaction_rejects_non_instruction() {
    let env = resolve_yaml(&full_schema()).unwrap();
    assert!(matches!(
        build_transaction(&env, &["vault"], "payer", Hash::default()),
        Err(Error::TypeError { .. })
    ));
}
