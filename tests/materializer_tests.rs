//! Tests for launch-plan assembly and script generation

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use solforge::validator::{render, LocalValidator, DEFAULT_TEMPLATE, READINESS_MARKER};
use solforge::{Environment, LaunchPlan, Materializer, Resolver, Schema, ValidatorConfig};

const TOKEN_PROGRAM: &str = "TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA";
const SYSTEM_PROGRAM: &str = "11111111111111111111111111111111";

fn schema_with_artifacts() -> Schema {
    Schema::from_yaml_str(&format!(
        r#"
accounts:
  myProgram: "{}, target/deploy/my_program.so"
  fixture: "{}, fixtures/fixture.json"
localDevelopment:
  clusterUrl: "http://localhost:8899"
"#,
        TOKEN_PROGRAM, SYSTEM_PROGRAM
    ))
    .unwrap()
}

// ====================
// Launch plan assembly
// ====================

#[test]
fn test_plan_splits_artifacts_by_extension() {
    let schema = schema_with_artifacts();
    let mut env = Environment::new();
    Resolver::new(&schema).resolve_accounts(&mut env).unwrap();

    let materializer = Materializer::new(&schema);
    let plan = materializer.plan(&env, HashMap::new(), 42);

    assert_eq!(plan.programs.len(), 1);
    assert_eq!(plan.programs[0].0, TOKEN_PROGRAM);
    assert_eq!(plan.json_accounts.len(), 1);
    assert_eq!(plan.json_accounts[0].0, SYSTEM_PROGRAM);
    assert_eq!(plan.warp_slot, 42);
    assert_eq!(plan.cluster_url, "http://localhost:8899");
}

#[test]
fn test_artifact_accounts_are_not_snapshotted() {
    let schema = schema_with_artifacts();
    let mut env = Environment::new();
    Resolver::new(&schema).resolve_accounts(&mut env).unwrap();

    // Both accounts carry artifacts, so nothing needs a remote snapshot
    let materializer = Materializer::new(&schema);
    assert!(materializer.snapshot_addresses(&env).is_empty());
}

#[test]
fn test_plain_accounts_are_snapshotted() {
    let schema = Schema::from_yaml_str(&format!("accounts:\n  plain: \"{}\"\n", TOKEN_PROGRAM))
        .unwrap();
    let mut env = Environment::new();
    Resolver::new(&schema).resolve_accounts(&mut env).unwrap();

    let materializer = Materializer::new(&schema);
    assert_eq!(
        materializer.snapshot_addresses(&env),
        vec![TOKEN_PROGRAM.to_string()]
    );
}

#[test]
fn test_rendered_script_directives() {
    let schema = schema_with_artifacts();
    let mut env = Environment::new();
    Resolver::new(&schema).resolve_accounts(&mut env).unwrap();

    let mut snapshot_paths = HashMap::new();
    snapshot_paths.insert(
        "CachedAddr".to_string(),
        Some(PathBuf::from(".accounts/CachedAddr.json")),
    );
    snapshot_paths.insert("LiveAddr".to_string(), None);

    let materializer = Materializer::new(&schema);
    let plan = materializer.plan(&env, snapshot_paths, 99);
    let script = render(DEFAULT_TEMPLATE, &plan);

    assert!(script.contains("--account CachedAddr .accounts/CachedAddr.json"));
    assert!(script.contains("--clone LiveAddr"));
    assert!(script.contains(&format!(
        "--bpf-program {} target/deploy/my_program.so",
        TOKEN_PROGRAM
    )));
    assert!(script.contains(&format!("--account {} fixtures/fixture.json", SYSTEM_PROGRAM)));
    assert!(script.contains("--warp-slot 99"));
    assert!(script.contains("--url http://localhost:8899"));
}

// ====================
// Script lifecycle
// ====================

#[test]
fn test_write_script_clears_stale_ledger() {
    let dir = tempfile::tempdir().unwrap();
    let ledger = dir.path().join("test-ledger");
    std::fs::create_dir_all(ledger.join("rocksdb")).unwrap();

    let config = ValidatorConfig {
        ledger_dir: ledger.clone(),
        script_path: dir.path().join("start-validator.sh"),
        readiness_timeout: Duration::from_secs(1),
    };
    let validator = LocalValidator::new(config);
    validator.write_script("#!/usr/bin/env bash\ntrue\n").unwrap();

    assert!(!ledger.exists());
    let written = std::fs::read_to_string(dir.path().join("start-validator.sh")).unwrap();
    assert!(written.starts_with("#!"));
}

#[tokio::test]
async fn test_start_resolves_on_readiness_marker() {
    let dir = tempfile::tempdir().unwrap();
    let config = ValidatorConfig {
        ledger_dir: dir.path().join("ledger"),
        script_path: dir.path().join("fake-validator.sh"),
        readiness_timeout: Duration::from_secs(10),
    };
    let mut validator = LocalValidator::new(config);
    // A fake validator that prints the marker and lingers briefly
    validator
        .write_script(&format!(
            "#!/usr/bin/env bash\necho \"booting\"\necho \"{} http://127.0.0.1:8899\"\nsleep 5\n",
            READINESS_MARKER
        ))
        .unwrap();

    validator.start().await.unwrap();
    validator.stop().await;
}

#[tokio::test]
async fn test_start_times_out_without_marker() {
    let dir = tempfile::tempdir().unwrap();
    let config = ValidatorConfig {
        ledger_dir: dir.path().join("ledger"),
        script_path: dir.path().join("silent.sh"),
        readiness_timeout: Duration::from_millis(300),
    };
    let mut validator = LocalValidator::new(config);
    validator
        .write_script("#!/usr/bin/env bash\nsleep 30\n")
        .unwrap();

    let err = validator.start().await.unwrap_err();
    assert!(err.to_string().contains("not ready"));
}

#[test]
fn test_default_ledger_dir_comes_from_schema() {
    let schema = Schema::from_yaml_str("localDevelopment:\n  ledgerFolder: \"my-ledger\"\n").unwrap();
    // Materializer picks the schema's ledger folder up; rendering still
    // works with an empty plan
    let _materializer = Materializer::new(&schema);
    let plan = LaunchPlan {
        warp_slot: 1,
        cluster_url: schema.local_development.cluster_url.clone(),
        ..Default::default()
    };
    let script = render(DEFAULT_TEMPLATE, &plan);
    assert!(script.contains("--warp-slot 1"));
}
