//! Local test-validator materialization and lifecycle
//!
//! Generates a launch script from cached/cloned accounts and registered
//! program artifacts, spawns it, and watches its stdout for the readiness
//! marker. The wait is timeout-bound; teardown is best-effort and never
//! raises.

mod template;

pub use template::{
    render, LaunchPlan, ACCOUNTS_MARKER, CLUSTER_MARKER, DEFAULT_TEMPLATE, JSON_ACCOUNTS_MARKER,
    PROGRAMS_MARKER, WARP_SLOT_MARKER,
};

use std::collections::HashMap;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, Command};
use tracing::{debug, info, warn};

use crate::cache::{AccountFetcher, SnapshotCache};
use crate::error::{Error, Result};
use crate::runtime::{Environment, Value};
use crate::schema::Schema;

/// Substring on the validator's stdout that signals readiness
pub const READINESS_MARKER: &str = "JSON RPC URL:";

/// Process name used for the post-spawn pid lookup
pub const PROCESS_NAME: &str = "solana-test-validator";

/// Default bound on the readiness wait
pub const DEFAULT_READINESS_TIMEOUT: Duration = Duration::from_secs(90);

/// Filesystem and timing settings for one validator run
#[derive(Debug, Clone)]
pub struct ValidatorConfig {
    /// Ledger directory, deleted before every launch
    pub ledger_dir: PathBuf,
    /// Where the generated launch script is written
    pub script_path: PathBuf,
    /// Bound on the readiness wait
    pub readiness_timeout: Duration,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        ValidatorConfig {
            ledger_dir: PathBuf::from("test-ledger"),
            script_path: PathBuf::from("start-validator.sh"),
            readiness_timeout: DEFAULT_READINESS_TIMEOUT,
        }
    }
}

/// Handle to a running local validator process
pub struct LocalValidator {
    config: ValidatorConfig,
    child: Option<Child>,
    pid: Option<u32>,
}

impl LocalValidator {
    /// Creates an unstarted validator handle
    pub fn new(config: ValidatorConfig) -> Self {
        LocalValidator {
            config,
            child: None,
            pid: None,
        }
    }

    /// Writes the launch script (executable) after clearing any stale
    /// ledger directory
    pub fn write_script(&self, contents: &str) -> Result<()> {
        match std::fs::remove_dir_all(&self.config.ledger_dir) {
            Ok(()) => debug!(dir = %self.config.ledger_dir.display(), "removed stale ledger"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }

        std::fs::write(&self.config.script_path, contents)?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(
                &self.config.script_path,
                std::fs::Permissions::from_mode(0o755),
            )?;
        }
        Ok(())
    }

    /// Spawns the launch script and blocks until the readiness marker
    /// appears on its stdout.
    ///
    /// Stderr is streamed to the log in the background. If the marker
    /// never appears within the configured timeout this fails with
    /// [`Error::ReadinessTimeout`] instead of hanging forever.
    pub async fn start(&mut self) -> Result<()> {
        let mut child = Command::new("bash")
            .arg(&self.config.script_path)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| Error::process(format!("failed to spawn launch script: {}", e)))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| Error::process("validator stdout not captured"))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| Error::process("validator stderr not captured"))?;

        tokio::spawn(async move {
            let mut lines = BufReader::new(stderr).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                warn!(target: "validator", "{}", line);
            }
        });

        let wait = async {
            let mut lines = BufReader::new(stdout).lines();
            while let Some(line) = lines.next_line().await.map_err(Error::IoError)? {
                debug!(target: "validator", "{}", line);
                if line.contains(READINESS_MARKER) {
                    return Ok(());
                }
            }
            Err(Error::process("validator exited before becoming ready"))
        };
        tokio::time::timeout(self.config.readiness_timeout, wait)
            .await
            .map_err(|_| Error::ReadinessTimeout(self.config.readiness_timeout))??;

        self.child = Some(child);
        self.pid = lookup_pid(PROCESS_NAME).await;
        info!(pid = ?self.pid, "local validator running");
        Ok(())
    }

    /// Pid of the validator process, if it could be resolved
    pub fn pid(&self) -> Option<u32> {
        self.pid
    }

    /// Sends a kill signal to the recorded pid. Failures are logged, not
    /// raised, since this runs during best-effort cleanup.
    pub async fn stop(&mut self) {
        if let Some(pid) = self.pid.take() {
            let status = Command::new("kill")
                .arg("-9")
                .arg(pid.to_string())
                .status()
                .await;
            match status {
                Ok(s) if s.success() => info!(pid, "stopped local validator"),
                Ok(s) => warn!(pid, code = ?s.code(), "kill returned non-zero"),
                Err(e) => warn!(pid, error = %e, "failed to kill validator"),
            }
        }
        if let Some(mut child) = self.child.take() {
            if let Err(e) = child.start_kill() {
                warn!(error = %e, "failed to kill launch script");
            }
        }
    }
}

/// Resolves the validator's pid by process-name lookup
async fn lookup_pid(name: &str) -> Option<u32> {
    let output = Command::new("pgrep").arg("-f").arg(name).output().await;
    match output {
        Ok(out) => String::from_utf8_lossy(&out.stdout)
            .lines()
            .next()
            .and_then(|l| l.trim().parse().ok()),
        Err(e) => {
            warn!(error = %e, "pid lookup failed");
            None
        }
    }
}

/// Builds launch plans and running validators from a resolved environment
pub struct Materializer<'a> {
    schema: &'a Schema,
    template: String,
    config: ValidatorConfig,
}

impl<'a> Materializer<'a> {
    /// Creates a materializer with the default template and config
    pub fn new(schema: &'a Schema) -> Self {
        Materializer {
            schema,
            template: DEFAULT_TEMPLATE.to_string(),
            config: ValidatorConfig {
                ledger_dir: PathBuf::from(&schema.local_development.ledger_folder),
                ..ValidatorConfig::default()
            },
        }
    }

    /// Substitutes a custom launch-script template
    pub fn with_template(mut self, template: impl Into<String>) -> Self {
        self.template = template.into();
        self
    }

    /// Overrides filesystem/timing settings
    pub fn with_config(mut self, config: ValidatorConfig) -> Self {
        self.config = config;
        self
    }

    /// Named-account addresses that need snapshotting: every schema account
    /// without a registered file artifact
    pub fn snapshot_addresses(&self, env: &Environment) -> Vec<String> {
        self.schema
            .accounts
            .values()
            .filter_map(|descriptor| descriptor.split(',').next())
            .map(|literal| literal.trim().to_string())
            .filter(|addr| !matches!(env.get(addr), Ok(Value::FileRef(_))))
            .collect()
    }

    /// Assembles the launch plan from snapshot paths and the environment's
    /// file associations
    pub fn plan(
        &self,
        env: &Environment,
        snapshot_paths: HashMap<String, Option<PathBuf>>,
        warp_slot: u64,
    ) -> LaunchPlan {
        let mut programs = Vec::new();
        let mut json_accounts = Vec::new();
        for (address, value) in env.iter() {
            if let Value::FileRef(path) = value {
                match path.extension().and_then(|e| e.to_str()) {
                    Some("so") => programs.push((address.clone(), path.clone())),
                    Some("json") => json_accounts.push((address.clone(), path.clone())),
                    _ => {}
                }
            }
        }
        // Stable directive order regardless of environment iteration order
        programs.sort();
        json_accounts.sort();

        LaunchPlan {
            accounts: snapshot_paths,
            programs,
            json_accounts,
            warp_slot,
            cluster_url: self.schema.local_development.cluster_url.clone(),
        }
    }

    /// Snapshots every account the schema names, generates the launch
    /// script, and starts the validator, returning the running handle.
    pub async fn materialize<F: AccountFetcher>(
        &self,
        env: &Environment,
        cache: &SnapshotCache<F>,
    ) -> Result<LocalValidator> {
        let addresses = self.snapshot_addresses(env);
        let paths = cache.snapshot_all(&addresses).await?;
        let warp_slot = cache.current_slot().await;

        let plan = self.plan(env, paths, warp_slot);
        let script = render(&self.template, &plan);

        let mut validator = LocalValidator::new(self.config.clone());
        validator.write_script(&script)?;
        validator.start().await?;
        Ok(validator)
    }
}
