//! Launch-script template substitution

use std::collections::HashMap;
use std::path::PathBuf;

/// Placeholder for cloned/cached account directives
pub const ACCOUNTS_MARKER: &str = "==ACCOUNTS==";
/// Placeholder for program-binary directives
pub const PROGRAMS_MARKER: &str = "==PROGRAMS==";
/// Placeholder for raw JSON account directives
pub const JSON_ACCOUNTS_MARKER: &str = "==JSON_ACCOUNTS==";
/// Placeholder for the time-warp slot
pub const WARP_SLOT_MARKER: &str = "==WARP_SLOT==";
/// Placeholder for the clone-source endpoint
pub const CLUSTER_MARKER: &str = "==CLUSTER==";

/// Default launch script; every marker is substituted by [`render`]
pub const DEFAULT_TEMPLATE: &str = "#!/usr/bin/env bash
set -e

solana-test-validator \\
  ==ACCOUNTS== \\
  ==PROGRAMS== \\
  ==JSON_ACCOUNTS== \\
  --warp-slot ==WARP_SLOT== \\
  --url ==CLUSTER== \\
  --reset
";

/// Inputs for one launch-script rendering
#[derive(Debug, Clone, Default)]
pub struct LaunchPlan {
    /// Address → snapshot path; `None` means clone from the live network
    pub accounts: HashMap<String, Option<PathBuf>>,
    /// Program binaries: (address, `.so` path)
    pub programs: Vec<(String, PathBuf)>,
    /// Raw JSON accounts: (address, `.json` path)
    pub json_accounts: Vec<(String, PathBuf)>,
    /// Live network slot to warp the local clock to
    pub warp_slot: u64,
    /// Clone-source endpoint
    pub cluster_url: String,
}

/// Substitutes all markers in a template.
///
/// Account directives are emitted in sorted address order so the generated
/// script is reproducible run to run.
pub fn render(template: &str, plan: &LaunchPlan) -> String {
    let mut addresses: Vec<&String> = plan.accounts.keys().collect();
    addresses.sort();

    let account_args = addresses
        .iter()
        .map(|addr| match &plan.accounts[*addr] {
            Some(path) => format!("--account {} {}", addr, path.display()),
            None => format!("--clone {}", addr),
        })
        .collect::<Vec<_>>()
        .join(" ");

    let program_args = plan
        .programs
        .iter()
        .map(|(addr, path)| format!("--bpf-program {} {}", addr, path.display()))
        .collect::<Vec<_>>()
        .join(" ");

    let json_args = plan
        .json_accounts
        .iter()
        .map(|(addr, path)| format!("--account {} {}", addr, path.display()))
        .collect::<Vec<_>>()
        .join(" ");

    template
        .replace(ACCOUNTS_MARKER, &account_args)
        .replace(PROGRAMS_MARKER, &program_args)
        .replace(JSON_ACCOUNTS_MARKER, &json_args)
        .replace(WARP_SLOT_MARKER, &plan.warp_slot.to_string())
        .replace(CLUSTER_MARKER, &plan.cluster_url)
}
