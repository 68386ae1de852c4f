//! # Solforge - Declarative Solana Instruction Engine
//!
//! Solforge turns a human-authored schema (named accounts, derived
//! addresses, instruction templates) into concrete, binary-encoded Solana
//! instructions, and can materialize a reproducible local test-validator
//! environment pre-seeded with the exact accounts those instructions touch.
//!
//! ## Architecture
//!
//! ```text
//! Schema → Resolver (4 phases, using the Codec) → Environment
//!        → build_transaction(...)                 (sign & submit)
//!        → SnapshotCache + Materializer           (local validator)
//! ```
//!
//! ### Main Components
//!
//! - [`codec`] - Token grammar classification and exact-width byte encoding
//! - [`Environment`] - Named-variable store threaded through resolution
//! - [`Resolver`] - Dependency-ordered four-phase schema resolution
//! - [`SnapshotCache`] - Batched remote account snapshots with disk caching
//! - [`Materializer`] - Launch-script generation and validator lifecycle
//!
//! ## Quick Start
//!
//! ```rust
//! use solforge::{Environment, Resolver, Schema};
//!
//! # fn main() -> solforge::Result<()> {
//! let schema = Schema::from_yaml_str(r#"
//! accounts:
//!   tokenProgram: "TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA"
//! pda:
//!   mintAuthority:
//!     programId: "$tokenProgram"
//!     seeds: ["authority"]
//! instructionDefinition:
//!   initialize:
//!     programId: "$tokenProgram"
//!     data: ["sighash(initialize)", "u32(7)"]
//!     accounts: ["$mintAuthority, mut"]
//! "#)?;
//!
//! let mut env = Environment::new();
//! Resolver::new(&schema).resolve_all(&mut env)?;
//!
//! // The environment now holds the account, the PDA and the instruction
//! assert!(env.contains("mintAuthority"));
//! assert!(env.contains("initialize"));
//! # Ok(())
//! # }
//! ```
//!
//! ## Resolution Order
//!
//! Resolution runs in four fixed phases: named accounts, test identities,
//! derived addresses, instructions. Each phase reads what earlier phases
//! wrote; forward references across phases are not supported, and
//! restricting a phase to a subset of names skips the excluded entries
//! entirely, side effects included.
//!
//! ## Error Handling
//!
//! Every resolution failure carries the offending name or token and
//! propagates synchronously; see [`Error`]. Only the live-slot lookup
//! tolerates transient failure (it falls back to a hard-coded slot).

/// Version of the solforge crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod cache;
pub mod codec;
pub mod error;
pub mod resolver;
pub mod runtime;
pub mod schema;
pub mod validator;

// Re-export main types
pub use cache::{AccountFetcher, AccountSnapshot, RpcFetcher, SnapshotCache};
pub use codec::{BytesMode, TokenPattern, TypeTag, VariableInfo};
pub use error::{Error, Result};
pub use resolver::{build_transaction, ParamMap, Resolver};
pub use runtime::{Environment, Scalar, Value};
pub use schema::{InstructionDefinition, LocalDevelopment, PdaDefinition, Schema, TestWallet};
pub use validator::{LaunchPlan, LocalValidator, Materializer, ValidatorConfig};
