//! Remote state access behind a narrow trait
//!
//! The cache only ever sees [`AccountFetcher`]; the RPC-backed
//! implementation lives here and tests substitute an in-memory mock.

use std::collections::HashMap;

use async_trait::async_trait;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::pubkey::Pubkey;
use tracing::warn;

use crate::cache::AccountSnapshot;
use crate::error::{Error, Result};

/// Maximum address span accepted by a single remote call
pub const MAX_BATCH_SIZE: usize = 100;

/// Warp slot used when the live slot lookup fails
pub const FALLBACK_WARP_SLOT: u64 = 240_000_000;

/// Batched remote account access
#[async_trait]
pub trait AccountFetcher: Send + Sync {
    /// Fetches a batch of at most [`MAX_BATCH_SIZE`] accounts; absent
    /// accounts map to `None`.
    async fn fetch_accounts(
        &self,
        addresses: &[Pubkey],
    ) -> Result<HashMap<Pubkey, Option<AccountSnapshot>>>;

    /// Current slot of the live network. Implementations fall back to
    /// [`FALLBACK_WARP_SLOT`] on transient failure rather than erroring.
    async fn current_slot(&self) -> u64;
}

/// [`AccountFetcher`] over a Solana JSON-RPC endpoint
pub struct RpcFetcher {
    client: RpcClient,
}

impl RpcFetcher {
    /// Creates a fetcher against the given endpoint URL
    pub fn new(url: impl Into<String>) -> Self {
        RpcFetcher {
            client: RpcClient::new(url.into()),
        }
    }
}

#[async_trait]
impl AccountFetcher for RpcFetcher {
    async fn fetch_accounts(
        &self,
        addresses: &[Pubkey],
    ) -> Result<HashMap<Pubkey, Option<AccountSnapshot>>> {
        debug_assert!(addresses.len() <= MAX_BATCH_SIZE);

        let accounts = self
            .client
            .get_multiple_accounts(addresses)
            .await
            .map_err(|e| Error::rpc(e.to_string()))?;

        let mut result = HashMap::with_capacity(addresses.len());
        for (address, account) in addresses.iter().zip(accounts) {
            let snapshot = account.map(|acc| AccountSnapshot {
                pubkey: *address,
                lamports: acc.lamports,
                data: acc.data,
                owner: acc.owner,
                executable: acc.executable,
                rent_epoch: acc.rent_epoch,
            });
            result.insert(*address, snapshot);
        }
        Ok(result)
    }

    async fn current_slot(&self) -> u64 {
        match self.client.get_slot().await {
            Ok(slot) => slot,
            Err(e) => {
                warn!(error = %e, fallback = FALLBACK_WARP_SLOT, "slot lookup failed");
                FALLBACK_WARP_SLOT
            }
        }
    }
}
