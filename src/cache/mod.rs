//! Content-addressed snapshot cache for remote account state
//!
//! One JSON file per address in the cache directory; a file's existence is
//! the sole cache-hit signal. There is no TTL and no invalidation beyond
//! manual deletion or the schema's `skipCache` list.

mod fetcher;
mod snapshot;

pub use fetcher::{AccountFetcher, RpcFetcher, FALLBACK_WARP_SLOT, MAX_BATCH_SIZE};
pub use snapshot::{AccountSnapshot, SnapshotAccount, SnapshotFile};

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use futures_util::future::join_all;
use solana_sdk::pubkey::Pubkey;
use tracing::{debug, info};

use crate::error::{Error, Result};

/// Disk-backed cache of account snapshots, keyed by address string
pub struct SnapshotCache<F: AccountFetcher> {
    dir: PathBuf,
    skip_cache: HashSet<String>,
    fetcher: F,
}

impl<F: AccountFetcher> SnapshotCache<F> {
    /// Creates a cache rooted at `dir`, creating the directory if needed
    pub fn new(dir: impl Into<PathBuf>, fetcher: F) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(SnapshotCache {
            dir,
            skip_cache: HashSet::new(),
            fetcher,
        })
    }

    /// Marks addresses that must always be re-cloned from the live network
    pub fn with_skip_cache<I, S>(mut self, addresses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.skip_cache = addresses.into_iter().map(Into::into).collect();
        self
    }

    /// On-disk path for an address, whether or not it exists yet
    pub fn path_for(&self, address: &str) -> PathBuf {
        self.dir.join(format!("{}.json", address))
    }

    /// True when a cache file exists and the address is not skip-listed
    pub fn is_cached(&self, address: &str) -> bool {
        !self.skip_cache.contains(address) && self.path_for(address).exists()
    }

    /// Filters out addresses whose cache file already exists
    pub fn skip_already_cached(&self, addresses: &[String]) -> Vec<String> {
        addresses
            .iter()
            .filter(|a| !self.is_cached(a))
            .cloned()
            .collect()
    }

    /// Fetches snapshots for the given addresses, partitioned into chunks
    /// of at most [`MAX_BATCH_SIZE`], one concurrent request per chunk.
    /// All chunks are joined before any result is returned; ordering across
    /// chunks does not matter since results merge into an address-keyed map.
    pub async fn fetch_batch(
        &self,
        addresses: &[Pubkey],
    ) -> Result<HashMap<Pubkey, Option<AccountSnapshot>>> {
        let futures = addresses
            .chunks(MAX_BATCH_SIZE)
            .map(|chunk| self.fetcher.fetch_accounts(chunk));

        let mut merged = HashMap::with_capacity(addresses.len());
        for batch in join_all(futures).await {
            merged.extend(batch?);
        }

        for (address, snapshot) in &merged {
            match snapshot {
                Some(_) => debug!(%address, "fetched account"),
                None => info!(%address, "account not found on cluster"),
            }
        }
        Ok(merged)
    }

    /// Fetches the programdata accounts pointed to by executable snapshots
    /// and merges them into the result set. Executables are two-account
    /// entities (program + programdata) that must travel together.
    pub async fn fetch_executable_followups(
        &self,
        snapshots: &mut HashMap<Pubkey, Option<AccountSnapshot>>,
    ) -> Result<()> {
        let followups: Vec<Pubkey> = snapshots
            .values()
            .flatten()
            .filter_map(AccountSnapshot::program_data_address)
            .filter(|addr| !snapshots.contains_key(addr) && !self.is_cached(&addr.to_string()))
            .collect();

        if followups.is_empty() {
            return Ok(());
        }
        debug!(count = followups.len(), "fetching programdata follow-ups");
        let extra = self.fetch_batch(&followups).await?;
        snapshots.extend(extra);
        Ok(())
    }

    /// Writes each non-null snapshot to its per-address file and returns
    /// the written paths
    pub fn persist(
        &self,
        snapshots: &HashMap<Pubkey, Option<AccountSnapshot>>,
    ) -> Result<Vec<PathBuf>> {
        let mut written = Vec::new();
        for snapshot in snapshots.values().flatten() {
            let path = self.path_for(&snapshot.pubkey.to_string());
            let file = SnapshotFile::from(snapshot);
            std::fs::write(&path, serde_json::to_vec_pretty(&file)?)?;
            written.push(path);
        }
        Ok(written)
    }

    /// Final pass: for each address, its on-disk path, or `None` meaning
    /// "not cached, clone live"
    pub fn map_to_paths(&self, addresses: &[String]) -> HashMap<String, Option<PathBuf>> {
        addresses
            .iter()
            .map(|a| {
                let path = self.is_cached(a).then(|| self.path_for(a));
                (a.clone(), path)
            })
            .collect()
    }

    /// Reads a previously persisted snapshot back from disk
    pub fn load(&self, address: &str) -> Result<AccountSnapshot> {
        let contents = std::fs::read_to_string(self.path_for(address))?;
        let file: SnapshotFile = serde_json::from_str(&contents)?;
        AccountSnapshot::try_from(file)
    }

    /// Full snapshot pass for a requested address list: skip cached
    /// entries, fetch the rest (with executable follow-ups), persist, and
    /// map every requested address to a path or `None`.
    pub async fn snapshot_all(
        &self,
        addresses: &[String],
    ) -> Result<HashMap<String, Option<PathBuf>>> {
        let missing = self.skip_already_cached(addresses);
        info!(
            requested = addresses.len(),
            to_fetch = missing.len(),
            "snapshotting accounts"
        );

        if !missing.is_empty() {
            let pubkeys = missing
                .iter()
                .map(|a| {
                    Pubkey::from_str(a).map_err(|e| Error::InvalidAddress {
                        name: a.clone(),
                        value: a.clone(),
                        reason: e.to_string(),
                    })
                })
                .collect::<Result<Vec<_>>>()?;

            let mut snapshots = self.fetch_batch(&pubkeys).await?;
            self.fetch_executable_followups(&mut snapshots).await?;
            self.persist(&snapshots)?;
        }

        Ok(self.map_to_paths(addresses))
    }

    /// Current slot of the live network, for warp-slot injection
    pub async fn current_slot(&self) -> u64 {
        self.fetcher.current_slot().await
    }

    /// Cache directory root
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// The underlying fetcher
    pub fn fetcher_ref(&self) -> &F {
        &self.fetcher
    }
}
