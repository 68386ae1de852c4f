//! Account snapshot type and its on-disk JSON format

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;

use crate::error::{Error, Result};

/// Offset of the programdata address inside an upgradeable program
/// account: a 4-byte state tag, then 32 bytes of address.
const PROGRAMDATA_POINTER_OFFSET: usize = 4;

/// Point-in-time capture of an account's on-chain state
#[derive(Debug, Clone, PartialEq)]
pub struct AccountSnapshot {
    /// The account's address
    pub pubkey: Pubkey,
    /// Balance in lamports
    pub lamports: u64,
    /// Raw account data
    pub data: Vec<u8>,
    /// Owning program
    pub owner: Pubkey,
    /// True for program accounts
    pub executable: bool,
    /// Rent epoch, stored verbatim
    pub rent_epoch: u64,
}

impl AccountSnapshot {
    /// For executable accounts, the embedded pointer to the programdata
    /// account: skip the 4-byte header, read the next 32 bytes.
    ///
    /// Program and programdata are two halves of one deployable and must
    /// travel together when cloned.
    pub fn program_data_address(&self) -> Option<Pubkey> {
        if !self.executable {
            return None;
        }
        let bytes = self
            .data
            .get(PROGRAMDATA_POINTER_OFFSET..PROGRAMDATA_POINTER_OFFSET + 32)?;
        let mut arr = [0u8; 32];
        arr.copy_from_slice(bytes);
        Some(Pubkey::new_from_array(arr))
    }
}

/// One JSON file per address: `{pubkey, account: {...}}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotFile {
    /// Address string
    pub pubkey: String,
    /// Account body
    pub account: SnapshotAccount,
}

/// Account body of a snapshot file; `data` is a `[base64, "base64"]` pair
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotAccount {
    /// Balance in lamports
    pub lamports: u64,
    /// Base64-tagged data encoding
    pub data: (String, String),
    /// Owning program address string
    pub owner: String,
    /// True for program accounts
    pub executable: bool,
    /// Rent epoch
    pub rent_epoch: u64,
}

impl From<&AccountSnapshot> for SnapshotFile {
    fn from(snap: &AccountSnapshot) -> Self {
        SnapshotFile {
            pubkey: snap.pubkey.to_string(),
            account: SnapshotAccount {
                lamports: snap.lamports,
                data: (BASE64.encode(&snap.data), "base64".to_string()),
                owner: snap.owner.to_string(),
                executable: snap.executable,
                rent_epoch: snap.rent_epoch,
            },
        }
    }
}

impl TryFrom<SnapshotFile> for AccountSnapshot {
    type Error = Error;

    fn try_from(file: SnapshotFile) -> Result<Self> {
        let parse = |field: &str, s: &str| {
            s.parse::<Pubkey>().map_err(|e| Error::InvalidAddress {
                name: field.to_string(),
                value: s.to_string(),
                reason: e.to_string(),
            })
        };
        let data = BASE64
            .decode(&file.account.data.0)
            .map_err(|e| Error::SchemaError(format!("corrupt snapshot data: {}", e)))?;
        Ok(AccountSnapshot {
            pubkey: parse("pubkey", &file.pubkey)?,
            lamports: file.account.lamports,
            data,
            owner: parse("owner", &file.account.owner)?,
            executable: file.account.executable,
            rent_epoch: file.account.rent_epoch,
        })
    }
}
