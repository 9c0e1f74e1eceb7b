//! Durable mapping from content fingerprints to minted product identities.
//!
//! The fingerprint map and the mint counter are co-located in one JSON
//! document and written atomically together, so neither can be reset without
//! the other. Saves happen at mint time, before a new identity is handed
//! out: a crash after minting can lose a number, but never reuse one.

use std::collections::BTreeMap;
use std::io::Write;
use std::time::{SystemTime, UNIX_EPOCH};

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use thiserror::Error;

mod fingerprint;

pub use fingerprint::{Fingerprint, Fingerprinter};

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("registry store io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("registry store is not valid JSON: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Identity minted for a product the first time its fingerprint is seen.
/// Immutable once minted; re-runs reuse it, they never re-mint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductIdentity {
    /// Globally unique, monotonically assigned product number.
    pub sequence: u64,

    /// Display name the identity was minted with.
    pub product_name: String,

    /// Output archive file stem; the writer appends `.zip`.
    pub archive_name: String,

    /// Epoch seconds at mint time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<u64>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct RegistryState {
    /// Mint counter. Strictly increases by one per minted identity; lost
    /// numbers are permitted, reused numbers are not.
    count: u64,

    /// Fingerprint hex -> identity. At most one identity per fingerprint.
    #[serde(default)]
    products: BTreeMap<String, ProductIdentity>,
}

/// The durable product registry backing a packaging run.
///
/// Single-writer: a run loads the store, mutates it in memory and overwrites
/// the whole file through a temporary-file rename on every mint.
#[derive(Debug)]
pub struct ProductRegistry {
    path: Utf8PathBuf,
    state: RegistryState,
}

impl ProductRegistry {
    /// Load the registry from `path`. A missing store starts empty; an
    /// unreadable or malformed store is an error, since packaging must not
    /// proceed when product numbering cannot be trusted.
    pub fn load(path: impl AsRef<Utf8Path>) -> Result<Self, RegistryError> {
        let path = path.as_ref().to_owned();
        let state = match std::fs::read(path.as_std_path()) {
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => RegistryState::default(),
            Err(err) => return Err(err.into()),
        };
        Ok(Self { path, state })
    }

    /// Number of identities minted so far.
    pub fn count(&self) -> u64 {
        self.state.count
    }

    /// Registered (fingerprint hex, identity) pairs in stable key order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &ProductIdentity)> {
        self.state.products.iter().map(|(hex, identity)| (hex.as_str(), identity))
    }

    pub fn lookup(&self, fingerprint: Fingerprint) -> Option<&ProductIdentity> {
        self.state.products.get(&fingerprint.to_hex())
    }

    /// Return the identity for `fingerprint`, minting and durably recording
    /// a new one when the fingerprint is unseen.
    ///
    /// A hit leaves the counter untouched. A miss increments the counter,
    /// derives the archive name from the sequence number and display name,
    /// and saves the whole store before returning, so the new number can
    /// never be handed out twice.
    pub fn get_or_create(
        &mut self,
        fingerprint: Fingerprint,
        display_name: &str,
    ) -> Result<ProductIdentity, RegistryError> {
        if let Some(existing) = self.state.products.get(&fingerprint.to_hex()) {
            return Ok(existing.clone());
        }

        self.state.count += 1;
        let sequence = self.state.count;
        let identity = ProductIdentity {
            sequence,
            product_name: display_name.to_string(),
            archive_name: drp_layout::archive_file_name(sequence, display_name),
            created_at: Some(now_epoch_secs()),
        };
        self.state.products.insert(fingerprint.to_hex(), identity.clone());
        self.save()?;

        Ok(identity)
    }

    fn save(&self) -> Result<(), RegistryError> {
        let directory = match self.path.parent() {
            Some(parent) if !parent.as_str().is_empty() => parent,
            _ => Utf8Path::new("."),
        };
        let mut temp = NamedTempFile::new_in(directory.as_std_path())?;
        temp.write_all(&serde_json::to_vec_pretty(&self.state)?)?;
        temp.persist(self.path.as_std_path()).map_err(|err| err.error)?;
        Ok(())
    }
}

/// Returns current UNIX epoch seconds.
fn now_epoch_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
