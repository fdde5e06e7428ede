//! JSON file persistence for the bet collection
//!
//! The store owns the single mutable copy of the collection. Every mutation
//! is written straight through to disk; if the write fails the in-memory
//! collection is rolled back so memory and disk never silently diverge.
//!
//! # Example
//!
//! ```no_run
//! use betledger::data::LedgerStore;
//! use betledger::models::NewBet;
//!
//! let mut store = LedgerStore::open("bets.json")?;
//! let bet = store.add(NewBet::default())?;
//! store.remove(&bet.id)?;
//! # Ok::<(), betledger::LedgerError>(())
//! ```

use std::collections::HashSet;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::LedgerError;
use crate::models::{Bet, BetPatch, NewBet};

/// Ledger backed by a JSON file
#[derive(Debug)]
pub struct LedgerStore {
    path: PathBuf,
    bets: Vec<Bet>,
}

impl LedgerStore {
    /// Open a ledger file
    ///
    /// A missing file is an empty ledger. A file that exists but does not
    /// parse is an error, so a later save cannot overwrite it.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, LedgerError> {
        let path = path.as_ref().to_path_buf();

        if !path.exists() {
            info!(path = %path.display(), "No ledger file found, starting empty");
            return Ok(Self {
                path,
                bets: Vec::new(),
            });
        }

        let file = File::open(&path)?;
        let mut bets: Vec<Bet> = serde_json::from_reader(BufReader::new(file))?;
        let reassigned = ensure_unique_ids(&mut bets);
        debug!(path = %path.display(), count = bets.len(), reassigned, "Loaded ledger");

        Ok(Self { path, bets })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current collection, newest additions first
    pub fn bets(&self) -> &[Bet] {
        &self.bets
    }

    pub fn get(&self, id: &str) -> Option<&Bet> {
        self.bets.iter().find(|b| b.id == id)
    }

    /// Add a bet with a fresh id, placing it first
    pub fn add(&mut self, new_bet: NewBet) -> Result<Bet, LedgerError> {
        let bet = new_bet.into_bet(Uuid::new_v4().to_string());

        let mut next = Vec::with_capacity(self.bets.len() + 1);
        next.push(bet.clone());
        next.extend(self.bets.iter().cloned());
        self.commit(next)?;

        debug!(id = %bet.id, "Added bet");
        Ok(bet)
    }

    /// Patch an existing bet
    pub fn update(&mut self, id: &str, patch: &BetPatch) -> Result<Bet, LedgerError> {
        let index = self.index_of(id)?;

        let mut next = self.bets.clone();
        patch.apply(&mut next[index]);
        let updated = next[index].clone();
        self.commit(next)?;

        debug!(id, "Updated bet");
        Ok(updated)
    }

    /// Remove a bet by id
    pub fn remove(&mut self, id: &str) -> Result<Bet, LedgerError> {
        let index = self.index_of(id)?;

        let mut next = self.bets.clone();
        let removed = next.remove(index);
        self.commit(next)?;

        debug!(id, "Removed bet");
        Ok(removed)
    }

    /// Delete every bet
    pub fn clear(&mut self) -> Result<usize, LedgerError> {
        let count = self.bets.len();
        self.commit(Vec::new())?;

        info!(count, "Cleared ledger");
        Ok(count)
    }

    /// Replace the whole collection (used by import)
    pub fn replace_all(&mut self, bets: Vec<Bet>) -> Result<(), LedgerError> {
        self.commit(bets)
    }

    fn index_of(&self, id: &str) -> Result<usize, LedgerError> {
        self.bets
            .iter()
            .position(|b| b.id == id)
            .ok_or_else(|| LedgerError::NotFound(id.to_string()))
    }

    /// Persist `next`, and only adopt it in memory once it is on disk
    fn commit(&mut self, next: Vec<Bet>) -> Result<(), LedgerError> {
        if let Err(e) = write_atomic(&self.path, &next) {
            warn!(
                path = %self.path.display(),
                error = %e,
                "Failed to save ledger, keeping previous state"
            );
            return Err(e);
        }

        self.bets = next;
        Ok(())
    }
}

/// Give blank and repeated ids a fresh UUID, keeping the first holder of
/// each id. Returns how many bets were changed.
pub(crate) fn ensure_unique_ids(bets: &mut [Bet]) -> usize {
    let mut seen = HashSet::with_capacity(bets.len());
    let mut reassigned = 0;

    for (index, bet) in bets.iter_mut().enumerate() {
        let id = bet.id.trim();
        if !id.is_empty() && seen.insert(id.to_string()) {
            continue;
        }

        let fresh = Uuid::new_v4().to_string();
        let previous = std::mem::replace(&mut bet.id, fresh);
        seen.insert(bet.id.clone());
        reassigned += 1;

        if previous.trim().is_empty() {
            debug!(index, id = %bet.id, "Assigned id to bet without one");
        } else {
            warn!(index, duplicate = %previous, id = %bet.id, "Duplicate bet id, assigned a fresh one");
        }
    }

    reassigned
}

/// Write to a sibling temp file and rename it over the target
fn write_atomic(path: &Path, bets: &[Bet]) -> Result<(), LedgerError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)?;
        }
    }

    let tmp = tmp_path(path);
    let written = write_json(&tmp, bets).and_then(|()| Ok(fs::rename(&tmp, path)?));
    if let Err(e) = written {
        let _ = fs::remove_file(&tmp);
        return Err(e);
    }

    debug!(path = %path.display(), count = bets.len(), "Saved ledger");
    Ok(())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    PathBuf::from(tmp)
}

fn write_json(path: &Path, bets: &[Bet]) -> Result<(), LedgerError> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, bets)?;
    writer.flush()?;
    Ok(())
}
