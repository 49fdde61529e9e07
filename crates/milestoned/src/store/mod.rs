//! Storage layer for milestoned.
//!
//! This module provides the flat-file record store for the milestone
//! collection and the disk-backed store for uploaded images.

pub mod files;

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::milestone::Milestone;

pub use files::FileStore;

/// Outcome of a [`RecordStore::remove`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoveOutcome {
    /// At least one record matched and the filtered collection was persisted.
    Removed {
        /// Number of records left after the removal.
        remaining: usize,
    },
    /// No record matched the requested id.
    NotFound {
        /// Every id currently in the store, for caller-side debugging.
        known_ids: Vec<String>,
    },
}

/// Flat-file store for the milestone collection.
///
/// The whole collection lives in a single JSON array file; every mutation
/// rewrites the entire file. The store itself holds no lock — callers that
/// interleave `load` and `save` (the API layer) serialize those sequences
/// behind one mutex.
#[derive(Debug)]
pub struct RecordStore {
    /// Path to the collection file.
    path: PathBuf,
}

impl RecordStore {
    /// Open a record store backed by the given file.
    ///
    /// Creates the parent directories if they don't exist. The file itself
    /// is only created on the first save.
    ///
    /// # Errors
    ///
    /// Returns an error if the parent directories cannot be created.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        debug!("Record store backed by {}", path.display());
        Ok(Self { path })
    }

    /// Get the path to the collection file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the full collection.
    ///
    /// Fails soft: a missing or unparsable file yields an empty collection.
    /// Parse failures are logged at warn but never surfaced to callers.
    #[must_use]
    pub fn load(&self) -> Vec<Milestone> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Vec::new(),
            Err(err) => {
                warn!(
                    "could not read {}: {err}; treating store as empty",
                    self.path.display()
                );
                return Vec::new();
            }
        };

        match serde_json::from_slice(&bytes) {
            Ok(milestones) => milestones,
            Err(err) => {
                warn!(
                    "could not parse {}: {err}; treating store as empty",
                    self.path.display()
                );
                Vec::new()
            }
        }
    }

    /// Persist the full collection, replacing the backing file.
    ///
    /// The collection is written to a temporary file in the same directory
    /// and renamed into place, so a concurrent reader never observes a torn
    /// file.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the file write fails.
    pub fn save(&self, milestones: &[Milestone]) -> Result<()> {
        let json = serde_json::to_vec_pretty(milestones)?;

        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, &json).map_err(|source| Error::store_write(&tmp, source))?;
        fs::rename(&tmp, &self.path).map_err(|source| Error::store_write(&self.path, source))?;

        debug!(
            "persisted {} milestones to {}",
            milestones.len(),
            self.path.display()
        );
        Ok(())
    }

    /// Append a milestone to the collection and persist it.
    ///
    /// # Errors
    ///
    /// Returns an error if the save fails.
    pub fn append(&self, milestone: Milestone) -> Result<()> {
        let mut milestones = self.load();
        debug!("appending milestone with id {}", milestone.id);
        milestones.push(milestone);
        self.save(&milestones)
    }

    /// Remove every record whose id equals `id` and persist the rest.
    ///
    /// Ids are compared as strings. When nothing matches, the collection is
    /// left untouched and the full id list is returned for diagnostics.
    ///
    /// # Errors
    ///
    /// Returns an error if the save fails.
    pub fn remove(&self, id: &str) -> Result<RemoveOutcome> {
        let milestones = self.load();
        let initial_len = milestones.len();

        let remaining: Vec<Milestone> = milestones
            .iter()
            .filter(|m| m.id != id)
            .cloned()
            .collect();

        if remaining.len() == initial_len {
            return Ok(RemoveOutcome::NotFound {
                known_ids: milestones.into_iter().map(|m| m.id).collect(),
            });
        }

        self.save(&remaining)?;
        Ok(RemoveOutcome::Removed {
            remaining: remaining.len(),
        })
    }
}
