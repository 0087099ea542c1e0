//! File-backed checkpoint store
//!
//! Each incremental cube keeps its checkpoint next to its exported pages:
//! `<output_dir>/<Cube>/latest-data-date-time.txt`, a single line holding
//! `yyyy-MM-ddTHH:mm:ss`.

use super::checkpoint::{format_timestamp, parse_timestamp, Checkpoint};
use crate::domain::ids::CubeName;
use crate::domain::{CubexError, Result};
use chrono::NaiveDateTime;
use std::path::{Path, PathBuf};

/// Name of the checkpoint file inside a cube's output directory
pub const CHECKPOINT_FILE_NAME: &str = "latest-data-date-time.txt";

/// Loads and saves per-cube checkpoints under the output root
#[derive(Debug, Clone)]
pub struct CheckpointStore {
    root: PathBuf,
    fallback: NaiveDateTime,
}

impl CheckpointStore {
    /// Create a store rooted at the export output directory
    ///
    /// # Arguments
    ///
    /// * `root` - Export output directory
    /// * `fallback` - Checkpoint returned for cubes that have none yet
    pub fn new(root: impl Into<PathBuf>, fallback: NaiveDateTime) -> Self {
        Self {
            root: root.into(),
            fallback,
        }
    }

    /// Create a store from the configured fallback string
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the fallback is not a valid timestamp.
    pub fn with_fallback_str(root: impl Into<PathBuf>, fallback: &str) -> Result<Self> {
        let fallback = parse_timestamp(fallback).map_err(|e| {
            CubexError::Configuration(format!("Invalid fallback start timestamp: {e}"))
        })?;
        Ok(Self::new(root, fallback))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn fallback(&self) -> NaiveDateTime {
        self.fallback
    }

    /// Output directory of a cube
    pub fn cube_dir(&self, cube: &CubeName) -> PathBuf {
        self.root.join(cube.as_str())
    }

    /// Path of a cube's checkpoint file
    pub fn checkpoint_path(&self, cube: &CubeName) -> PathBuf {
        self.cube_dir(cube).join(CHECKPOINT_FILE_NAME)
    }

    /// Load the checkpoint for a cube
    ///
    /// Returns the stored timestamp if the checkpoint file exists, otherwise
    /// the configured fallback.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub async fn load(&self, cube: &CubeName) -> Result<Checkpoint> {
        match self.read(cube).await? {
            Some(checkpoint) => {
                tracing::debug!(
                    cube = %cube,
                    checkpoint = %checkpoint.formatted(),
                    "Loaded checkpoint"
                );
                Ok(checkpoint)
            }
            None => {
                tracing::debug!(
                    cube = %cube,
                    fallback = %format_timestamp(&self.fallback),
                    "No checkpoint file, using fallback start"
                );
                Ok(Checkpoint::new(cube.clone(), self.fallback))
            }
        }
    }

    /// Read a stored checkpoint, `None` if the cube has no checkpoint file
    pub async fn read(&self, cube: &CubeName) -> Result<Option<Checkpoint>> {
        let path = self.checkpoint_path(cube);

        let contents = match tokio::fs::read_to_string(&path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(CubexError::Checkpoint(format!(
                    "Failed to read {}: {e}",
                    path.display()
                )))
            }
        };

        let timestamp = parse_timestamp(&contents).map_err(|e| {
            CubexError::Checkpoint(format!("Malformed checkpoint {}: {e}", path.display()))
        })?;

        Ok(Some(Checkpoint::new(cube.clone(), timestamp)))
    }

    /// Overwrite a cube's checkpoint file
    ///
    /// The file is written to a temporary sibling and renamed into place so a
    /// crash never leaves a truncated checkpoint behind.
    ///
    /// # Errors
    ///
    /// Returns a filesystem error if the directory or file cannot be written.
    pub async fn save(&self, checkpoint: &Checkpoint) -> Result<()> {
        let dir = self.cube_dir(&checkpoint.cube);
        let path = dir.join(CHECKPOINT_FILE_NAME);
        let tmp_path = dir.join(format!("{CHECKPOINT_FILE_NAME}.tmp"));

        tokio::fs::create_dir_all(&dir).await.map_err(|e| {
            CubexError::Filesystem(format!("Failed to create {}: {e}", dir.display()))
        })?;

        tokio::fs::write(&tmp_path, checkpoint.formatted())
            .await
            .map_err(|e| {
                CubexError::Filesystem(format!("Failed to write {}: {e}", tmp_path.display()))
            })?;

        tokio::fs::rename(&tmp_path, &path).await.map_err(|e| {
            CubexError::Filesystem(format!("Failed to replace {}: {e}", path.display()))
        })?;

        tracing::info!(
            cube = %checkpoint.cube,
            checkpoint = %checkpoint.formatted(),
            "Checkpoint saved"
        );

        Ok(())
    }

    /// All checkpoints found under the output root, sorted by cube name
    ///
    /// # Errors
    ///
    /// Returns an error if the root cannot be listed or a checkpoint is malformed.
    pub async fn list(&self) -> Result<Vec<Checkpoint>> {
        let mut entries = match tokio::fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(CubexError::Filesystem(format!(
                    "Failed to list {}: {e}",
                    self.root.display()
                )))
            }
        };

        let mut checkpoints = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_dir() {
                continue;
            }

            let Ok(cube) = CubeName::new(entry.file_name().to_string_lossy()) else {
                continue;
            };

            if let Some(checkpoint) = self.read(&cube).await? {
                checkpoints.push(checkpoint);
            }
        }

        checkpoints.sort_by(|a, b| a.cube.cmp(&b.cube));
        Ok(checkpoints)
    }
}
