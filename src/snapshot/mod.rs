//! Snapshot persistence.
//!
//! The whole keyspace is serialized to a single file at
//! `<dir>/<dbfilename>`. A save writes a temp file in the same directory
//! and renames it over the live path, so the file on disk is always either
//! the previous image or a complete new one. The in-progress flag is held
//! for the full duration of a background save, and a foreground save fails
//! while one is running.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use jiff::Timestamp;
use rand::distr::{Alphanumeric, SampleString};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{error, info};

use crate::store::SharedStore;

pub mod codec;

pub use codec::SnapshotError;

#[derive(Error, Debug)]
pub enum PersistError {
    #[error("another save in progress")]
    SaveInProgress,
    #[error("background save is already running")]
    BackgroundSaveRunning,
    #[error(transparent)]
    Codec(#[from] SnapshotError),
    #[error("{0}")]
    Io(#[from] std::io::Error),
}

struct SaveState {
    background_running: bool,
    last_save: i64,
}

pub struct SnapshotManager {
    path: PathBuf,
    store: SharedStore,
    state: Mutex<SaveState>,
}

impl SnapshotManager {
    pub fn new(dir: &str, dbfilename: &str, store: SharedStore) -> Arc<Self> {
        Arc::new(SnapshotManager {
            path: Path::new(dir).join(dbfilename),
            store,
            state: Mutex::new(SaveState {
                background_running: false,
                last_save: 0,
            }),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the snapshot at startup.
    ///
    /// A missing file gets its directory tree created and an empty file in
    /// place; an empty file leaves the store empty; anything else is
    /// decoded into the store. A decode that runs off the end of the
    /// stream is treated like the empty file and leaves the store empty;
    /// any other decode failure is returned to the caller, which treats it
    /// as fatal.
    pub async fn load_on_start(&self) -> Result<(), PersistError> {
        match tokio::fs::read(&self.path).await {
            Ok(contents) => {
                if !contents.is_empty() {
                    match codec::decode(&contents) {
                        Ok(entries) => {
                            let loaded = entries.len();
                            self.store.write().await.replace_entries(entries);
                            info!(keys = loaded, path = %self.path.display(), "loaded snapshot");
                        }
                        Err(SnapshotError::UnexpectedEof) => {
                            info!(path = %self.path.display(), "snapshot ends early, starting empty");
                        }
                        Err(e) => return Err(e.into()),
                    }
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                if let Some(parent) = self.path.parent() {
                    tokio::fs::create_dir_all(parent).await?;
                }
                tokio::fs::File::create(&self.path).await?;
                info!(path = %self.path.display(), "created empty snapshot");
            }
            Err(e) => return Err(e.into()),
        }

        if let Ok(metadata) = tokio::fs::metadata(&self.path).await {
            if let Ok(modified) = metadata.modified() {
                if let Ok(timestamp) = Timestamp::try_from(modified) {
                    self.state.lock().await.last_save = timestamp.as_second();
                }
            }
        }

        Ok(())
    }

    /// Foreground save. Holds the save state for the whole operation so
    /// two saves can never interleave, and takes the store write lock
    /// while encoding.
    pub async fn save(&self) -> Result<(), PersistError> {
        let mut state = self.state.lock().await;
        if state.background_running {
            return Err(PersistError::SaveInProgress);
        }

        let image = {
            let mut guard = self.store.write().await;
            guard.purge_expired();
            codec::encode(&guard.entries)
        };
        self.commit(image).await?;
        state.last_save = Timestamp::now().as_second();

        Ok(())
    }

    /// Background save. Flags the save as running, then performs the same
    /// temp-then-rename dance from a detached task under the store read
    /// lock. The flag stays set until the write has completed.
    pub async fn bgsave(self: &Arc<Self>) -> Result<(), PersistError> {
        {
            let mut state = self.state.lock().await;
            if state.background_running {
                return Err(PersistError::BackgroundSaveRunning);
            }
            state.background_running = true;
        }

        let manager = Arc::clone(self);
        tokio::spawn(async move {
            let image = {
                let guard = manager.store.read().await;
                codec::encode(&guard.entries)
            };
            let result = manager.commit(image).await;

            let mut state = manager.state.lock().await;
            state.background_running = false;
            match result {
                Ok(()) => {
                    state.last_save = Timestamp::now().as_second();
                    info!("background save completed");
                }
                Err(e) => error!(error = %e, "background save failed"),
            }
        });

        Ok(())
    }

    /// Epoch second of the last successful save.
    pub async fn last_save(&self) -> i64 {
        self.state.lock().await.last_save
    }

    /// Raw bytes of the current snapshot file, served to attaching
    /// replicas.
    pub async fn file_contents(&self) -> Result<Vec<u8>, PersistError> {
        Ok(tokio::fs::read(&self.path).await?)
    }

    /// Loads a snapshot image received over the wire, replacing the
    /// current keyspace. An empty payload leaves the store empty.
    pub async fn load_from_bytes(&self, bytes: &[u8]) -> Result<(), PersistError> {
        if bytes.is_empty() {
            return Ok(());
        }
        let entries = codec::decode(bytes)?;
        self.store.write().await.replace_entries(entries);
        Ok(())
    }

    /// Writes the image to a temp file in the snapshot directory and
    /// renames it over the live path. The temp file is removed on any
    /// failure.
    async fn commit(&self, image: Vec<u8>) -> Result<(), PersistError> {
        let directory = self.path.parent().unwrap_or_else(|| Path::new("."));
        let suffix = Alphanumeric.sample_string(&mut rand::rng(), 8);
        let file_name = self
            .path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| "snapshot".to_string());
        let temp_path = directory.join(format!("{}.{}.tmp", file_name, suffix));

        let result = async {
            tokio::fs::write(&temp_path, &image).await?;
            tokio::fs::rename(&temp_path, &self.path).await
        }
        .await;

        if result.is_err() {
            let _ = tokio::fs::remove_file(&temp_path).await;
        }

        Ok(result?)
    }
}
