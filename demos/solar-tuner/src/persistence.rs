/// Saving and loading the parameter snapshot through a document store.

use orrery_engine::{DocumentPath, DocumentStore, StoreError};

use crate::params::Snapshot;

pub const SNAPSHOT_COLLECTION: &str = "solarSystem";
pub const SNAPSHOT_ID: &str = "config";

pub fn snapshot_path() -> DocumentPath {
    DocumentPath::new(SNAPSHOT_COLLECTION, SNAPSHOT_ID)
}

#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("document store: {0}")]
    Store(#[from] StoreError),
    #[error("snapshot does not match the expected shape: {0}")]
    Snapshot(#[from] serde_json::Error),
    #[error("no document store configured")]
    NotConfigured,
}

/// Always reads and writes the same document.
pub struct PersistenceGateway<S> {
    store: S,
    path: DocumentPath,
}

impl<S: DocumentStore> PersistenceGateway<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            path: snapshot_path(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn path(&self) -> &DocumentPath {
        &self.path
    }

    /// Overwrite the stored document with `snapshot`.
    pub async fn save(&self, snapshot: &Snapshot) -> Result<(), PersistError> {
        let body = serde_json::to_value(snapshot)?;
        self.store.write(&self.path, &body).await?;
        log::info!("persistence: saved {}", self.path);
        Ok(())
    }

    /// `Ok(None)` when nothing has been saved yet.
    pub async fn load(&self) -> Result<Option<Snapshot>, PersistError> {
        let Some(body) = self.store.read(&self.path).await? else {
            log::info!("persistence: {} not found", self.path);
            return Ok(None);
        };
        let snapshot = serde_json::from_value(body)?;
        log::info!("persistence: loaded {}", self.path);
        Ok(Some(snapshot))
    }
}

/// User-visible outcome of one save or load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Acknowledgment {
    Saved,
    SaveFailed,
    Loaded,
    NotFound,
    LoadFailed,
}

impl Acknowledgment {
    pub const ALL: [Acknowledgment; 5] = [
        Acknowledgment::Saved,
        Acknowledgment::SaveFailed,
        Acknowledgment::Loaded,
        Acknowledgment::NotFound,
        Acknowledgment::LoadFailed,
    ];

    pub fn message(self) -> &'static str {
        match self {
            Acknowledgment::Saved => "Data saved to Firebase successfully!",
            Acknowledgment::SaveFailed => "Error saving data. Check the console for details.",
            Acknowledgment::Loaded => "Data loaded successfully!",
            Acknowledgment::NotFound => "No data found in Firebase.",
            Acknowledgment::LoadFailed => "Error loading data. Check the console for details.",
        }
    }

    /// Numeric code carried in the game event.
    pub fn code(self) -> u32 {
        match self {
            Acknowledgment::Saved => 1,
            Acknowledgment::SaveFailed => 2,
            Acknowledgment::Loaded => 3,
            Acknowledgment::NotFound => 4,
            Acknowledgment::LoadFailed => 5,
        }
    }

    pub fn from_code(code: u32) -> Option<Acknowledgment> {
        Acknowledgment::ALL.into_iter().find(|a| a.code() == code)
    }

    pub fn is_failure(self) -> bool {
        matches!(self, Acknowledgment::SaveFailed | Acknowledgment::LoadFailed)
    }
}
