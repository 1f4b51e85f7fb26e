use std::future::Future;
use std::pin::Pin;

use thiserror::Error;

use crate::settings::models::SettingsModel;

/// Repository error type - abstracts over specific implementation errors
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("I/O error: {0}")]
    Io(String),
    #[error("serialization error: {0}")]
    Serialization(String),
    #[error("path error: {0}")]
    Path(String),
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub trait SettingsRepository: Send + Sync + 'static {
    /// Load settings from storage; defaults when nothing is stored yet.
    fn load(&self) -> BoxFuture<'static, RepositoryResult<SettingsModel>>;

    /// Persist settings to storage.
    fn save(&self, settings: SettingsModel) -> BoxFuture<'static, RepositoryResult<()>>;

    /// Get the storage path (for diagnostics)
    fn storage_path(&self) -> String;
}
