pub mod settings_json_repository;
pub mod settings_repository;

pub use settings_json_repository::JsonSettingsRepository;
pub use settings_repository::{BoxFuture, RepositoryError, RepositoryResult, SettingsRepository};
