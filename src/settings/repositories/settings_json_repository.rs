use std::path::PathBuf;

use super::settings_repository::{
    BoxFuture, RepositoryError, RepositoryResult, SettingsRepository,
};
use crate::settings::models::SettingsModel;

pub struct JsonSettingsRepository {
    file_path: PathBuf,
}

impl JsonSettingsRepository {
    /// Create repository with XDG-compliant path
    pub fn new() -> RepositoryResult<Self> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| RepositoryError::Path("Cannot determine config directory".into()))?;

        let app_dir = config_dir.join("gemterm");
        let file_path = app_dir.join("settings.json");

        Ok(Self { file_path })
    }

    /// Create repository with custom path (tests, `--config-file`)
    pub fn with_path(file_path: PathBuf) -> Self {
        Self { file_path }
    }
}

impl SettingsRepository for JsonSettingsRepository {
    fn load(&self) -> BoxFuture<'static, RepositoryResult<SettingsModel>> {
        let path = self.file_path.clone();

        Box::pin(async move {
            // First run: nothing stored yet
            if !tokio::fs::try_exists(&path).await.unwrap_or(false) {
                return Ok(SettingsModel::default());
            }

            let contents = tokio::fs::read_to_string(&path)
                .await
                .map_err(|e| RepositoryError::Io(e.to_string()))?;

            let settings: SettingsModel = serde_json::from_str(&contents)
                .map_err(|e| RepositoryError::Serialization(e.to_string()))?;

            Ok(settings)
        })
    }

    fn save(&self, settings: SettingsModel) -> BoxFuture<'static, RepositoryResult<()>> {
        let path = self.file_path.clone();

        Box::pin(async move {
            let json = serde_json::to_string_pretty(&settings)
                .map_err(|e| RepositoryError::Serialization(e.to_string()))?;

            if let Some(parent) = path.parent() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|e| RepositoryError::Io(e.to_string()))?;
            }

            // Write atomically using temp file + rename
            let temp_path = path.with_extension(format!("json.{}.tmp", std::process::id()));
            tokio::fs::write(&temp_path, &json)
                .await
                .map_err(|e| RepositoryError::Io(e.to_string()))?;

            tokio::fs::rename(&temp_path, &path)
                .await
                .map_err(|e| RepositoryError::Io(e.to_string()))?;

            Ok(())
        })
    }

    fn storage_path(&self) -> String {
        self.file_path.to_string_lossy().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repository_in(dir: &tempfile::TempDir) -> JsonSettingsRepository {
        JsonSettingsRepository::with_path(dir.path().join("settings.json"))
    }

    #[tokio::test]
    async fn missing_file_loads_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let repo = repository_in(&dir);

        let settings = repo.load().await.unwrap();
        assert_eq!(settings, SettingsModel::default());
    }

    #[tokio::test]
    async fn settings_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let repo = repository_in(&dir);

        let settings = SettingsModel {
            model: "gemini-2.5-pro".into(),
            api_key: Some("AIza-test".into()),
            remember_key: true,
            dark_mode: true,
        };
        repo.save(settings.clone()).await.unwrap();

        assert_eq!(repo.load().await.unwrap(), settings);
    }

    #[tokio::test]
    async fn key_is_never_written_when_remember_is_off() {
        let dir = tempfile::tempdir().unwrap();
        let repo = repository_in(&dir);

        let settings = SettingsModel {
            api_key: Some("AIza-secret".into()),
            remember_key: false,
            ..SettingsModel::default()
        };
        repo.save(settings.storage_view()).await.unwrap();

        let raw = std::fs::read_to_string(repo.storage_path()).unwrap();
        assert!(!raw.contains("AIza-secret"));
        assert!(repo.load().await.unwrap().api_key.is_none());
    }

    #[tokio::test]
    async fn corrupt_file_surfaces_a_serialization_error() {
        let dir = tempfile::tempdir().unwrap();
        let repo = repository_in(&dir);
        std::fs::write(dir.path().join("settings.json"), "not json").unwrap();

        assert!(matches!(
            repo.load().await,
            Err(RepositoryError::Serialization(_))
        ));
    }
}
