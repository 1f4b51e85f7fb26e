use serde::{Deserialize, Serialize};

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Session configuration persisted to the settings file: model id, API
/// key, the remember-key flag, and the theme preference.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettingsModel {
    pub model: String,
    pub api_key: Option<String>,
    pub remember_key: bool,
    pub dark_mode: bool,
}

impl Default for SettingsModel {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            api_key: None,
            remember_key: true,
            dark_mode: false,
        }
    }
}

impl SettingsModel {
    /// Whether a usable credential is configured.
    pub fn has_api_key(&self) -> bool {
        self.api_key
            .as_deref()
            .is_some_and(|key| !key.trim().is_empty())
    }

    /// The form that goes to disk: the key is persisted only while
    /// remember-key is on.
    pub fn storage_view(&self) -> SettingsModel {
        let mut view = self.clone();
        if !view.remember_key {
            view.api_key = None;
        }
        view
    }
}
