//! Viewer settings persisted as JSON.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::Result;
use crate::policy::AttachmentPolicy;

/// Placeholder shown while a remote fetch is running.
pub const LOADING_PLACEHOLDER_URI: &str = "about:mailview/loading";

/// Placeholder shown when there is nothing to display.
pub const EMPTY_PLACEHOLDER_URI: &str = "about:blank";

/// Settings that shape how the viewer loads and offers content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerSettings {
    /// Whether incomplete messages may be fetched from the remote service.
    pub allow_remote_fetch: bool,
    /// Page displayed while a remote fetch is in progress.
    pub loading_placeholder_uri: String,
    /// Page displayed when a remote fetch fails.
    pub empty_placeholder_uri: String,
    /// Rules for offering attachment actions.
    pub attachment_policy: AttachmentPolicy,
    /// Where saved attachments go. Defaults to the user's download directory.
    pub download_dir: Option<PathBuf>,
}

impl Default for ViewerSettings {
    fn default() -> Self {
        Self {
            allow_remote_fetch: true,
            loading_placeholder_uri: LOADING_PLACEHOLDER_URI.to_string(),
            empty_placeholder_uri: EMPTY_PLACEHOLDER_URI.to_string(),
            attachment_policy: AttachmentPolicy::default(),
            download_dir: None,
        }
    }
}

impl ViewerSettings {
    /// Default settings file location.
    #[must_use]
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("mailview")
            .join("settings.json")
    }

    /// Directory attachments are saved into.
    #[must_use]
    pub fn resolved_download_dir(&self) -> Option<PathBuf> {
        self.download_dir.clone().or_else(dirs::download_dir)
    }

    /// Load settings from the default location.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub async fn load() -> Result<Self> {
        Self::load_from(&Self::default_path()).await
    }

    /// Load settings from `path`, falling back to defaults if it is missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub async fn load_from(path: &std::path::Path) -> Result<Self> {
        if !tokio::fs::try_exists(path).await? {
            return Ok(Self::default());
        }

        let contents = tokio::fs::read_to_string(path).await?;
        Ok(serde_json::from_str(&contents)?)
    }

    /// Save settings to `path`, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub async fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let contents = serde_json::to_string_pretty(self)?;
        tokio::fs::write(path, contents).await?;

        tracing::info!("Settings saved to {:?}", path);
        Ok(())
    }
}
