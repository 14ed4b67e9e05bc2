use crate::models::{PresetsConfig, SettingsConfig, ThemeConfig};
use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use std::fs;

/// Settings store for loading and saving the persisted YAML documents.
///
/// Manages three documents under one data directory:
/// - Settings (`QRStudio Settings.yaml`): colors and the total-generated counter
/// - Theme (`QRStudio Theme.yaml`): dark/light preference
/// - Presets (`QRStudio Presets.yaml`): saved style snapshots, most recent ten
///
/// Each document is read once at startup and overwritten wholesale on change.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    data_dir: Utf8PathBuf,
    settings_path: Utf8PathBuf,
    theme_path: Utf8PathBuf,
    presets_path: Utf8PathBuf,
}

impl SettingsStore {
    /// Create a new SettingsStore with the specified data directory.
    ///
    /// # Arguments
    /// * `data_dir` - Directory containing the persisted documents (e.g., "QRStudio Data")
    pub fn new<P: AsRef<Utf8Path>>(data_dir: P) -> Result<Self> {
        let data_dir = data_dir.as_ref().to_path_buf();

        // Create the data directory if it doesn't exist
        if !data_dir.exists() {
            fs::create_dir_all(&data_dir)
                .with_context(|| format!("Failed to create data directory: {}", data_dir))?;
        }

        Ok(Self {
            settings_path: data_dir.join("QRStudio Settings.yaml"),
            theme_path: data_dir.join("QRStudio Theme.yaml"),
            presets_path: data_dir.join("QRStudio Presets.yaml"),
            data_dir,
        })
    }

    /// Load the settings document.
    ///
    /// # Returns
    /// The loaded SettingsConfig, or defaults if the file doesn't exist
    pub fn load_settings(&self) -> Result<SettingsConfig> {
        if !self.settings_path.exists() {
            tracing::warn!(
                "Settings file not found at {}, using defaults",
                self.settings_path
            );
            return Ok(SettingsConfig::default());
        }

        let file_contents = fs::read_to_string(&self.settings_path)
            .with_context(|| format!("Failed to read settings: {}", self.settings_path))?;

        let config: SettingsConfig = serde_yaml_ng::from_str(&file_contents)
            .with_context(|| format!("Failed to parse settings: {}", self.settings_path))?;

        tracing::info!("Loaded settings from {}", self.settings_path);
        Ok(config)
    }

    /// Save the settings document.
    pub fn save_settings(&self, config: &SettingsConfig) -> Result<()> {
        let yaml_string =
            serde_yaml_ng::to_string(config).context("Failed to serialize settings to YAML")?;

        fs::write(&self.settings_path, yaml_string)
            .with_context(|| format!("Failed to write settings: {}", self.settings_path))?;

        tracing::info!("Saved settings to {}", self.settings_path);
        Ok(())
    }

    /// Load the theme document.
    ///
    /// # Returns
    /// The loaded ThemeConfig, or the default (dark) if the file doesn't exist
    pub fn load_theme(&self) -> Result<ThemeConfig> {
        if !self.theme_path.exists() {
            tracing::debug!(
                "Theme file not found at {}, using default",
                self.theme_path
            );
            return Ok(ThemeConfig::default());
        }

        let file_contents = fs::read_to_string(&self.theme_path)
            .with_context(|| format!("Failed to read theme: {}", self.theme_path))?;

        let config: ThemeConfig = serde_yaml_ng::from_str(&file_contents)
            .with_context(|| format!("Failed to parse theme: {}", self.theme_path))?;

        Ok(config)
    }

    /// Save the theme document. Written on every toggle.
    pub fn save_theme(&self, config: &ThemeConfig) -> Result<()> {
        let yaml_string =
            serde_yaml_ng::to_string(config).context("Failed to serialize theme to YAML")?;

        fs::write(&self.theme_path, yaml_string)
            .with_context(|| format!("Failed to write theme: {}", self.theme_path))?;

        tracing::info!("Saved theme to {}", self.theme_path);
        Ok(())
    }

    /// Load the presets document.
    ///
    /// # Returns
    /// The loaded PresetsConfig, or an empty list if the file doesn't exist
    pub fn load_presets(&self) -> Result<PresetsConfig> {
        if !self.presets_path.exists() {
            tracing::debug!(
                "Presets file not found at {}, starting empty",
                self.presets_path
            );
            return Ok(PresetsConfig::default());
        }

        let file_contents = fs::read_to_string(&self.presets_path)
            .with_context(|| format!("Failed to read presets: {}", self.presets_path))?;

        let config: PresetsConfig = serde_yaml_ng::from_str(&file_contents)
            .with_context(|| format!("Failed to parse presets: {}", self.presets_path))?;

        tracing::info!(
            "Loaded {} presets from {}",
            config.presets.len(),
            self.presets_path
        );
        Ok(config)
    }

    /// Save the presets document.
    pub fn save_presets(&self, config: &PresetsConfig) -> Result<()> {
        let yaml_string =
            serde_yaml_ng::to_string(config).context("Failed to serialize presets to YAML")?;

        fs::write(&self.presets_path, yaml_string)
            .with_context(|| format!("Failed to write presets: {}", self.presets_path))?;

        tracing::info!("Saved presets to {}", self.presets_path);
        Ok(())
    }

    /// Get the data directory path.
    pub fn data_dir(&self) -> &Utf8Path {
        &self.data_dir
    }
}
