use serde::{Deserialize, Serialize};

/// Maximum number of saved style presets kept on disk.
///
/// When the list grows past this, the oldest entries are discarded so the
/// file always holds the most recent ten.
pub const MAX_SAVED_PRESETS: usize = 10;

/// Settings document from QRStudio Settings.yaml
///
/// The only data that outlives a session: the color pair and the
/// total-generated counter. Written wholesale after every successful
/// generation and after a settings reset.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SettingsConfig {
    #[serde(rename = "QRStudio_Settings", default)]
    pub studio: StudioSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudioSettings {
    #[serde(rename = "Foreground Color", default = "default_foreground")]
    pub foreground_color: String,

    #[serde(rename = "Background Color", default = "default_background")]
    pub background_color: String,

    #[serde(rename = "Total Generated", default)]
    pub total_generated: u64,
}

impl Default for StudioSettings {
    fn default() -> Self {
        Self {
            foreground_color: default_foreground(),
            background_color: default_background(),
            total_generated: 0,
        }
    }
}

fn default_foreground() -> String {
    "#3b82f6".to_string()
}

fn default_background() -> String {
    "#0f172a".to_string()
}

/// UI theme preference, stored under its own file so toggling the theme
/// never rewrites the settings document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Dark => "dark",
            Theme::Light => "light",
        }
    }
}

/// Theme document from QRStudio Theme.yaml
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ThemeConfig {
    #[serde(rename = "Theme", default)]
    pub theme: Theme,
}

/// A saved style snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preset {
    #[serde(rename = "Name")]
    pub name: String,

    #[serde(rename = "Foreground Color")]
    pub foreground_color: String,

    #[serde(rename = "Background Color")]
    pub background_color: String,

    #[serde(rename = "Size")]
    pub pixel_size: u32,

    #[serde(rename = "Margin")]
    pub margin: u32,

    #[serde(rename = "Error Correction")]
    pub error_correction: String,
}

/// Preset list document from QRStudio Presets.yaml
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PresetsConfig {
    #[serde(rename = "QRStudio_Presets", default)]
    pub presets: Vec<Preset>,
}

impl PresetsConfig {
    /// Append a preset, dropping the oldest entries beyond the cap.
    pub fn push_capped(&mut self, preset: Preset) {
        self.presets.push(preset);
        if self.presets.len() > MAX_SAVED_PRESETS {
            let excess = self.presets.len() - MAX_SAVED_PRESETS;
            self.presets.drain(..excess);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_studio_settings_defaults() {
        let settings = StudioSettings::default();
        assert_eq!(settings.foreground_color, "#3b82f6");
        assert_eq!(settings.background_color, "#0f172a");
        assert_eq!(settings.total_generated, 0);
    }

    #[test]
    fn test_theme_toggle() {
        assert_eq!(Theme::Dark.toggled(), Theme::Light);
        assert_eq!(Theme::Light.toggled(), Theme::Dark);
        assert_eq!(Theme::default(), Theme::Dark);
    }

    #[test]
    fn test_preset_cap_keeps_most_recent() {
        let mut config = PresetsConfig::default();
        for i in 0..15 {
            config.push_capped(Preset {
                name: format!("Preset {}", i),
                foreground_color: "#3b82f6".to_string(),
                background_color: "#0f172a".to_string(),
                pixel_size: 300,
                margin: 20,
                error_correction: "H".to_string(),
            });
        }

        assert_eq!(config.presets.len(), MAX_SAVED_PRESETS);
        assert_eq!(config.presets.first().unwrap().name, "Preset 5");
        assert_eq!(config.presets.last().unwrap().name, "Preset 14");
    }
}
