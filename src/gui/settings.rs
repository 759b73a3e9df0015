use std::path::PathBuf;

/// Everything the app remembers between runs. Unknown or missing fields fall
/// back to defaults so old settings files keep loading after upgrades.
#[derive(Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SettingsData {
    pub dark_mode: bool,
    pub zoom: f32,
    pub data_path: Option<PathBuf>,
}

impl Default for SettingsData {
    fn default() -> Self {
        Self { dark_mode: true, zoom: 1.1, data_path: None }
    }
}
