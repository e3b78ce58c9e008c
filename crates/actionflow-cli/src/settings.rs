//! Optional settings file.
//!
//! ```yaml
//! layout:
//!   node-width: 240
//!   vertical-gap: 40
//! lint:
//!   extra-runner-labels: [gpu, arm64-large]
//! ```
//!
//! Every key is optional; missing ones keep their defaults.

use actionflow_core::workflow::{LayoutOptions, LintOptions};
use serde::Deserialize;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub layout: LayoutOptions,
    pub lint: LintOptions,
}

impl Settings {
    /// Load settings from `path`, or the defaults when no path is given.
    pub fn load(path: Option<&str>) -> Result<Self, String> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read settings file '{}': {}", path, e))?;
        let settings = Self::from_yaml(&content)
            .map_err(|e| format!("Invalid settings file '{}': {}", path, e))?;
        tracing::info!("Loaded settings from {}", path);
        Ok(settings)
    }

    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        // An empty file is null, not a mapping
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(yaml)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_settings() {
        let settings = Settings::from_yaml(
            "layout:\n  node-width: 240\nlint:\n  extra-runner-labels: [gpu]\n",
        )
        .unwrap();
        assert_eq!(settings.layout.node_width, 240.0);
        assert_eq!(settings.layout.node_height, 80.0);
        assert_eq!(settings.lint.extra_runner_labels, vec!["gpu".to_string()]);
    }

    #[test]
    fn test_empty_settings() {
        assert_eq!(Settings::from_yaml("").unwrap(), Settings::default());
        assert_eq!(Settings::load(None).unwrap(), Settings::default());
    }

    #[test]
    fn test_unknown_shape_is_rejected() {
        assert!(Settings::from_yaml("layout: wide\n").is_err());
    }
}
