//! Engine configuration — `.attribution.toml`
//!
//! Lets an embedding application pick the default rendering format, the label
//! shown for unrecognised licences, and extra jurisdiction ports that the
//! built-in table does not know about.

use crate::evaluation::{
    AttributionFormat, AttributionGenerator, AttributionOptions, DialogueEvaluation,
};
use crate::{AttributionError, AttributionResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Engine-level configuration (loaded from `.attribution.toml`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttributionConfig {
    /// Default rendering options
    #[serde(default)]
    pub rendering: RenderingConfig,

    /// Text shown in place of a licence name when detection failed
    #[serde(default = "default_unknown_label")]
    pub unknown_licence_label: String,

    /// Extra regional tokens → legal-code URL, merged over the built-in table
    #[serde(default)]
    pub ported_licences: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderingConfig {
    #[serde(default)]
    pub format: AttributionFormat,

    /// Link the licence (HTML) or print its legal-code URL (text)
    #[serde(default = "default_true")]
    pub licence_link: bool,
}

fn default_unknown_label() -> String {
    crate::licence::UNKNOWN_LICENCE_NAME.to_string()
}
fn default_true() -> bool {
    true
}

impl Default for RenderingConfig {
    fn default() -> Self {
        Self {
            format: AttributionFormat::Text,
            licence_link: true,
        }
    }
}

impl Default for AttributionConfig {
    fn default() -> Self {
        Self {
            rendering: RenderingConfig::default(),
            unknown_licence_label: default_unknown_label(),
            ported_licences: BTreeMap::new(),
        }
    }
}

impl AttributionConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> AttributionResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> AttributionResult<Self> {
        toml::from_str(content)
            .map_err(|e| AttributionError::Config(format!("Failed to parse configuration: {}", e)))
    }

    /// Try `.attribution.toml`, then `attribution.toml`, then defaults
    pub fn from_project_root(root: &Path) -> Self {
        for name in [".attribution.toml", "attribution.toml"] {
            let path = root.join(name);
            if !path.exists() {
                continue;
            }
            match Self::from_file(&path) {
                Ok(config) => {
                    tracing::info!("Loaded attribution config from {}", path.display());
                    return config;
                }
                Err(e) => {
                    tracing::warn!("Failed to load {}: {}", path.display(), e);
                }
            }
        }
        Self::default()
    }

    /// Rendering options seeded from this configuration
    pub fn default_options(&self) -> AttributionOptions {
        AttributionOptions {
            format: self.rendering.format,
            licence_link: self.rendering.licence_link,
            ..AttributionOptions::default()
        }
    }

    /// Generator for `evaluation` with the configured options and label
    pub fn attribution_generator(
        &self,
        evaluation: &DialogueEvaluation,
    ) -> AttributionResult<AttributionGenerator> {
        Ok(evaluation
            .attribution_generator(self.default_options())?
            .with_unknown_licence_label(self.unknown_licence_label.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AttributionConfig::default();
        assert_eq!(config.rendering.format, AttributionFormat::Text);
        assert!(config.rendering.licence_link);
        assert_eq!(config.unknown_licence_label, "Unknown licence");
        assert!(config.ported_licences.is_empty());
    }

    #[test]
    fn test_config_toml_parse() {
        let toml_str = r#"
            unknown_licence_label = "Lizenz unbekannt"

            [rendering]
            format = "html"
            licence_link = false

            [ported_licences]
            "cc-by-sa-3.0-xk" = "https://example.org/by-sa/3.0/xk/legalcode"
        "#;
        let config = AttributionConfig::from_toml(toml_str).unwrap();
        assert_eq!(config.rendering.format, AttributionFormat::Html);
        assert!(!config.rendering.licence_link);
        assert_eq!(config.unknown_licence_label, "Lizenz unbekannt");
        assert_eq!(config.ported_licences.len(), 1);

        let opts = config.default_options();
        assert_eq!(opts.format, AttributionFormat::Html);
        assert!(!opts.licence_link);
        assert!(!opts.licence_only);
    }

    #[test]
    fn test_generator_uses_configured_label() {
        use crate::asset::{Asset, AssetRecord, Author};
        use crate::dialogue::Dialogue;
        use crate::licence::{Licence, LicenceStore};
        use std::sync::Arc;

        let config = AttributionConfig::from_toml("unknown_licence_label = \"Lizenz unbekannt\"").unwrap();
        let asset = Arc::new(Asset::generic(
            AssetRecord::new(Licence::unknown())
                .title("Sunset")
                .author(Author::new("Jane Doe")),
        ));
        let d = Dialogue::new(asset, Arc::new(LicenceStore::with_defaults().unwrap()));
        let text = config
            .attribution_generator(&d.evaluation())
            .unwrap()
            .generate(false)
            .unwrap();
        assert_eq!(text, "Jane Doe, \"Sunset\", Lizenz unbekannt");
    }

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config = AttributionConfig::from_toml("").unwrap();
        assert!(config.rendering.licence_link);
        assert_eq!(config.unknown_licence_label, "Unknown licence");
    }

    #[test]
    fn test_bad_toml_is_config_error() {
        let err = AttributionConfig::from_toml("rendering = 3").unwrap_err();
        assert!(matches!(err, AttributionError::Config(_)));
    }

    #[test]
    fn test_from_project_root() {
        let dir = tempfile::TempDir::new().unwrap();
        assert_eq!(
            AttributionConfig::from_project_root(dir.path()).rendering.format,
            AttributionFormat::Text
        );

        std::fs::write(
            dir.path().join("attribution.toml"),
            "[rendering]\nformat = \"html\"\n",
        )
        .unwrap();
        assert_eq!(
            AttributionConfig::from_project_root(dir.path()).rendering.format,
            AttributionFormat::Html
        );

        // an unparsable .attribution.toml falls through to attribution.toml
        std::fs::write(dir.path().join(".attribution.toml"), "not = [valid").unwrap();
        assert_eq!(
            AttributionConfig::from_project_root(dir.path()).rendering.format,
            AttributionFormat::Html
        );
    }
}
