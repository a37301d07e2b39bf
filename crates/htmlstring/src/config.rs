use crate::codec::Codec;
use crate::entities::EntityTable;
use crate::error::{HtmlStringError, IoContext, Result};
use crate::escape::EscapeMode;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

pub const CONFIG_FILE_NAME: &str = "htmlstring.toml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CodecConfig {
    #[serde(default)]
    pub mode: EscapeMode,
    #[serde(default)]
    pub named: bool,
    /// Extra entities in the WHATWG `entities.json` format.
    #[serde(default)]
    pub entities: Option<PathBuf>,
    #[serde(default)]
    pub replace_builtin: bool,
}

impl CodecConfig {
    /// A relative `entities` path is resolved against the config's directory.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(HtmlStringError::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }

        let content = fs::read_to_string(path).io_context("reading config", path)?;
        let mut config: CodecConfig =
            toml::from_str(&content).map_err(|error| HtmlStringError::TomlParse {
                path: path.to_path_buf(),
                message: error.to_string(),
            })?;

        if let Some(parent) = path.parent() {
            config.entities = config.entities.take().map(|entities| {
                if entities.is_relative() {
                    parent.join(entities)
                } else {
                    entities
                }
            });
        }

        debug!(path = %path.display(), mode = ?config.mode, "loaded config");
        Ok(config)
    }

    pub fn discover(dir: &Path) -> Result<Self> {
        let path = dir.join(CONFIG_FILE_NAME);
        if path.exists() {
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn entity_table(&self) -> Result<Arc<EntityTable>> {
        let Some(path) = &self.entities else {
            if self.replace_builtin {
                return Err(HtmlStringError::InvalidConfig {
                    message: "replace_builtin needs an entities file".to_string(),
                });
            }
            return Ok(EntityTable::shared());
        };

        let custom = EntityTable::load_json(path)?;
        if self.replace_builtin {
            return Ok(Arc::new(custom));
        }
        let mut table = EntityTable::html5();
        table.extend(&custom);
        Ok(Arc::new(table))
    }

    pub fn build_codec(&self) -> Result<Codec> {
        Ok(Codec::new(self.entity_table()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config: CodecConfig = toml::from_str("").unwrap();
        assert_eq!(config, CodecConfig::default());
        assert_eq!(config.mode, EscapeMode::Unicode);
        assert!(!config.named);
    }

    #[test]
    fn test_load_resolves_relative_entities() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(
            &path,
            "mode = \"ascii\"\nnamed = true\nentities = \"extra.json\"\n",
        )
        .unwrap();

        let config = CodecConfig::load(&path).unwrap();
        assert_eq!(config.mode, EscapeMode::Ascii);
        assert!(config.named);
        assert_eq!(config.entities, Some(dir.path().join("extra.json")));
    }

    #[test]
    fn test_load_missing() {
        let dir = TempDir::new().unwrap();
        let result = CodecConfig::load(&dir.path().join("missing.toml"));
        assert!(matches!(result, Err(HtmlStringError::ConfigNotFound { .. })));
    }

    #[test]
    fn test_load_rejects_unknown_fields() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "mode = \"ebcdic\"\n").unwrap();
        assert!(matches!(
            CodecConfig::load(&path),
            Err(HtmlStringError::TomlParse { .. })
        ));

        fs::write(&path, "colour = true\n").unwrap();
        assert!(matches!(
            CodecConfig::load(&path),
            Err(HtmlStringError::TomlParse { .. })
        ));
    }

    #[test]
    fn test_discover_falls_back_to_defaults() {
        let dir = TempDir::new().unwrap();
        assert_eq!(
            CodecConfig::discover(dir.path()).unwrap(),
            CodecConfig::default()
        );
    }

    #[test]
    fn test_custom_entities_extend_builtin() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("extra.json"),
            r#"{ "&swift;": { "codepoints": [128038], "characters": "🐦" } }"#,
        )
        .unwrap();
        fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            "entities = \"extra.json\"\n",
        )
        .unwrap();

        let codec = CodecConfig::discover(dir.path())
            .unwrap()
            .build_codec()
            .unwrap();
        assert_eq!(codec.unescape("&swift; &amp;"), "\u{1f426} &");
    }

    #[test]
    fn test_custom_entities_replace_builtin() {
        let dir = TempDir::new().unwrap();
        let entities = dir.path().join("extra.json");
        fs::write(
            &entities,
            r#"{ "&swift;": { "codepoints": [128038], "characters": "🐦" } }"#,
        )
        .unwrap();

        let config = CodecConfig {
            entities: Some(entities),
            replace_builtin: true,
            ..CodecConfig::default()
        };
        let codec = config.build_codec().unwrap();
        assert_eq!(codec.unescape("&swift; &amp;"), "\u{1f426} &amp;");
        assert_eq!(codec.entities().len(), 1);
    }

    #[test]
    fn test_replace_builtin_requires_entities() {
        let config = CodecConfig {
            replace_builtin: true,
            ..CodecConfig::default()
        };
        assert!(matches!(
            config.entity_table(),
            Err(HtmlStringError::InvalidConfig { .. })
        ));
        assert!(config.build_codec().is_err());
    }

    #[test]
    fn test_default_uses_shared_table() {
        let table = CodecConfig::default().entity_table().unwrap();
        assert!(Arc::ptr_eq(&table, &EntityTable::shared()));
    }
}
