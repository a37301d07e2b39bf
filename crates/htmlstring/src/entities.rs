//! Entity names (without `&` and `;`) to literal values, and back.

use crate::entity_data::HTML5_ENTITIES;
use crate::error::{HtmlStringError, IoContext, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::{Arc, LazyLock};
use tracing::{debug, warn};

/// Names that win over the general ranking when several share a value.
const PREFERRED_NAMES: &[(&str, &str)] = &[
    ("\u{2aaf}\u{338}", "npreceq"),
    ("\u{2ab0}\u{338}", "nsucceq"),
];

static SHARED: LazyLock<Arc<EntityTable>> = LazyLock::new(|| Arc::new(EntityTable::html5()));

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntityTable {
    by_name: HashMap<String, String>,
    by_value: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct JsonEntity {
    characters: String,
}

impl EntityTable {
    pub fn html5() -> Self {
        let table = Self::from_pairs(HTML5_ENTITIES.iter().copied());
        debug!(entries = table.len(), "built html5 entity table");
        table
    }

    pub fn shared() -> Arc<EntityTable> {
        Arc::clone(&SHARED)
    }

    pub fn from_pairs<I, N, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (N, V)>,
        N: Into<String>,
        V: Into<String>,
    {
        let mut table = Self::default();
        for (name, value) in pairs {
            let (name, value) = (name.into(), value.into());
            if let Err(error) = validate_entry(&name, &value) {
                warn!(%error, "skipping entity");
                continue;
            }
            table.insert(name, value);
        }
        table
    }

    /// Keys without a trailing `;` are legacy aliases and are skipped.
    pub fn from_json(json: &str) -> Result<Self> {
        Self::parse_json(json, None)
    }

    pub fn load_json(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).io_context("reading entities", path)?;
        Self::parse_json(&content, Some(path))
    }

    fn parse_json(json: &str, path: Option<&Path>) -> Result<Self> {
        let raw: HashMap<String, JsonEntity> =
            serde_json::from_str(json).map_err(|error| HtmlStringError::JsonParse {
                path: path.map(Path::to_path_buf),
                message: error.to_string(),
            })?;

        let mut table = Self::default();
        for (key, entity) in raw {
            let name = key.strip_prefix('&').unwrap_or(&key);
            let Some(name) = name.strip_suffix(';') else {
                continue;
            };
            validate_entry(name, &entity.characters)?;
            table.insert(name.to_string(), entity.characters);
        }

        debug!(entries = table.len(), "loaded entity table from json");
        Ok(table)
    }

    fn insert(&mut self, name: String, value: String) {
        match self.by_value.get(&value) {
            Some(current) if !is_preferred_name(&value, &name, current) => {}
            _ => {
                self.by_value.insert(value.clone(), name.clone());
            }
        }
        if let Some(previous) = self.by_name.insert(name.clone(), value) {
            // A redefined name may have been the canonical name for its old value.
            if self.by_value.get(&previous) == Some(&name) {
                self.by_value.remove(&previous);
                let replacement = self
                    .by_name
                    .iter()
                    .filter(|(_, value)| **value == previous)
                    .map(|(name, _)| name)
                    .fold(None::<&String>, |best, candidate| match best {
                        Some(best) if !is_preferred_name(&previous, candidate, best) => Some(best),
                        _ => Some(candidate),
                    })
                    .cloned();
                if let Some(replacement) = replacement {
                    self.by_value.insert(previous, replacement);
                }
            }
        }
    }

    pub fn extend(&mut self, other: &EntityTable) {
        let mut names: Vec<&String> = other.by_name.keys().collect();
        names.sort();
        for name in names {
            self.insert(name.clone(), other.by_name[name].clone());
        }
    }

    pub fn lookup_by_name(&self, name: &str) -> Option<&str> {
        self.by_name.get(name).map(String::as_str)
    }

    pub fn name_for(&self, value: &str) -> Option<&str> {
        self.by_value.get(value).map(String::as_str)
    }

    pub fn contains_name(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

fn is_preferred_name(value: &str, candidate: &str, current: &str) -> bool {
    let listed = |name: &str| PREFERRED_NAMES.contains(&(value, name));
    match (listed(candidate), listed(current)) {
        (true, false) => return true,
        (false, true) => return false,
        _ => {}
    }
    // Lowercase names first, then the shortest, then byte order.
    let rank = |name: &str| {
        (
            name.bytes().any(|byte| byte.is_ascii_uppercase()),
            name.len(),
        )
    };
    (rank(candidate), candidate) < (rank(current), current)
}

/// Rejects names that `&name;` could not reproduce when unescaped.
fn validate_entry(name: &str, value: &str) -> Result<()> {
    let invalid = |message: &str| HtmlStringError::InvalidEntity {
        name: name.to_string(),
        message: message.to_string(),
    };
    if name.is_empty() {
        return Err(invalid("name is empty"));
    }
    if name.starts_with('#') {
        return Err(invalid("names starting with '#' are numeric references"));
    }
    if name.contains(['&', ';']) {
        return Err(invalid("name contains a delimiter"));
    }
    if value.is_empty() {
        return Err(invalid("value is empty"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_html5_lookup() {
        let table = EntityTable::html5();
        assert_eq!(table.lookup_by_name("amp"), Some("&"));
        assert_eq!(table.lookup_by_name("aleph"), Some("\u{2135}"));
        assert_eq!(table.lookup_by_name("nsucceq"), Some("\u{2ab0}\u{338}"));
        assert_eq!(table.lookup_by_name("fjlig"), Some("fj"));
    }

    #[test]
    fn test_lookup_is_exact_and_case_sensitive() {
        let table = EntityTable::html5();
        assert_eq!(table.lookup_by_name("swift"), None);
        assert_eq!(table.lookup_by_name("am"), None);
        assert_eq!(table.lookup_by_name("amp;"), None);
        assert_eq!(table.lookup_by_name("&amp"), None);
        assert_eq!(table.lookup_by_name("Aleph"), None);
        assert_eq!(table.lookup_by_name("AMP"), Some("&"));
    }

    #[test]
    fn test_html5_has_only_terminated_names() {
        let table = EntityTable::html5();
        assert_eq!(table.len(), 2125);
        assert!(!table.contains_name("amp;"));
    }

    #[test]
    fn test_shared_is_built_once() {
        let first = EntityTable::shared();
        let second = EntityTable::shared();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.lookup_by_name("lt"), Some("<"));
    }

    #[test]
    fn test_canonical_name() {
        let table = EntityTable::html5();
        assert_eq!(table.name_for("&"), Some("amp"));
        assert_eq!(table.name_for("\u{2ab0}\u{338}"), Some("nsucceq"));
        assert_eq!(table.name_for("<"), Some("lt"));
        assert_eq!(table.name_for("\u{2aaf}\u{338}"), Some("npreceq"));
        assert_eq!(table.name_for("{"), Some("lcub"));
        assert_eq!(table.name_for("\u{a0}"), Some("nbsp"));
        assert_eq!(table.name_for("\u{1f643}"), None);
    }

    #[test]
    fn test_from_pairs_is_isolated() {
        let table = EntityTable::from_pairs([("swift", "\u{1f426}")]);
        assert_eq!(table.lookup_by_name("swift"), Some("\u{1f426}"));
        assert_eq!(table.lookup_by_name("amp"), None);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_preferred_names_resolve_to_their_value() {
        let table = EntityTable::html5();
        for (value, name) in PREFERRED_NAMES {
            assert_eq!(table.lookup_by_name(name), Some(*value));
            assert_eq!(table.name_for(value), Some(*name));
        }
    }

    #[test]
    fn test_from_pairs_skips_unusable_names() {
        let table = EntityTable::from_pairs([
            ("#49", "\u{e9}"),
            ("", "x"),
            ("a;b", "y"),
            ("a&b", "y"),
            ("blank", ""),
            ("eacute", "\u{e9}"),
        ]);
        assert_eq!(table.len(), 1);
        assert_eq!(table.name_for("\u{e9}"), Some("eacute"));
        assert!(!table.contains_name("#49"));
    }

    #[test]
    fn test_redefined_name_updates_reverse_mapping() {
        let mut table = EntityTable::from_pairs([("a", "1"), ("bb", "1")]);
        assert_eq!(table.name_for("1"), Some("a"));
        table.extend(&EntityTable::from_pairs([("a", "2")]));
        assert_eq!(table.lookup_by_name("a"), Some("2"));
        assert_eq!(table.name_for("1"), Some("bb"));
        assert_eq!(table.name_for("2"), Some("a"));
    }

    #[test]
    fn test_from_json() {
        let json = r#"{
            "&swift;": { "codepoints": [128038], "characters": "🐦" },
            "&swift": { "codepoints": [128038], "characters": "🐦" },
            "&rust;": { "codepoints": [129408], "characters": "🦀" }
        }"#;
        let table = EntityTable::from_json(json).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.lookup_by_name("swift"), Some("\u{1f426}"));
        assert_eq!(table.lookup_by_name("rust"), Some("\u{1f980}"));
    }

    #[test]
    fn test_from_json_rejects_malformed() {
        assert!(matches!(
            EntityTable::from_json("[1, 2]"),
            Err(HtmlStringError::JsonParse { path: None, .. })
        ));
        assert!(matches!(
            EntityTable::from_json(r#"{ "&#12;": { "characters": "x" } }"#),
            Err(HtmlStringError::InvalidEntity { .. })
        ));
        assert!(matches!(
            EntityTable::from_json(r#"{ "&empty;": { "characters": "" } }"#),
            Err(HtmlStringError::InvalidEntity { .. })
        ));
    }

    #[test]
    fn test_load_json_reports_path() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("entities.json");
        fs::write(&path, "{ not json").unwrap();
        let error = EntityTable::load_json(&path).unwrap_err();
        assert!(error.to_string().contains("entities.json"));
    }

    #[test]
    fn test_extend_overrides() {
        let mut table = EntityTable::html5();
        table.extend(&EntityTable::from_pairs([("amp", "and"), ("swift", "S")]));
        assert_eq!(table.lookup_by_name("amp"), Some("and"));
        assert_eq!(table.lookup_by_name("swift"), Some("S"));
        assert_eq!(table.name_for("&"), Some("AMP"));
    }
}
