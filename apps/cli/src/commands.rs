use htmlstring::{
    Codec, CodecConfig, EscapeMode, HtmlStringError, IoContext, Result as CodecResult,
};
use std::error::Error;
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Command-line values that take precedence over the config file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub config: Option<PathBuf>,
    pub entities: Option<PathBuf>,
    pub mode: Option<EscapeMode>,
    pub named: bool,
}

impl Overrides {
    fn resolve(&self) -> CodecResult<CodecConfig> {
        let mut config = match &self.config {
            Some(path) => CodecConfig::load(path)?,
            None => CodecConfig::discover(&std::env::current_dir()?)?,
        };
        if let Some(mode) = self.mode {
            config.mode = mode;
        }
        if self.named {
            config.named = true;
        }
        if let Some(entities) = &self.entities {
            config.entities = Some(entities.clone());
        }
        debug!(?config, "resolved configuration");
        Ok(config)
    }
}

fn read_input(input: Option<&Path>) -> CodecResult<String> {
    match input {
        Some(path) if path != Path::new("-") => {
            fs::read_to_string(path).io_context("reading input", path)
        }
        _ => {
            let mut text = String::new();
            io::stdin().read_to_string(&mut text)?;
            Ok(text)
        }
    }
}

fn write_output(text: &str) -> io::Result<()> {
    let mut stdout = io::stdout().lock();
    stdout.write_all(text.as_bytes())?;
    stdout.flush()
}

pub fn escape_with(config: &CodecConfig, codec: &Codec, text: &str) -> String {
    if config.named && config.mode == EscapeMode::Unicode {
        warn!("named entities only apply to ascii mode; ignoring --named");
    }
    match (config.mode, config.named) {
        (EscapeMode::Ascii, true) => codec.escape_ascii_named(text),
        (mode, _) => codec.escape(text, mode),
    }
    .into_owned()
}

/// Resolves an entity name, tolerating the `&` and `;` delimiters, or with
/// `reverse` the canonical name of a literal value.
pub fn lookup_entity(codec: &Codec, value: &str, reverse: bool) -> CodecResult<String> {
    let entities = codec.entities();
    if reverse {
        return entities
            .name_for(value)
            .map(|name| format!("&{name};"))
            .ok_or_else(|| HtmlStringError::UnknownEntity {
                name: value.to_string(),
            });
    }

    let name = value.strip_prefix('&').unwrap_or(value);
    let name = name.strip_suffix(';').unwrap_or(name);
    entities
        .lookup_by_name(name)
        .map(str::to_string)
        .ok_or_else(|| HtmlStringError::UnknownEntity {
            name: name.to_string(),
        })
}

pub fn escape(overrides: &Overrides, input: Option<&Path>) -> Result<(), Box<dyn Error>> {
    let config = overrides.resolve()?;
    let codec = config.build_codec()?;
    let text = read_input(input)?;
    write_output(&escape_with(&config, &codec, &text))?;
    Ok(())
}

pub fn unescape(overrides: &Overrides, input: Option<&Path>) -> Result<(), Box<dyn Error>> {
    let codec = overrides.resolve()?.build_codec()?;
    let text = read_input(input)?;
    write_output(&codec.unescape(&text))?;
    Ok(())
}

pub fn entity(overrides: &Overrides, value: &str, reverse: bool) -> Result<(), Box<dyn Error>> {
    let codec = overrides.resolve()?.build_codec()?;
    let found = lookup_entity(&codec, value, reverse)?;
    println!("{found}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_escape_with_modes() {
        let codec = Codec::default();
        let mut config = CodecConfig::default();
        assert_eq!(escape_with(&config, &codec, "caf\u{e9} & co"), "caf\u{e9} &#38; co");

        config.mode = EscapeMode::Ascii;
        assert_eq!(escape_with(&config, &codec, "caf\u{e9} & co"), "caf&#233; &#38; co");

        config.named = true;
        assert_eq!(escape_with(&config, &codec, "caf\u{e9} & co"), "caf&eacute; &amp; co");
    }

    #[test]
    fn test_named_ignored_in_unicode_mode() {
        let config = CodecConfig {
            named: true,
            ..CodecConfig::default()
        };
        assert_eq!(escape_with(&config, &Codec::default(), "\u{e9}&"), "\u{e9}&#38;");
    }

    #[test]
    fn test_lookup_entity() {
        let codec = Codec::default();
        assert_eq!(lookup_entity(&codec, "aleph", false).unwrap(), "\u{2135}");
        assert_eq!(lookup_entity(&codec, "&amp;", false).unwrap(), "&");
        assert_eq!(lookup_entity(&codec, "\u{e9}", true).unwrap(), "&eacute;");
        assert!(matches!(
            lookup_entity(&codec, "swift", false),
            Err(HtmlStringError::UnknownEntity { .. })
        ));
    }

    #[test]
    fn test_read_input_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("input.html");
        fs::write(&path, "Fish &amp; Chips").unwrap();
        assert_eq!(read_input(Some(&path)).unwrap(), "Fish &amp; Chips");

        let missing = read_input(Some(&dir.path().join("missing.html")));
        assert!(matches!(missing, Err(HtmlStringError::IoAt { .. })));
    }

    #[test]
    fn test_overrides_take_precedence() {
        let dir = TempDir::new().unwrap();
        let config_path = dir.path().join("htmlstring.toml");
        fs::write(&config_path, "mode = \"unicode\"\n").unwrap();

        let overrides = Overrides {
            config: Some(config_path),
            mode: Some(EscapeMode::Ascii),
            named: true,
            ..Overrides::default()
        };
        let config = overrides.resolve().unwrap();
        assert_eq!(config.mode, EscapeMode::Ascii);
        assert!(config.named);
    }
}
