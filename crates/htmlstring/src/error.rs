use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum HtmlStringError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("IO error while {action} {path}: {source}")]
    IoAt {
        action: &'static str,
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("TOML parse error in {path}: {message}")]
    TomlParse { path: PathBuf, message: String },

    #[error("JSON parse error in {}: {message}", source_label(.path))]
    JsonParse {
        path: Option<PathBuf>,
        message: String,
    },

    #[error("Config file not found: {path}")]
    ConfigNotFound { path: PathBuf },

    #[error("Invalid entity '{name}': {message}")]
    InvalidEntity { name: String, message: String },

    #[error("Invalid config: {message}")]
    InvalidConfig { message: String },

    #[error("Unknown entity: {name}")]
    UnknownEntity { name: String },
}

fn source_label(path: &Option<PathBuf>) -> String {
    match path {
        Some(path) => path.display().to_string(),
        None => "<inline>".to_string(),
    }
}

pub type Result<T> = std::result::Result<T, HtmlStringError>;

pub trait IoContext<T> {
    fn io_context(self, action: &'static str, path: &Path) -> Result<T>;
}

impl<T> IoContext<T> for std::result::Result<T, std::io::Error> {
    fn io_context(self, action: &'static str, path: &Path) -> Result<T> {
        self.map_err(|source| HtmlStringError::IoAt {
            action,
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_context_names_action_and_path() {
        let raw: std::result::Result<(), std::io::Error> = Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "missing",
        ));
        let error = raw
            .io_context("reading input", Path::new("page.html"))
            .unwrap_err();
        let message = error.to_string();
        assert!(message.contains("reading input"));
        assert!(message.contains("page.html"));
        assert!(message.contains("missing"));
    }

    #[test]
    fn test_json_parse_without_path() {
        let error = HtmlStringError::JsonParse {
            path: None,
            message: "expected value".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "JSON parse error in <inline>: expected value"
        );
    }
}
