use crate::entities::EntityTable;
use crate::escape::{EscapeMode, escape_character, escape_text};
use crate::unescape::unescape_text;
use std::borrow::Cow;
use std::sync::{Arc, LazyLock};

static SHARED: LazyLock<Codec> = LazyLock::new(Codec::default);

#[derive(Debug, Clone)]
pub struct Codec {
    entities: Arc<EntityTable>,
}

impl Default for Codec {
    fn default() -> Self {
        Self::new(EntityTable::shared())
    }
}

impl Codec {
    pub fn new(entities: Arc<EntityTable>) -> Self {
        Self { entities }
    }

    /// The codec over the process-wide HTML5 table.
    pub fn shared() -> &'static Codec {
        &SHARED
    }

    pub fn entities(&self) -> &EntityTable {
        &self.entities
    }

    pub fn escape<'a>(&self, text: &'a str, mode: EscapeMode) -> Cow<'a, str> {
        escape_text(text, mode, None)
    }

    pub fn escape_unicode<'a>(&self, text: &'a str) -> Cow<'a, str> {
        escape_text(text, EscapeMode::Unicode, None)
    }

    pub fn escape_ascii<'a>(&self, text: &'a str) -> Cow<'a, str> {
        escape_text(text, EscapeMode::Ascii, None)
    }

    pub fn escape_ascii_named<'a>(&self, text: &'a str) -> Cow<'a, str> {
        escape_text(text, EscapeMode::Ascii, Some(self.entities.as_ref()))
    }

    pub fn escape_character_unicode<'a>(&self, character: &'a str) -> Cow<'a, str> {
        escape_character(character, EscapeMode::Unicode, None)
    }

    pub fn escape_character_ascii<'a>(&self, character: &'a str) -> Cow<'a, str> {
        escape_character(character, EscapeMode::Ascii, None)
    }

    pub fn escape_character_ascii_named<'a>(&self, character: &'a str) -> Cow<'a, str> {
        escape_character(character, EscapeMode::Ascii, Some(self.entities.as_ref()))
    }

    pub fn unescape<'a>(&self, text: &'a str) -> Cow<'a, str> {
        unescape_text(text, &self.entities)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TRICKY_INPUTS: &[&str] = &[
        "",
        "Hello, world.",
        "Fish & Chips",
        "Fish & chips &amp; sauce",
        "a \u{2ab0}\u{338} b",
        "Hey \u{1f643}!",
        "Going to the \u{1f1fa}\u{1f1f8} next June",
        "e\u{301} <\u{338} caf\u{e9}",
        "line one\r\nline two\n",
        "&#4_9; &swift; &#xd8ff; &amp;&amp;",
        "{\"key\": [1, 2]} @user `code` 100% $5 + tax = =",
        "\u{1f468}\u{200d}\u{1f469}\u{200d}\u{1f467} family",
    ];

    #[test]
    fn test_round_trip() {
        let codec = Codec::default();
        for input in TRICKY_INPUTS {
            assert_eq!(codec.unescape(&codec.escape_unicode(input)), *input);
            assert_eq!(codec.unescape(&codec.escape_ascii(input)), *input);
            assert_eq!(codec.unescape(&codec.escape_ascii_named(input)), *input);
        }
    }

    #[test]
    fn test_ascii_output_is_ascii() {
        let codec = Codec::default();
        for input in TRICKY_INPUTS {
            assert!(codec.escape_ascii(input).is_ascii());
            assert!(codec.escape_ascii_named(input).is_ascii());
        }
    }

    #[test]
    fn test_escape_dispatch() {
        let codec = Codec::default();
        assert_eq!(codec.escape("\u{3a3}", EscapeMode::Unicode), "\u{3a3}");
        assert_eq!(codec.escape("\u{3a3}", EscapeMode::Ascii), "&#931;");
    }

    #[test]
    fn test_character_variants() {
        let codec = Codec::default();
        assert_eq!(codec.escape_character_ascii("&"), "&#38;");
        assert_eq!(codec.escape_character_unicode("&"), "&#38;");
        assert_eq!(codec.escape_character_ascii("\u{1f643}"), "&#128579;");
        assert_eq!(codec.escape_character_unicode("\u{1f643}"), "\u{1f643}");
        assert_eq!(
            codec.escape_character_ascii_named("\u{2ab0}\u{338}"),
            "&nsucceq;"
        );
    }

    #[test]
    fn test_named_escaping_round_trips_custom_tables() {
        let table = EntityTable::from_pairs([("#49", "\u{e9}"), ("x;y", "x")]);
        let codec = Codec::new(Arc::new(table));
        let escaped = codec.escape_ascii_named("\u{e9}x");
        assert_eq!(escaped, "&#233;x");
        assert_eq!(codec.unescape(&escaped), "\u{e9}x");
    }

    #[test]
    fn test_shared_codec() {
        assert!(std::ptr::eq(Codec::shared(), Codec::shared()));
        assert!(Arc::ptr_eq(
            &Codec::shared().entities,
            &EntityTable::shared()
        ));
    }

    #[test]
    fn test_isolated_tables() {
        let codec = Codec::new(Arc::new(EntityTable::from_pairs([("and", "&")])));
        assert_eq!(codec.escape_ascii_named("Fish & Chips"), "Fish &and; Chips");
        assert_eq!(codec.unescape("Fish &and; Chips &amp;"), "Fish & Chips &amp;");
        assert_eq!(Codec::default().unescape("&amp;"), "&");
    }
}
