use crate::entities::EntityTable;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt::Write;
use unicode_segmentation::UnicodeSegmentation;

pub const REQUIRED_ESCAPES: [char; 17] = [
    '!', '"', '$', '%', '&', '\'', '+', ',', '<', '=', '>', '@', '[', ']', '`', '{', '}',
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EscapeMode {
    #[default]
    Unicode,
    Ascii,
}

pub fn is_required_escape(character: char) -> bool {
    REQUIRED_ESCAPES.contains(&character)
}

impl EscapeMode {
    pub fn requires_escape(self, grapheme: &str) -> bool {
        match self {
            EscapeMode::Unicode => grapheme.chars().any(is_required_escape),
            EscapeMode::Ascii => {
                let mut scalars = grapheme.chars();
                match (scalars.next(), scalars.next()) {
                    (Some(scalar), None) => !scalar.is_ascii() || is_required_escape(scalar),
                    _ => true,
                }
            }
        }
    }

    fn is_untouched(self, text: &str) -> bool {
        match self {
            EscapeMode::Unicode => !text.chars().any(is_required_escape),
            // CR LF is the only cluster made purely of ASCII scalars.
            EscapeMode::Ascii => {
                text.bytes()
                    .all(|byte| byte.is_ascii() && !is_required_escape(char::from(byte)))
                    && !text.contains("\r\n")
            }
        }
    }
}

/// Escapes `text` one grapheme cluster at a time.
///
/// With `names`, a cluster that needs escaping and has a canonical entity
/// name is written as `&name;`; everything else that needs escaping becomes
/// one decimal reference per scalar.
pub(crate) fn escape_text<'a>(
    text: &'a str,
    mode: EscapeMode,
    names: Option<&EntityTable>,
) -> Cow<'a, str> {
    if mode.is_untouched(text) {
        return Cow::Borrowed(text);
    }

    let mut output = String::with_capacity(text.len() + text.len() / 2);
    let mut committed = 0;

    for (offset, grapheme) in text.grapheme_indices(true) {
        if !mode.requires_escape(grapheme) {
            continue;
        }
        output.push_str(&text[committed..offset]);
        push_entities(&mut output, grapheme, names);
        committed = offset + grapheme.len();
    }

    if committed == 0 {
        return Cow::Borrowed(text);
    }
    output.push_str(&text[committed..]);
    Cow::Owned(output)
}

pub(crate) fn escape_character<'a>(
    character: &'a str,
    mode: EscapeMode,
    names: Option<&EntityTable>,
) -> Cow<'a, str> {
    if character.is_empty() || !mode.requires_escape(character) {
        return Cow::Borrowed(character);
    }
    let mut output = String::new();
    push_entities(&mut output, character, names);
    Cow::Owned(output)
}

fn push_entities(output: &mut String, grapheme: &str, names: Option<&EntityTable>) {
    if let Some(name) = names.and_then(|table| table.name_for(grapheme)) {
        output.push('&');
        output.push_str(name);
        output.push(';');
        return;
    }
    for scalar in grapheme.chars() {
        let _ = write!(output, "&#{};", u32::from(scalar));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unicode(text: &str) -> Cow<'_, str> {
        escape_text(text, EscapeMode::Unicode, None)
    }

    fn ascii(text: &str) -> Cow<'_, str> {
        escape_text(text, EscapeMode::Ascii, None)
    }

    #[test]
    fn test_required_escapes_in_both_modes() {
        for character in REQUIRED_ESCAPES {
            let text = character.to_string();
            let expected = format!("&#{};", character as u32);
            assert_eq!(unicode(&text), expected);
            assert_eq!(ascii(&text), expected);
        }
    }

    #[test]
    fn test_plain_ascii_is_untouched() {
        for byte in 0u8..0x80 {
            let character = char::from(byte);
            if is_required_escape(character) {
                continue;
            }
            let text = character.to_string();
            assert_eq!(unicode(&text), text);
            assert_eq!(ascii(&text), text);
        }
    }

    #[test]
    fn test_unicode_mode() {
        assert_eq!(unicode("Fish & Chips"), "Fish &#38; Chips");
        assert_eq!(unicode("a \u{2ab0}\u{338} b"), "a \u{2ab0}\u{338} b");
        assert_eq!(unicode("Hey \u{1f643}!"), "Hey \u{1f643}&#33;");
        assert_eq!(
            unicode("Going to the \u{1f1fa}\u{1f1f8} next June"),
            "Going to the \u{1f1fa}\u{1f1f8} next June"
        );
        assert_eq!(unicode("<b>"), "&#60;b&#62;");
    }

    #[test]
    fn test_ascii_mode() {
        assert_eq!(ascii("Fish & Chips"), "Fish &#38; Chips");
        assert_eq!(ascii("Hey \u{1f643}"), "Hey &#128579;");
        assert_eq!(
            ascii("Going to the \u{1f1fa}\u{1f1f8} next June"),
            "Going to the &#127482;&#127480; next June"
        );
        assert_eq!(ascii("\u{3a3}"), "&#931;");
        assert_eq!(ascii("a \u{2ab0}\u{338} b"), "a &#10928;&#824; b");
    }

    #[test]
    fn test_ascii_mode_escapes_whole_clusters() {
        assert_eq!(ascii("e\u{301}"), "&#101;&#769;");
        assert_eq!(ascii("a\r\nb"), "a&#13;&#10;b");
        assert_eq!(ascii("a\nb"), "a\nb");
    }

    #[test]
    fn test_cluster_with_required_scalar() {
        assert_eq!(unicode("<\u{338}"), "&#60;&#824;");
        assert_eq!(unicode("e\u{301}"), "e\u{301}");
    }

    #[test]
    fn test_untouched_input_is_borrowed() {
        assert!(matches!(unicode(""), Cow::Borrowed("")));
        assert!(matches!(ascii(""), Cow::Borrowed("")));
        assert!(matches!(unicode("caf\u{e9}"), Cow::Borrowed(_)));
        assert!(matches!(ascii("Hello world."), Cow::Borrowed(_)));
        assert!(matches!(ascii("caf\u{e9}"), Cow::Owned(_)));
    }

    #[test]
    fn test_escaping_twice_is_deterministic() {
        let once = unicode("&").into_owned();
        assert_eq!(once, "&#38;");
        assert_eq!(unicode(&once), "&#38;#38;");
    }

    #[test]
    fn test_character_variants() {
        assert_eq!(
            escape_character("&", EscapeMode::Unicode, None),
            "&#38;"
        );
        assert_eq!(
            escape_character("\u{1f1fa}\u{1f1f8}", EscapeMode::Ascii, None),
            "&#127482;&#127480;"
        );
        assert_eq!(
            escape_character("\u{1f1fa}\u{1f1f8}", EscapeMode::Unicode, None),
            "\u{1f1fa}\u{1f1f8}"
        );
        assert_eq!(escape_character("A", EscapeMode::Ascii, None), "A");
        assert!(matches!(
            escape_character("", EscapeMode::Ascii, None),
            Cow::Borrowed("")
        ));
    }

    #[test]
    fn test_named_entities() {
        let table = EntityTable::html5();
        let named = |text: &str| escape_text(text, EscapeMode::Ascii, Some(&table)).into_owned();
        assert_eq!(named("Fish & Chips"), "Fish &amp; Chips");
        assert_eq!(named("a \u{2ab0}\u{338} b"), "a &nsucceq; b");
        assert_eq!(named("Hey \u{1f643}"), "Hey &#128579;");
        assert_eq!(named("\u{1f1fa}\u{1f1f8}"), "&#127482;&#127480;");
        assert_eq!(named("A"), "A");
    }

    #[test]
    fn test_mode_from_config_text() {
        #[derive(Deserialize)]
        struct Wrapper {
            mode: EscapeMode,
        }
        let parsed: Wrapper = toml::from_str("mode = \"ascii\"").unwrap();
        assert_eq!(parsed.mode, EscapeMode::Ascii);
        assert_eq!(EscapeMode::default(), EscapeMode::Unicode);
    }
}
