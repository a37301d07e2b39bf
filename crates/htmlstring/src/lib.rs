pub mod codec;
pub mod config;
pub mod entities;
mod entity_data;
pub mod error;
pub mod escape;
pub mod numeric;
mod unescape;

pub use codec::*;
pub use config::*;
pub use entities::*;
pub use error::*;
pub use escape::{EscapeMode, REQUIRED_ESCAPES, is_required_escape};
pub use numeric::parse_numeric;

use std::borrow::Cow;

pub fn escape_unicode(text: &str) -> Cow<'_, str> {
    Codec::shared().escape_unicode(text)
}

pub fn escape_ascii(text: &str) -> Cow<'_, str> {
    Codec::shared().escape_ascii(text)
}

pub fn escape_ascii_named(text: &str) -> Cow<'_, str> {
    Codec::shared().escape_ascii_named(text)
}

/// `character` is taken as one extended grapheme cluster.
pub fn escape_character_unicode(character: &str) -> Cow<'_, str> {
    Codec::shared().escape_character_unicode(character)
}

pub fn escape_character_ascii(character: &str) -> Cow<'_, str> {
    Codec::shared().escape_character_ascii(character)
}

/// Anything that does not resolve is left as it was.
pub fn unescape(text: &str) -> Cow<'_, str> {
    Codec::shared().unescape(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_documented_examples() {
        assert_eq!(unescape("&amp;"), "&");
        assert_eq!(unescape("&#49;"), "1");
        assert_eq!(unescape("&#xe9;"), "\u{e9}");
        assert_eq!(unescape("&#4_9;"), "&#4_9;");
        assert_eq!(unescape("&swift;"), "&swift;");
        assert_eq!(unescape("a &amp;&amp; b"), "a && b");
        assert_eq!(unescape("Fish & Chips"), "Fish & Chips");
        assert_eq!(unescape("Fish & chips &amp; sauce"), "Fish & chips & sauce");
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(escape_unicode(""), "");
        assert_eq!(escape_ascii(""), "");
        assert_eq!(escape_character_unicode(""), "");
        assert_eq!(escape_character_ascii(""), "");
        assert_eq!(unescape(""), "");
    }

    #[test]
    fn test_identity_is_borrowed() {
        let text = "Hello world";
        for result in [escape_unicode(text), escape_ascii(text), unescape(text)] {
            match result {
                Cow::Borrowed(borrowed) => assert!(std::ptr::eq(borrowed, text)),
                Cow::Owned(_) => panic!("expected the input back"),
            }
        }
    }

    #[test]
    fn test_flags() {
        let flag = "\u{1f1fa}\u{1f1f8}";
        assert_eq!(escape_ascii(flag), "&#127482;&#127480;");
        assert_eq!(escape_unicode(flag), flag);
        assert_eq!(escape_character_ascii(flag), "&#127482;&#127480;");
        assert_eq!(escape_character_unicode(flag), flag);
        assert_eq!(unescape(&escape_ascii(flag)), flag);
    }

    #[test]
    fn test_named_escaping() {
        assert_eq!(escape_ascii_named("a \u{2ab0}\u{338} b"), "a &nsucceq; b");
        assert_eq!(escape_ascii_named("Fish & Chips"), "Fish &amp; Chips");
    }

    #[test]
    fn test_concurrent_use() {
        let handles: Vec<_> = (0..8)
            .map(|index| {
                std::thread::spawn(move || {
                    let text = format!("{index} & \u{1f643}");
                    unescape(&escape_ascii(&text)).into_owned() == text
                })
            })
            .collect();
        for handle in handles {
            assert!(handle.join().unwrap());
        }
    }
}
