use crate::entities::EntityTable;
use crate::numeric::parse_numeric;
use memchr::{memchr, memchr2};
use std::borrow::Cow;
use tracing::trace;

/// Replaces every resolvable `&...;` reference in `text`.
///
/// For each `;` the candidate starts at the closest `&` before it, so in
/// `Fish & chips &amp; sauce` only `&amp;` is decoded. Candidates that are
/// neither numeric nor a known name stay in the output byte for byte, and
/// scanning resumes right after their `&`.
pub(crate) fn unescape_text<'a>(text: &'a str, table: &EntityTable) -> Cow<'a, str> {
    let bytes = text.as_bytes();
    let mut output = String::new();
    let mut committed = 0;
    let mut cursor = 0;
    let mut substituted = false;

    while let Some(found) = memchr(b'&', &bytes[cursor..]) {
        let Some((start, end)) = candidate_span(bytes, cursor + found) else {
            break;
        };
        let content = &text[start + 1..end];

        let mut scalar = [0u8; 4];
        let resolved = match parse_numeric(content) {
            Some(character) => Some(&*character.encode_utf8(&mut scalar)),
            None => table.lookup_by_name(content),
        };

        match resolved {
            Some(value) => {
                output.push_str(&text[committed..start]);
                output.push_str(value);
                substituted = true;
                committed = end + 1;
                cursor = end + 1;
            }
            None => {
                trace!(candidate = content, "left unresolved entity in place");
                cursor = start + 1;
            }
        }
    }

    if !substituted {
        return Cow::Borrowed(text);
    }
    output.push_str(&text[committed..]);
    Cow::Owned(output)
}

// Offsets of the last `&` before the next `;`, and of that `;`.
fn candidate_span(bytes: &[u8], ampersand: usize) -> Option<(usize, usize)> {
    let mut start = ampersand;
    let mut position = ampersand + 1;
    loop {
        let offset = memchr2(b'&', b';', &bytes[position..])?;
        position += offset;
        if bytes[position] == b';' {
            return Some((start, position));
        }
        start = position;
        position += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unescape(text: &str) -> Cow<'_, str> {
        unescape_text(text, &EntityTable::shared())
    }

    #[test]
    fn test_named() {
        assert_eq!(unescape("&amp;"), "&");
        assert_eq!(unescape("Do you know &aleph;?"), "Do you know \u{2135}?");
        assert_eq!(unescape("a &nsucceq; b"), "a \u{2ab0}\u{338} b");
        assert_eq!(unescape("&fjlig;"), "fj");
    }

    #[test]
    fn test_numeric() {
        assert_eq!(unescape("&#49;"), "1");
        assert_eq!(
            unescape("My phone number starts with a &#49;"),
            "My phone number starts with a 1"
        );
        assert_eq!(unescape("Let's meet at the caf&#xe9;"), "Let's meet at the caf\u{e9}");
        assert_eq!(unescape("&#X10D;"), "\u{10d}");
        assert_eq!(unescape("&#127482;&#127480;"), "\u{1f1fa}\u{1f1f8}");
    }

    #[test]
    fn test_malformed_passes_through() {
        assert_eq!(
            unescape("My phone number starts with a &#4_9;!"),
            "My phone number starts with a &#4_9;!"
        );
        assert_eq!(
            unescape("Let's meet at the caf&#xzi;!"),
            "Let's meet at the caf&#xzi;!"
        );
        assert_eq!(
            unescape("What is this character ? -> &#xd8ff;"),
            "What is this character ? -> &#xd8ff;"
        );
        assert_eq!(unescape("I love &swift;"), "I love &swift;");
        assert_eq!(unescape("&;"), "&;");
        assert_eq!(unescape("&#;"), "&#;");
        assert_eq!(unescape("&#99999999999;"), "&#99999999999;");
    }

    #[test]
    fn test_consecutive_entities() {
        assert_eq!(unescape("a &amp;&amp; b"), "a && b");
        assert_eq!(unescape("&lt;&gt;"), "<>");
    }

    #[test]
    fn test_no_terminator() {
        assert_eq!(unescape("Fish & Chips"), "Fish & Chips");
        assert_eq!(unescape("&amp; then &amp"), "& then &amp");
        assert_eq!(unescape("&"), "&");
    }

    #[test]
    fn test_nearest_ampersand_wins() {
        assert_eq!(
            unescape("Fish & chips &amp; sauce"),
            "Fish & chips & sauce"
        );
        assert_eq!(unescape("&&amp;"), "&&");
        assert_eq!(unescape("& chips &amp;"), "& chips &");
    }

    #[test]
    fn test_rejected_candidate_is_rescanned() {
        assert_eq!(unescape("&swift;&amp;"), "&swift;&");
        assert_eq!(unescape("&a&b;c;&lt;"), "&a&b;c;<");
        assert_eq!(unescape("&#x;amp;"), "&#x;amp;");
    }

    #[test]
    fn test_decoded_text_is_not_rescanned() {
        assert_eq!(unescape("&amp;amp;"), "&amp;");
        assert_eq!(unescape("&#38;lt;"), "&lt;");
    }

    #[test]
    fn test_untouched_input_is_borrowed() {
        assert!(matches!(unescape(""), Cow::Borrowed("")));
        assert!(matches!(unescape("Hello, world."), Cow::Borrowed(_)));
        assert!(matches!(unescape("Fish & Chips"), Cow::Borrowed(_)));
        assert!(matches!(unescape("I love &swift;"), Cow::Borrowed(_)));
    }

    #[test]
    fn test_non_ascii_around_entities() {
        assert_eq!(unescape("\u{1f643}&amp;\u{e9}"), "\u{1f643}&\u{e9}");
        assert_eq!(unescape("&\u{e9};"), "&\u{e9};");
    }

    #[test]
    fn test_custom_table() {
        let table = EntityTable::from_pairs([("swift", "\u{1f426}")]);
        assert_eq!(unescape_text("I love &swift;", &table), "I love \u{1f426}");
        assert_eq!(unescape_text("&amp;", &table), "&amp;");
        assert_eq!(unescape_text("&#49;", &table), "1");
    }
}
