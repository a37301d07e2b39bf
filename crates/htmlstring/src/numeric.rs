/// `content` is everything between `&` and `;`, e.g. `#49` or `#xe9`.
pub fn parse_numeric(content: &str) -> Option<char> {
    let body = content.strip_prefix('#')?;
    let (digits, radix) = match body.strip_prefix(['x', 'X']) {
        Some(hex) => (hex, 16),
        None => (body, 10),
    };

    if digits.is_empty() || !digits.chars().all(|digit| digit.is_digit(radix)) {
        return None;
    }

    let code_point = u32::from_str_radix(digits, radix).ok()?;
    char::from_u32(code_point)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decimal() {
        assert_eq!(parse_numeric("#49"), Some('1'));
        assert_eq!(parse_numeric("#931"), Some('\u{3a3}'));
        assert_eq!(parse_numeric("#128579"), Some('\u{1f643}'));
        assert_eq!(parse_numeric("#0000065"), Some('A'));
    }

    #[test]
    fn test_hexadecimal() {
        assert_eq!(parse_numeric("#xe9"), Some('\u{e9}'));
        assert_eq!(parse_numeric("#x10d"), Some('\u{10d}'));
        assert_eq!(parse_numeric("#X10D"), Some('\u{10d}'));
        assert_eq!(parse_numeric("#x10FFFF"), Some('\u{10ffff}'));
    }

    #[test]
    fn test_requires_hash() {
        assert_eq!(parse_numeric("49"), None);
        assert_eq!(parse_numeric("amp"), None);
        assert_eq!(parse_numeric(""), None);
    }

    #[test]
    fn test_empty_body() {
        assert_eq!(parse_numeric("#"), None);
        assert_eq!(parse_numeric("#x"), None);
        assert_eq!(parse_numeric("#X"), None);
    }

    #[test]
    fn test_rejects_non_digits() {
        assert_eq!(parse_numeric("#4_9"), None);
        assert_eq!(parse_numeric("#xzi"), None);
        assert_eq!(parse_numeric("#49a"), None);
        assert_eq!(parse_numeric("#+49"), None);
        assert_eq!(parse_numeric("#x+e9"), None);
        assert_eq!(parse_numeric("# 49"), None);
        assert_eq!(parse_numeric("#-1"), None);
        assert_eq!(parse_numeric("#\u{663}"), None);
    }

    #[test]
    fn test_rejects_illegal_scalars() {
        assert_eq!(parse_numeric("#xd8ff"), None);
        assert_eq!(parse_numeric("#55296"), None);
        assert_eq!(parse_numeric("#x110000"), None);
        assert_eq!(parse_numeric("#4294967295"), None);
    }

    #[test]
    fn test_rejects_overflow() {
        assert_eq!(parse_numeric("#4294967296"), None);
        assert_eq!(parse_numeric("#x100000000"), None);
        assert_eq!(parse_numeric("#99999999999999999999"), None);
    }
}
