//! Branch-free character predicates.
//!
//! These are the leaves the lexer and serializer build on: whitespace,
//! newline, and identifier start/continue classification over full
//! Unicode `char`s, matching the KDL 2.0.0 grammar's definitions exactly.

/// True for the KDL definition of whitespace: ASCII space/tab plus the
/// Unicode space separators KDL 2.0.0 recognizes, and U+FEFF (which KDL
/// treats as whitespace everywhere except as a leading BOM).
pub fn is_whitespace(c: char) -> bool {
    matches!(
        c,
        '\u{0009}'
            | '\u{0020}'
            | '\u{00A0}'
            | '\u{1680}'
            | '\u{2000}'..='\u{200A}'
            | '\u{202F}'
            | '\u{205F}'
            | '\u{3000}'
            | '\u{FEFF}'
    )
}

/// True for any of the line-terminating sequences' starting bytes: `\n`,
/// `\r`, and the handful of Unicode line separators KDL 2.0.0 treats as
/// newlines.
pub fn is_newline_start(c: char) -> bool {
    matches!(
        c,
        '\u{000A}' | '\u{000D}' | '\u{0085}' | '\u{000C}' | '\u{2028}' | '\u{2029}'
    )
}

/// Bytes that may never appear as the first character of a bare identifier.
pub fn is_identifier_reserved_start(c: char) -> bool {
    c.is_ascii_digit()
        || matches!(
            c,
            '(' | ')'
                | '{'
                | '}'
                | '['
                | ']'
                | '/'
                | '\\'
                | '"'
                | '#'
                | '='
                | ';'
                | ':'
        )
        || is_whitespace(c)
        || is_newline_start(c)
        || c.is_control()
}

/// True if `c` may continue a bare identifier once started (reserved
/// structural bytes and whitespace still end it; digits do not, once past
/// the first character).
pub fn is_identifier_continue(c: char) -> bool {
    !(is_whitespace(c)
        || is_newline_start(c)
        || matches!(
            c,
            '(' | ')' | '{' | '}' | '[' | ']' | '\\' | '"' | ';' | '=' | '/' | '#'
        )
        || c.is_control())
}

/// True if `c` may start a bare (non-`#`-prefixed) identifier.
pub fn is_identifier_start(c: char) -> bool {
    !is_identifier_reserved_start(c)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whitespace_classification() {
        assert!(is_whitespace(' '));
        assert!(is_whitespace('\t'));
        assert!(is_whitespace('\u{FEFF}'));
        assert!(!is_whitespace('a'));
    }

    #[test]
    fn identifier_start_rejects_reserved() {
        assert!(!is_identifier_start('0'));
        assert!(!is_identifier_start('('));
        assert!(!is_identifier_start('"'));
        assert!(!is_identifier_start('#'));
        assert!(is_identifier_start('a'));
        assert!(is_identifier_start('_'));
        assert!(is_identifier_start('-'));
    }

    #[test]
    fn identifier_continue_allows_digits() {
        assert!(is_identifier_continue('0'));
        assert!(!is_identifier_continue(' '));
        assert!(!is_identifier_continue('{'));
    }

    #[test]
    fn identifier_continue_rejects_structural_bytes_not_just_reserved_start() {
        assert!(!is_identifier_continue('/'));
        assert!(!is_identifier_continue('#'));
    }
}
