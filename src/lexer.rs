//! Tokenizer: turns source bytes into a lazy sequence of typed tokens.
//!
//! Operates on a `&str` (the caller is responsible for handing over valid
//! UTF-8, matching the KDL 2.0.0 spec's requirement that source text is
//! UTF-8). A leading BOM is stripped at construction. Each call to
//! [`Lexer::next_token`] skips insignificant trivia (non-newline
//! whitespace, comments, escaped line continuations) and returns exactly
//! one token at a time, rather than building a materialized token vector
//! up front.

use alloc::string::String;

use crate::classify::{is_identifier_continue, is_identifier_start, is_newline_start, is_whitespace};
use crate::error::{Error, LexicalError, Span as ErrSpan};
use crate::token::{NumberRadix, SpannedToken, TokenKind};

/// Result type for lexer operations.
pub type LexResult = Result<SpannedToken, Error>;

/// The tokenizer. Holds the source and a cursor; has no other mutable state,
/// so tokens can always be re-requested from a saved `pos()` (used by the
/// parser's slashdash handling, which re-parses a suppressed construct to
/// validate it without materializing it into the DOM).
pub struct Lexer<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Lexer<'a> {
    /// Create a lexer over `src`, stripping a leading UTF-8 BOM if present.
    pub fn new(src: &'a str) -> Self {
        let pos = if src.starts_with('\u{FEFF}') {
            '\u{FEFF}'.len_utf8()
        } else {
            0
        };
        Lexer { src, pos }
    }

    /// Current byte offset of the cursor.
    pub fn pos(&self) -> usize {
        self.pos
    }

    /// Reposition the cursor (used to re-lex a slashdash-suppressed construct).
    pub fn set_pos(&mut self, pos: usize) {
        self.pos = pos;
    }

    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn peek_char(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn peek_char_at(&self, extra: usize) -> Option<char> {
        self.rest().chars().nth(extra)
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek_char()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn err(&self, kind: LexicalError, start: usize) -> Error {
        Error::new(kind.into(), ErrSpan::new(start as u32, (self.pos - start) as u32))
    }

    /// Skip non-newline whitespace, comments, and escaped line continuations.
    /// Stops at EOF, a newline, or the first byte of a real token.
    fn skip_trivia(&mut self) -> Result<(), Error> {
        loop {
            match self.peek_char() {
                Some(c) if is_whitespace(c) => {
                    self.bump();
                }
                Some('\\') => {
                    // Only a line continuation if, after optional trailing
                    // whitespace, a newline follows; otherwise this `\` is
                    // an error at this position (it isn't valid at node-head level).
                    let save = self.pos;
                    self.bump();
                    while matches!(self.peek_char(), Some(c) if is_whitespace(c)) {
                        self.bump();
                    }
                    match self.peek_char() {
                        Some(c) if is_newline_start(c) => {
                            self.consume_newline();
                            while matches!(self.peek_char(), Some(c) if is_whitespace(c)) {
                                self.bump();
                            }
                        }
                        _ => {
                            self.pos = save;
                            return Err(self.err(LexicalError::UnexpectedCharacter('\\'), save));
                        }
                    }
                }
                Some('/') => match self.peek_char_at(1) {
                    Some('/') => {
                        self.bump();
                        self.bump();
                        while let Some(c) = self.peek_char() {
                            if is_newline_start(c) {
                                break;
                            }
                            self.bump();
                        }
                    }
                    Some('*') => {
                        let start = self.pos;
                        self.bump();
                        self.bump();
                        self.skip_block_comment(start)?;
                    }
                    _ => break,
                },
                _ => break,
            }
        }
        Ok(())
    }

    fn skip_block_comment(&mut self, start: usize) -> Result<(), Error> {
        let mut depth = 1usize;
        loop {
            match self.peek_char() {
                None => return Err(self.err(LexicalError::UnterminatedComment, start)),
                Some('/') if self.peek_char_at(1) == Some('*') => {
                    self.bump();
                    self.bump();
                    depth += 1;
                }
                Some('*') if self.peek_char_at(1) == Some('/') => {
                    self.bump();
                    self.bump();
                    depth -= 1;
                    if depth == 0 {
                        return Ok(());
                    }
                }
                Some(_) => {
                    self.bump();
                }
            }
        }
    }

    fn consume_newline(&mut self) {
        match self.peek_char() {
            Some('\r') => {
                self.bump();
                if self.peek_char() == Some('\n') {
                    self.bump();
                }
            }
            Some(c) if is_newline_start(c) => {
                self.bump();
            }
            _ => {}
        }
    }

    /// Produce the next token, or `Eof` once the source is exhausted.
    pub fn next_token(&mut self) -> LexResult {
        let result = self.next_token_inner();
        match &result {
            Ok(tok) => crate::trace!("token {:?} at {}..{}", tok.kind, tok.span.offset, tok.span.offset + tok.span.len),
            Err(e) => crate::debug!("lex error at byte {}: {}", self.pos, e),
        }
        result
    }

    fn next_token_inner(&mut self) -> LexResult {
        self.skip_trivia()?;
        let start = self.pos;
        let Some(c) = self.peek_char() else {
            return Ok(SpannedToken {
                kind: TokenKind::Eof,
                span: ErrSpan::point(start as u32),
            });
        };

        if is_newline_start(c) {
            self.consume_newline();
            return Ok(self.spanned(TokenKind::Newline, start));
        }

        match c {
            '{' => {
                self.bump();
                Ok(self.spanned(TokenKind::LBrace, start))
            }
            '}' => {
                self.bump();
                Ok(self.spanned(TokenKind::RBrace, start))
            }
            ';' => {
                self.bump();
                Ok(self.spanned(TokenKind::Semicolon, start))
            }
            '=' => {
                self.bump();
                Ok(self.spanned(TokenKind::Equals, start))
            }
            '(' => {
                self.bump();
                Ok(self.spanned(TokenKind::TypeOpen, start))
            }
            ')' => {
                self.bump();
                Ok(self.spanned(TokenKind::TypeClose, start))
            }
            '"' => self.scan_quoted_or_multiline(start),
            '#' => self.scan_hash(start),
            '-' if self.peek_char_at(1).is_some_and(|n| n.is_ascii_digit() || n == '.') => {
                self.scan_number(start)
            }
            '+' if self.peek_char_at(1).is_some_and(|n| n.is_ascii_digit()) => {
                self.scan_number(start)
            }
            c if c.is_ascii_digit() => self.scan_number(start),
            c if is_identifier_start(c) => self.scan_bare_identifier(start),
            other => Err(self.err(LexicalError::UnexpectedCharacter(other), start)),
        }
    }

    fn spanned(&self, kind: TokenKind, start: usize) -> SpannedToken {
        SpannedToken {
            kind,
            span: ErrSpan::new(start as u32, (self.pos - start) as u32),
        }
    }

    fn scan_bare_identifier(&mut self, start: usize) -> LexResult {
        // `/-` is handled by the caller path (peek before identifier dispatch in next_token
        // only reaches here for non-`/` starts); a lone `-`/`+` not followed by a digit
        // falls through to here and is scanned as an ordinary identifier.
        while matches!(self.peek_char(), Some(c) if is_identifier_continue(c)) {
            self.bump();
        }
        let text = &self.src[start..self.pos];
        Ok(self.spanned(TokenKind::Identifier(String::from(text)), start))
    }

    fn scan_hash(&mut self, start: usize) -> LexResult {
        // `/-` slashdash is scanned from `/`, not `#`; `#` begins either a
        // raw string (`#"`, `##"`, ...) or a keyword literal.
        self.bump(); // consume '#'
        let mut hash_count = 1usize;
        while self.peek_char() == Some('#') {
            self.bump();
            hash_count += 1;
        }
        if self.peek_char() == Some('"') {
            return self.scan_raw_string(start, hash_count);
        }
        if hash_count > 1 {
            return Err(self.err(LexicalError::InvalidIdentifier, start));
        }
        // keyword literal
        for (word, kind) in [
            ("true", TokenKind::True),
            ("false", TokenKind::False),
            ("null", TokenKind::Null),
            ("nan", TokenKind::Nan),
            ("-inf", TokenKind::NegInf),
            ("inf", TokenKind::Inf),
        ] {
            if self.rest().starts_with(word) {
                let after = self.pos + word.len();
                let boundary_ok = self.src[after..]
                    .chars()
                    .next()
                    .map(|c| !is_identifier_continue(c))
                    .unwrap_or(true);
                if boundary_ok {
                    self.pos = after;
                    return Ok(self.spanned(kind, start));
                }
            }
        }
        // consume the rest of whatever identifier-like run follows so the
        // error span covers the whole malformed token.
        while matches!(self.peek_char(), Some(c) if is_identifier_continue(c)) {
            self.bump();
        }
        Err(self.err(LexicalError::InvalidIdentifier, start))
    }

    fn scan_raw_string(&mut self, start: usize, hash_count: usize) -> LexResult {
        self.bump(); // consume opening '"'
        let content_start = self.pos;
        let mut terminator = String::from("\"");
        for _ in 0..hash_count {
            terminator.push('#');
        }
        match self.rest().find(&terminator) {
            Some(rel) => {
                let content = &self.src[content_start..content_start + rel];
                self.pos = content_start + rel + terminator.len();
                Ok(self.spanned(
                    TokenKind::String {
                        text: String::from(content),
                        verbatim_span: Some((content_start as u32, rel as u32)),
                    },
                    start,
                ))
            }
            None => {
                self.pos = self.src.len();
                Err(self.err(LexicalError::UnterminatedRawString, start))
            }
        }
    }

    fn scan_quoted_or_multiline(&mut self, start: usize) -> LexResult {
        self.bump(); // opening quote
        if self.peek_char() == Some('"') && self.peek_char_at(1) == Some('"') {
            self.bump();
            self.bump();
            return self.scan_multiline_string(start);
        }
        self.scan_single_line_string(start)
    }

    fn scan_single_line_string(&mut self, start: usize) -> LexResult {
        let content_start = self.pos;
        loop {
            match self.peek_char() {
                None => return Err(self.err(LexicalError::UnterminatedString, start)),
                Some('"') => {
                    let content = &self.src[content_start..self.pos];
                    let content_len = self.pos - content_start;
                    let verbatim_span = if content.contains('\\') {
                        None
                    } else {
                        Some((content_start as u32, content_len as u32))
                    };
                    self.bump();
                    let decoded = decode_escapes(content).map_err(|e| self.err(e, start))?;
                    return Ok(self.spanned(
                        TokenKind::String {
                            text: decoded,
                            verbatim_span,
                        },
                        start,
                    ));
                }
                Some(c) if is_newline_start(c) => {
                    return Err(self.err(LexicalError::UnterminatedString, start));
                }
                Some('\\') => {
                    self.bump();
                    if self.bump().is_none() {
                        return Err(self.err(LexicalError::UnterminatedString, start));
                    }
                }
                Some(_) => {
                    self.bump();
                }
            }
        }
    }

    fn scan_multiline_string(&mut self, start: usize) -> LexResult {
        // Opening `"""` must be followed immediately by a newline.
        match self.peek_char() {
            Some(c) if is_newline_start(c) => self.consume_newline(),
            _ => return Err(self.err(LexicalError::UnterminatedString, start)),
        }
        let body_start = self.pos;
        let mut line_start = self.pos;
        let (body_end, indent_end) = loop {
            if self.peek_char().is_none() {
                return Err(self.err(LexicalError::UnterminatedString, start));
            }
            // Scan one line, tracking whether it is all-whitespace then `"""`.
            let scan_start = self.pos;
            while matches!(self.peek_char(), Some(c) if is_whitespace(c)) {
                self.bump();
            }
            if self.rest().starts_with("\"\"\"") {
                let indent_end = self.pos;
                self.pos += 3;
                break (line_start, indent_end);
            }
            self.pos = scan_start;
            // Not a terminator line: consume through end of line.
            loop {
                match self.peek_char() {
                    None => return Err(self.err(LexicalError::UnterminatedString, start)),
                    Some(c) if is_newline_start(c) => {
                        self.consume_newline();
                        break;
                    }
                    Some('\\') => {
                        self.bump();
                        self.bump();
                    }
                    Some(_) => {
                        self.bump();
                    }
                }
            }
            line_start = self.pos;
        };
        let indent = &self.src[line_start..indent_end];
        let body = &self.src[body_start..body_end];
        let dedented = dedent_multiline(body, indent).map_err(|e| self.err(e, start))?;
        let decoded = decode_escapes(&dedented).map_err(|e| self.err(e, start))?;
        Ok(self.spanned(
            TokenKind::String {
                text: decoded,
                verbatim_span: None,
            },
            start,
        ))
    }

    fn scan_number(&mut self, start: usize) -> LexResult {
        let sign_present = matches!(self.peek_char(), Some('-') | Some('+'));
        if sign_present {
            self.bump();
        }
        let radix = if self.peek_char() == Some('0') {
            match self.peek_char_at(1) {
                Some('x') => Some(NumberRadix::Hex),
                Some('o') => Some(NumberRadix::Octal),
                Some('b') => Some(NumberRadix::Binary),
                _ => None,
            }
        } else {
            None
        };

        if let Some(radix) = radix {
            self.bump(); // '0'
            self.bump(); // x/o/b
            let digit_ok: fn(char) -> bool = match radix {
                NumberRadix::Hex => |c: char| c.is_ascii_hexdigit() || c == '_',
                NumberRadix::Octal => |c: char| matches!(c, '0'..='7' | '_'),
                NumberRadix::Binary => |c: char| matches!(c, '0' | '1' | '_'),
                NumberRadix::Decimal => unreachable!(),
            };
            let digits_start = self.pos;
            while matches!(self.peek_char(), Some(c) if digit_ok(c)) {
                self.bump();
            }
            if self.pos == digits_start {
                return Err(self.err(LexicalError::InvalidNumber, start));
            }
            let text = String::from(&self.src[start..self.pos]);
            return Ok(self.spanned(TokenKind::Number { text, radix }, start));
        }

        // Decimal: digits, optional `.digits`, optional exponent.
        let digits_start = self.pos;
        while matches!(self.peek_char(), Some(c) if c.is_ascii_digit() || c == '_') {
            self.bump();
        }
        if self.pos == digits_start {
            return Err(self.err(LexicalError::InvalidNumber, start));
        }
        if self.peek_char() == Some('.') && self.peek_char_at(1).is_some_and(|c| c.is_ascii_digit())
        {
            self.bump();
            while matches!(self.peek_char(), Some(c) if c.is_ascii_digit() || c == '_') {
                self.bump();
            }
        }
        if matches!(self.peek_char(), Some('e') | Some('E')) {
            let save = self.pos;
            self.bump();
            if matches!(self.peek_char(), Some('+') | Some('-')) {
                self.bump();
            }
            let exp_digits_start = self.pos;
            while matches!(self.peek_char(), Some(c) if c.is_ascii_digit() || c == '_') {
                self.bump();
            }
            if self.pos == exp_digits_start {
                self.pos = save;
            }
        }
        // Reject an identifier character directly following the number
        // (e.g. `1abc`), which is not a valid number nor separated token.
        if matches!(self.peek_char(), Some(c) if is_identifier_continue(c) && c != '.') {
            while matches!(self.peek_char(), Some(c) if is_identifier_continue(c)) {
                self.bump();
            }
            return Err(self.err(LexicalError::InvalidNumber, start));
        }
        let text = String::from(&self.src[start..self.pos]);
        Ok(self.spanned(
            TokenKind::Number {
                text,
                radix: NumberRadix::Decimal,
            },
            start,
        ))
    }
}

/// Scan a `/-` slashdash token at the lexer's current position. Exposed
/// separately from [`Lexer::next_token`] because `/-` is only valid in
/// specific grammar positions; the parser checks for it
/// explicitly rather than having the generic dispatcher special-case `/`.
impl<'a> Lexer<'a> {
    /// True if the lexer, after skipping trivia, is positioned at `/-`.
    pub fn peek_slashdash(&mut self) -> Result<bool, Error> {
        self.skip_trivia()?;
        Ok(self.rest().starts_with("/-"))
    }

    /// Consume a `/-` token (caller must have confirmed with [`peek_slashdash`]).
    pub fn consume_slashdash(&mut self) -> SpannedToken {
        let start = self.pos;
        self.pos += 2;
        self.spanned(TokenKind::SlashDash, start)
    }

    /// True if, after skipping trivia, the lexer is at EOF.
    pub fn at_eof(&mut self) -> Result<bool, Error> {
        self.skip_trivia()?;
        Ok(self.peek_char().is_none())
    }
}

/// Strip the common leading-whitespace prefix from a multi-line string body:
/// the closing line's indentation is the prefix removed
/// from every content line, and it's an error for a (non-blank) content
/// line not to start with it.
fn dedent_multiline(body: &str, indent: &str) -> Result<String, LexicalError> {
    if body.is_empty() {
        return Ok(String::new());
    }
    let mut lines: alloc::vec::Vec<&str> = body.split('\n').collect();
    // `split('\n')` leaves a trailing empty element if body ends with '\n'
    // (it always does here since every content line's newline was consumed).
    if lines.last() == Some(&"") {
        lines.pop();
    }
    let mut out = String::new();
    for (i, line) in lines.iter().enumerate() {
        let line = line.strip_suffix('\r').unwrap_or(line);
        let stripped = if line.trim().is_empty() {
            ""
        } else if let Some(rest) = line.strip_prefix(indent) {
            rest
        } else {
            return Err(LexicalError::UnterminatedString);
        };
        if i > 0 {
            out.push('\n');
        }
        out.push_str(stripped);
    }
    Ok(out)
}

/// Decode the escape sequences in a (non-raw) string body:
/// `\n \r \t \\ \" \b \f \s \u{HEX}`, plus `\` followed by
/// whitespace/newline as a line-continuation that's swallowed entirely.
fn decode_escapes(body: &str) -> Result<String, LexicalError> {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some('\\') => out.push('\\'),
            Some('"') => out.push('"'),
            Some('b') => out.push('\u{0008}'),
            Some('f') => out.push('\u{000C}'),
            Some('s') => out.push(' '),
            Some('u') => {
                if chars.next() != Some('{') {
                    return Err(LexicalError::InvalidEscape);
                }
                let mut hex = String::new();
                loop {
                    match chars.next() {
                        Some('}') => break,
                        Some(h) if h.is_ascii_hexdigit() => hex.push(h),
                        _ => return Err(LexicalError::InvalidEscape),
                    }
                }
                if hex.is_empty() || hex.len() > 6 {
                    return Err(LexicalError::InvalidEscape);
                }
                let code = u32::from_str_radix(&hex, 16).map_err(|_| LexicalError::InvalidEscape)?;
                let ch = char::from_u32(code).ok_or(LexicalError::InvalidEscape)?;
                out.push(ch);
            }
            Some(c) if is_whitespace(c) || is_newline_start(c) => {
                // Line continuation: swallow remaining whitespace/newline
                // and the next line's leading whitespace.
                let mut saw_newline = is_newline_start(c);
                while let Some(&n) = chars.peek() {
                    if is_whitespace(n) {
                        chars.next();
                    } else if is_newline_start(n) && !saw_newline {
                        saw_newline = true;
                        chars.next();
                    } else {
                        break;
                    }
                }
                if !saw_newline {
                    return Err(LexicalError::InvalidEscape);
                }
            }
            _ => return Err(LexicalError::InvalidEscape),
        }
    }
    Ok(out)
}
