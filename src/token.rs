//! Token types produced by the lexer and consumed by the parser.

use alloc::string::String;

use crate::error::Span;

/// A single lexical token together with its source span.
#[derive(Debug, Clone, PartialEq)]
pub struct SpannedToken {
    /// The token's kind and payload.
    pub kind: TokenKind,
    /// The byte span this token occupies in the source.
    pub span: Span,
}

/// Token kinds.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    /// A bare or quoted identifier (node name, property key, `(type)` name).
    Identifier(String),
    /// A decoded string literal (quoted, multi-line, or raw).
    String {
        /// The string's final (escape-decoded / dedented) content.
        text: String,
        /// When `Some((start, len))`, `text` is byte-identical to that
        /// range of the original source, so a zero-copy `StringRef` can
        /// borrow it directly instead of interning into the pool. `None` for strings that
        /// needed escape decoding or multi-line dedenting, which always
        /// promotes to pool storage.
        verbatim_span: Option<(u32, u32)>,
    },
    /// A number literal, not yet parsed into a value: raw text plus a
    /// classification the parser/value-builder uses to pick integer vs. float.
    Number {
        /// The literal's raw text, underscores and all, excluding any leading `-`/`+` already consumed separately is not the case here: sign is included.
        text: String,
        /// Which numeric grammar production matched.
        radix: NumberRadix,
    },
    /// `#true`
    True,
    /// `#false`
    False,
    /// `#null`
    Null,
    /// `#inf`
    Inf,
    /// `#-inf`
    NegInf,
    /// `#nan`
    Nan,
    /// `=`
    Equals,
    /// `{`
    LBrace,
    /// `}`
    RBrace,
    /// `;`
    Semicolon,
    /// A line break (node terminator).
    Newline,
    /// `/-`
    SlashDash,
    /// `(` opening a type annotation, immediately followed by an identifier and `)`.
    TypeOpen,
    /// `)` closing a type annotation.
    TypeClose,
    /// End of input.
    Eof,
}

/// Which numeric grammar production a `Number` token matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberRadix {
    /// `[0-9_]+(\.[0-9_]+)?([eE][+-]?[0-9_]+)?`
    Decimal,
    /// `0x[0-9A-Fa-f_]+`
    Hex,
    /// `0o[0-7_]+`
    Octal,
    /// `0b[01_]+`
    Binary,
}
