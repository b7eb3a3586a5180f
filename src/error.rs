//! Unified error taxonomy for parsing, decoding, and serialization.

use alloc::string::{String, ToString};
use core::fmt::{self, Debug, Display};

/// A byte offset range into the source that produced an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    /// Byte offset of the first byte covered by the span.
    pub offset: u32,
    /// Number of bytes covered by the span.
    pub len: u32,
}

impl Span {
    /// Create a new span.
    pub const fn new(offset: u32, len: u32) -> Self {
        Span { offset, len }
    }

    /// A zero-length span at `offset`, used for EOF-adjacent errors.
    pub const fn point(offset: u32) -> Self {
        Span { offset, len: 0 }
    }
}

/// Error type for every fallible public operation in this crate.
#[derive(Clone)]
pub struct Error {
    /// The specific kind of error.
    pub kind: Kind,
    /// Source span where the error occurred, if known.
    pub span: Option<Span>,
    /// A copy of the source text, attached for diagnostics.
    pub source_code: Option<String>,
}

impl Error {
    /// Create a new error with span information.
    pub const fn new(kind: Kind, span: Span) -> Self {
        Error {
            kind,
            span: Some(span),
            source_code: None,
        }
    }

    /// Create an error with no span information (e.g. an I/O failure).
    pub const fn without_span(kind: Kind) -> Self {
        Error {
            kind,
            span: None,
            source_code: None,
        }
    }

    /// Attach source code to this error for diagnostics.
    pub fn with_source(mut self, source: &str) -> Self {
        self.source_code = Some(source.to_string());
        self
    }

    /// Returns a reference to the error kind for detailed inspection.
    pub fn kind(&self) -> &Kind {
        &self.kind
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;
        if let Some(span) = self.span {
            write!(f, " (at byte {})", span.offset)?;
        }
        Ok(())
    }
}

impl Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Error")
            .field("kind", &self.kind)
            .field("span", &self.span)
            .finish()
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

impl<K: Into<Kind>> From<K> for Error {
    fn from(value: K) -> Self {
        Error::without_span(value.into())
    }
}

/// Top-level error classification, grouping errors into four categories.
#[derive(Debug, Clone)]
pub enum Kind {
    /// Tokenizer-level error.
    Lexical(LexicalError),
    /// Parser-level error.
    Grammatical(GrammaticalError),
    /// Decode-path error.
    Semantic(SemanticError),
    /// Allocation/IO-level error.
    Resource(ResourceError),
}

impl From<LexicalError> for Kind {
    fn from(e: LexicalError) -> Self {
        Kind::Lexical(e)
    }
}
impl From<GrammaticalError> for Kind {
    fn from(e: GrammaticalError) -> Self {
        Kind::Grammatical(e)
    }
}
impl From<SemanticError> for Kind {
    fn from(e: SemanticError) -> Self {
        Kind::Semantic(e)
    }
}
impl From<ResourceError> for Kind {
    fn from(e: ResourceError) -> Self {
        Kind::Resource(e)
    }
}

impl Kind {
    /// A stable short string identifying this error kind, e.g. `"kdl::unterminated_string"`.
    pub fn code(&self) -> &'static str {
        match self {
            Kind::Lexical(e) => e.code(),
            Kind::Grammatical(e) => e.code(),
            Kind::Semantic(e) => e.code(),
            Kind::Resource(e) => e.code(),
        }
    }

    /// A human-readable label describing what the associated span points to.
    pub fn label(&self) -> String {
        match self {
            Kind::Lexical(e) => e.label(),
            Kind::Grammatical(e) => e.label(),
            Kind::Semantic(e) => e.label(),
            Kind::Resource(e) => e.label(),
        }
    }
}

impl Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Kind::Lexical(e) => Display::fmt(e, f),
            Kind::Grammatical(e) => Display::fmt(e, f),
            Kind::Semantic(e) => Display::fmt(e, f),
            Kind::Resource(e) => Display::fmt(e, f),
        }
    }
}

/// Lexical (tokenizer) errors.
#[derive(Debug, Clone)]
pub enum LexicalError {
    /// A quoted or multi-line string was never closed.
    UnterminatedString,
    /// A raw string (`#"..."#`) was never closed with a matching hash count.
    UnterminatedRawString,
    /// An escape sequence inside a quoted string was not recognized.
    InvalidEscape,
    /// A number literal did not match any numeric grammar production.
    InvalidNumber,
    /// A `#`-prefixed token was not one of the recognized keyword literals.
    InvalidIdentifier,
    /// A byte did not begin any valid token.
    UnexpectedCharacter(char),
    /// A `/* ... */` comment (possibly nested) was never closed.
    UnterminatedComment,
}

impl LexicalError {
    fn code(&self) -> &'static str {
        match self {
            LexicalError::UnterminatedString => "kdl::unterminated_string",
            LexicalError::UnterminatedRawString => "kdl::unterminated_raw_string",
            LexicalError::InvalidEscape => "kdl::invalid_escape",
            LexicalError::InvalidNumber => "kdl::invalid_number",
            LexicalError::InvalidIdentifier => "kdl::invalid_identifier",
            LexicalError::UnexpectedCharacter(_) => "kdl::unexpected_character",
            LexicalError::UnterminatedComment => "kdl::unterminated_comment",
        }
    }

    fn label(&self) -> String {
        match self {
            LexicalError::UnexpectedCharacter(c) => alloc::format!("unexpected character '{c}'"),
            other => other.to_string(),
        }
    }
}

impl Display for LexicalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LexicalError::UnterminatedString => write!(f, "unterminated string"),
            LexicalError::UnterminatedRawString => write!(f, "unterminated raw string"),
            LexicalError::InvalidEscape => write!(f, "invalid escape sequence"),
            LexicalError::InvalidNumber => write!(f, "invalid number literal"),
            LexicalError::InvalidIdentifier => write!(f, "invalid keyword literal after '#'"),
            LexicalError::UnexpectedCharacter(c) => write!(f, "unexpected character '{c}'"),
            LexicalError::UnterminatedComment => write!(f, "unterminated block comment"),
        }
    }
}

/// Grammatical (parser) errors.
#[derive(Debug, Clone)]
pub enum GrammaticalError {
    /// The parser expected one of a set of token kinds but found another.
    UnexpectedToken {
        /// What the parser expected, as a short description.
        expected: &'static str,
        /// What was actually found, as a short description.
        got: String,
    },
    /// A `{ ... }` children block was never closed.
    UnterminatedBlock,
    /// Extra input remained after a complete top-level document.
    TrailingInput,
    /// A `(type)` annotation was malformed or misplaced.
    InvalidTypeAnnotation,
}

impl GrammaticalError {
    fn code(&self) -> &'static str {
        match self {
            GrammaticalError::UnexpectedToken { .. } => "kdl::unexpected_token",
            GrammaticalError::UnterminatedBlock => "kdl::unterminated_block",
            GrammaticalError::TrailingInput => "kdl::trailing_input",
            GrammaticalError::InvalidTypeAnnotation => "kdl::invalid_type_annotation",
        }
    }

    fn label(&self) -> String {
        match self {
            GrammaticalError::UnexpectedToken { expected, got } => {
                alloc::format!("expected {expected}, got {got}")
            }
            other => other.to_string(),
        }
    }
}

impl Display for GrammaticalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GrammaticalError::UnexpectedToken { expected, got } => {
                write!(f, "unexpected token: expected {expected}, got {got}")
            }
            GrammaticalError::UnterminatedBlock => write!(f, "unterminated children block"),
            GrammaticalError::TrailingInput => write!(f, "trailing input after document"),
            GrammaticalError::InvalidTypeAnnotation => write!(f, "invalid type annotation"),
        }
    }
}

/// Decode-path (typed destination) errors.
#[derive(Debug, Clone)]
pub enum SemanticError {
    /// A value's textual/DOM type didn't match what the destination field wanted.
    TypeMismatch {
        /// The expected Rust-level type name.
        expected: &'static str,
        /// What kind of KDL value was actually found.
        got: &'static str,
    },
    /// A required field on the destination type had no corresponding node/argument/property.
    MissingRequiredField(&'static str),
    /// A node or property had no corresponding field on the destination type (strict mode only).
    UnknownField(String),
    /// An integer value didn't fit in the destination integer type.
    IntegerOverflow {
        /// The textual value that overflowed.
        value: String,
        /// The destination type name.
        target: &'static str,
    },
}

impl SemanticError {
    fn code(&self) -> &'static str {
        match self {
            SemanticError::TypeMismatch { .. } => "kdl::type_mismatch",
            SemanticError::MissingRequiredField(_) => "kdl::missing_field",
            SemanticError::UnknownField(_) => "kdl::unknown_field",
            SemanticError::IntegerOverflow { .. } => "kdl::integer_overflow",
        }
    }

    fn label(&self) -> String {
        self.to_string()
    }
}

impl Display for SemanticError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SemanticError::TypeMismatch { expected, got } => {
                write!(f, "type mismatch: expected {expected}, got {got}")
            }
            SemanticError::MissingRequiredField(field) => {
                write!(f, "missing required field `{field}`")
            }
            SemanticError::UnknownField(field) => write!(f, "unknown field `{field}`"),
            SemanticError::IntegerOverflow { value, target } => {
                write!(f, "`{value}` does not fit in {target}")
            }
        }
    }
}

/// Allocation/IO errors.
#[derive(Debug, Clone)]
pub enum ResourceError {
    /// The configured allocator could not satisfy a request.
    AllocationFailed,
    /// An I/O error occurred while streaming source bytes or writing output.
    Io(String),
}

impl ResourceError {
    fn code(&self) -> &'static str {
        match self {
            ResourceError::AllocationFailed => "kdl::allocation_failed",
            ResourceError::Io(_) => "kdl::io",
        }
    }

    fn label(&self) -> String {
        self.to_string()
    }
}

impl Display for ResourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceError::AllocationFailed => write!(f, "allocation failed"),
            ResourceError::Io(msg) => write!(f, "I/O error: {msg}"),
        }
    }
}

/// Result alias used throughout this crate.
pub type Result<T> = core::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_offset() {
        let err = Error::new(LexicalError::UnterminatedString.into(), Span::new(12, 3));
        assert_eq!(err.to_string(), "unterminated string (at byte 12)");
    }

    #[test]
    fn codes_are_stable() {
        assert_eq!(
            Kind::from(LexicalError::InvalidNumber).code(),
            "kdl::invalid_number"
        );
        assert_eq!(
            Kind::from(GrammaticalError::TrailingInput).code(),
            "kdl::trailing_input"
        );
    }
}
