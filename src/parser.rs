//! Recursive-descent parser / event emitter.
//!
//! Drives an [`EventSink`] through the LL(1) grammar:
//!
//! ```text
//! document   := nodes EOF
//! nodes      := (node node-terminator)*
//! node       := type? identifier (ws value-or-prop)* children?
//! value-or-prop := property | argument
//! property   := identifier '=' value
//! argument   := value
//! value      := type? primitive
//! children   := '{' nodes '}'
//! ```
//!
//! Lookahead beyond one token (deciding property vs. argument, and
//! confirming type-annotation adjacency) is done by saving the lexer's
//! cursor with [`Lexer::pos`] and rewinding with [`Lexer::set_pos`] rather
//! than buffering tokens.

use alloc::string::String as StdString;

use crate::document::Document;
use crate::error::{Error, GrammaticalError, Result};
use crate::event::{DOMBuilder, Event, EventSink};
use crate::lexer::Lexer;
use crate::number;
use crate::pool::StringRef;
use crate::token::{NumberRadix, SpannedToken, TokenKind};
use crate::value::{TypedValue, Value};

/// Which tokenization strategy a parse uses.
///
/// Only [`Strategy::Default`] currently affects tokenization: `Parser`
/// always drives the scalar [`Lexer`] regardless of which variant is
/// selected. `StructuralIndex` and `Preprocessed` name a real, independently
/// tested accelerator (see [`crate::prescan`]) that isn't wired into the
/// lexer's hot path yet; selecting them today is accepted but has no
/// observable effect beyond what `Default` already does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Scalar tokenizer only. The only variant that currently changes behavior.
    Default,
    /// Use the structural pre-scanner to accelerate tokenization.
    /// Not yet wired in; currently behaves identically to `Default`.
    StructuralIndex,
    /// The caller has already run the pre-scanner and is handing back its index.
    /// Not yet wired in; currently behaves identically to `Default`.
    Preprocessed,
}

/// Options controlling a parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    /// When `true`, every string is interned into the document's pool.
    /// When `false`, strings that need no transformation borrow directly
    /// from the source buffer.
    pub copy_strings: bool,
    /// Which tokenization strategy to use. See [`Strategy`]'s doc comment:
    /// only `Strategy::Default` currently changes parsing behavior.
    pub strategy: Strategy,
}

impl ParseOptions {
    /// The default options: zero-copy strings, scalar tokenizer.
    pub const fn new() -> Self {
        ParseOptions {
            copy_strings: false,
            strategy: Strategy::Default,
        }
    }

    /// Build options with all strings copied into the pool.
    pub const fn copy_strings(mut self, copy: bool) -> Self {
        self.copy_strings = copy;
        self
    }

    /// Build options with a specific tokenization strategy. See
    /// [`Strategy`]'s doc comment for which variants currently do anything.
    pub const fn strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }
}

impl Default for ParseOptions {
    fn default() -> Self {
        ParseOptions::new()
    }
}

/// Parse `source` into a fresh [`Document`].
pub fn parse(source: &str, opts: ParseOptions) -> Result<Document> {
    let mut doc = Document::new();
    doc.set_source(source);
    let mut builder = DOMBuilder::new(doc);
    let mut parser = Parser::new(source, opts, &mut builder);
    parser.parse_document().map_err(|e| {
        crate::debug!("parse error: {}", e);
        e.with_source(source)
    })?;
    Ok(builder.finish())
}

/// Parse `source`, driving an arbitrary [`EventSink`] instead of building a
/// [`Document`].
pub fn parse_with_sink<S: EventSink>(source: &str, opts: ParseOptions, sink: &mut S) -> Result<()> {
    let mut parser = Parser::new(source, opts, sink);
    parser.parse_document().map_err(|e| {
        crate::debug!("parse error: {}", e);
        e.with_source(source)
    })
}

struct Parser<'a, S: EventSink> {
    lexer: Lexer<'a>,
    source: &'a str,
    opts: ParseOptions,
    sink: &'a mut S,
}

impl<'a, S: EventSink> Parser<'a, S> {
    fn new(source: &'a str, opts: ParseOptions, sink: &'a mut S) -> Self {
        Parser {
            lexer: Lexer::new(source),
            source,
            opts,
            sink,
        }
    }

    fn next(&mut self) -> Result<SpannedToken> {
        self.lexer.next_token()
    }

    fn unexpected(expected: &'static str, got: &TokenKind) -> Error {
        GrammaticalError::UnexpectedToken {
            expected,
            got: describe(got),
        }
        .into()
    }

    fn with_span(err: Error, span: crate::error::Span) -> Error {
        Error::new(err.kind, span)
    }

    /// Intern an identifier/string's decoded text, using a zero-copy
    /// `StringRef` when options allow and the token didn't need transforming.
    fn ref_for_identifier(&mut self, text: &str, span: crate::error::Span) -> StringRef {
        if !self.opts.copy_strings {
            let slice = &self.source[span.offset as usize..(span.offset as usize + span.len as usize)];
            if slice == text {
                return StringRef::borrowed(span.offset, span.len);
            }
        }
        self.sink.intern(text)
    }

    fn ref_for_string(&mut self, text: &str, verbatim_span: Option<(u32, u32)>) -> StringRef {
        if !self.opts.copy_strings {
            if let Some((offset, len)) = verbatim_span {
                return StringRef::borrowed(offset, len);
            }
        }
        self.sink.intern(text)
    }

    fn parse_document(&mut self) -> Result<()> {
        self.parse_node_list(true, false)?;
        let tok = self.next()?;
        if tok.kind != TokenKind::Eof {
            return Err(Self::with_span(GrammaticalError::TrailingInput.into(), tok.span));
        }
        Ok(())
    }

    fn skip_terminators(&mut self) -> Result<()> {
        loop {
            let save = self.lexer.pos();
            let tok = self.next()?;
            match tok.kind {
                TokenKind::Newline | TokenKind::Semicolon => {}
                _ => {
                    self.lexer.set_pos(save);
                    return Ok(());
                }
            }
        }
    }

    fn parse_node_list(&mut self, top_level: bool, suppress: bool) -> Result<()> {
        loop {
            self.skip_terminators()?;
            let save = self.lexer.pos();
            let tok = self.next()?;
            match &tok.kind {
                TokenKind::Eof if top_level => {
                    self.lexer.set_pos(save);
                    break;
                }
                TokenKind::RBrace if !top_level => {
                    self.lexer.set_pos(save);
                    break;
                }
                TokenKind::SlashDash => {
                    self.parse_node(true)?;
                }
                _ => {
                    self.lexer.set_pos(save);
                    self.parse_node(suppress)?;
                }
            }
            let save2 = self.lexer.pos();
            let after = self.next()?;
            match after.kind {
                TokenKind::Newline | TokenKind::Semicolon => {}
                TokenKind::Eof if top_level => self.lexer.set_pos(save2),
                TokenKind::RBrace if !top_level => self.lexer.set_pos(save2),
                other => {
                    return Err(Self::with_span(
                        Self::unexpected("newline, ';', or end of block", &other),
                        after.span,
                    ))
                }
            }
        }
        Ok(())
    }

    fn parse_node(&mut self, suppress: bool) -> Result<()> {
        let (type_annotation, name_tok) = self.parse_type_then()?;
        let name_text = match name_tok.kind {
            TokenKind::Identifier(s) => s,
            TokenKind::String { text, .. } => text,
            other => {
                return Err(Self::with_span(Self::unexpected("node name", &other), name_tok.span))
            }
        };
        let span_start = type_annotation
            .as_ref()
            .map(|(_, open_span)| open_span.offset)
            .unwrap_or(name_tok.span.offset);
        let name_ref = self.ref_for_identifier(&name_text, name_tok.span);
        let type_ref = type_annotation.map(|(r, _)| r);

        if !suppress {
            self.sink.accept(Event::StartNode {
                name: name_ref,
                type_annotation: type_ref,
                span_start,
            })?;
        }

        let mut last_end = name_tok.span.offset + name_tok.span.len;
        loop {
            let save = self.lexer.pos();
            let tok = self.next()?;
            match &tok.kind {
                TokenKind::Newline | TokenKind::Semicolon | TokenKind::Eof | TokenKind::RBrace => {
                    self.lexer.set_pos(save);
                    break;
                }
                TokenKind::LBrace => {
                    self.lexer.set_pos(save);
                    break;
                }
                TokenKind::SlashDash => {
                    self.parse_value_or_prop(true)?;
                }
                _ => {
                    self.lexer.set_pos(save);
                    self.parse_value_or_prop(suppress)?;
                }
            }
            last_end = self.lexer.pos() as u32;
        }

        // Optional children block, possibly itself slashdashed.
        let save = self.lexer.pos();
        let tok = self.next()?;
        let (has_children, children_suppress) = match tok.kind {
            TokenKind::LBrace => {
                self.lexer.set_pos(save);
                (true, suppress)
            }
            TokenKind::SlashDash => {
                let save2 = self.lexer.pos();
                let next = self.next()?;
                if next.kind != TokenKind::LBrace {
                    return Err(Self::with_span(
                        Self::unexpected("'{' after '/-'", &next.kind),
                        next.span,
                    ));
                }
                self.lexer.set_pos(save2);
                (true, true)
            }
            _ => {
                self.lexer.set_pos(save);
                (false, suppress)
            }
        };
        if has_children {
            self.parse_children(children_suppress)?;
            last_end = self.lexer.pos() as u32;
        }

        if !suppress {
            self.sink.accept(Event::EndNode { span_end: last_end })?;
        }
        Ok(())
    }

    fn parse_children(&mut self, suppress: bool) -> Result<()> {
        let open = self.next()?;
        debug_assert_eq!(open.kind, TokenKind::LBrace);
        self.parse_node_list(false, suppress)?;
        let close = self.next()?;
        if close.kind != TokenKind::RBrace {
            return Err(Self::with_span(GrammaticalError::UnterminatedBlock.into(), close.span));
        }
        Ok(())
    }

    fn parse_value_or_prop(&mut self, suppress: bool) -> Result<()> {
        let save = self.lexer.pos();
        let tok1 = self.next()?;
        let key_candidate = match &tok1.kind {
            TokenKind::Identifier(s) => Some(s.clone()),
            TokenKind::String { text, .. } => Some(text.clone()),
            _ => None,
        };
        if let Some(key_text) = key_candidate {
            let save2 = self.lexer.pos();
            let tok2 = self.next()?;
            if tok2.kind == TokenKind::Equals {
                let value = self.parse_value()?;
                if !suppress {
                    let name_ref = self.ref_for_identifier(&key_text, tok1.span);
                    self.sink.accept(Event::Property { name: name_ref, value })?;
                }
                return Ok(());
            }
            self.lexer.set_pos(save2);
        }
        self.lexer.set_pos(save);
        let value = self.parse_value()?;
        if !suppress {
            self.sink.accept(Event::Argument(value))?;
        }
        Ok(())
    }

    fn parse_value(&mut self) -> Result<Value> {
        let (type_annotation, tok) = self.parse_type_then()?;
        let type_ref = type_annotation.map(|(r, _)| r);
        let typed = match tok.kind {
            TokenKind::String { text, verbatim_span } => {
                TypedValue::String(self.ref_for_string(&text, verbatim_span))
            }
            TokenKind::Number { text, radix } => self.build_number(&text, radix, tok.span)?,
            TokenKind::True => TypedValue::Bool(true),
            TokenKind::False => TypedValue::Bool(false),
            TokenKind::Null => TypedValue::Null,
            TokenKind::Inf => TypedValue::Inf,
            TokenKind::NegInf => TypedValue::NegInf,
            TokenKind::Nan => TypedValue::Nan,
            other => return Err(Self::with_span(Self::unexpected("a value", &other), tok.span)),
        };
        Ok(match type_ref {
            Some(t) => Value::with_type(typed, t),
            None => Value::new(typed),
        })
    }

    fn build_number(&mut self, text: &str, radix: NumberRadix, span: crate::error::Span) -> Result<TypedValue> {
        let (sign, unsigned_text) = match text.strip_prefix('-') {
            Some(rest) => (-1i64, rest),
            None => (1i64, text.strip_prefix('+').unwrap_or(text)),
        };
        let clean = number::strip_underscores(unsigned_text)
            .ok_or_else(|| Self::with_span(crate::error::LexicalError::InvalidNumber.into(), span))?;
        match radix {
            NumberRadix::Decimal => {
                let signed_clean = if sign < 0 {
                    alloc::format!("-{clean}")
                } else {
                    clean
                };
                let raw_ref = self.ref_for_identifier(text, span);
                Ok(number::decimal_value(&signed_clean, raw_ref))
            }
            _ => {
                // radix literals are always integers; `clean` still carries
                // the `0x`/`0o`/`0b` prefix, which must be stripped first.
                let digits = &clean[2..];
                match number::parse_radix_integer(digits, sign, radix) {
                    Some(n) => Ok(TypedValue::Integer(n)),
                    None => {
                        let raw_ref = self.ref_for_identifier(text, span);
                        Ok(TypedValue::FloatRaw(raw_ref))
                    }
                }
            }
        }
    }

    /// Parse an optional `(type)` prefix followed by the token it
    /// immediately annotates, enforcing the no-whitespace adjacency rule at
    /// every boundary.
    fn parse_type_then(&mut self) -> Result<(Option<(StringRef, crate::error::Span)>, SpannedToken)> {
        let save = self.lexer.pos();
        let open = self.next()?;
        if open.kind != TokenKind::TypeOpen {
            self.lexer.set_pos(save);
            let tok = self.next()?;
            return Ok((None, tok));
        }
        let open_end = open.span.offset + open.span.len;
        let name_tok = self.next()?;
        if name_tok.span.offset != open_end {
            return Err(Self::with_span(GrammaticalError::InvalidTypeAnnotation.into(), name_tok.span));
        }
        let name_text = match &name_tok.kind {
            TokenKind::Identifier(s) => s.clone(),
            TokenKind::String { text, .. } => text.clone(),
            _ => return Err(Self::with_span(GrammaticalError::InvalidTypeAnnotation.into(), name_tok.span)),
        };
        let name_end = name_tok.span.offset + name_tok.span.len;
        let close = self.next()?;
        if close.kind != TokenKind::TypeClose || close.span.offset != name_end {
            return Err(Self::with_span(GrammaticalError::InvalidTypeAnnotation.into(), close.span));
        }
        let type_ref = self.ref_for_identifier(&name_text, name_tok.span);
        let close_end = close.span.offset + close.span.len;
        let annotated = self.next()?;
        if annotated.span.offset != close_end {
            return Err(Self::with_span(GrammaticalError::InvalidTypeAnnotation.into(), annotated.span));
        }
        Ok((Some((type_ref, open.span)), annotated))
    }
}

fn describe(kind: &TokenKind) -> StdString {
    match kind {
        TokenKind::Identifier(s) => alloc::format!("identifier `{s}`"),
        TokenKind::String { text, .. } => alloc::format!("string {text:?}"),
        TokenKind::Number { text, .. } => alloc::format!("number `{text}`"),
        TokenKind::True => "#true".into(),
        TokenKind::False => "#false".into(),
        TokenKind::Null => "#null".into(),
        TokenKind::Inf => "#inf".into(),
        TokenKind::NegInf => "#-inf".into(),
        TokenKind::Nan => "#nan".into(),
        TokenKind::Equals => "'='".into(),
        TokenKind::LBrace => "'{'".into(),
        TokenKind::RBrace => "'}'".into(),
        TokenKind::Semicolon => "';'".into(),
        TokenKind::Newline => "newline".into(),
        TokenKind::SlashDash => "'/-'".into(),
        TokenKind::TypeOpen => "'('".into(),
        TokenKind::TypeClose => "')'".into(),
        TokenKind::Eof => "end of input".into(),
    }
}
