//! Typed decode contract.
//!
//! This is deliberately straightforward field-by-field dispatch, not a
//! reflection or derive-macro system: a destination type implements [`Decode`] by
//! hand, reading whichever arguments/properties/children it needs off the
//! node it's given. [`decode`] parses the source and hands the single
//! top-level root node to the destination's [`Decode::decode`].

use alloc::string::ToString;

use crate::document::Document;
use crate::error::{Error, Result, SemanticError};
use crate::node::{NodeHandle, NodeRecord};
use crate::parser::{parse, ParseOptions};
use crate::value::{TypedValue, Value};

/// Options controlling a typed decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeOptions {
    /// When `true`, a node or property with no corresponding field on the
    /// destination type is a `SemanticError::UnknownField`. When `false`
    /// (the default), unrecognized input is silently skipped.
    pub strict: bool,
}

impl DecodeOptions {
    /// Lenient decoding: unknown fields are ignored.
    pub const fn new() -> Self {
        DecodeOptions { strict: false }
    }

    /// Build options with strictness toggled.
    pub const fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }
}

impl Default for DecodeOptions {
    fn default() -> Self {
        DecodeOptions::new()
    }
}

/// A type that can be populated directly from a parsed KDL node, without
/// going through an intermediate `Document` traversal at the call site.
pub trait Decode: Sized {
    /// Build `Self` from `handle`'s node within `doc`.
    fn decode(doc: &Document, handle: NodeHandle, opts: DecodeOptions) -> Result<Self>;
}

/// Parse `source` and decode its single top-level root node into `T`
///. Returns a `MissingRequiredField` error if the
/// source has no root node, or `TrailingInput`-shaped ambiguity if it has
/// more than one (decode only ever targets a single node's worth of data).
pub fn decode<T: Decode>(source: &str, parse_opts: ParseOptions, decode_opts: DecodeOptions) -> Result<T> {
    let doc = parse(source, parse_opts)?;
    let root = doc
        .roots()
        .first()
        .copied()
        .ok_or_else(|| Error::from(SemanticError::MissingRequiredField("<root node>")))?;
    T::decode(&doc, root, decode_opts)
}

/// Helpers for pulling typed scalars out of a node's arguments/properties,
/// shared by hand-written `Decode` implementations.
impl NodeRecord {
    /// The node's `n`th positional argument, or `None` if it has fewer.
    pub fn nth_argument<'a>(&self, doc: &'a Document, n: usize) -> Option<&'a Value> {
        doc.values().arguments_in(self.args).get(n)
    }

    /// The node's property named `key`, or `None` if absent.
    pub fn property<'a>(&self, doc: &'a Document, key: &str) -> Option<&'a Value> {
        doc.values()
            .properties_in(self.props)
            .iter()
            .find(|p| doc.resolve(p.name) == key)
            .map(|p| &p.value)
    }
}

/// Convert a decoded `TypedValue` into a Rust scalar, surfacing a
/// `SemanticError::TypeMismatch`/`IntegerOverflow` on failure. Implemented
/// for the handful of primitives a hand-written `Decode` impl typically
/// needs; destinations with richer shapes convert `TypedValue` themselves.
pub trait FromValue: Sized {
    /// Convert `value`, resolving any `StringRef` payload against `doc`.
    fn from_value(doc: &Document, value: &Value) -> Result<Self>;
}

impl FromValue for alloc::string::String {
    fn from_value(doc: &Document, value: &Value) -> Result<Self> {
        match &value.value {
            TypedValue::String(r) => Ok(doc.resolve(*r).to_string()),
            other => Err(type_mismatch("string", other)),
        }
    }
}

impl FromValue for bool {
    fn from_value(_doc: &Document, value: &Value) -> Result<Self> {
        match &value.value {
            TypedValue::Bool(b) => Ok(*b),
            other => Err(type_mismatch("bool", other)),
        }
    }
}

impl FromValue for i64 {
    fn from_value(_doc: &Document, value: &Value) -> Result<Self> {
        match &value.value {
            TypedValue::Integer(n) => Ok(*n),
            other => Err(type_mismatch("integer", other)),
        }
    }
}

macro_rules! impl_from_value_int {
    ($($t:ty),*) => {$(
        impl FromValue for $t {
            fn from_value(doc: &Document, value: &Value) -> Result<Self> {
                let n = i64::from_value(doc, value)?;
                <$t>::try_from(n).map_err(|_| {
                    Error::from(SemanticError::IntegerOverflow {
                        value: n.to_string(),
                        target: stringify!($t),
                    })
                })
            }
        }
    )*};
}
impl_from_value_int!(i8, i16, i32, u8, u16, u32, u64);

impl FromValue for f64 {
    fn from_value(_doc: &Document, value: &Value) -> Result<Self> {
        match &value.value {
            TypedValue::Float(f) => Ok(*f),
            TypedValue::Integer(n) => Ok(*n as f64),
            other => Err(type_mismatch("float", other)),
        }
    }
}

fn type_mismatch(expected: &'static str, got: &TypedValue) -> Error {
    SemanticError::TypeMismatch {
        expected,
        got: got.kind_name(),
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Config {
        host: alloc::string::String,
        port: u16,
    }

    impl Decode for Config {
        fn decode(doc: &Document, handle: NodeHandle, opts: DecodeOptions) -> Result<Self> {
            let mut host = None;
            let mut port = None;
            for child in doc.nodes().children_of(handle) {
                let child_rec = doc.nodes().get(child);
                let name = doc.resolve(child_rec.name);
                let value = child_rec
                    .nth_argument(doc, 0)
                    .ok_or_else(|| Error::from(SemanticError::MissingRequiredField("value")))?;
                match name {
                    "host" => host = Some(alloc::string::String::from_value(doc, value)?),
                    "port" => port = Some(u16::from_value(doc, value)?),
                    other if opts.strict => {
                        return Err(SemanticError::UnknownField(other.to_string()).into())
                    }
                    _ => {}
                }
            }
            Ok(Config {
                host: host.ok_or_else(|| Error::from(SemanticError::MissingRequiredField("host")))?,
                port: port.ok_or_else(|| Error::from(SemanticError::MissingRequiredField("port")))?,
            })
        }
    }

    #[test]
    fn decodes_children_into_struct_fields() {
        let cfg: Config = decode(
            "config {\n    host \"localhost\"\n    port 8080\n}",
            ParseOptions::new(),
            DecodeOptions::new(),
        )
        .unwrap();
        assert_eq!(cfg.host, "localhost");
        assert_eq!(cfg.port, 8080);
    }

    #[test]
    fn strict_mode_rejects_unknown_field() {
        let err = decode::<Config>(
            "config {\n    host \"localhost\"\n    port 8080\n    extra 1\n}",
            ParseOptions::new(),
            DecodeOptions::new().strict(true),
        )
        .unwrap_err();
        assert!(matches!(
            err.kind,
            crate::error::Kind::Semantic(SemanticError::UnknownField(_))
        ));
    }

    #[test]
    fn integer_overflow_is_reported() {
        let value = Value::new(TypedValue::Integer(70000));
        let doc = Document::new();
        let err = u16::from_value(&doc, &value).unwrap_err();
        assert!(matches!(
            err.kind,
            crate::error::Kind::Semantic(SemanticError::IntegerOverflow { .. })
        ));
    }
}
