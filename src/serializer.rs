//! Canonical KDL serializer.

use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;

use crate::classify;
use crate::document::Document;
use crate::node::NodeHandle;
use crate::number;
use crate::value::{Entry, TypedValue, Value};

/// Options controlling serialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SerializeOptions {
    /// The string used for one level of indentation. The canonical form
    /// uses four spaces; overriding this still produces
    /// valid KDL, just not the crate's canonical rendering.
    pub indent: &'static str,
}

impl SerializeOptions {
    /// The canonical serialization options: four-space indentation.
    pub const fn new() -> Self {
        SerializeOptions { indent: "    " }
    }

    /// Build options with a custom indentation string.
    pub const fn indent(mut self, indent: &'static str) -> Self {
        self.indent = indent;
        self
    }
}

impl Default for SerializeOptions {
    fn default() -> Self {
        SerializeOptions::new()
    }
}

/// Render `doc` to canonical KDL text.
pub fn serialize(doc: &Document, opts: SerializeOptions) -> String {
    let mut out = String::new();
    for (i, &root) in doc.roots().iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        write_node(doc, &mut out, root, 0, &opts);
    }
    out
}

/// Write `doc` to a `std::io::Write` sink, for callers streaming output
/// rather than building a `String` in memory.
#[cfg(feature = "std")]
pub fn serialize_to_writer<W: std::io::Write>(
    doc: &Document,
    writer: &mut W,
    opts: SerializeOptions,
) -> crate::error::Result<()> {
    let text = serialize(doc, opts);
    writer
        .write_all(text.as_bytes())
        .map_err(|e| crate::error::ResourceError::Io(format!("{e}")).into())
}

/// Render `doc` to a `String`, an alias kept for callers migrating from
/// `std::io`-free call sites.
#[cfg(feature = "std")]
pub fn to_string(doc: &Document, opts: SerializeOptions) -> String {
    serialize(doc, opts)
}

fn write_node(doc: &Document, out: &mut String, handle: NodeHandle, depth: usize, opts: &SerializeOptions) {
    for _ in 0..depth {
        out.push_str(opts.indent);
    }
    let rec = doc.nodes().get(handle);
    if let Some(t) = rec.type_annotation {
        out.push('(');
        write_identifier(out, doc.resolve(t));
        out.push(')');
    }
    write_identifier(out, doc.resolve(rec.name));

    for entry in doc.values().entries_in(rec.entries) {
        out.push(' ');
        match *entry {
            Entry::Argument(i) => write_value(doc, out, &doc.values().arguments[i as usize]),
            Entry::Property(i) => {
                let prop = &doc.values().properties[i as usize];
                write_identifier(out, doc.resolve(prop.name));
                out.push('=');
                write_value(doc, out, &prop.value);
            }
        }
    }

    let children: Vec<_> = doc.nodes().children_of(handle).collect();
    if !children.is_empty() {
        out.push_str(" {\n");
        for child in children {
            write_node(doc, out, child, depth + 1, opts);
            out.push('\n');
        }
        for _ in 0..depth {
            out.push_str(opts.indent);
        }
        out.push('}');
    }
}

fn write_value(doc: &Document, out: &mut String, value: &Value) {
    if let Some(t) = value.type_annotation {
        out.push('(');
        write_identifier(out, doc.resolve(t));
        out.push(')');
    }
    match &value.value {
        TypedValue::String(r) => write_string(out, doc.resolve(*r)),
        TypedValue::Integer(n) => out.push_str(&number::format_integer(*n)),
        TypedValue::Float(f) => out.push_str(&number::format_float(*f)),
        TypedValue::FloatRaw(r) => out.push_str(doc.resolve(*r)),
        TypedValue::Bool(true) => out.push_str("#true"),
        TypedValue::Bool(false) => out.push_str("#false"),
        TypedValue::Null => out.push_str("#null"),
        TypedValue::Inf => out.push_str("#inf"),
        TypedValue::NegInf => out.push_str("#-inf"),
        TypedValue::Nan => out.push_str("#nan"),
    }
}

/// Write `name` bare if it matches the identifier grammar (`true`, `false`,
/// `null`, `inf`, `nan` are only keywords when `#`-prefixed, so they stay
/// bare here too), double-quoted with minimal escaping otherwise.
fn write_identifier(out: &mut String, name: &str) {
    if is_bare_identifier_safe(name) {
        out.push_str(name);
    } else {
        write_string(out, name);
    }
}

fn is_bare_identifier_safe(s: &str) -> bool {
    if s.is_empty() {
        return false;
    }
    let mut chars = s.chars();
    let first = chars.next().unwrap();
    if !classify::is_identifier_start(first) && !matches!(first, '-' | '+') {
        return false;
    }
    if matches!(first, '-' | '+') {
        // A bare identifier starting with a sign must not look like the
        // start of a number literal (e.g. `-1` is a number, not a name).
        if let Some(second) = s.chars().nth(1) {
            if second.is_ascii_digit() || second == '.' {
                return false;
            }
        }
    }
    s.chars().all(classify::is_identifier_continue)
}

fn write_string(out: &mut String, s: &str) {
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{0008}' => out.push_str("\\b"),
            '\u{000C}' => out.push_str("\\f"),
            c if c.is_control() => out.push_str(&format!("\\u{{{:x}}}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{parse, ParseOptions};

    fn round_trip(src: &str) -> String {
        let doc = parse(src, ParseOptions::new()).unwrap();
        serialize(&doc, SerializeOptions::new())
    }

    #[test]
    fn bare_node_renders_plain() {
        assert_eq!(round_trip("node"), "node");
    }

    #[test]
    fn arguments_and_properties_in_order() {
        assert_eq!(round_trip(r#"node "a" k=1"#), r#"node "a" k=1"#);
    }

    #[test]
    fn property_before_argument_order_preserved() {
        assert_eq!(round_trip(r#"node k=1 "a""#), r#"node k=1 "a""#);
    }

    #[test]
    fn interleaved_arguments_and_properties_preserve_order() {
        assert_eq!(
            round_trip(r#"node 1 k="a" 2 j="b""#),
            r#"node 1 k="a" 2 j="b""#
        );
    }

    #[test]
    fn string_value_containing_slash_or_hash_is_never_emitted_bare() {
        assert!(!is_bare_identifier_safe("a/b"));
        assert!(!is_bare_identifier_safe("a#b"));
        // a name that merely starts with a sign isn't a number, so it still
        // needs the reserved-byte check to apply past the first character.
        assert!(!is_bare_identifier_safe("-a/b"));
    }

    #[test]
    fn nested_children_indented() {
        let out = round_trip("parent {\n    child1\n    child2 arg=1\n}");
        assert_eq!(out, "parent {\n    child1\n    child2 arg=1\n}");
    }

    #[test]
    fn identifier_needing_quotes_is_quoted() {
        let doc = parse(r#""weird name" 1"#, ParseOptions::new()).unwrap();
        let out = serialize(&doc, SerializeOptions::new());
        assert_eq!(out, r#""weird name" 1"#);
    }

    #[test]
    fn type_annotations_preserved() {
        assert_eq!(round_trip("(u8)byte 255"), "(u8)byte 255");
    }

    #[test]
    fn idempotent_round_trip() {
        let src = r#"(u8)parent "a" k=1 {
    child1
    child2 arg=2
}"#;
        let once = round_trip(src);
        let twice = round_trip(&once);
        assert_eq!(once, twice);
    }
}
