//! Streaming event sink contract.
//!
//! Parsing drives a sink through a strict `start_node` / `argument` /
//! `property` / `end_node` sequence. The sink is a capability set, not a
//! base class: [`DOMBuilder`] appends to a
//! `Document`'s SoA stores, [`NullSink`] discards everything (useful for
//! validate-only parses and fuzzing), and a caller's own [`EventSink`]
//! impl can drive incremental/streaming consumption without ever
//! materializing a `Document`.

use alloc::vec::Vec;

use crate::document::Document;
use crate::error::Result;
use crate::node::Span as NodeSpan;
use crate::pool::StringRef;
use crate::value::{Entry, Value};

/// A single structural event emitted by the parser.
#[derive(Debug, Clone)]
pub enum Event {
    /// A node's opening: name, optional type annotation, and the byte
    /// offset of its first byte (including any type annotation/slashdash prefix).
    StartNode {
        /// The node's name.
        name: StringRef,
        /// The node's `(type)` annotation, if any.
        type_annotation: Option<StringRef>,
        /// Byte offset of the node's first byte.
        span_start: u32,
    },
    /// One positional argument, in the order it appeared relative to other
    /// arguments and properties on the same node.
    Argument(Value),
    /// One named property. Later `Property` events for the same name within
    /// the same node supersede earlier ones (folded by [`DOMBuilder`];
    /// passed through unfolded to any other sink).
    Property {
        /// The property's key.
        name: StringRef,
        /// The property's value.
        value: Value,
    },
    /// A node's closing: the byte offset one past its last byte.
    EndNode {
        /// Byte offset one past the node's last byte.
        span_end: u32,
    },
}

/// The sink contract every parse drives. `start_node` and
/// `end_node` calls are always perfectly nested and balanced; a slashdashed
/// construct is parsed but never reaches the sink at all.
pub trait EventSink {
    /// Called for every event in document order.
    fn accept(&mut self, event: Event) -> Result<()>;

    /// Turn decoded text into a `StringRef` the sink can later resolve.
    /// `DOMBuilder` interns into its `Document`'s pool; sinks that discard
    /// values entirely (`NullSink`) can return any stable ref since it's
    /// never resolved.
    fn intern(&mut self, s: &str) -> StringRef;
}

/// Builds a [`Document`] from an event stream.
///
/// Keeps a stack of currently-open nodes; each level stages its own
/// arguments and (pre-fold) properties in a local buffer and only appends
/// to the `Document`'s shared `ValueStore` at `end_node`, once the range is
/// known to be final. Node records themselves are appended at `start_node`
/// so children can reference the parent's handle immediately; the parent's
/// `children` range (its whole subtree) is patched in at its
/// own `end_node` once every descendant has been appended.
pub struct DOMBuilder {
    pub(crate) doc: Document,
    stack: Vec<OpenNode>,
}

struct OpenNode {
    handle: crate::node::NodeHandle,
    args: Vec<Value>,
    props: Vec<(StringRef, Value)>,
    /// Source-order log of which array each argument/property landed in,
    /// so the serializer can replay the original interleave.
    entries: Vec<Entry>,
    children_start: u32,
}

impl DOMBuilder {
    /// Start building into an already-constructed (typically empty) `Document`.
    pub fn new(doc: Document) -> Self {
        DOMBuilder {
            doc,
            stack: Vec::new(),
        }
    }

    /// Finish building, returning the populated `Document`. Errors if a
    /// `start_node` was never matched by an `end_node` (an internal misuse,
    /// not a user-facing parse error: the parser never calls `accept` out
    /// of sequence).
    pub fn finish(mut self) -> Document {
        debug_assert!(self.stack.is_empty(), "DOMBuilder finished with open nodes");
        self.doc.finalize_roots();
        self.doc
    }
}

impl EventSink for DOMBuilder {
    fn intern(&mut self, s: &str) -> StringRef {
        self.doc.intern(s)
    }

    fn accept(&mut self, event: Event) -> Result<()> {
        match event {
            Event::StartNode {
                name,
                type_annotation,
                span_start,
            } => {
                let parent = self.stack.last().map(|o| o.handle);
                let handle = self.doc.push_node_shell(name, type_annotation, parent, span_start);
                let children_start = self.doc.node_count() as u32;
                self.stack.push(OpenNode {
                    handle,
                    args: Vec::new(),
                    props: Vec::new(),
                    entries: Vec::new(),
                    children_start,
                });
                Ok(())
            }
            Event::Argument(value) => {
                let open = self.stack.last_mut().expect("argument event outside any open node");
                let idx = open.args.len() as u32;
                open.args.push(value);
                open.entries.push(Entry::Argument(idx));
                Ok(())
            }
            Event::Property { name, value } => {
                let open = self.stack.last_mut().expect("property event outside any open node");
                if let Some(existing) = open.props.iter_mut().find(|(n, _)| *n == name) {
                    existing.1 = value;
                } else {
                    let idx = open.props.len() as u32;
                    open.props.push((name, value));
                    open.entries.push(Entry::Property(idx));
                }
                Ok(())
            }
            Event::EndNode { span_end } => {
                let open = self.stack.pop().expect("end_node without matching start_node");
                let children_count = self.doc.node_count() as u32 - open.children_start;
                self.doc.finish_node(
                    open.handle,
                    open.args,
                    open.props,
                    open.entries,
                    open.children_start,
                    children_count,
                    span_end,
                );
                Ok(())
            }
        }
    }
}

/// A sink that discards every event. Used to validate a document (and
/// exercise the full tokenizer/parser path) without paying for DOM
/// construction, e.g. a `parse_validate` entry point, or a fuzz harness
/// that only cares whether the recognizer accepts or rejects input.
#[derive(Debug, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn accept(&mut self, _event: Event) -> Result<()> {
        Ok(())
    }

    fn intern(&mut self, s: &str) -> StringRef {
        StringRef::borrowed(0, s.len() as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;
    use crate::value::TypedValue;

    #[test]
    fn null_sink_accepts_everything() {
        let mut sink = NullSink;
        assert!(sink
            .accept(Event::StartNode {
                name: StringRef::borrowed(0, 1),
                type_annotation: None,
                span_start: 0,
            })
            .is_ok());
        assert!(sink.accept(Event::EndNode { span_end: 1 }).is_ok());
    }

    #[test]
    fn dom_builder_assembles_simple_node() {
        let mut builder = DOMBuilder::new(Document::new());
        let name = builder.doc.intern("node");
        builder
            .accept(Event::StartNode {
                name,
                type_annotation: None,
                span_start: 0,
            })
            .unwrap();
        let arg = builder.doc.intern("a");
        builder
            .accept(Event::Argument(Value::new(TypedValue::String(arg))))
            .unwrap();
        builder.accept(Event::EndNode { span_end: 8 }).unwrap();
        let doc = builder.finish();
        assert_eq!(doc.roots().len(), 1);
        let root = doc.roots()[0];
        let record = doc.nodes().get(root);
        assert_eq!(record.args.count, 1);
    }
}
