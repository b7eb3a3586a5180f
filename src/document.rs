//! The top-level owner of a parsed document: string pool, node store, value
//! store, and the root list, tied together.

use alloc::string::String;
use alloc::vec::Vec;

use crate::node::{NodeHandle, NodeRecord, NodeStore, Span};
use crate::pool::{StringPool, StringRef};
use crate::value::{Entry, Property, Range, Value, ValueStore};

/// A fully parsed KDL document.
///
/// Owns every allocation a parse produced: the interned string pool, the
/// node and value SoA stores, and the root list. Dropping a `Document`
/// releases all of it together.
#[derive(Debug, Default)]
pub struct Document {
    pool: StringPool,
    nodes: NodeStore,
    values: ValueStore,
    roots: Vec<NodeHandle>,
    /// A copy of the source text this document was parsed from, kept so
    /// zero-copy `StringRef`s remain resolvable without the
    /// caller having to keep the original buffer around too.
    source: String,
}

impl Document {
    /// An empty document, ready for a [`crate::event::DOMBuilder`] to populate.
    pub fn new() -> Self {
        Document::default()
    }

    /// Attach the source text this document is being built from. Called
    /// once, before parsing begins.
    pub(crate) fn set_source(&mut self, source: &str) {
        self.source = String::from(source);
    }

    /// Intern a string into this document's pool.
    pub fn intern(&mut self, s: &str) -> StringRef {
        self.pool.intern(s)
    }

    /// A zero-copy reference into the source buffer at `[offset, offset+len)`.
    pub fn borrow_source(&self, offset: u32, len: u32) -> StringRef {
        StringRef::borrowed(offset, len)
    }

    /// The source text this document was parsed from (empty if constructed directly).
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Resolve a `StringRef` obtained from this document to its text.
    pub fn resolve(&self, r: StringRef) -> &str {
        r.resolve(&self.pool, &self.source)
    }

    /// The document's root nodes, in source order.
    pub fn roots(&self) -> &[NodeHandle] {
        &self.roots
    }

    /// Read-only access to the node store.
    pub fn nodes(&self) -> &NodeStore {
        &self.nodes
    }

    /// Read-only access to the value store.
    pub fn values(&self) -> &ValueStore {
        &self.values
    }

    /// Read-only access to the string pool.
    pub fn pool(&self) -> &StringPool {
        &self.pool
    }

    /// Number of nodes appended so far (used by the builder to compute subtree ranges).
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Append a placeholder record for a node that has just been opened;
    /// its ranges are filled in later by [`Document::finish_node`].
    pub(crate) fn push_node_shell(
        &mut self,
        name: StringRef,
        type_annotation: Option<StringRef>,
        parent: Option<NodeHandle>,
        span_start: u32,
    ) -> NodeHandle {
        self.nodes.push(NodeRecord {
            name,
            type_annotation,
            args: Range::EMPTY,
            props: Range::EMPTY,
            entries: Range::EMPTY,
            children: Range::EMPTY,
            parent,
            span: Span {
                start: span_start,
                end: span_start,
            },
        })
    }

    /// Finalize a node once its `end_node` event has arrived: append its
    /// staged arguments/properties/interleave log to the shared value store
    /// (folding properties last-write-wins), and patch in its ranges.
    pub(crate) fn finish_node(
        &mut self,
        handle: NodeHandle,
        args: Vec<Value>,
        props: Vec<(StringRef, Value)>,
        entries: Vec<Entry>,
        children_start: u32,
        children_count: u32,
        span_end: u32,
    ) {
        let args_start = self.values.arguments.len() as u32;
        for a in args.iter() {
            self.values.push_argument(a.clone());
        }
        let args_range = Range::new(args_start, args.len() as u32);

        let props_start = self.values.properties.len() as u32;
        for (name, value) in props.iter() {
            self.values.push_property(Property {
                name: *name,
                value: value.clone(),
            });
        }
        let props_range = Range::new(props_start, props.len() as u32);

        let entries_start = self.values.entries.len() as u32;
        for entry in entries.iter() {
            let rebased = match *entry {
                Entry::Argument(i) => Entry::Argument(args_start + i),
                Entry::Property(i) => Entry::Property(props_start + i),
            };
            self.values.push_entry(rebased);
        }
        let entries_range = Range::new(entries_start, entries.len() as u32);

        let record = self.nodes.get_mut(handle);
        record.args = args_range;
        record.props = props_range;
        record.entries = entries_range;
        record.children = Range::new(children_start, children_count);
        record.span.end = span_end;
    }

    /// Append an already-finalized node record verbatim. Used by the merger
    ///, which computes ranges itself rather
    /// than going through the event builder's staging.
    pub(crate) fn push_raw_node(&mut self, record: NodeRecord) -> NodeHandle {
        self.nodes.push(record)
    }

    /// Append an already-resolved argument value. Used by the merger.
    pub(crate) fn push_raw_argument(&mut self, value: Value) {
        self.values.push_argument(value);
    }

    /// Append an already-resolved property. Used by the merger.
    pub(crate) fn push_raw_property(&mut self, property: Property) {
        self.values.push_property(property);
    }

    /// Append an already-rebased interleave-order entry. Used by the merger.
    pub(crate) fn push_raw_entry(&mut self, entry: Entry) {
        self.values.push_entry(entry);
    }

    /// Compute the root list: every node with no parent, in source order.
    /// Called once, after the event stream is exhausted.
    pub(crate) fn finalize_roots(&mut self) {
        self.roots = self
            .nodes
            .iter()
            .filter(|(_, rec)| rec.parent.is_none())
            .map(|(h, _)| h)
            .collect();
    }

    /// Two documents are logically equal if their root subtrees are
    /// structurally identical (names, type annotations, argument/property
    /// values, child order) even though their underlying handles/pool
    /// layout may differ.
    pub fn logically_eq(&self, other: &Document) -> bool {
        if self.roots.len() != other.roots.len() {
            return false;
        }
        self.roots
            .iter()
            .zip(other.roots.iter())
            .all(|(&a, &b)| self.subtree_eq(a, other, b))
    }

    fn subtree_eq(&self, a: NodeHandle, other: &Document, b: NodeHandle) -> bool {
        let ra = self.nodes.get(a);
        let rb = other.nodes.get(b);
        if self.resolve(ra.name) != other.resolve(rb.name) {
            return false;
        }
        match (ra.type_annotation, rb.type_annotation) {
            (Some(ta), Some(tb)) if self.resolve(ta) == other.resolve(tb) => {}
            (None, None) => {}
            _ => return false,
        }
        let args_a = self.values.arguments_in(ra.args);
        let args_b = other.values.arguments_in(rb.args);
        if args_a.len() != args_b.len() {
            return false;
        }
        if !args_a
            .iter()
            .zip(args_b.iter())
            .all(|(x, y)| self.value_eq(x, other, y))
        {
            return false;
        }
        let props_a = self.values.properties_in(ra.props);
        let props_b = other.values.properties_in(rb.props);
        if props_a.len() != props_b.len() {
            return false;
        }
        if !props_a.iter().zip(props_b.iter()).all(|(x, y)| {
            self.resolve(x.name) == other.resolve(y.name) && self.value_eq(&x.value, other, &y.value)
        }) {
            return false;
        }
        let entries_a = self.values.entries_in(ra.entries);
        let entries_b = other.values.entries_in(rb.entries);
        if entries_a.len() != entries_b.len() {
            return false;
        }
        if !entries_a
            .iter()
            .zip(entries_b.iter())
            .all(|(x, y)| core::mem::discriminant(x) == core::mem::discriminant(y))
        {
            return false;
        }
        let children_a: Vec<_> = self.nodes.children_of(a).collect();
        let children_b: Vec<_> = other.nodes.children_of(b).collect();
        if children_a.len() != children_b.len() {
            return false;
        }
        children_a
            .into_iter()
            .zip(children_b)
            .all(|(ca, cb)| self.subtree_eq(ca, other, cb))
    }

    fn value_eq(&self, a: &Value, other: &Document, b: &Value) -> bool {
        use crate::value::TypedValue::*;
        let types_match = match (a.type_annotation, b.type_annotation) {
            (Some(ta), Some(tb)) => self.resolve(ta) == other.resolve(tb),
            (None, None) => true,
            _ => false,
        };
        if !types_match {
            return false;
        }
        match (&a.value, &b.value) {
            (String(x), String(y)) => self.resolve(*x) == other.resolve(*y),
            (Integer(x), Integer(y)) => x == y,
            (Float(x), Float(y)) => x == y,
            (FloatRaw(x), FloatRaw(y)) => self.resolve(*x) == other.resolve(*y),
            (Bool(x), Bool(y)) => x == y,
            (Null, Null) | (Inf, Inf) | (NegInf, NegInf) | (Nan, Nan) => true,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{DOMBuilder, Event, EventSink};
    use crate::value::TypedValue;

    #[test]
    fn nested_children_have_correct_subtree_ranges() {
        let mut builder = DOMBuilder::new(Document::new());
        let parent_name = builder_intern(&mut builder, "parent");
        builder
            .accept(Event::StartNode {
                name: parent_name,
                type_annotation: None,
                span_start: 0,
            })
            .unwrap();
        let child1 = builder_intern(&mut builder, "child1");
        builder
            .accept(Event::StartNode {
                name: child1,
                type_annotation: None,
                span_start: 1,
            })
            .unwrap();
        let grandchild = builder_intern(&mut builder, "grandchild");
        builder
            .accept(Event::StartNode {
                name: grandchild,
                type_annotation: None,
                span_start: 2,
            })
            .unwrap();
        builder.accept(Event::EndNode { span_end: 3 }).unwrap();
        builder.accept(Event::EndNode { span_end: 4 }).unwrap();
        let child2 = builder_intern(&mut builder, "child2");
        builder
            .accept(Event::StartNode {
                name: child2,
                type_annotation: None,
                span_start: 5,
            })
            .unwrap();
        builder.accept(Event::EndNode { span_end: 6 }).unwrap();
        builder.accept(Event::EndNode { span_end: 7 }).unwrap();

        let doc = builder.finish();
        assert_eq!(doc.roots().len(), 1);
        let parent = doc.roots()[0];
        let immediate: Vec<_> = doc.nodes().children_of(parent).collect();
        assert_eq!(immediate.len(), 2);
        assert_eq!(doc.resolve(doc.nodes().get(immediate[0]).name), "child1");
        assert_eq!(doc.resolve(doc.nodes().get(immediate[1]).name), "child2");
        let grandkids: Vec<_> = doc.nodes().children_of(immediate[0]).collect();
        assert_eq!(grandkids.len(), 1);
        assert_eq!(doc.resolve(doc.nodes().get(grandkids[0]).name), "grandchild");
    }

    #[test]
    fn property_last_write_wins() {
        let mut builder = DOMBuilder::new(Document::new());
        let name = builder_intern(&mut builder, "node");
        builder
            .accept(Event::StartNode {
                name,
                type_annotation: None,
                span_start: 0,
            })
            .unwrap();
        let k = builder_intern(&mut builder, "k");
        builder
            .accept(Event::Property {
                name: k,
                value: Value::new(TypedValue::Integer(1)),
            })
            .unwrap();
        builder
            .accept(Event::Property {
                name: k,
                value: Value::new(TypedValue::Integer(2)),
            })
            .unwrap();
        builder.accept(Event::EndNode { span_end: 10 }).unwrap();
        let doc = builder.finish();
        let root = doc.roots()[0];
        let props = doc.values().properties_in(doc.nodes().get(root).props);
        assert_eq!(props.len(), 1);
        assert_eq!(props[0].value.value, TypedValue::Integer(2));
    }

    fn build_property_then_argument() -> Document {
        let mut builder = DOMBuilder::new(Document::new());
        let name = builder_intern(&mut builder, "node");
        builder
            .accept(Event::StartNode {
                name,
                type_annotation: None,
                span_start: 0,
            })
            .unwrap();
        let k = builder_intern(&mut builder, "k");
        builder
            .accept(Event::Property {
                name: k,
                value: Value::new(TypedValue::Integer(1)),
            })
            .unwrap();
        let a = builder_intern(&mut builder, "a");
        builder
            .accept(Event::Argument(Value::new(TypedValue::String(a))))
            .unwrap();
        builder.accept(Event::EndNode { span_end: 10 }).unwrap();
        builder.finish()
    }

    #[test]
    fn entries_log_preserves_property_before_argument_order() {
        use crate::value::Entry;

        let doc = build_property_then_argument();
        let root = doc.roots()[0];
        let entries = doc.values().entries_in(doc.nodes().get(root).entries);
        assert_eq!(entries, &[Entry::Property(0), Entry::Argument(0)]);
    }

    #[test]
    fn logically_eq_distinguishes_interleave_order() {
        let property_first = build_property_then_argument();

        let mut builder = DOMBuilder::new(Document::new());
        let name = builder_intern(&mut builder, "node");
        builder
            .accept(Event::StartNode {
                name,
                type_annotation: None,
                span_start: 0,
            })
            .unwrap();
        let a = builder_intern(&mut builder, "a");
        builder
            .accept(Event::Argument(Value::new(TypedValue::String(a))))
            .unwrap();
        let k = builder_intern(&mut builder, "k");
        builder
            .accept(Event::Property {
                name: k,
                value: Value::new(TypedValue::Integer(1)),
            })
            .unwrap();
        builder.accept(Event::EndNode { span_end: 10 }).unwrap();
        let argument_first = builder.finish();

        assert!(!property_first.logically_eq(&argument_first));
        assert!(property_first.logically_eq(&property_first));
    }

    fn builder_intern(builder: &mut DOMBuilder, s: &str) -> StringRef {
        builder.doc.intern(s)
    }
}
