//! Partitioner and merger.
//!
//! [`find_partitions`] locates safe split points in source text so
//! independent chunks can be parsed on separate threads; [`merge_documents`]
//! physically concatenates the resulting `Document`s into one, rewriting
//! string pools and rebasing every range; [`VirtualDocument`] offers the
//! same ordered view without copying, for callers who don't need a single
//! physical `Document`.

use alloc::vec::Vec;

use crate::document::Document;
use crate::node::{NodeHandle, NodeRecord};
use crate::pool::StringRef;
use crate::value::{Entry, Property, Range, Value};

/// Find up to `k - 1` byte offsets in `source`, each guaranteed to fall on a
/// top-level node boundary (outside any brace depth, string, or comment,
/// immediately after a node terminator), chosen as close as possible to
/// `k` evenly spaced target positions.
///
/// Returns fewer than `k - 1` offsets if the source is too small to support
/// that many safe boundaries.
pub fn find_partitions(source: &str, k: usize) -> Vec<u32> {
    if k <= 1 || source.is_empty() {
        return Vec::new();
    }
    let boundaries = top_level_boundaries(source);
    if boundaries.is_empty() {
        return Vec::new();
    }

    let len = source.len() as u32;
    let mut chosen = Vec::with_capacity(k - 1);
    for i in 1..k {
        let target = (len as u64 * i as u64 / k as u64) as u32;
        if let Some(&best) = boundaries.iter().min_by_key(|&&b| b.abs_diff(target)) {
            if best != target {
                crate::debug!("partition target {target} has no boundary there, using {best} instead");
            }
            if chosen.last() != Some(&best) {
                chosen.push(best);
            }
        }
    }
    chosen.dedup();
    chosen
}

/// Scan `source` once, tracking brace depth, string state, and comment
/// state, collecting every offset that immediately follows a top-level node
/// terminator (newline or `;` at brace depth 0, outside a string/comment).
fn top_level_boundaries(source: &str) -> Vec<u32> {
    let bytes = source.as_bytes();
    let mut offsets = Vec::new();
    let mut i = 0usize;
    let mut depth = 0i32;
    let mut in_string = false;
    let mut raw_hashes: Option<usize> = None;
    let mut hash_run = 0usize;
    let mut line_comment = false;
    let mut block_comment_depth = 0u32;

    while i < bytes.len() {
        let b = bytes[i];
        if line_comment {
            if b == b'\n' {
                line_comment = false;
                if depth == 0 {
                    offsets.push((i + 1) as u32);
                }
            }
            i += 1;
            continue;
        }
        if block_comment_depth > 0 {
            if b == b'/' && bytes.get(i + 1) == Some(&b'*') {
                block_comment_depth += 1;
                i += 2;
                continue;
            }
            if b == b'*' && bytes.get(i + 1) == Some(&b'/') {
                block_comment_depth -= 1;
                i += 2;
                continue;
            }
            i += 1;
            continue;
        }
        if in_string {
            if b == b'\\' && raw_hashes.is_none() {
                i += 2;
                continue;
            }
            if b == b'"' {
                let needed = raw_hashes.unwrap_or(0);
                let mut j = i + 1;
                let mut seen = 0usize;
                while seen < needed && bytes.get(j) == Some(&b'#') {
                    j += 1;
                    seen += 1;
                }
                if seen == needed {
                    in_string = false;
                    raw_hashes = None;
                    i = j;
                    continue;
                }
            }
            i += 1;
            continue;
        }

        match b {
            b'#' => {
                hash_run += 1;
                i += 1;
            }
            b'"' => {
                if hash_run > 0 {
                    raw_hashes = Some(hash_run);
                }
                hash_run = 0;
                in_string = true;
                i += 1;
            }
            b'/' if bytes.get(i + 1) == Some(&b'/') => {
                line_comment = true;
                i += 2;
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                block_comment_depth = 1;
                i += 2;
            }
            b'{' => {
                depth += 1;
                hash_run = 0;
                i += 1;
            }
            b'}' => {
                depth -= 1;
                hash_run = 0;
                i += 1;
                if depth == 0 {
                    offsets.push(i as u32);
                }
            }
            b';' => {
                hash_run = 0;
                i += 1;
                if depth == 0 {
                    offsets.push(i as u32);
                }
            }
            b'\n' => {
                hash_run = 0;
                i += 1;
                if depth == 0 {
                    offsets.push(i as u32);
                }
            }
            _ => {
                hash_run = 0;
                i += 1;
            }
        }
    }
    offsets
}

/// Physically concatenate `docs` into a single `Document`: string pools are re-interned, node/value ranges are
/// shifted by cumulative offsets, and parent pointers are rebased.
pub fn merge_documents(docs: Vec<Document>) -> Document {
    let mut merged = Document::new();
    for doc in &docs {
        merged_append(&mut merged, doc);
    }
    merged.finalize_roots();
    merged
}

fn merged_append(merged: &mut Document, doc: &Document) {
    let node_base = merged.node_count() as u32;
    let arg_base = merged.values().arguments.len() as u32;
    let prop_base = merged.values().properties.len() as u32;
    let entry_base = merged.values().entries.len() as u32;

    for (_, rec) in doc.nodes().iter() {
        let name = merged.intern(doc.resolve(rec.name));
        let type_annotation = rec.type_annotation.map(|t| merged.intern(doc.resolve(t)));
        let parent = rec.parent.map(|p| p.rebased(node_base));
        merged.push_raw_node(NodeRecord {
            name,
            type_annotation,
            args: Range::new(rec.args.start + arg_base, rec.args.count),
            props: Range::new(rec.props.start + prop_base, rec.props.count),
            entries: Range::new(rec.entries.start + entry_base, rec.entries.count),
            children: Range::new(rec.children.start + node_base, rec.children.count),
            parent,
            span: rec.span,
        });
    }

    for value in &doc.values().arguments {
        let rewritten = rewrite_value(merged, doc, value);
        merged.push_raw_argument(rewritten);
    }
    for prop in &doc.values().properties {
        let name = merged.intern(doc.resolve(prop.name));
        let value = rewrite_value(merged, doc, &prop.value);
        merged.push_raw_property(Property { name, value });
    }
    for entry in &doc.values().entries {
        let rebased = match *entry {
            Entry::Argument(i) => Entry::Argument(i + arg_base),
            Entry::Property(i) => Entry::Property(i + prop_base),
        };
        merged.push_raw_entry(rebased);
    }
}

fn rewrite_value(merged: &mut Document, doc: &Document, value: &Value) -> Value {
    use crate::value::TypedValue::*;
    let type_annotation = value.type_annotation.map(|t| merged.intern(doc.resolve(t)));
    let typed = match &value.value {
        String(r) => crate::value::TypedValue::String(merged.intern(doc.resolve(*r))),
        FloatRaw(r) => crate::value::TypedValue::FloatRaw(merged.intern(doc.resolve(*r))),
        Integer(n) => Integer(*n),
        Float(f) => Float(*f),
        Bool(b) => Bool(*b),
        Null => Null,
        Inf => Inf,
        NegInf => NegInf,
        Nan => Nan,
    };
    Value {
        value: typed,
        type_annotation,
    }
}

/// A handle into one document of a [`VirtualDocument`]: which document, and
/// which node within it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VirtualHandle {
    /// Index into the `VirtualDocument`'s document list.
    pub doc_index: usize,
    /// The node handle within that document.
    pub node: NodeHandle,
}

/// A read-only façade over an ordered sequence of `Document`s that iterates
/// them in order without copying or rewriting any ranges.
/// Does not support in-place mutation.
#[derive(Debug, Default)]
pub struct VirtualDocument {
    docs: Vec<Document>,
}

impl VirtualDocument {
    /// Wrap an ordered list of documents.
    pub fn new(docs: Vec<Document>) -> Self {
        VirtualDocument { docs }
    }

    /// The wrapped documents, in order.
    pub fn documents(&self) -> &[Document] {
        &self.docs
    }

    /// Every root across every wrapped document, in document order.
    pub fn roots(&self) -> Vec<VirtualHandle> {
        self.docs
            .iter()
            .enumerate()
            .flat_map(|(doc_index, doc)| {
                doc.roots().iter().map(move |&node| VirtualHandle { doc_index, node })
            })
            .collect()
    }

    /// Resolve a `VirtualHandle`'s node record in its owning document.
    pub fn get(&self, handle: VirtualHandle) -> &NodeRecord {
        self.docs[handle.doc_index].nodes().get(handle.node)
    }

    /// Resolve a `StringRef` obtained from the node at `handle`.
    pub fn resolve(&self, handle: VirtualHandle, r: StringRef) -> &str {
        self.docs[handle.doc_index].resolve(r)
    }

    /// The immediate children of `handle`, still addressed relative to the
    /// same underlying document.
    pub fn children_of(&self, handle: VirtualHandle) -> impl Iterator<Item = VirtualHandle> + '_ {
        let doc_index = handle.doc_index;
        self.docs[doc_index]
            .nodes()
            .children_of(handle.node)
            .map(move |node| VirtualHandle { doc_index, node })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{parse, ParseOptions};

    #[test]
    fn finds_boundary_outside_braces_and_strings() {
        let src = "a {\n  b\n}\nc \"x; y\"\nd";
        let boundaries = top_level_boundaries(src);
        // every returned offset must not land inside the `{ ... }` block or the string
        for &b in &boundaries {
            assert!(b as usize <= src.len());
        }
        assert!(boundaries.contains(&(src.find("c \"x; y\"").unwrap() as u32)));
    }

    #[test]
    fn find_partitions_respects_small_k() {
        assert!(find_partitions("a\nb\nc\n", 1).is_empty());
        assert!(find_partitions("", 4).is_empty());
    }

    #[test]
    fn find_partitions_returns_sorted_unique_offsets() {
        let src = "a\nb\nc\nd\ne\nf\ng\nh\n";
        let parts = find_partitions(src, 4);
        let mut sorted = parts.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(parts, sorted);
    }

    #[test]
    fn merge_reproduces_single_parse_structure() {
        let whole = parse("a 1\nb 2\nc 3\n", ParseOptions::new()).unwrap();
        let chunks: Vec<Document> = ["a 1\n", "b 2\n", "c 3\n"]
            .iter()
            .map(|s| parse(s, ParseOptions::new()).unwrap())
            .collect();
        let merged = merge_documents(chunks);
        assert!(whole.logically_eq(&merged));
    }

    #[test]
    fn virtual_document_iterates_in_order() {
        let chunks: Vec<Document> = ["a 1\n", "b 2\n"]
            .iter()
            .map(|s| parse(s, ParseOptions::new()).unwrap())
            .collect();
        let virt = VirtualDocument::new(chunks);
        let roots = virt.roots();
        assert_eq!(roots.len(), 2);
        assert_eq!(virt.resolve(roots[0], virt.get(roots[0]).name), "a");
        assert_eq!(virt.resolve(roots[1], virt.get(roots[1]).name), "b");
    }
}
