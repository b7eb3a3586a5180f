//! Partitioning and merging across chunks.

use kdl_rs::{find_partitions, merge_documents, parse, ParseOptions, VirtualDocument};

fn split_and_parse(src: &str, k: usize) -> Vec<kdl_rs::Document> {
    let mut offsets = find_partitions(src, k);
    offsets.push(src.len() as u32);
    let mut chunks = Vec::new();
    let mut start = 0usize;
    for &end in &offsets {
        let end = end as usize;
        if end > start {
            chunks.push(parse(&src[start..end], ParseOptions::new()).unwrap());
        }
        start = end;
    }
    chunks
}

const DOC: &str = "a 1\nb 2\nc { d 3\n  e 4\n}\nf 5\n";

#[test]
fn merged_chunks_match_a_single_parse() {
    let whole = parse(DOC, ParseOptions::new()).unwrap();
    for k in [2, 3, 4, 8] {
        let chunks = split_and_parse(DOC, k);
        let merged = merge_documents(chunks);
        assert!(whole.logically_eq(&merged), "mismatch for k={k}");
    }
}

#[test]
fn find_partitions_never_splits_inside_a_block_or_string() {
    let src = "a { b; c; }\nd \"has a newline? no\"\ne\n";
    let offsets = find_partitions(src, 3);
    for &off in &offsets {
        // Reparsing the prefix up to each offset must succeed on its own,
        // which only holds if the offset lands at a genuine top-level boundary.
        let prefix = &src[..off as usize];
        assert!(parse(prefix, ParseOptions::new()).is_ok(), "bad split at {off}");
    }
}

#[test]
fn virtual_document_preserves_chunk_order_without_copying() {
    let chunks = split_and_parse(DOC, 3);
    let expected_roots: usize = chunks.iter().map(|d| d.roots().len()).sum();
    let virt = VirtualDocument::new(chunks);
    let roots = virt.roots();
    assert_eq!(roots.len(), expected_roots);
    let names: Vec<_> = roots.iter().map(|&h| virt.resolve(h, virt.get(h).name).to_string()).collect();
    assert_eq!(names, vec!["a", "b", "c", "f"]);
}
