//! End-to-end parse scenarios over the public API.

use kdl_rs::{parse, Kind, LexicalError, ParseOptions};

#[test]
fn parses_a_small_config_document() {
    let src = r#"
        package {
            name "kdl"
            version "2.0.0"
            authors "Alice" "Bob"
        }
        dependency "serde" version="1" optional=#true
    "#;
    let doc = parse(src, ParseOptions::new()).expect("should parse");
    assert_eq!(doc.roots().len(), 2);

    let package = doc.nodes().get(doc.roots()[0]);
    assert_eq!(doc.resolve(package.name), "package");
    let children: Vec<_> = doc.nodes().children_of(doc.roots()[0]).collect();
    assert_eq!(children.len(), 3);
    let authors = doc.nodes().get(children[2]);
    assert_eq!(doc.resolve(authors.name), "authors");
    assert_eq!(doc.values().arguments_in(authors.args).len(), 2);

    let dependency = doc.nodes().get(doc.roots()[1]);
    let props = doc.values().properties_in(dependency.props);
    assert_eq!(props.len(), 2);
}

#[test]
fn type_annotations_and_slashdash_compose() {
    let doc = parse("(package)node /-unused arg1 k=/-1 k=2", ParseOptions::new()).unwrap();
    let root = doc.roots()[0];
    let rec = doc.nodes().get(root);
    assert_eq!(doc.resolve(rec.type_annotation.unwrap()), "package");
    let args = doc.values().arguments_in(rec.args);
    assert_eq!(args.len(), 1);
    let props = doc.values().properties_in(rec.props);
    assert_eq!(props.len(), 1);
}

#[test]
fn empty_source_has_no_roots() {
    let doc = parse("", ParseOptions::new()).unwrap();
    assert!(doc.roots().is_empty());
}

#[test]
fn unexpected_character_is_lexical() {
    let err = parse("node [oops]", ParseOptions::new()).unwrap_err();
    assert!(matches!(
        err.kind,
        Kind::Lexical(LexicalError::UnexpectedCharacter('['))
    ));
}
