//! Parse -> serialize round-tripping.

use kdl_rs::{parse, serialize, ParseOptions, SerializeOptions};
use proptest::prelude::*;

fn canonical(src: &str) -> String {
    let doc = parse(src, ParseOptions::new()).unwrap();
    serialize(&doc, SerializeOptions::new())
}

#[test]
fn serializing_twice_is_idempotent() {
    let src = r#"
        (kdl)document {
            node1 "a" "b" k=1
            node2 (u8)255 {
                leaf #null #true #false
            }
        }
    "#;
    let once = canonical(src);
    let twice = canonical(&once);
    assert_eq!(once, twice);
}

#[test]
fn logically_equal_after_round_trip() {
    let src = "parent (dec)1.5 k=\"x\" {\n    child\n}";
    let doc = parse(src, ParseOptions::new()).unwrap();
    let text = serialize(&doc, SerializeOptions::new());
    let reparsed = parse(&text, ParseOptions::new()).unwrap();
    assert!(doc.logically_eq(&reparsed));
}

proptest! {
    #[test]
    fn integer_values_round_trip(n in any::<i32>()) {
        let src = format!("node {n}");
        let doc = parse(&src, ParseOptions::new()).unwrap();
        let text = serialize(&doc, SerializeOptions::new());
        let reparsed = parse(&text, ParseOptions::new()).unwrap();
        prop_assert!(doc.logically_eq(&reparsed));
    }

    #[test]
    fn bare_identifier_names_round_trip(name in "[a-zA-Z_][a-zA-Z0-9_]{0,12}") {
        let src = format!("{name} 1");
        let doc = parse(&src, ParseOptions::new()).unwrap();
        let text = serialize(&doc, SerializeOptions::new());
        prop_assert!(text.starts_with(&name));
        let reparsed = parse(&text, ParseOptions::new()).unwrap();
        prop_assert!(doc.logically_eq(&reparsed));
    }
}
