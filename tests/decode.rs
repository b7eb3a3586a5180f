//! Typed decode contract exercised from outside the crate.

use kdl_rs::{decode, Decode, DecodeOptions, Document, Kind, NodeHandle, ParseOptions, Result, SemanticError};

struct Server {
    host: String,
    port: u16,
    tls: bool,
}

impl Decode for Server {
    fn decode(doc: &Document, handle: NodeHandle, opts: DecodeOptions) -> Result<Self> {
        let mut host = None;
        let mut port = None;
        let mut tls = false;
        let rec = doc.nodes().get(handle);
        for prop in doc.values().properties_in(rec.props) {
            let key = doc.resolve(prop.name);
            match key {
                "tls" => tls = bool::from_value(doc, &prop.value)?,
                other if opts.strict => {
                    return Err(SemanticError::UnknownField(other.to_string()).into())
                }
                _ => {}
            }
        }
        for child in doc.nodes().children_of(handle) {
            let child_rec = doc.nodes().get(child);
            let name = doc.resolve(child_rec.name);
            let value = child_rec
                .nth_argument(doc, 0)
                .ok_or_else(|| kdl_rs::Error::from(SemanticError::MissingRequiredField("value")))?;
            match name {
                "host" => host = Some(String::from_value(doc, value)?),
                "port" => port = Some(u16::from_value(doc, value)?),
                other if opts.strict => {
                    return Err(SemanticError::UnknownField(other.to_string()).into())
                }
                _ => {}
            }
        }
        Ok(Server {
            host: host.ok_or_else(|| kdl_rs::Error::from(SemanticError::MissingRequiredField("host")))?,
            port: port.ok_or_else(|| kdl_rs::Error::from(SemanticError::MissingRequiredField("port")))?,
            tls,
        })
    }
}

use kdl_rs::FromValue;

#[test]
fn decodes_a_nested_configuration() {
    let server: Server = decode(
        "server tls=#true {\n    host \"example.com\"\n    port 8443\n}",
        ParseOptions::new(),
        DecodeOptions::new(),
    )
    .unwrap();
    assert_eq!(server.host, "example.com");
    assert_eq!(server.port, 8443);
    assert!(server.tls);
}

#[test]
fn missing_required_field_is_reported() {
    let err = decode::<Server>("server {\n    host \"example.com\"\n}", ParseOptions::new(), DecodeOptions::new())
        .unwrap_err();
    assert!(matches!(
        err.kind,
        Kind::Semantic(SemanticError::MissingRequiredField("port"))
    ));
}

#[test]
fn overflowing_port_is_an_integer_overflow() {
    let err = decode::<Server>(
        "server {\n    host \"x\"\n    port 70000\n}",
        ParseOptions::new(),
        DecodeOptions::new(),
    )
    .unwrap_err();
    assert!(matches!(
        err.kind,
        Kind::Semantic(SemanticError::IntegerOverflow { .. })
    ));
}
