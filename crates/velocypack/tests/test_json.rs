//! Tests using the `documents.json` test vectors.

use serde::Deserialize;
use velocypack::{Error, Options, Parser, Slice};

#[derive(Deserialize)]
struct DocumentTest {
    description: String,
    json: serde_json::Value,
    expected: String,
}

fn load_documents() -> Vec<DocumentTest> {
    let json = include_str!("testdata/documents.json");
    serde_json::from_str(json).expect("Failed to parse test vectors")
}

#[test]
fn test_document_vectors_roundtrip() {
    for case in &load_documents() {
        let json_str = serde_json::to_string(&case.json).unwrap();

        let builder = Parser::from_json(&json_str)
            .unwrap_or_else(|e| panic!("from_json failed for '{}': {}", case.description, e));

        let result_str = builder
            .slice()
            .and_then(|s| s.to_json())
            .unwrap_or_else(|e| panic!("to_json failed for '{}': {}", case.description, e));

        assert_eq!(
            case.expected, result_str,
            "Roundtrip failed for '{}'",
            case.description
        );
    }
}

#[test]
fn test_document_vectors_layouts_agree() {
    let layouts = [
        Options::default(),
        Options {
            sort_attribute_names: false,
            ..Options::default()
        },
        Options {
            build_unindexed_arrays: true,
            build_unindexed_objects: true,
            ..Options::default()
        },
    ];

    for case in &load_documents() {
        let json_str = serde_json::to_string(&case.json).unwrap();
        let hashes: Vec<u64> = layouts
            .iter()
            .map(|options| {
                let builder = Parser::from_json_with_options(&json_str, options).unwrap();
                let slice = builder.slice().unwrap();
                assert_eq!(
                    slice.to_json_value().unwrap(),
                    case.json,
                    "Value mismatch for '{}'",
                    case.description
                );
                slice.normalized_hash()
            })
            .collect();
        assert!(
            hashes.windows(2).all(|w| w[0] == w[1]),
            "Layouts hash differently for '{}'",
            case.description
        );
    }
}

#[test]
fn test_unsorted_objects_keep_insertion_order() {
    let options = Options {
        sort_attribute_names: false,
        ..Options::default()
    };
    let builder = Parser::from_json_with_options(r#"{"zeta":1,"alpha":2}"#, &options).unwrap();
    assert_eq!(builder.slice().unwrap().to_json().unwrap(), r#"{"zeta":1,"alpha":2}"#);
}

#[test]
fn test_pretty_output() {
    let builder = Parser::from_json(r#"{"b":[1,2],"a":null}"#).unwrap();
    let slice = builder.slice().unwrap();
    let pretty = slice.to_json_pretty().unwrap();
    assert!(pretty.contains('\n'));
    assert_eq!(
        serde_json::from_str::<serde_json::Value>(&pretty).unwrap(),
        serde_json::json!({"a": null, "b": [1, 2]})
    );
    assert_eq!(slice.to_string(), pretty);
}

#[test]
fn test_invalid_json_is_rejected() {
    for input in ["", "{", "[1,]", "{\"a\" 1}", "nul"] {
        assert!(
            matches!(Parser::from_json(input), Err(Error::JsonParse(_))),
            "accepted invalid JSON {input:?}"
        );
    }
}

#[test]
fn test_numbers_pick_the_smallest_encoding() {
    let cases: [(&str, &[u8]); 6] = [
        ("0", &[0x30]),
        ("9", &[0x39]),
        ("-1", &[0x3f]),
        ("10", &[0x28, 0x0a]),
        ("-7", &[0x20, 0xf9]),
        ("65536", &[0x2a, 0x00, 0x00, 0x01]),
    ];
    for (json, bytes) in cases {
        let builder = Parser::from_json(json).unwrap();
        assert_eq!(builder.bytes().unwrap(), bytes, "for {json}");
    }

    let builder = Parser::from_json("0.25").unwrap();
    let slice = builder.slice().unwrap();
    assert!(slice.is_double());
    assert_eq!(slice.get_double().unwrap(), 0.25);
}

#[test]
fn test_dump_of_bare_header_bytes() {
    let bytes = [0x0a];
    assert_eq!(Slice::new(&bytes).to_json().unwrap(), "{}");
    let bytes = [0x01];
    assert_eq!(Slice::new(&bytes).to_json().unwrap(), "[]");
}
