use catalog_predicates::{DecodeError, Predicate, decode_predicate};
use serde_json::{Value, json};

fn reject(raw: Value) -> DecodeError {
    match decode_predicate(&raw) {
        Ok(p) => panic!("expected {raw} to be rejected, got {p}"),
        Err(e) => e,
    }
}

#[test]
fn null_and_arrays_are_not_predicates() {
    let err = reject(Value::Null);
    assert!(err.reason.contains("null"));
    assert_eq!(err.path.to_string(), "<root>");
    assert!(reject(json!([{ "kind": "api" }])).reason.contains("array"));
}

#[test]
fn operator_mixed_with_properties() {
    let err = reject(json!({ "$all": [], "kind": "api" }));
    assert!(err.reason.contains("only key"), "{err}");
}

#[test]
fn two_operators_in_one_object() {
    let err = reject(json!({ "$all": [], "$any": [] }));
    assert!(err.reason.contains("only key"));
}

#[test]
fn unknown_operators() {
    let err = reject(json!({ "$xor": [] }));
    assert_eq!(err.reason, "unknown operator '$xor'");
    assert_eq!(err.path.to_string(), "$xor");

    let err = reject(json!({ "kind": { "$invalid": "foo" } }));
    assert_eq!(err.reason, "unknown operator '$invalid'");
    assert_eq!(err.path.to_string(), "kind.$invalid");
}

#[test]
fn combinators_need_the_right_operand() {
    let err = reject(json!({ "$any": { "kind": "api" } }));
    assert!(err.reason.contains("array"));
    assert_eq!(err.path.to_string(), "$any");

    let err = reject(json!({ "$all": [{ "kind": "api" }, null] }));
    assert_eq!(err.path.to_string(), "$all[1]");

    let err = reject(json!({ "$not": [{ "kind": "api" }] }));
    assert_eq!(err.path.to_string(), "$not");
}

#[test]
fn value_operators_are_checked() {
    let err = reject(json!({ "metadata.annotations": { "$exists": "yes" } }));
    assert!(err.reason.contains("boolean"));
    assert_eq!(err.path.to_string(), "[\"metadata.annotations\"].$exists");

    let err = reject(json!({ "kind": { "$in": ["api", { "nested": true }] } }));
    assert_eq!(err.path.to_string(), "kind.$in[1]");

    let err = reject(json!({ "kind": { "$in": "api" } }));
    assert!(err.reason.contains("array"));

    let err = reject(json!({ "relations": { "$contains": { "type": { "$exists": 1 } } } }));
    assert_eq!(err.path.to_string(), "relations.$contains.type.$exists");
}

#[test]
fn operators_in_the_wrong_position() {
    let err = reject(json!({ "$exists": true }));
    assert!(err.reason.contains("property value"));

    let err = reject(json!({ "kind": { "$any": ["api"] } }));
    assert!(err.reason.contains("$contains"));
}

#[test]
fn nested_plain_objects_and_nulls_as_values() {
    let err = reject(json!({ "spec": { "type": "service" } }));
    assert_eq!(err.path.to_string(), "spec");

    let err = reject(json!({ "$any": [{ "kind": null }] }));
    assert_eq!(err.path.to_string(), "$any[0].kind");
    assert!(err.reason.contains("null"));
}

#[test]
fn empty_expression_is_accepted() {
    let predicate = decode_predicate(&json!({})).unwrap();
    assert!(matches!(predicate, Predicate::Expression(ref e) if e.is_empty()));
}

#[test]
fn deserialize_goes_through_validation() {
    let err = serde_json::from_str::<Predicate>(r#"{ "$not": { "kind": { "$in": [null] } } }"#)
        .unwrap_err();
    assert!(err.to_string().contains("$not.kind.$in[0]"), "{err}");
}
