use catalog_predicates::{
    Predicate, PredicateError, ReadOptions, read_optional_predicate_from_config,
    read_predicate_from_config,
};
use config::{Config, File, FileFormat};
use serde_json::json;

fn load(json: &str) -> Config {
    Config::builder()
        .add_source(File::from_str(json, FileFormat::Json))
        .build()
        .expect("config builds")
}

#[test]
fn reads_predicate_through_config_crate() {
    let config = load(r#"{ "predicate": { "kind": "component", "spec.type": "service" } }"#);
    let predicate =
        read_predicate_from_config(&config, &ReadOptions::new().with_key("predicate")).unwrap();
    assert_eq!(predicate.to_value(), json!({ "kind": "component", "spec.type": "service" }));
}

#[test]
fn reads_root_through_config_crate() {
    let config = load(r#"{ "kind": "api" }"#);
    let predicate = read_predicate_from_config(&config, &ReadOptions::new()).unwrap();
    assert_eq!(predicate.to_value(), json!({ "kind": "api" }));
}

#[test]
fn missing_key_through_config_crate() {
    let config = load("{}");
    let err = read_predicate_from_config(&config, &ReadOptions::new().with_key("predicate"))
        .unwrap_err();
    assert!(matches!(err, PredicateError::MissingKey { .. }));
    let absent =
        read_optional_predicate_from_config(&config, &ReadOptions::new().with_key("predicate"))
            .unwrap();
    assert!(absent.is_none());
}

#[test]
fn nested_combinators_through_config_crate() {
    let config = load(
        r#"{
            "catalog": {
                "filter": {
                    "$any": [
                        { "kind": "component", "spec.type": "service" },
                        { "$not": { "kind": { "$in": ["api", "resource"] } } }
                    ]
                }
            }
        }"#,
    );
    let predicate =
        read_predicate_from_config(&config, &ReadOptions::new().with_key("catalog.filter")).unwrap();
    assert!(matches!(predicate, Predicate::Any(ref items) if items.len() == 2));
    assert_eq!(
        predicate.to_value(),
        json!({
            "$any": [
                { "kind": "component", "spec.type": "service" },
                { "$not": { "kind": { "$in": ["api", "resource"] } } }
            ]
        })
    );
}

#[test]
fn invalid_predicate_through_config_crate() {
    let config = load(r#"{ "predicate": { "kind": { "$invalid": "foo" } } }"#);
    let err =
        read_optional_predicate_from_config(&config, &ReadOptions::new().with_key("predicate"))
            .unwrap_err();
    assert!(err.to_string().contains("Invalid predicate in config"));
}
