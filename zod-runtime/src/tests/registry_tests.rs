//! Tests for recursive schemas built through a registry.

use crate::prelude::*;
use serde_json::json;

#[test]
fn test_self_referencing_schema() {
    let registry = SchemaRegistry::new();
    let node = registry.declare("Node");
    registry.define(
        node,
        z::object()
            .field("value", z::number())
            .field("next", registry.reference(node).nullable()),
    );
    let list = registry.reference(node);
    assert!(list.is(json!({"value": 1, "next": {"value": 2, "next": null}})));
    let error = list
        .parse(json!({"value": 1, "next": {"value": "two", "next": null}}))
        .unwrap_err();
    assert_eq!(crate::display_path(&error.issues()[0].path), "next.value");
}

#[test]
fn test_mutually_recursive_schemas() {
    let registry = SchemaRegistry::new();
    let expr = registry.declare("Expr");
    let call = registry.declare("Call");
    registry.define(
        expr,
        z::union(schemas![z::number(), registry.reference(call)]),
    );
    registry.define(
        call,
        z::object()
            .field("fn", z::string())
            .field("args", registry.reference(expr).array()),
    );
    let schema = registry.reference(expr);
    assert!(schema.is(json!({"fn": "add", "args": [1, {"fn": "neg", "args": [2]}]})));
    assert!(!schema.is(json!({"fn": "add", "args": ["x"]})));
}

#[test]
fn test_redefinition_replaces_schema() {
    let registry = SchemaRegistry::new();
    let id = registry.register("Id", z::string());
    let reference = registry.reference(id);
    assert!(reference.is("a"));
    registry.define(id, z::number());
    assert!(reference.is(1));
    assert!(!reference.is("a"));
}

#[test]
fn test_get_by_name_returns_definition() {
    let registry = SchemaRegistry::new();
    registry.register("Flag", z::boolean());
    let flag = registry.get_by_name("Flag").unwrap();
    assert_eq!(flag.type_tag(), TypeTag::Boolean);
}

#[test]
#[should_panic(expected = "before it was defined")]
fn test_undefined_reference_panics_on_parse() {
    let registry = SchemaRegistry::new();
    let id = registry.declare("Pending");
    let _ = registry.reference(id).parse(1);
}

#[test]
#[should_panic(expected = "registry was dropped")]
fn test_reference_outliving_registry_panics() {
    let reference = {
        let registry = SchemaRegistry::new();
        let id = registry.register("Gone", z::string());
        registry.reference(id)
    };
    let _ = reference.parse("x");
}

#[test]
#[should_panic(expected = "does not belong to this registry")]
fn test_foreign_id_panics() {
    let first = SchemaRegistry::new();
    let second = SchemaRegistry::new();
    let id = first.declare("A");
    first.declare("B");
    let foreign = first.declare("C");
    assert_ne!(id, foreign);
    second.define(foreign, z::string());
}
