//! End-to-end scenarios through the public API.

use serde::Deserialize;
use serde_json::json;
use zod_runtime::prelude::*;
use zod_runtime::{IssueCode, ParseOptions, TypeTag};

// =============================================================================
// Form validation
// =============================================================================

fn signup() -> Schema {
    z::object()
        .field("email", z::string().trim().to_lowercase().email())
        .field("password", z::string().min(8))
        .field("confirm", z::string())
        .field("age", z::coerce::number().int().gte(13.0).optional())
        .field("role", z::enum_(["user", "admin"]).default_value("user"))
        .field("tags", z::string().array().max(3).default_value(json!([])))
        .strict()
        .refine(
            |v| v.get("password") == v.get("confirm"),
            RefineParams::new().message("Passwords don't match").path(["confirm"]),
        )
}

#[test]
fn test_signup_happy_path() {
    let parsed = signup()
        .parse(json!({
            "email": "  Ada@Example.com ",
            "password": "correct horse",
            "confirm": "correct horse",
            "age": "36"
        }))
        .unwrap();
    assert_eq!(
        parsed.to_json(),
        json!({
            "email": "ada@example.com",
            "password": "correct horse",
            "confirm": "correct horse",
            "age": 36,
            "role": "user",
            "tags": []
        })
    );
}

#[test]
fn test_signup_collects_field_errors() {
    let error = signup()
        .parse(json!({
            "email": "not-an-email",
            "password": "short",
            "confirm": "short",
            "age": "12",
            "role": "root",
            "debug": true
        }))
        .unwrap_err();
    let flattened = error.flatten();
    assert_eq!(flattened.field_errors["email"], vec!["Invalid email"]);
    assert_eq!(
        flattened.field_errors["password"],
        vec!["String must contain at least 8 character(s)"]
    );
    assert_eq!(
        flattened.field_errors["age"],
        vec!["Number must be greater than or equal to 13"]
    );
    assert!(flattened.field_errors.contains_key("role"));
    assert_eq!(
        flattened.form_errors,
        vec!["Unrecognized key(s) in object: 'debug'"]
    );
}

#[test]
fn test_signup_refinement_runs_on_valid_shape() {
    let error = signup()
        .parse(json!({
            "email": "ada@example.com",
            "password": "correct horse",
            "confirm": "battery staple"
        }))
        .unwrap_err();
    assert_eq!(error.codes(), vec![IssueCode::Custom]);
    assert_eq!(error.flatten().field_errors["confirm"], vec!["Passwords don't match"]);
}

#[test]
fn test_abort_early_reports_one_issue() {
    let options = ParseOptions::new().with_abort_early(true);
    let error = signup()
        .parse_with(json!({"email": "x", "password": "y", "confirm": "y"}), &options)
        .unwrap_err();
    assert_eq!(error.len(), 1);
}

// =============================================================================
// Typed output
// =============================================================================

#[derive(Debug, Deserialize, PartialEq)]
struct Order {
    id: String,
    quantity: u32,
    notes: Option<String>,
}

#[test]
fn test_parsed_value_deserializes_into_struct() {
    let schema = z::object()
        .field("id", z::string().uuid())
        .field("quantity", z::coerce::number().int().positive())
        .field("notes", z::string().trim().optional());
    let parsed = schema
        .parse(json!({"id": "67e55044-10b1-426f-9247-bb680e5fe0c8", "quantity": "2"}))
        .unwrap();
    let order: Order = parsed.deserialize_into().unwrap();
    assert_eq!(
        order,
        Order {
            id: "67e55044-10b1-426f-9247-bb680e5fe0c8".to_string(),
            quantity: 2,
            notes: None,
        }
    );
}

// =============================================================================
// Functions
// =============================================================================

#[test]
fn test_function_schema_guards_calls() {
    let greet = z::function()
        .args(schemas![z::string().min(1)])
        .returns(z::string())
        .implement(|args| {
            let name = args[0].as_str().unwrap_or_default();
            Ok(Value::from(format!("Hello, {}!", name)))
        });
    assert_eq!(
        greet.call(vec![Value::from("Ada")]).unwrap(),
        Value::from("Hello, Ada!")
    );
    let error = greet.call(vec![Value::from("")]).unwrap_err();
    assert_eq!(error.codes(), vec![IssueCode::InvalidArguments]);
}

#[test]
fn test_function_values_are_wrapped_on_parse() {
    let schema = z::function().args(schemas![z::number()]).returns(z::number());
    let double = zod_runtime::Function::new(|args| {
        Ok(Value::from(args[0].as_f64().unwrap_or_default() * 2.0))
    });
    let guarded = schema.parse(double).unwrap();
    let Value::Function(guarded) = guarded else {
        panic!("expected a function");
    };
    assert_eq!(guarded.call(vec![Value::from(4)]).unwrap(), Value::from(8));
    assert!(guarded.call(vec![Value::from("4")]).is_err());
}

// =============================================================================
// Introspection
// =============================================================================

#[test]
fn test_descriptor_snapshot() {
    let schema = z::object()
        .field("name", z::string().describe("Display name"))
        .field("nickname", z::string().nullish())
        .into_schema();
    let descriptor = schema.descriptor();
    assert_eq!(descriptor.type_tag, TypeTag::Object);
    assert_eq!(descriptor.keys, vec!["name", "nickname"]);
    assert_eq!(
        descriptor.children[0].metadata.description.as_deref(),
        Some("Display name")
    );
    assert!(descriptor.children[1].optional && descriptor.children[1].nullable);
    let serialized = serde_json::to_value(&descriptor).unwrap();
    assert_eq!(serialized["type_tag"], json!("object"));
}

#[test]
fn test_debug_parse_still_validates() {
    let options = ParseOptions::new().with_debug(true);
    let schema = z::string().array();
    assert!(schema.parse_with(json!(["a"]), &options).is_ok());
    assert!(schema.debug(true).parse(json!([1])).is_err());
}

#[tokio::test]
async fn test_async_lookup_in_object() {
    let taken = ["admin", "root"];
    let schema = z::object().field(
        "username",
        z::string().refine_async(
            move |v| async move {
                tokio::task::yield_now().await;
                !taken.iter().any(|t| v.as_str() == Some(*t))
            },
            "Username is taken",
        ),
    );
    assert!(schema.parse_async(json!({"username": "ada"})).await.is_ok());
    let error = schema
        .parse_async(json!({"username": "root"}))
        .await
        .unwrap_err();
    assert_eq!(error.issues()[0].path, vec![PathSegment::from("username")]);
}
