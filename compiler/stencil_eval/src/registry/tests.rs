use std::collections::HashMap;

use pretty_assertions::assert_eq;

use super::*;
use crate::value::{FromValue, ScriptObject, ToValue};

struct Person {
    name: String,
    age: i64,
}

impl Reflect for Person {
    fn describe(table: &mut MemberTable<Self>) {
        table.member("name", |p| p.name.to_value()).setter(|p, v| {
            p.name = String::from_value(v)?;
            Ok(())
        });
        table.member("age", |p| p.age.to_value());
    }
}

struct Account {
    first_name: String,
    secret: String,
    id: i64,
}

impl Reflect for Account {
    fn describe(table: &mut MemberTable<Self>) {
        table.member("firstName", |a| a.first_name.to_value());
        table.member("secret", |a| a.secret.to_value()).ignore();
        table.member("ID", |a| a.id.to_value()).rename("identifier");
        // Maps to the same script name as `firstName` under snake case.
        table.member("first_name", |_| Value::from("shadowed"));
    }
}

fn account() -> Value {
    Value::reflect(Account {
        first_name: "Ada".to_owned(),
        secret: "hunter2".to_owned(),
        id: 7,
    })
}

fn person() -> Value {
    Value::reflect(Person {
        name: "Ada".to_owned(),
        age: 36,
    })
}

#[test]
fn every_kind_of_object_reads_the_same() {
    let registry = AccessorRegistry::new();
    let script = Value::object([("name", Value::from("Ada")), ("age", Value::Int(36))]);
    let map: HashMap<String, Value> = HashMap::from([
        ("name".to_owned(), Value::from("Ada")),
        ("age".to_owned(), Value::Int(36)),
    ]);
    let hosts = [script, Value::host(map), person()];
    for target in &hosts {
        for name in ["name", "age", "missing"] {
            assert_eq!(
                registry.get_member(target, name).unwrap(),
                registry.get_member(&hosts[0], name).unwrap(),
                "{name} on {}",
                target.type_name()
            );
            assert_eq!(
                registry.has_member(target, name),
                name != "missing",
                "{name} on {}",
                target.type_name()
            );
        }
        assert_eq!(registry.length(target), Some(2));
    }
}

#[test]
fn default_policy_is_snake_case() {
    let registry = AccessorRegistry::new();
    let value = account();
    assert_eq!(
        registry.get_member(&value, "first_name").unwrap(),
        Some(Value::from("Ada"))
    );
    assert_eq!(registry.get_member(&value, "firstName").unwrap(), None);
}

#[test]
fn renamed_and_ignored_members() {
    let registry = AccessorRegistry::new();
    let value = account();
    assert_eq!(
        registry.get_member(&value, "identifier").unwrap(),
        Some(Value::Int(7))
    );
    assert_eq!(registry.get_member(&value, "id").unwrap(), None);
    assert!(!registry.has_member(&value, "secret"));
    let names: Vec<String> = registry
        .member_names(&value)
        .unwrap()
        .iter()
        .map(ToString::to_string)
        .collect();
    assert_eq!(names, ["first_name", "identifier"]);
}

#[test]
fn registry_wide_policy() {
    let registry = AccessorRegistry::new().with_naming_policy(identity);
    let value = account();
    assert_eq!(
        registry.get_member(&value, "firstName").unwrap(),
        Some(Value::from("Ada"))
    );
    assert_eq!(
        registry.get_member(&value, "first_name").unwrap(),
        Some(Value::from("shadowed"))
    );
}

#[test]
fn type_policy_replaces_cached_accessor() {
    let registry = AccessorRegistry::new();
    let value = account();
    assert!(registry.has_member(&value, "first_name"));

    registry.set_type_policy::<Account>(camel_case);
    assert!(registry.has_member(&value, "firstName"));
    assert!(!registry.has_member(&value, "first_name"));
    assert!(registry.has_member(&person(), "name"));
}

#[test]
fn reflected_setters() {
    let registry = AccessorRegistry::new();
    let value = person();
    registry
        .set_member(&value, "name", Value::from("Grace"))
        .unwrap();
    assert_eq!(
        registry.get_member(&value, "name").unwrap(),
        Some(Value::from("Grace"))
    );
    assert_eq!(
        registry.set_member(&value, "age", Value::Int(1)),
        Err(AccessError::ReadOnly {
            name: "age".to_owned()
        })
    );
    assert!(matches!(
        registry.set_member(&value, "height", Value::Int(1)),
        Err(AccessError::UnknownMember { .. })
    ));
    assert!(matches!(
        registry.set_member(&value, "name", Value::Int(1)),
        Err(AccessError::Conversion { .. })
    ));
}

#[test]
fn host_maps_take_assignments() {
    let registry = AccessorRegistry::new();
    let value = Value::host(HashMap::<String, i64>::new());
    registry.set_member(&value, "count", Value::Int(3)).unwrap();
    assert_eq!(
        registry.get_index(&value, &Value::from("count")).unwrap(),
        Value::Int(3)
    );
}

#[test]
fn numeric_keys_resolve_from_member_names() {
    let registry = AccessorRegistry::new();
    let value = Value::host(HashMap::from([(1i64, "one".to_owned())]));
    assert_eq!(
        registry.get_member(&value, "1").unwrap(),
        Some(Value::from("one"))
    );
    assert_eq!(
        registry.get_index(&value, &Value::Int(1)).unwrap(),
        Value::from("one")
    );
    assert_eq!(registry.get_member(&value, "one").unwrap(), None);
}

#[test]
fn sequences_grow_on_write() {
    let registry = AccessorRegistry::new();
    let value = Value::host(vec![1i64]);
    registry
        .set_index(&value, &Value::Int(3), Value::Int(4))
        .unwrap();
    assert_eq!(registry.length(&value), Some(4));
    assert_eq!(registry.get_index(&value, &Value::Int(2)).unwrap(), Value::Int(0));
    assert_eq!(registry.get_index(&value, &Value::Int(3)).unwrap(), Value::Int(4));
    assert_eq!(
        registry.get_member(&value, "size").unwrap(),
        Some(Value::Int(4))
    );
}

#[test]
fn growth_per_write_is_bounded() {
    let registry = AccessorRegistry::new();
    let far = Value::Int(3_000_000_000);
    for value in [Value::array(Vec::<Value>::new()), Value::host(vec![1i64])] {
        let len = registry.length(&value).unwrap();
        assert_eq!(
            registry.set_index(&value, &far, Value::Int(1)),
            Err(AccessError::GrowthLimit { index: 3_000_000_000, len })
        );
        assert_eq!(registry.length(&value), Some(len));
    }

    let array = Value::array([Value::Int(0)]);
    let edge = i64::try_from(MAX_INDEX_GROWTH).unwrap();
    registry.set_index(&array, &Value::Int(edge), Value::Int(1)).unwrap();
    assert_eq!(registry.length(&array), Some(MAX_INDEX_GROWTH + 1));
}

#[test]
fn fixed_sequences_reject_growth() {
    let registry = AccessorRegistry::new();
    let value = Value::host([1i64, 2, 3]);
    registry
        .set_index(&value, &Value::Int(1), Value::Int(20))
        .unwrap();
    assert_eq!(registry.get_index(&value, &Value::Int(1)).unwrap(), Value::Int(20));
    assert_eq!(
        registry.set_index(&value, &Value::Int(5), Value::Int(0)),
        Err(AccessError::FixedLength { index: 5, len: 3 })
    );
}

#[test]
fn negative_indices() {
    let registry = AccessorRegistry::new();
    let array = Value::array([Value::Int(1)]);
    assert_eq!(registry.get_index(&array, &Value::Int(-1)).unwrap(), Value::Null);
    assert_eq!(
        registry.set_index(&array, &Value::Int(-1), Value::Int(0)),
        Err(AccessError::NegativeIndex { index: -1 })
    );
    let host = Value::host(vec![1i64]);
    assert_eq!(registry.get_index(&host, &Value::Int(-2)).unwrap(), Value::Null);
}

#[test]
fn array_members() {
    let registry = AccessorRegistry::new();
    let array = Value::array([Value::Int(1), Value::Int(2)]);
    assert_eq!(registry.get_member(&array, "size").unwrap(), Some(Value::Int(2)));
    assert_eq!(registry.get_member(&array, "last").unwrap(), Some(Value::Int(2)));
    assert_eq!(
        registry.get_member(&Value::array([]), "first").unwrap(),
        Some(Value::Null)
    );
    assert!(matches!(
        registry.set_member(&array, "size", Value::Int(0)),
        Err(AccessError::ReadOnly { .. })
    ));
}

#[test]
fn opaque_values_are_integration_errors() {
    let registry = AccessorRegistry::new();
    let value = Value::opaque(5u32);
    let error = registry.get_member(&value, "x").unwrap_err();
    assert!(matches!(error, AccessError::HostIntegration { .. }));
    assert!(!error.is_lookup_failure());
    assert_eq!(registry.length(&value), None);
}

#[test]
fn primitives_have_no_members() {
    let registry = AccessorRegistry::new();
    let error = registry.get_member(&Value::Int(1), "x").unwrap_err();
    assert_eq!(
        error,
        AccessError::NoMembers {
            type_name: "int",
            name: "x".to_owned()
        }
    );
    assert!(error.is_lookup_failure());
    assert_eq!(
        registry.get_member(&Value::from("abc"), "size").unwrap(),
        Some(Value::Int(3))
    );
    assert!(matches!(
        registry.get_index(&Value::Bool(true), &Value::Int(0)),
        Err(AccessError::NotIndexable { .. })
    ));
}

#[test]
fn object_index_by_key() {
    let registry = AccessorRegistry::new();
    let object = ScriptObject::new();
    object.insert("2", Value::from("two"));
    let value = Value::Object(object);
    assert_eq!(registry.get_index(&value, &Value::Int(2)).unwrap(), Value::from("two"));
    assert!(matches!(
        registry.get_index(&value, &Value::Null),
        Err(AccessError::InvalidIndex { .. })
    ));
}

#[test]
fn accessors_resolve_across_threads() {
    let registry = AccessorRegistry::new();
    std::thread::scope(|s| {
        for _ in 0..8 {
            s.spawn(|| {
                let value = person();
                assert_eq!(
                    registry.get_member(&value, "age").unwrap(),
                    Some(Value::Int(36))
                );
            });
        }
    });
}

#[test]
fn naming_conversions() {
    for (host, script) in [
        ("firstName", "first_name"),
        ("FirstName", "first_name"),
        ("first_name", "first_name"),
        ("HTTPServer", "http_server"),
        ("userID", "user_id"),
        ("v2Name", "v2_name"),
        ("x", "x"),
    ] {
        assert_eq!(snake_case(host), script, "{host}");
    }
    assert_eq!(camel_case("first_name"), "firstName");
    assert_eq!(camel_case("_private"), "private");
    assert_eq!(identity("Keep_Me"), "Keep_Me");
}
