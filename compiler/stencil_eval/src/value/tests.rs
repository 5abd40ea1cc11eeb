use std::collections::HashMap;

use pretty_assertions::assert_eq;

use super::*;

fn shown(value: &Value) -> String {
    value.display(AccessorRegistry::global())
}

#[test]
fn truthiness() {
    assert!(!Value::Null.is_truthy());
    assert!(!Value::Bool(false).is_truthy());
    for truthy in [
        Value::Int(0),
        Value::Float(0.0),
        Value::from(""),
        Value::array([]),
        Value::object::<&str>([]),
    ] {
        assert!(truthy.is_truthy(), "{truthy:?}");
    }
}

#[test]
fn numbers_compare_across_representations() {
    assert_eq!(Value::Int(2), Value::Float(2.0));
    assert_eq!(Value::Int(7), Value::BigInt(7));
    assert_eq!(Value::BigInt(1 << 70), Value::BigInt(1 << 70));
    assert_ne!(Value::Int(1), Value::from("1"));
    assert_ne!(Value::Null, Value::Bool(false));
}

#[test]
fn containers_compare_structurally() {
    let a = Value::array([Value::Int(1), Value::object([("k", Value::from("v"))])]);
    let b = Value::array([Value::Int(1), Value::object([("k", Value::from("v"))])]);
    assert_eq!(a, b);
    assert_ne!(a, Value::array([Value::Int(1)]));
    assert_eq!(
        Value::Range(RangeValue::new(1, 3, true)),
        Value::Range(RangeValue::new(1, 4, false))
    );
}

#[test]
fn from_i128_narrows() {
    assert!(matches!(Value::from_i128(5), Value::Int(5)));
    assert!(matches!(Value::from_i128(i128::from(i64::MAX) + 1), Value::BigInt(_)));
    assert_eq!(Value::from_i128(-3).type_name(), "int");
}

#[test]
fn display_forms() {
    assert_eq!(shown(&Value::Null), "");
    assert_eq!(shown(&Value::Float(2.5)), "2.5");
    assert_eq!(
        shown(&Value::array([Value::Null, Value::from("a"), Value::Bool(true)])),
        "[null, a, true]"
    );
    assert_eq!(
        shown(&Value::object([("a", Value::Int(1)), ("b", Value::array([]))])),
        "{a: 1, b: []}"
    );
    assert_eq!(shown(&Value::Range(RangeValue::new(3, 1, true))), "[3, 2, 1]");
    assert_eq!(shown(&Value::Range(RangeValue::new(0, 5000, false))), "0..<5000");
}

#[test]
fn self_referencing_containers_display_finitely() {
    let array = ScriptArray::new();
    array.push(Value::Array(array.clone()));
    let text = shown(&Value::Array(array));
    assert!(text.contains("[...]"));
}

#[test]
fn objects_keep_insertion_order() {
    let object = ScriptObject::new();
    object.insert("z", Value::Int(1));
    object.insert("a", Value::Int(2));
    object.insert("m", Value::Int(3));
    let keys: Vec<String> = object.keys().iter().map(ToString::to_string).collect();
    assert_eq!(keys, ["z", "a", "m"]);
    object.remove("a");
    assert_eq!(object.len(), 2);
}

#[test]
fn read_only_slots() {
    let object = ScriptObject::new();
    object.insert_read_only("id", Value::Int(1));
    assert!(object.is_read_only("id"));
    assert!(object.set("id", Value::Int(2)).is_err());
    object.insert("id", Value::Int(3));
    assert_eq!(object.get("id"), Some(Value::Int(3)));
}

#[test]
fn handles_alias() {
    let array = ScriptArray::new();
    let alias = Value::Array(array.clone());
    array.push(Value::Int(1));
    let Value::Array(seen) = &alias else {
        unreachable!()
    };
    assert_eq!(seen.len(), 1);
    assert!(seen.ptr_eq(&array));
}

#[test]
fn array_set_extends_with_null() {
    let array = ScriptArray::from_vec(vec![Value::Int(1)]);
    array.set(3, Value::Int(4));
    assert_eq!(
        array.to_vec(),
        vec![Value::Int(1), Value::Null, Value::Null, Value::Int(4)]
    );
}

#[test]
fn ranges() {
    let up = RangeValue::new(1, 4, false);
    assert_eq!(up.iter().collect::<Vec<_>>(), vec![1, 2, 3]);
    assert!(up.contains(3) && !up.contains(4));
    let down = RangeValue::new(3, 0, true);
    assert_eq!(down.iter().collect::<Vec<_>>(), vec![3, 2, 1, 0]);
    assert_eq!(down.get(4), None);
    assert!(RangeValue::new(2, 2, false).is_empty());
    assert_eq!(RangeValue::new(i64::MIN, i64::MAX, true).get(0), Some(i64::MIN));
}

#[test]
fn conversions_to_values() {
    let map: HashMap<String, i32> = HashMap::from([("a".to_owned(), 1)]);
    let value = map.to_value();
    assert!(matches!(&value, Value::Object(object) if object.get("a") == Some(Value::Int(1))));
    assert_eq!(vec![1u8, 2].to_value(), Value::array([Value::Int(1), Value::Int(2)]));
    assert_eq!(Some("x".to_owned()).to_value(), Value::from("x"));
    assert_eq!(None::<i64>.to_value(), Value::Null);
}

#[test]
fn conversions_from_values() {
    assert_eq!(i32::from_value(Value::Int(7)).unwrap(), 7);
    assert_eq!(i32::from_value(Value::Null).unwrap(), 0);
    assert_eq!(String::from_value(Value::from("s")).unwrap(), "s");
    assert!(u8::from_value(Value::Int(300)).is_err());
    assert!(bool::from_value(Value::Int(1)).is_err());
    assert_eq!(
        Vec::<i64>::from_value(Value::array([Value::Int(1)])).unwrap(),
        vec![1]
    );
}

#[test]
fn host_values_share_state() {
    let value = Value::opaque(5u32);
    let Value::Host(host) = &value else {
        unreachable!()
    };
    assert_eq!(host.type_name(), "u32");
    host.with_mut::<u32, _>(|n| *n += 1);
    assert_eq!(host.with_ref::<u32, _>(|n| *n), Some(6));
    assert_eq!(host.with_ref::<String, _>(Clone::clone), None);
    assert_eq!(value.clone(), value);
    assert_ne!(value, Value::opaque(6u32));
}
