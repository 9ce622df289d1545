use super::*;
use crate::errors::EvalErrorKind;
use crate::native::NativeRegistry;
use crate::ScriptContext;
use pretty_assertions::assert_eq;

#[test]
fn test_set_then_get() {
    let mut table = Table::new();
    table.set(Value::Int(1), Value::string("one")).unwrap();
    table.set(Value::string("k"), Value::Bool(true)).unwrap();
    assert_eq!(table.get(&Value::Int(1)).unwrap(), Value::string("one"));
    assert_eq!(table.field("k"), Value::Bool(true));
    assert_eq!(table.len(), 2);
}

#[test]
fn test_overwrite_keeps_one_entry() {
    let mut table = Table::new();
    table.set_field("x", Value::Int(1));
    table.set_field("x", Value::Int(2));
    assert_eq!(table.len(), 1);
    assert_eq!(table.field("x"), Value::Int(2));
}

#[test]
fn test_nil_key_is_rejected() {
    let mut table = Table::new();
    let err = table.set(Value::Nil, Value::Int(1)).unwrap_err();
    assert_eq!(err.kind, EvalErrorKind::InvalidKey);
    assert!(table.is_empty());
    assert!(table.get(&Value::Nil).is_err());
}

#[test]
fn test_missing_and_nil_values_read_alike() {
    let mut table = Table::new();
    table.set_field("present", Value::Nil);
    assert_eq!(table.field("present"), Value::Nil);
    assert_eq!(table.field("absent"), Value::Nil);
}

#[test]
fn test_int_and_float_keys_are_distinct() {
    let mut table = Table::new();
    table.set(Value::Int(1), Value::string("int")).unwrap();
    table.set(Value::Float(1.0), Value::string("float")).unwrap();
    assert_eq!(table.len(), 2);
}

#[test]
fn test_from_iter_skips_nil_keys() {
    let table: Table = [
        (Value::Nil, Value::Int(0)),
        (Value::Int(1), Value::Int(1)),
    ]
    .into_iter()
    .collect();
    assert_eq!(table.len(), 1);
}

#[test]
fn test_last_handle_evicts_table() {
    let context = ScriptContext::new(NativeRegistry::new());
    let handle = context.new_table(Table::new());
    let id = handle.id();
    let copy = handle.clone();
    assert_eq!(context.tables().reference_count(id), Some(2));

    drop(handle);
    assert_eq!(context.tables().reference_count(id), Some(1));
    drop(copy);
    assert!(context.tables().get(id).is_none());

    // The slot is reused under a new generation.
    let fresh = context.new_table(Table::new());
    assert_eq!(fresh.id().index(), id.index());
    assert_ne!(fresh.id(), id);
    assert!(Handle::new(context.tables(), id).is_none());
}
