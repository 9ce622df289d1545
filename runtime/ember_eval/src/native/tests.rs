use super::*;
use crate::errors::EvalErrorKind;
use pretty_assertions::assert_eq;

fn noop(_: &mut Interpreter, _: Registers) -> ReturnValue {
    ReturnValue::empty()
}

#[test]
fn test_register_and_lookup() {
    let mut registry = NativeRegistry::new();
    let id = registry
        .register(
            NativeFunction::new("move_to", noop)
                .arg("target", NativeType::Vec3)
                .nullable_arg("speed", NativeType::Float),
        )
        .unwrap();

    assert_eq!(registry.lookup(Ident::from_name("move_to")), Some(id));
    assert_eq!(registry.lookup(Ident::from_name("missing")), None);

    let function = registry.get(id).unwrap();
    assert_eq!(function.arity(), 2);
    assert!(function.arguments[1].flags.contains(ArgumentFlags::NULLABLE));
    assert!(function.arguments[0].flags.is_empty());
}

#[test]
fn test_too_many_arguments_rejected() {
    let mut registry = NativeRegistry::new();
    let mut function = NativeFunction::new("wide", noop);
    for name in ["a", "b", "c", "d", "e", "f", "g"] {
        function = function.arg(name, NativeType::Int);
    }
    let err = registry.register(function).unwrap_err();
    assert_eq!(
        err.kind,
        EvalErrorKind::SlotLimit {
            name: "wide".into(),
            what: "arguments",
            limit: ARGUMENT_SLOTS,
        }
    );
    assert!(registry.is_empty());
}

#[test]
fn test_too_many_results_rejected() {
    let mut registry = NativeRegistry::new();
    let mut function = NativeFunction::new("tall", noop);
    for _ in 0..=RESULT_SLOTS {
        function = function.returns(NativeType::Int);
    }
    assert!(registry.register(function).is_err());
}

#[test]
fn test_six_arguments_fit() {
    let mut registry = NativeRegistry::new();
    let mut function = NativeFunction::new("six", noop);
    for name in ["a", "b", "c", "d", "e", "f"] {
        function = function.arg(name, NativeType::Int);
    }
    assert!(registry.register(function).is_ok());
}

#[test]
fn test_reregistering_replaces() {
    let mut registry = NativeRegistry::new();
    registry.register(NativeFunction::new("f", noop)).unwrap();
    let id = registry
        .register(NativeFunction::new("f", noop).arg("x", NativeType::Any))
        .unwrap();
    assert_eq!(registry.len(), 1);
    assert_eq!(registry.get(id).unwrap().arity(), 1);
}

#[test]
fn test_core_natives() {
    let registry = NativeRegistry::with_core_natives();
    for name in ["assert", "print", "table", "sqrt", "min", "pow"] {
        assert!(registry.lookup(Ident::from_name(name)).is_some(), "{name}");
    }
}
