//! Runtime behavior of the generated forwarding types.
//!
//! With the default `flavor` feature the flavor definitions (priority 2)
//! win; built with `--no-default-features` only the base set exists and its
//! definitions are selected instead.

use variant_merge_tests::{
    ConstructorWithArgClass, ConstructorWithGenericClass, SimpleConstructorClass,
};

const EXPECTED_FLAVOR: &str = if cfg!(feature = "flavor") {
    "flavor"
} else {
    "main"
};

#[test]
fn test_simple_constructor_uses_highest_priority() {
    let simple = SimpleConstructorClass::new();

    assert_eq!(simple.flavor(), EXPECTED_FLAVOR);
    // Deref exposes the winner's fields directly.
    assert_eq!(simple.flavor, EXPECTED_FLAVOR);
}

#[test]
fn test_constructor_arguments_are_forwarded() {
    let with_arg = ConstructorWithArgClass::new("1".to_string());

    assert_eq!(with_arg.arg(), "1");
    assert_eq!(with_arg.flavor(), EXPECTED_FLAVOR);
}

#[test]
fn test_generic_constructor_is_forwarded() {
    let generic = ConstructorWithGenericClass::new(1);

    assert_eq!(*generic.arg(), 1);
    assert_eq!(generic.flavor(), EXPECTED_FLAVOR);

    let float = ConstructorWithGenericClass::new(2.5_f64);
    assert_eq!(float.arg, 2.5);
}

#[test]
fn test_properties_are_writable() {
    let mut with_arg = ConstructorWithArgClass::new("1".to_string());
    *with_arg.arg_mut() = "2".to_string();
    with_arg.flavor.push_str("-edited");

    assert_eq!(with_arg.arg(), "2");
    assert_eq!(with_arg.flavor(), &format!("{}-edited", EXPECTED_FLAVOR));
}

#[cfg(feature = "flavor")]
#[test]
fn test_into_inner_returns_flavor_definition() {
    use variant_merge_tests::flavor::simple::FlavorSimple;

    let inner: FlavorSimple = SimpleConstructorClass::new().into_inner();
    assert_eq!(inner.flavor, "flavor");
}

#[cfg(not(feature = "flavor"))]
#[test]
fn test_into_inner_returns_base_definition() {
    use variant_merge_tests::base::simple::MainSimple;

    let inner: MainSimple = SimpleConstructorClass::new().into_inner();
    assert_eq!(inner.flavor, "main");
}

#[test]
fn test_lower_priority_definitions_stay_usable() {
    let base = variant_merge_tests::base::with_arg::MainWithArg::new("x".to_string());
    assert_eq!(base.flavor, "main");
}
