//! Compile-fail tests for the variant_merge attribute
//!
//! These tests verify that the macro rejects the same declarations the
//! generator would refuse to forward to.

#[test]
fn ui() {
    let t = trybuild::TestCases::new();
    t.compile_fail("tests/ui/*.rs");
}
