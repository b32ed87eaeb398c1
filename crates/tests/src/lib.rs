//! Fixture crate for generated variant artifacts.
//!
//! `base` always takes part in the build; `flavor` only with the `flavor`
//! feature. The build script resolves both into the forwarding types
//! included below, so everything outside the source sets refers to
//! `SimpleConstructorClass` and friends, never to a variant directly.

pub mod base;
#[cfg(feature = "flavor")]
pub mod flavor;
pub mod number;

pub use number::Number;

include!(concat!(env!("OUT_DIR"), "/variant_merge.rs"));
