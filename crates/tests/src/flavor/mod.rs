//! Flavor source set, priority 2.

pub mod generic;
pub mod simple;
pub mod with_arg;
