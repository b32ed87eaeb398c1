//! Base source set, priority 1.

pub mod generic;
pub mod simple;
pub mod with_arg;
