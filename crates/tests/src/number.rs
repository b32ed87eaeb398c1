use std::fmt::Debug;

/// Numeric values a generic variant can be built from.
pub trait Number: Copy + PartialEq + Debug {}

impl Number for i32 {}
impl Number for i64 {}
impl Number for u32 {}
impl Number for f64 {}
