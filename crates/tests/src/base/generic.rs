use variant_merge_macros::variant_merge;

use crate::Number;

#[variant_merge(name = "ConstructorWithGenericClass", priority = 1)]
pub struct MainGeneric<T: Number> {
    pub arg: T,
    pub flavor: String,
}

impl<T: Number> MainGeneric<T> {
    pub fn new(arg: T) -> Self {
        Self {
            arg,
            flavor: "main".to_string(),
        }
    }
}
