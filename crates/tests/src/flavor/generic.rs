use variant_merge_macros::variant_merge;

use crate::Number;

/// Declares no bounds itself; the constructor's impl block carries them.
#[variant_merge(name = "ConstructorWithGenericClass", priority = 2)]
pub struct FlavorGeneric<U> {
    pub arg: U,
    pub flavor: String,
}

impl<V> FlavorGeneric<V>
where
    V: Number,
{
    pub fn new(arg: V) -> Self {
        Self {
            arg,
            flavor: "flavor".to_string(),
        }
    }
}
