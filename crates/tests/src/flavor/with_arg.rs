use variant_merge_macros::variant_merge;

#[variant_merge(name = "ConstructorWithArgClass", priority = 2)]
pub struct FlavorWithArg {
    pub arg: String,
    pub flavor: String,
}

impl FlavorWithArg {
    pub fn new(arg: String) -> Self {
        Self {
            arg,
            flavor: "flavor".to_string(),
        }
    }
}
