use variant_merge_macros::variant_merge;

#[variant_merge(name = "ConstructorWithArgClass", priority = 1)]
pub struct MainWithArg {
    pub arg: String,
    pub flavor: String,
}

impl MainWithArg {
    pub fn new(arg: String) -> Self {
        Self {
            arg,
            flavor: "main".to_string(),
        }
    }
}
