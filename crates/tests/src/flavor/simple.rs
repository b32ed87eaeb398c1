use variant_merge_macros::variant_merge;

#[variant_merge(name = "SimpleConstructorClass", priority = 2)]
pub struct FlavorSimple {
    pub flavor: String,
}

impl FlavorSimple {
    pub fn new() -> Self {
        Self {
            flavor: "flavor".to_string(),
        }
    }
}

impl Default for FlavorSimple {
    fn default() -> Self {
        Self::new()
    }
}
