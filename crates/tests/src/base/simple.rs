use variant_merge_macros::variant_merge;

#[variant_merge(name = "SimpleConstructorClass", priority = 1)]
pub struct MainSimple {
    pub flavor: String,
}

impl MainSimple {
    pub fn new() -> Self {
        Self {
            flavor: "main".to_string(),
        }
    }
}

impl Default for MainSimple {
    fn default() -> Self {
        Self::new()
    }
}
