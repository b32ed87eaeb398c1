use variant_merge_macros::variant_merge;

#[variant_merge(name = "not a type", priority = 1)]
pub struct Widget;

fn main() {}
