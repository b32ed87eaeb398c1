use variant_merge_macros::variant_merge;

#[variant_merge(name = "Widget", colour = "red")]
pub struct Widget;

fn main() {}
