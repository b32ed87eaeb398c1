use variant_merge_macros::variant_merge;

#[variant_merge(name = "Widget", priority = 1)]
struct Widget;

fn main() {}
