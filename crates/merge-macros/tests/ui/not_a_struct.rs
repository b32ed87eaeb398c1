use variant_merge_macros::variant_merge;

#[variant_merge(name = "Widget", priority = 1)]
pub enum Widget {
    Plain,
}

fn main() {}
