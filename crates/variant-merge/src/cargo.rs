//! Build-script entry point.
//!
//! ```ignore
//! // build.rs
//! fn main() {
//!     let config = variant_merge::GeneratorConfig::default()
//!         .root("src/base", "crate::base")
//!         .root("src/flavor", "crate::flavor");
//!     if let Err(err) = variant_merge::cargo::run(config) {
//!         eprintln!("error[{}]: {}", err.kind(), err);
//!         std::process::exit(1);
//!     }
//! }
//! ```
//!
//! The including crate then pulls the artifacts in with
//! `include!(concat!(env!("OUT_DIR"), "/variant_merge.rs"));`.

use std::env;

use crate::config::GeneratorConfig;
use crate::error::Result;
use crate::{GenerationReport, Generator};

/// Runs a generation pass from a build script.
///
/// An unset `out_dir` is taken from `OUT_DIR`. Every source root is
/// registered with `cargo:rerun-if-changed`.
pub fn run(mut config: GeneratorConfig) -> Result<GenerationReport> {
    if config.out_dir.as_os_str().is_empty()
        && let Some(out_dir) = env::var_os("OUT_DIR")
    {
        config.out_dir = out_dir.into();
    }
    for root in &config.roots {
        println!("cargo:rerun-if-changed={}", root.path.display());
    }
    Generator::new(config).generate()
}
