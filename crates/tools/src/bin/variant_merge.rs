//! Variant Merge CLI
//!
//! Usage: `variant-merge <generate|check|plan> --root DIR[=MODULE]... [--out-dir DIR]`

use clap::Parser;
use std::process;

use variant_merge_tools::commands::{Cli, report, run};

fn main() {
    variant_merge_tools::init_logging();

    let cli = Cli::parse();

    match run(&cli.command) {
        Ok(Some(output)) => println!("{}", output),
        Ok(None) => {}
        Err(e) => {
            report(&e);
            process::exit(1);
        }
    }
}
