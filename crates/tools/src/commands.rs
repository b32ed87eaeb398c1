//! `variant-merge` subcommands.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use tracing::{error, info};
use variant_merge::{Error, Generator, GeneratorConfig, SourceRoot};

#[derive(Parser, Debug)]
#[command(name = "variant-merge")]
#[command(about = "Resolve priority-tagged variant definitions into forwarding types")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Resolve every group and write the artifacts
    Generate {
        #[command(flatten)]
        scan: ScanArgs,

        /// Generated-output directory
        #[arg(long = "out-dir")]
        out_dir: PathBuf,

        /// Index file name
        #[arg(long = "index-file", default_value = variant_merge::config::DEFAULT_INDEX_FILE)]
        index_file: String,
    },

    /// Collect, group and resolve without writing anything
    Check {
        #[command(flatten)]
        scan: ScanArgs,
    },

    /// Print the resolution plan as JSON
    Plan {
        #[command(flatten)]
        scan: ScanArgs,
    },
}

#[derive(Args, Debug)]
pub struct ScanArgs {
    /// Source root, as DIR or DIR=MODULE (module defaults to `crate`)
    #[arg(long = "root", required = true)]
    pub roots: Vec<SourceRoot>,

    /// Attribute name marking variant definitions
    #[arg(long, default_value = variant_merge::DEFAULT_ATTRIBUTE)]
    pub attribute: String,

    /// Constructor name looked up on each definition
    #[arg(long, default_value = variant_merge::config::DEFAULT_CONSTRUCTOR)]
    pub constructor: String,
}

impl ScanArgs {
    pub fn config(&self) -> GeneratorConfig {
        GeneratorConfig {
            roots: self.roots.clone(),
            attribute: self.attribute.clone(),
            constructor: self.constructor.clone(),
            ..GeneratorConfig::default()
        }
    }
}

impl Command {
    pub fn config(&self) -> GeneratorConfig {
        match self {
            Command::Generate {
                scan,
                out_dir,
                index_file,
            } => GeneratorConfig {
                out_dir: out_dir.clone(),
                index_file: index_file.clone(),
                ..scan.config()
            },
            Command::Check { scan } | Command::Plan { scan } => scan.config(),
        }
    }
}

/// Runs one subcommand; returns the text to print on stdout, if any.
pub fn run(command: &Command) -> Result<Option<String>, Error> {
    let generator = Generator::new(command.config());
    match command {
        Command::Generate { .. } => {
            let report = generator.generate()?;
            info!(
                "{} group(s) from {} unit(s): {} file(s) written, {} unchanged",
                report.groups,
                report.units,
                report.written.len(),
                report.unchanged.len()
            );
            Ok(None)
        }
        Command::Check { .. } => {
            let resolved = generator.check()?;
            for group in &resolved {
                let winner = group.winner();
                info!(
                    "{}: {} (priority {}) over {} other definition(s)",
                    group.name,
                    winner.type_path,
                    winner.priority,
                    group.chain.len() - 1
                );
            }
            info!("{} group(s) resolved", resolved.len());
            Ok(None)
        }
        Command::Plan { .. } => {
            let plan = generator.plan()?;
            let json = serde_json::to_string_pretty(&plan.summary()).map_err(|e| {
                Error::Emission {
                    group: None,
                    path: PathBuf::from("<stdout>"),
                    source: e.into(),
                }
            })?;
            Ok(Some(json))
        }
    }
}

/// Logs a fatal error with its kind, group and locations.
pub fn report(err: &Error) {
    error!(kind = %err.kind(), group = err.group().unwrap_or("-"), "{}", err);
    for location in err.locations() {
        error!("  at {}", location);
    }
}
