//! Variant Merge
//!
//! Build-time resolution of priority-tagged variant definitions into one
//! forwarding type per logical name.
//!
//! Several source sets (a base set and any number of flavor sets) may each
//! declare a struct under the same logical name:
//!
//! ```ignore
//! #[variant_merge(name = "Greeting", priority = 2)]
//! pub struct FlavorGreeting { pub text: String }
//! ```
//!
//! A generation pass runs four stages:
//! 1. **Collect**: every compilation unit is scanned (in parallel) for
//!    annotated structs.
//! 2. **Group**: definitions are partitioned by name; duplicate priorities
//!    within a name are rejected.
//! 3. **Resolve**: the highest priority wins; every other member must be
//!    structurally compatible with it.
//! 4. **Emit**: one `<Name>.rs` artifact per group wraps the winner, plus an
//!    index file listing them.
//!
//! Any error aborts the whole pass before anything is written.

pub mod attribute;
pub mod cargo;
pub mod collect;
pub mod config;
pub mod emit;
pub mod error;
pub mod group;
pub mod model;
pub mod resolve;
mod shape;
pub mod source;
pub mod write;

use std::path::PathBuf;

use serde::Serialize;
use tracing::{info, instrument};

pub use attribute::{DEFAULT_ATTRIBUTE, MergeArgs};
pub use config::{GeneratorConfig, ScanOptions, SourceRoot};
pub use error::{Error, ErrorKind, Result, ScanDefect, ShapeMismatch};
pub use model::{
    AnnotatedDefinition, DefinitionGroup, GeneratedArtifact, ResolvedDefinition, SourceLocation,
};
pub use source::CompilationUnit;
pub use write::WriteSummary;

/// Runs generation passes for one configuration.
#[derive(Debug, Clone)]
pub struct Generator {
    config: GeneratorConfig,
}

/// Everything a pass would write, computed in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan {
    pub units: usize,
    pub resolved: Vec<ResolvedDefinition>,
    pub artifacts: Vec<GeneratedArtifact>,
}

/// Resolution outcome of one group, as reported by `variant-merge plan`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupSummary {
    pub name: String,
    pub winner: String,
    pub priority: i64,
    pub file_name: String,
    pub chain: Vec<ChainEntry>,
}

/// One member of a resolved chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChainEntry {
    pub type_path: String,
    pub priority: i64,
    pub location: SourceLocation,
}

/// Outcome of a completed pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationReport {
    pub units: usize,
    pub groups: usize,
    pub written: Vec<PathBuf>,
    pub unchanged: Vec<PathBuf>,
}

impl Plan {
    pub fn summary(&self) -> Vec<GroupSummary> {
        self.resolved
            .iter()
            .zip(&self.artifacts)
            .map(|(resolved, artifact)| {
                let winner = resolved.winner();
                GroupSummary {
                    name: resolved.name.clone(),
                    winner: winner.type_path.clone(),
                    priority: winner.priority,
                    file_name: artifact.file_name.clone(),
                    chain: resolved
                        .chain
                        .iter()
                        .map(|member| ChainEntry {
                            type_path: member.type_path.clone(),
                            priority: member.priority,
                            location: member.source_location.clone(),
                        })
                        .collect(),
                }
            })
            .collect()
    }
}

impl Generator {
    pub fn new(config: GeneratorConfig) -> Self {
        Self { config }
    }

    /// Collects, groups and resolves the configured roots without emitting.
    pub fn check(&self) -> Result<Vec<ResolvedDefinition>> {
        let units = source::discover(&self.config.roots)?;
        self.resolve_units(&units)
    }

    /// Runs every stage except writing over the configured roots.
    pub fn plan(&self) -> Result<Plan> {
        let units = source::discover(&self.config.roots)?;
        self.plan_units(&units)
    }

    /// Runs every stage except writing over already loaded units.
    pub fn plan_units(&self, units: &[CompilationUnit]) -> Result<Plan> {
        let resolved = self.resolve_units(units)?;
        let artifacts = emit::emit_all(&resolved)?;
        Ok(Plan {
            units: units.len(),
            resolved,
            artifacts,
        })
    }

    /// Runs a full pass and writes the artifacts into `out_dir`.
    #[instrument(skip_all, name = "generate")]
    pub fn generate(&self) -> Result<GenerationReport> {
        let plan = self.plan()?;
        let summary =
            write::write_artifacts(&self.config.out_dir, &self.config.index_file, &plan.artifacts)?;

        info!(
            units = plan.units,
            groups = plan.resolved.len(),
            written = summary.written.len(),
            "generation complete"
        );
        Ok(GenerationReport {
            units: plan.units,
            groups: plan.resolved.len(),
            written: summary.written,
            unchanged: summary.unchanged,
        })
    }

    fn resolve_units(&self, units: &[CompilationUnit]) -> Result<Vec<ResolvedDefinition>> {
        info!(units = units.len(), "scanning compilation units");
        let definitions = collect::collect(units, &self.config.scan_options())?;
        let groups = group::group(definitions)?;
        resolve::resolve_all(groups)
    }
}
