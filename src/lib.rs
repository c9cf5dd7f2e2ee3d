use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use log::{info, warn};

use crate::domain::{FileListSpec, StageConfig};
use crate::error::Result;

pub mod domain;
pub mod error;
pub mod filelist;
pub mod fs;
pub mod logging;
pub mod manifest;
pub mod stage;
pub mod watch;

pub use crate::error::StageError;
pub use crate::stage::stage_assets;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Rebuild the output directory from the baseline data and manifest overlays
    Stage(StageArgs),
    /// Generate a build-system file list from glob patterns
    Filelist(FileListArgs),
    /// Stage, then stage again whenever the inputs change
    Watch {
        #[command(flatten)]
        stage: StageArgs,

        /// Milliseconds of silence before a burst of changes triggers a rebuild
        #[arg(long, default_value_t = watch::default_quiet_ms())]
        quiet_ms: u64,
    },
}

#[derive(clap::Args, Debug, Clone)]
pub struct StageArgs {
    /// Project root holding WorldsProject.json, Data/ and SourceData/
    #[arg(short, long, default_value = ".")]
    pub root: PathBuf,

    /// Project manifest, instead of <root>/WorldsProject.json
    #[arg(long)]
    pub manifest: Option<PathBuf>,

    /// Baseline data tree, instead of <root>/Data
    #[arg(long)]
    pub data: Option<PathBuf>,

    /// Overlay source root, instead of <root>/SourceData
    #[arg(long)]
    pub source: Option<PathBuf>,

    /// Output directory, instead of <root>/BuiltData
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Assemble into a sibling staging directory and swap it in on success
    #[arg(long)]
    pub atomic: bool,
}

impl StageArgs {
    pub fn to_config(&self) -> StageConfig {
        let defaults = StageConfig::from_root(&self.root);
        StageConfig {
            manifest_path: self.manifest.clone().unwrap_or(defaults.manifest_path),
            baseline_dir: self.data.clone().unwrap_or(defaults.baseline_dir),
            source_dir: self.source.clone().unwrap_or(defaults.source_dir),
            output_dir: self.output.clone().unwrap_or(defaults.output_dir),
            atomic: self.atomic,
        }
    }
}

#[derive(clap::Args, Debug, Clone)]
pub struct FileListArgs {
    /// YAML file describing several lists to generate
    #[arg(long, conflicts_with_all = ["root", "pattern", "ext", "output", "template"])]
    pub config: Option<PathBuf>,

    /// Directory to enumerate
    #[arg(short, long, required_unless_present = "config")]
    pub root: Option<PathBuf>,

    /// Glob matched against root-relative paths, e.g. `**/*.cpp`
    #[arg(short, long, required_unless_present_any = ["config", "ext"])]
    pub pattern: Vec<String>,

    /// File extension to include, shorthand for `**/*.<ext>`
    #[arg(short, long)]
    pub ext: Vec<String>,

    /// File to write
    #[arg(short, long, required_unless_present = "config")]
    pub output: Option<PathBuf>,

    /// Variable name passed to the template
    #[arg(long, default_value = "SOURCE_FILES")]
    pub variable: String,

    /// Tera template to render instead of the CMake default
    #[arg(short, long)]
    pub template: Option<PathBuf>,
}

impl FileListArgs {
    /// `None` when a config file supplies the lists instead.
    pub fn to_spec(&self) -> Option<FileListSpec> {
        let root = self.root.clone()?;
        let output = self.output.clone()?;
        let patterns = self
            .pattern
            .iter()
            .cloned()
            .chain(self.ext.iter().map(|e| filelist::extension_pattern(e)))
            .collect();
        Some(FileListSpec {
            root,
            patterns,
            output,
            variable: self.variable.clone(),
            template: self.template.clone(),
        })
    }
}

pub fn run(args: &Args) -> Result<()> {
    match &args.command {
        Command::Stage(stage) => {
            let report = stage_assets(&stage.to_config())?;
            info!(
                "Copied {} overlays, skipped {}",
                report.copied.len(),
                report.skipped.len()
            );
        }
        Command::Filelist(list) => {
            if let Some(config) = &list.config {
                let lists = filelist::generate_from_config(config)?;
                info!("Generated {} file lists", lists.len());
            } else if let Some(spec) = list.to_spec() {
                filelist::generate(&spec)?;
            } else {
                warn!("Nothing to generate: pass --config, or --root with --output");
            }
        }
        Command::Watch { stage, quiet_ms } => {
            watch::watch(&stage.to_config(), Duration::from_millis(*quiet_ms))?;
        }
    }
    Ok(())
}
