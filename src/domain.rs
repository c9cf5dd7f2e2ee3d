use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const MANIFEST_FILE: &str = "WorldsProject.json";
pub const BASELINE_DIR: &str = "Data";
pub const SOURCE_DIR: &str = "SourceData";
pub const OUTPUT_DIR: &str = "BuiltData";

#[derive(Deserialize, Debug, Serialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProjectManifest {
    pub project_name: String,
    /// Overlay directory names under the source root, applied in order.
    #[serde(default)]
    pub copy_directories: Vec<String>,
}

/// Where the stager reads from and writes to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageConfig {
    pub manifest_path: PathBuf,
    pub baseline_dir: PathBuf,
    pub source_dir: PathBuf,
    pub output_dir: PathBuf,
    /// Assemble into `<output>.staging` and swap into place only on success.
    pub atomic: bool,
}

impl StageConfig {
    /// The standard project layout under `root`.
    pub fn from_root(root: &Path) -> Self {
        StageConfig {
            manifest_path: root.join(MANIFEST_FILE),
            baseline_dir: root.join(BASELINE_DIR),
            source_dir: root.join(SOURCE_DIR),
            output_dir: root.join(OUTPUT_DIR),
            atomic: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StageReport {
    pub project_name: String,
    pub copied: Vec<String>,
    pub skipped: Vec<String>,
}

#[derive(Deserialize, Debug, Serialize, Clone, PartialEq, Eq)]
pub struct FileListSpec {
    pub root: PathBuf,
    pub patterns: Vec<String>,
    pub output: PathBuf,
    #[serde(default = "default_variable")]
    pub variable: String,
    #[serde(default)]
    pub template: Option<PathBuf>,
}

fn default_variable() -> String {
    "SOURCE_FILES".to_string()
}

#[derive(Deserialize, Debug, Serialize, Clone, PartialEq, Eq)]
pub struct FileListConfig {
    pub lists: Vec<FileListSpec>,
}

#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct FileList {
    pub variable: String,
    pub files: Vec<String>,
    pub output: PathBuf,
}
