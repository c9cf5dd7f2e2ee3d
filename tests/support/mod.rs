#![allow(dead_code)]

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use walkdir::WalkDir;
use worlds_build::domain::StageConfig;

pub struct Project {
    pub dir: TempDir,
}

impl Project {
    pub fn new() -> Self {
        Project {
            dir: tempfile::tempdir().expect("Failed to create temp dir"),
        }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.root().join(relative)
    }

    pub fn config(&self) -> StageConfig {
        StageConfig::from_root(self.root())
    }

    pub fn manifest(&self, name: &str, dirs: &[&str]) {
        let json = serde_json::json!({ "projectName": name, "copyDirectories": dirs });
        fs::write(self.path("WorldsProject.json"), json.to_string()).expect("Failed to write manifest");
    }

    pub fn file(&self, relative: &str, contents: &str) {
        let path = self.path(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).expect("Failed to write file");
    }

    pub fn dir(&self, relative: &str) {
        fs::create_dir_all(self.path(relative)).unwrap();
    }
}

/// Relative path -> contents; directories map to `None`.
pub fn snapshot(root: &Path) -> BTreeMap<String, Option<Vec<u8>>> {
    WalkDir::new(root)
        .min_depth(1)
        .into_iter()
        .map(|e| e.expect("walk failed"))
        .map(|e| {
            let rel = e
                .path()
                .strip_prefix(root)
                .unwrap()
                .to_string_lossy()
                .replace('\\', "/");
            let contents = if e.file_type().is_dir() {
                None
            } else {
                Some(fs::read(e.path()).unwrap())
            };
            (rel, contents)
        })
        .collect()
}
