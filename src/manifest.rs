use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use crate::domain::ProjectManifest;
use crate::error::{Result, StageError};

pub fn load_manifest(path: &Path) -> Result<ProjectManifest> {
    let text = fs::read_to_string(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => StageError::ManifestNotFound {
            path: path.to_path_buf(),
        },
        _ => StageError::Io {
            path: path.to_path_buf(),
            source: e,
        },
    })?;
    parse_manifest(&text).map_err(|source| StageError::ManifestParse {
        path: path.to_path_buf(),
        source,
    })
}

pub fn parse_manifest(text: &str) -> serde_json::Result<ProjectManifest> {
    serde_json::from_str(text)
}
