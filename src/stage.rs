use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::domain::{ProjectManifest, StageConfig, StageReport};
use crate::error::{Result, StageError};
use crate::fs::{copy_tree, prepare_output_dir};
use crate::manifest::load_manifest;

/// Builds the output directory from the baseline tree plus the manifest's
/// overlay directories.
pub fn stage_assets(config: &StageConfig) -> Result<StageReport> {
    let manifest = load_manifest(&config.manifest_path)?;
    info!("Building project {}...", manifest.project_name);

    let report = if config.atomic {
        stage_atomically(config, &manifest)?
    } else {
        assemble(config, &manifest, &config.output_dir)?
    };

    info!("Build of {} finished.", manifest.project_name);
    Ok(report)
}

fn stage_atomically(config: &StageConfig, manifest: &ProjectManifest) -> Result<StageReport> {
    let staging_dir = staging_path(&config.output_dir);
    match assemble(config, manifest, &staging_dir) {
        Ok(report) => {
            prepare_output_dir(&config.output_dir)?;
            fs::rename(&staging_dir, &config.output_dir).map_err(StageError::io(&staging_dir))?;
            Ok(report)
        }
        Err(e) => {
            let _ = fs::remove_dir_all(&staging_dir);
            Err(e)
        }
    }
}

fn assemble(config: &StageConfig, manifest: &ProjectManifest, target: &Path) -> Result<StageReport> {
    prepare_output_dir(target)?;

    if !config.baseline_dir.is_dir() {
        return Err(StageError::BaselineMissing {
            path: config.baseline_dir.clone(),
        });
    }
    copy_tree(&config.baseline_dir, target)?;

    let mut report = StageReport {
        project_name: manifest.project_name.clone(),
        ..StageReport::default()
    };

    for name in &manifest.copy_directories {
        let source = config.source_dir.join(name);
        if !source.exists() {
            warn!("Copy directory `{}` doesn't exist.", name);
            report.skipped.push(name.clone());
            continue;
        }

        let destination = target.join(name);
        if destination.exists() {
            return Err(StageError::OverlayCollision {
                name: name.clone(),
                destination,
            });
        }
        copy_tree(&source, &destination)?;
        report.copied.push(name.clone());
    }

    Ok(report)
}

/// `BuiltData` -> `BuiltData.staging`, next to the output directory.
pub fn staging_path(output_dir: &Path) -> PathBuf {
    let mut name = output_dir
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| OsString::from("output"));
    name.push(".staging");
    output_dir.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn staging_dir_is_a_sibling() {
        assert_eq!(
            staging_path(Path::new("/proj/BuiltData")),
            PathBuf::from("/proj/BuiltData.staging")
        );
        assert_eq!(staging_path(Path::new("out")), PathBuf::from("out.staging"));
    }
}
