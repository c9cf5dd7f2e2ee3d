use std::fs;
use std::io::{Error, ErrorKind};
use std::path::Path;

use log::debug;
use walkdir::WalkDir;

use crate::error::{Result, StageError};

/// Removes `output_dir` and everything under it. The directory is left absent.
pub fn prepare_output_dir(output_dir: &Path) -> Result<()> {
    if output_dir.exists() {
        debug!("Cleaning output directory: {}", output_dir.display());
        fs::remove_dir_all(output_dir).map_err(StageError::io(output_dir))?;
    }
    Ok(())
}

pub fn copy_asset(path: &Path, output_path: &Path) -> Result<()> {
    if let Some(parent) = output_path.parent() {
        fs::create_dir_all(parent).map_err(StageError::io(parent))?;
    }
    debug!("Copying asset: {} -> {}", path.display(), output_path.display());
    fs::copy(path, output_path).map_err(StageError::io(path))?;
    Ok(())
}

/// Recursively copies the directory `src` to `dst`, which must not exist yet.
///
/// Empty directories are recreated and symlinks are followed. Returns the
/// number of files copied.
pub fn copy_tree(src: &Path, dst: &Path) -> Result<usize> {
    if !src.is_dir() {
        return Err(StageError::Io {
            path: src.to_path_buf(),
            source: Error::new(ErrorKind::NotFound, "source is not a directory"),
        });
    }
    if dst.exists() {
        return Err(StageError::Io {
            path: dst.to_path_buf(),
            source: Error::new(ErrorKind::AlreadyExists, "destination already exists"),
        });
    }

    let mut copied = 0;
    for entry in WalkDir::new(src).follow_links(true) {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(src).to_path_buf();
            StageError::Io {
                path,
                source: e.into(),
            }
        })?;
        let path = entry.path();
        let relative_path = path.strip_prefix(src).map_err(|_e| StageError::Io {
            path: path.to_path_buf(),
            source: Error::new(ErrorKind::Other, "Failed to compute relative path"),
        })?;
        let output_path = dst.join(relative_path);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&output_path).map_err(StageError::io(&output_path))?;
        } else {
            copy_asset(path, &output_path)?;
            copied += 1;
        }
    }
    Ok(copied)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn copies_nested_files_and_empty_dirs() {
        let tmp = tempfile::tempdir().unwrap();
        let src = tmp.path().join("src");
        fs::create_dir_all(src.join("nested/deeper")).unwrap();
        fs::create_dir_all(src.join("empty")).unwrap();
        fs::write(src.join("top.txt"), "top").unwrap();
        fs::write(src.join("nested/deeper/leaf.bin"), [0u8, 1, 2, 255]).unwrap();

        let dst = tmp.path().join("dst");
        let copied = copy_tree(&src, &dst).unwrap();

        assert_eq!(copied, 2);
        assert_eq!(fs::read_to_string(dst.join("top.txt")).unwrap(), "top");
        assert_eq!(fs::read(dst.join("nested/deeper/leaf.bin")).unwrap(), vec![0u8, 1, 2, 255]);
        assert!(dst.join("empty").is_dir());
    }

    #[test]
    fn refuses_existing_destination() {
        let tmp = tempfile::tempdir().unwrap();
        let src = tmp.path().join("src");
        let dst = tmp.path().join("dst");
        fs::create_dir_all(&src).unwrap();
        fs::create_dir_all(&dst).unwrap();

        let err = copy_tree(&src, &dst).unwrap_err();
        match err {
            StageError::Io { source, .. } => assert_eq!(source.kind(), ErrorKind::AlreadyExists),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn prepare_removes_existing_output() {
        let tmp = tempfile::tempdir().unwrap();
        let out = tmp.path().join("out");
        fs::create_dir_all(out.join("stale")).unwrap();
        fs::write(out.join("stale/file"), "x").unwrap();

        prepare_output_dir(&out).unwrap();
        assert!(!out.exists());
        prepare_output_dir(&out).unwrap();
    }
}
