use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rootstrap_core::ChrootSuffix;
use thiserror::Error;
use tracing::debug;

use crate::{RootFs, SessionCache};

pub const LOCAL_PACKAGES_MOUNT: &str = "/mnt/local-packages";

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("repository-sync-failed: failed to update {path}: content still differs after rewriting it")]
    StillOutdated { path: PathBuf },
}

pub fn repository_urls(mirrors: &[String], local_repository: bool) -> Vec<String> {
    let mut urls = Vec::with_capacity(mirrors.len() + 1);
    if local_repository {
        urls.push(LOCAL_PACKAGES_MOUNT.to_string());
    }
    urls.extend(mirrors.iter().cloned());
    urls
}

pub fn read_repository_list(path: &Path) -> Result<Option<Vec<String>>> {
    Ok(read_repository_text(path)?
        .map(|content| content.lines().map(str::to_string).collect()))
}

fn read_repository_text(path: &Path) -> Result<Option<String>> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(err)
            .with_context(|| format!("failed to read repository list: {}", path.display())),
    }
}

// One entry per line, each terminated by `\n`.
fn repository_list_text(desired: &[String]) -> String {
    desired.iter().map(|line| format!("{line}\n")).collect()
}

pub fn update_repository_list(
    session: &mut SessionCache,
    root_fs: &mut dyn RootFs,
    suffix: &ChrootSuffix,
    path: &Path,
    desired: &[String],
) -> Result<()> {
    if session.repository_list_synced(suffix) {
        return Ok(());
    }

    let expected = repository_list_text(desired);
    let existing = match read_repository_text(path)? {
        Some(content) => Some(content),
        None => {
            if let Some(parent) = path.parent() {
                root_fs.create_dir_all(parent)?;
            }
            None
        }
    };
    if existing.as_deref().unwrap_or_default() == expected {
        session.mark_repository_list_synced(suffix);
        return Ok(());
    }

    debug!("({suffix}) update {}", path.display());
    if existing.is_some() {
        root_fs.remove_file(path)?;
    }
    for line in desired {
        root_fs.append_line(path, line)?;
    }

    let written = read_repository_text(path)?.unwrap_or_default();
    if written != expected {
        return Err(SyncError::StillOutdated {
            path: path.to_path_buf(),
        }
        .into());
    }

    session.mark_repository_list_synced(suffix);
    Ok(())
}
