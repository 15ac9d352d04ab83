use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::AportsLookup;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AportsTree {
    roots: Vec<PathBuf>,
}

impl AportsTree {
    pub fn new(roots: Vec<PathBuf>) -> Self {
        Self { roots }
    }
}

impl AportsLookup for AportsTree {
    fn find(&self, package: &str) -> Result<Option<PathBuf>> {
        if package.is_empty() || package.contains('/') || package.starts_with('.') {
            return Ok(None);
        }

        for root in &self.roots {
            if let Some(found) = apkbuild_dir(root, package) {
                return Ok(Some(found));
            }
            if !root.is_dir() {
                continue;
            }
            let mut repos = Vec::new();
            for entry in fs::read_dir(root)
                .with_context(|| format!("failed to read aports tree: {}", root.display()))?
            {
                let entry = entry?;
                if entry.file_type()?.is_dir() {
                    repos.push(entry.path());
                }
            }
            repos.sort();
            if let Some(found) = repos.iter().find_map(|repo| apkbuild_dir(repo, package)) {
                return Ok(Some(found));
            }
        }
        Ok(None)
    }
}

fn apkbuild_dir(parent: &Path, package: &str) -> Option<PathBuf> {
    let dir = parent.join(package);
    dir.join("APKBUILD").is_file().then_some(dir)
}
