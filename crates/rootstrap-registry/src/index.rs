use std::cell::RefCell;
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::SystemTime;

use anyhow::{anyhow, Context, Result};
use flate2::read::MultiGzDecoder;
use rootstrap_core::{parse_records, Arch, ApkVersion, PackageRecord};
use tracing::debug;

pub trait PackageIndex {
    fn package(&self, name: &str, arch: &Arch) -> Result<Option<PackageRecord>>;
}

#[derive(Debug)]
pub struct ApkIndexStore {
    work: PathBuf,
    parsed: RefCell<HashMap<PathBuf, (SystemTime, Rc<Vec<PackageRecord>>)>>,
}

impl ApkIndexStore {
    pub fn new(work: impl Into<PathBuf>) -> Self {
        Self {
            work: work.into(),
            parsed: RefCell::new(HashMap::new()),
        }
    }

    pub fn local_index_path(&self, arch: &Arch) -> PathBuf {
        self.work
            .join("packages")
            .join(arch.as_str())
            .join("APKINDEX.tar.gz")
    }

    pub fn mirror_index_dir(&self, arch: &Arch) -> PathBuf {
        self.work.join(format!("cache_apk_{arch}"))
    }

    pub fn index_paths(&self, arch: &Arch) -> Result<Vec<PathBuf>> {
        let mut paths = Vec::new();
        let local = self.local_index_path(arch);
        if local.is_file() {
            paths.push(local);
        }

        let mirror_dir = self.mirror_index_dir(arch);
        if mirror_dir.is_dir() {
            let mut mirror_paths = Vec::new();
            for entry in fs::read_dir(&mirror_dir).with_context(|| {
                format!("failed to read index cache: {}", mirror_dir.display())
            })? {
                let entry = entry?;
                if !entry.file_type()?.is_file() {
                    continue;
                }
                let path = entry.path();
                if path
                    .file_name()
                    .and_then(|value| value.to_str())
                    .is_some_and(|name| name.starts_with("APKINDEX."))
                {
                    mirror_paths.push(path);
                }
            }
            mirror_paths.sort();
            paths.extend(mirror_paths);
        }

        Ok(paths)
    }

    fn records(&self, path: &Path) -> Result<Rc<Vec<PackageRecord>>> {
        let modified = fs::metadata(path)
            .and_then(|metadata| metadata.modified())
            .with_context(|| format!("failed to stat package index: {}", path.display()))?;
        if let Some((cached_at, records)) = self.parsed.borrow().get(path) {
            if *cached_at == modified {
                return Ok(Rc::clone(records));
            }
        }

        debug!("parsing package index {}", path.display());
        let content = read_index_text(path)?;
        let records = Rc::new(
            parse_records(&content)
                .with_context(|| format!("failed to parse package index: {}", path.display()))?,
        );
        self.parsed
            .borrow_mut()
            .insert(path.to_path_buf(), (modified, Rc::clone(&records)));
        Ok(records)
    }
}

impl PackageIndex for ApkIndexStore {
    fn package(&self, name: &str, arch: &Arch) -> Result<Option<PackageRecord>> {
        let mut exact: Option<(ApkVersion, PackageRecord)> = None;
        let mut provider: Option<(ApkVersion, PackageRecord)> = None;

        for path in self.index_paths(arch)? {
            for record in self.records(&path)?.iter() {
                let slot = if record.name == name {
                    &mut exact
                } else if record.provides_name(name) {
                    &mut provider
                } else {
                    continue;
                };
                let version = ApkVersion::parse(&record.version).with_context(|| {
                    format!("package '{}' in {}", record.name, path.display())
                })?;
                // Earlier indexes win ties: the local index, then mirror caches by file name.
                if slot.as_ref().map_or(true, |(best, _)| version > *best) {
                    *slot = Some((version, record.clone()));
                }
            }
        }

        Ok(exact.or(provider).map(|(_, record)| record))
    }
}

fn read_index_text(path: &Path) -> Result<String> {
    let is_archive = path
        .file_name()
        .and_then(|value| value.to_str())
        .is_some_and(|name| name.ends_with(".tar.gz"));
    if !is_archive {
        return fs::read_to_string(path)
            .with_context(|| format!("failed to read package index: {}", path.display()));
    }

    let file = File::open(path)
        .with_context(|| format!("failed to open package index: {}", path.display()))?;
    let mut archive = tar::Archive::new(MultiGzDecoder::new(file));
    for entry in archive
        .entries()
        .with_context(|| format!("failed to read package index archive: {}", path.display()))?
    {
        let mut entry = entry
            .with_context(|| format!("failed to read package index entry: {}", path.display()))?;
        let is_index = entry
            .path()
            .map(|entry_path| entry_path.as_os_str() == "APKINDEX")
            .unwrap_or(false);
        if !is_index {
            continue;
        }
        let mut content = String::new();
        entry
            .read_to_string(&mut content)
            .with_context(|| format!("failed to read APKINDEX from {}", path.display()))?;
        return Ok(content);
    }

    Err(anyhow!(
        "package index archive has no APKINDEX member: {}",
        path.display()
    ))
}
