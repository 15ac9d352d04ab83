use std::path::{Path, PathBuf};

use rootstrap_core::{Arch, ChrootSuffix};
use rootstrap_registry::LOCAL_PACKAGES_MOUNT;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkLayout {
    work: PathBuf,
}

impl WorkLayout {
    pub fn new(work: impl Into<PathBuf>) -> Self {
        Self { work: work.into() }
    }

    pub fn work(&self) -> &Path {
        &self.work
    }

    pub fn chroot_dir(&self, suffix: &ChrootSuffix) -> PathBuf {
        self.work.join(format!("chroot_{suffix}"))
    }

    pub fn chroot_path(&self, suffix: &ChrootSuffix, inner: &str) -> PathBuf {
        self.chroot_dir(suffix).join(inner.trim_start_matches('/'))
    }

    pub fn repositories_path(&self, suffix: &ChrootSuffix) -> PathBuf {
        self.chroot_path(suffix, "/etc/apk/repositories")
    }

    pub fn installed_db_path(&self, suffix: &ChrootSuffix) -> PathBuf {
        self.chroot_path(suffix, "/lib/apk/db/installed")
    }

    pub fn apk_binary_path(&self, suffix: &ChrootSuffix) -> PathBuf {
        self.chroot_path(suffix, "/sbin/apk")
    }

    pub fn local_package_path(&self, arch: &Arch, name: &str, version: &str) -> String {
        format!("{LOCAL_PACKAGES_MOUNT}/{arch}/{name}-{version}.apk")
    }
}
