use anyhow::Result;
use rootstrap_core::{Arch, ChrootSuffix};
use rootstrap_registry::PackageIndex;

use crate::{AportsLookup, InstallError, WorkLayout};

// apk reinstalls an unchanged name, version and release only when given a path.
pub fn replace_aports_packages_with_path(
    layout: &WorkLayout,
    suffix: &ChrootSuffix,
    arch: &Arch,
    aports: &dyn AportsLookup,
    index: &dyn PackageIndex,
    packages: &[String],
) -> Result<Vec<String>> {
    let mut resolved = Vec::with_capacity(packages.len());
    for package in packages {
        if aports.find(package)?.is_none() {
            resolved.push(package.clone());
            continue;
        }

        let record = index.package(package, arch)?.ok_or_else(|| {
            InstallError::InternalConsistency(format!(
                "{package}: could not find binary package, although it should exist for sure at this point; this is probably a subpackage parsing bug"
            ))
        })?;
        let package_path = layout.local_package_path(arch, package, &record.version);
        if layout.chroot_path(suffix, &package_path).exists() {
            resolved.push(package_path);
        } else {
            resolved.push(package.clone());
        }
    }
    Ok(resolved)
}
