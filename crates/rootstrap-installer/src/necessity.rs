use std::cmp::Ordering;
use std::collections::BTreeMap;

use anyhow::{Context, Result};
use rootstrap_core::{compare_versions, Arch, PackageRecord, PackageSpec};
use rootstrap_registry::PackageIndex;
use tracing::warn;

use crate::{InstallError, PackageBuilder};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Necessity {
    Required,
    Satisfied,
    InstalledNewer {
        installed: String,
        repository: String,
    },
}

impl Necessity {
    pub fn is_required(&self) -> bool {
        matches!(self, Self::Required)
    }
}

pub struct NecessityCheck<'a> {
    pub arch: &'a Arch,
    pub build: bool,
    pub build_disabled: bool,
    /// Forced rebuilds attempted when an installed package has no binary in
    /// the index before giving up.
    pub max_forced_rebuilds: u32,
    pub installed: &'a BTreeMap<String, PackageRecord>,
    pub index: &'a dyn PackageIndex,
}

pub fn install_is_necessary(
    check: &NecessityCheck<'_>,
    builder: &mut dyn PackageBuilder,
    spec: &PackageSpec,
) -> Result<Necessity> {
    let package = match spec {
        PackageSpec::Remove(name) => {
            return Ok(if check.installed.contains_key(name) {
                Necessity::Required
            } else {
                Necessity::Satisfied
            });
        }
        PackageSpec::Install(name) => name.as_str(),
    };
    let arch = check.arch;

    if check.build && !check.build_disabled {
        builder.build(package, arch, false)?;
    }

    let Some(installed) = check.installed.get(package) else {
        return Ok(Necessity::Required);
    };

    let mut forced_rebuilds = 0;
    let repository = loop {
        if let Some(record) = check.index.package(package, arch)? {
            break record;
        }
        if check.build_disabled {
            return Err(InstallError::BuildDisabled {
                package: package.to_string(),
                arch: arch.to_string(),
            }
            .into());
        }
        if forced_rebuilds >= check.max_forced_rebuilds {
            return Err(InstallError::InternalConsistency(format!(
                "package '{package}' for {arch} still has no binary package after {forced_rebuilds} forced rebuild(s)"
            ))
            .into());
        }

        warn!(
            "internal error: package '{package}' for {arch} has not been built yet, but it should have been; rebuilding it with force"
        );
        builder.build(package, arch, true)?;
        forced_rebuilds += 1;
    };

    let ordering = compare_versions(&installed.version, &repository.version)
        .with_context(|| format!("failed to compare versions of '{package}'"))?;
    Ok(match ordering {
        Ordering::Greater => {
            warn!(
                "{arch} package '{package}' installed version {} is newer than the version in the repositories: {}",
                installed.version, repository.version
            );
            Necessity::InstalledNewer {
                installed: installed.version.clone(),
                repository: repository.version,
            }
        }
        Ordering::Less => Necessity::Required,
        Ordering::Equal if repository.timestamp > installed.timestamp => Necessity::Required,
        Ordering::Equal => Necessity::Satisfied,
    })
}
