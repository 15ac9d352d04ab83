use std::collections::BTreeMap;

use anyhow::Result;
use rootstrap_core::{Arch, ChrootSuffix, PackageRecord, PackageSpec};
use rootstrap_registry::PackageIndex;
use rootstrap_resolver::{expand_closure, Candidate};

use crate::{read_installed, AportsLookup, DependencyResolver, WorkLayout};

pub struct IndexResolver<'a> {
    pub layout: &'a WorkLayout,
    pub index: &'a dyn PackageIndex,
    pub aports: &'a dyn AportsLookup,
}

impl DependencyResolver for IndexResolver<'_> {
    fn expand(
        &self,
        requested: &[PackageSpec],
        suffix: &ChrootSuffix,
        arch: &Arch,
    ) -> Result<Vec<PackageSpec>> {
        let installed = read_installed(self.layout, suffix)?;
        expand_closure(requested, |name| {
            if let Some(record) = self.index.package(name, arch)? {
                return Ok(Candidate::Record(record));
            }
            if let Some(record) = installed_candidate(&installed, name) {
                return Ok(Candidate::Record(record.clone()));
            }
            if self.aports.find(name)?.is_some() {
                return Ok(Candidate::Source);
            }
            Ok(Candidate::Missing)
        })
    }
}

fn installed_candidate<'a>(
    installed: &'a BTreeMap<String, PackageRecord>,
    name: &str,
) -> Option<&'a PackageRecord> {
    installed
        .get(name)
        .or_else(|| installed.values().find(|record| record.provides_name(name)))
}
