use std::path::PathBuf;

use anyhow::Result;
use rootstrap_core::{Arch, ChrootSuffix, PackageSpec};

pub trait PackageBuilder {
    fn build(&mut self, package: &str, arch: &Arch, force: bool) -> Result<()>;
}

pub trait AportsLookup {
    fn find(&self, package: &str) -> Result<Option<PathBuf>>;
}

pub trait ChrootInit {
    fn init(&mut self, suffix: &ChrootSuffix) -> Result<()>;
}

pub trait ApkRunner {
    fn run_with_progress(&mut self, suffix: &ChrootSuffix, args: &[String]) -> Result<()>;

    fn run_quiet(&mut self, suffix: &ChrootSuffix, args: &[String]) -> Result<()>;
}

pub trait DependencyResolver {
    fn expand(
        &self,
        requested: &[PackageSpec],
        suffix: &ChrootSuffix,
        arch: &Arch,
    ) -> Result<Vec<PackageSpec>>;
}
