use std::process::Command;

use anyhow::{anyhow, Result};
use rootstrap_core::Arch;
use rootstrap_registry::run_command;
use tracing::info;

use crate::PackageBuilder;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandPackageBuilder {
    program: String,
    args: Vec<String>,
}

impl CommandPackageBuilder {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    pub(crate) fn command(&self, package: &str, arch: &Arch, force: bool) -> Command {
        let mut command = Command::new(&self.program);
        command.args(&self.args);
        if force {
            command.arg("--force");
        }
        command.arg("--arch").arg(arch.as_str()).arg(package);
        command
    }
}

impl PackageBuilder for CommandPackageBuilder {
    fn build(&mut self, package: &str, arch: &Arch, force: bool) -> Result<()> {
        if force {
            info!("build {package} for {arch} (forced)");
        }
        let mut command = self.command(package, arch, force);
        run_command(
            &mut command,
            &format!("failed to build '{package}' for {arch}"),
        )
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DisabledBuilder;

impl PackageBuilder for DisabledBuilder {
    fn build(&mut self, package: &str, arch: &Arch, _force: bool) -> Result<()> {
        Err(anyhow!(
            "cannot build '{package}' for {arch}: no build_command is configured"
        ))
    }
}
