use anyhow::Result;
use rootstrap_core::{Arch, ChrootSuffix, PackageSpec};
use rootstrap_registry::{update_repository_list, PackageIndex, RootFs, SessionCache};
use tracing::info;

use crate::{
    check_min_version, install_is_necessary, read_installed, replace_aports_packages_with_path,
    AportsLookup, ApkRunner, ChrootInit, DependencyResolver, InstallError, NecessityCheck,
    PackageBuilder, WorkLayout,
};

/// Transient meta-package grouping dependencies and path installs so that
/// only the requested names end up marked as explicitly installed.
pub const VIRTUAL_PACKAGE: &str = ".rootstrap";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallPolicy {
    pub offline: bool,
    pub build_disabled: bool,
    pub max_forced_rebuilds: u32,
    pub apk_min_version: String,
    pub device_arch: Arch,
    pub repository_urls: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallOutcome {
    NothingToDo,
    Applied { commands: Vec<Vec<String>> },
}

pub struct Installer<'a> {
    pub layout: &'a WorkLayout,
    pub policy: &'a InstallPolicy,
    pub index: &'a dyn PackageIndex,
    pub aports: &'a dyn AportsLookup,
    pub resolver: &'a dyn DependencyResolver,
    pub builder: &'a mut dyn PackageBuilder,
    pub chroot: &'a mut dyn ChrootInit,
    pub root_fs: &'a mut dyn RootFs,
    pub apk: &'a mut dyn ApkRunner,
}

impl Installer<'_> {
    pub fn update_repository_list(
        &mut self,
        session: &mut SessionCache,
        suffix: &ChrootSuffix,
    ) -> Result<()> {
        update_repository_list(
            session,
            &mut *self.root_fs,
            suffix,
            &self.layout.repositories_path(suffix),
            &self.policy.repository_urls,
        )
    }

    pub fn install(
        &mut self,
        session: &mut SessionCache,
        packages: &[PackageSpec],
        suffix: &ChrootSuffix,
        build: bool,
    ) -> Result<InstallOutcome> {
        validate_package_names(packages.iter().map(PackageSpec::name))?;

        check_min_version(session, self.layout, suffix, &self.policy.apk_min_version)?;
        self.chroot.init(suffix)?;
        self.update_repository_list(session, suffix)?;

        let arch = suffix.arch(&self.policy.device_arch)?;
        let closure = self.resolver.expand(packages, suffix, &arch)?;
        validate_package_names(closure.iter().map(PackageSpec::name))?;

        let installed = read_installed(self.layout, suffix)?;
        let check = NecessityCheck {
            arch: &arch,
            build,
            build_disabled: self.policy.build_disabled,
            max_forced_rebuilds: self.policy.max_forced_rebuilds,
            installed: &installed,
            index: self.index,
        };
        let mut to_add = Vec::new();
        let mut to_del = Vec::new();
        for spec in &closure {
            if !install_is_necessary(&check, &mut *self.builder, spec)?.is_required() {
                continue;
            }
            match spec {
                PackageSpec::Install(name) => to_add.push(name.clone()),
                PackageSpec::Remove(name) => to_del.push(name.clone()),
            }
        }
        if to_add.is_empty() && to_del.is_empty() {
            return Ok(InstallOutcome::NothingToDo);
        }

        let mut message = format!("({suffix}) install");
        for spec in packages {
            if let PackageSpec::Install(name) = spec {
                if !installed.contains_key(name) {
                    message.push(' ');
                    message.push_str(name);
                }
            }
        }
        info!("{message}");

        let to_add = replace_aports_packages_with_path(
            self.layout,
            suffix,
            &arch,
            self.aports,
            self.index,
            &to_add,
        )?;
        let commands = compose_apk_commands(packages, &to_add, &to_del);
        self.run_apk_commands(suffix, &commands)?;

        Ok(InstallOutcome::Applied { commands })
    }

    fn run_apk_commands(&mut self, suffix: &ChrootSuffix, commands: &[Vec<String>]) -> Result<()> {
        for (index, command) in commands.iter().enumerate() {
            let mut args = Vec::with_capacity(command.len() + 1);
            if self.policy.offline {
                args.push("--no-network".to_string());
            }
            args.extend(command.iter().cloned());

            if index == 0 {
                self.apk.run_with_progress(suffix, &args)?;
            } else {
                self.apk.run_quiet(suffix, &args)?;
            }
        }
        Ok(())
    }
}

pub fn validate_package_names<'a>(names: impl IntoIterator<Item = &'a str>) -> Result<()> {
    for name in names {
        if name.starts_with('-') {
            return Err(InstallError::InvalidPackageName {
                name: name.to_string(),
            }
            .into());
        }
    }
    Ok(())
}

pub fn compose_apk_commands(
    requested: &[PackageSpec],
    to_add: &[String],
    to_del: &[String],
) -> Vec<Vec<String>> {
    let without_conflicts = requested
        .iter()
        .filter_map(|spec| match spec {
            PackageSpec::Install(name) => Some(name.clone()),
            PackageSpec::Remove(_) => None,
        })
        .collect::<Vec<_>>();

    let mut plain_add = vec!["add".to_string()];
    plain_add.extend(without_conflicts.iter().cloned());

    let mut commands = Vec::new();
    if !to_add.is_empty() && without_conflicts.as_slice() != to_add {
        let mut virtual_add = vec![
            "add".to_string(),
            "-u".to_string(),
            "--virtual".to_string(),
            VIRTUAL_PACKAGE.to_string(),
        ];
        virtual_add.extend(to_add.iter().cloned());
        commands.push(virtual_add);
        commands.push(plain_add);
        commands.push(vec!["del".to_string(), VIRTUAL_PACKAGE.to_string()]);
    } else {
        commands.push(plain_add);
    }

    if !to_del.is_empty() {
        let mut del = vec!["del".to_string()];
        del.extend(to_del.iter().cloned());
        commands.push(del);
    }
    commands
}
