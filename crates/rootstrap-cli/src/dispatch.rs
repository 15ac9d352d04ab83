use std::io;

use anyhow::Result;
use rootstrap_core::{compare_versions, ChrootSuffix, PackageSpec};
use rootstrap_installer::{
    read_installed, AportsTree, CommandPackageBuilder, DisabledBuilder, HostApkRunner,
    HostChrootInit, IndexResolver, InstallOutcome, Installer, PackageBuilder, WorkLayout,
};
use rootstrap_registry::{update_repository_list, ApkIndexStore, SessionCache, SudoRootFs};

use crate::completion::write_completions_script;
use crate::config::{load_config, Config};
use crate::render::{
    current_output_style, format_installed_lines, ordering_symbol, render_status_line,
    ApkProgressView,
};
use crate::{Cli, Commands};

pub(crate) fn run_cli(cli: Cli, session: &mut SessionCache) -> Result<()> {
    match cli.command {
        Commands::Compare { left, right } => {
            println!("{}", ordering_symbol(compare_versions(&left, &right)?));
        }
        Commands::Completions { shell } => {
            write_completions_script(shell, &mut io::stdout().lock())?;
        }
        Commands::Install {
            suffix,
            no_build,
            packages,
        } => {
            let config = load_config(cli.config.as_deref())?;
            let suffix = ChrootSuffix::parse(&suffix)?;
            let packages = packages
                .iter()
                .map(|token| PackageSpec::parse(token))
                .collect::<Vec<_>>();
            run_install(&config, cli.offline, session, &suffix, &packages, !no_build)?;
        }
        Commands::SyncRepos { suffix } => {
            let config = load_config(cli.config.as_deref())?;
            let suffix = ChrootSuffix::parse(&suffix)?;
            let layout = WorkLayout::new(&config.work);
            let mut root_fs = SudoRootFs::new(config.sudo_program());
            update_repository_list(
                session,
                &mut root_fs,
                &suffix,
                &layout.repositories_path(&suffix),
                &config.repository_urls(),
            )?;
        }
        Commands::Installed { suffix, json } => {
            let config = load_config(cli.config.as_deref())?;
            let suffix = ChrootSuffix::parse(&suffix)?;
            let installed = read_installed(&WorkLayout::new(&config.work), &suffix)?;
            if json {
                let records = installed.values().collect::<Vec<_>>();
                println!("{}", serde_json::to_string_pretty(&records)?);
            } else {
                for line in format_installed_lines(&installed) {
                    println!("{line}");
                }
            }
        }
    }

    Ok(())
}

fn run_install(
    config: &Config,
    offline: bool,
    session: &mut SessionCache,
    suffix: &ChrootSuffix,
    packages: &[PackageSpec],
    build_requested: bool,
) -> Result<()> {
    let layout = WorkLayout::new(&config.work);
    let policy = config.install_policy(offline)?;
    let sudo = config.sudo_program();

    let index = ApkIndexStore::new(&config.work);
    let aports = AportsTree::new(config.aports_roots());
    let resolver = IndexResolver {
        layout: &layout,
        index: &index,
        aports: &aports,
    };
    let (mut builder, build) = package_builder(config, build_requested);
    let mut chroot = HostChrootInit::new(layout.clone(), SudoRootFs::new(sudo.clone()));
    let mut root_fs = SudoRootFs::new(sudo.clone());

    let style = current_output_style();
    let progress = ApkProgressView::start(style, "apk");
    let mut apk = HostApkRunner::new(layout.clone(), sudo);
    if let Some(callback) = progress.callback() {
        apk = apk.with_progress(callback);
    }

    let mut installer = Installer {
        layout: &layout,
        policy: &policy,
        index: &index,
        aports: &aports,
        resolver: &resolver,
        builder: builder.as_mut(),
        chroot: &mut chroot,
        root_fs: &mut root_fs,
        apk: &mut apk,
    };
    let outcome = installer.install(session, packages, suffix, build);
    progress.finish();

    let message = match outcome? {
        InstallOutcome::NothingToDo => format!("({suffix}) nothing to do"),
        InstallOutcome::Applied { commands } => {
            format!("({suffix}) ran {} apk command(s)", commands.len())
        }
    };
    println!("{}", render_status_line(style, "done", &message));
    Ok(())
}

pub(crate) fn package_builder(
    config: &Config,
    build_requested: bool,
) -> (Box<dyn PackageBuilder>, bool) {
    match config.build_command.as_deref() {
        Some([program, args @ ..]) => (
            Box::new(CommandPackageBuilder::new(program.clone(), args.to_vec())),
            build_requested,
        ),
        _ => (Box::new(DisabledBuilder), false),
    }
}
