use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser, Subcommand};
use rootstrap_registry::SessionCache;
use tracing_subscriber::EnvFilter;

mod completion;
mod config;
mod dispatch;
mod render;

use completion::CliCompletionShell;
use dispatch::run_cli;
use render::{current_error_style, render_error_line};

#[derive(Parser, Debug)]
#[command(name = "rootstrap")]
#[command(about = "Install packages into apk-based chroots", long_about = None)]
struct Cli {
    /// Config file (default: $XDG_CONFIG_HOME/rootstrap/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// -v for info, -vv for debug output
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
    /// Never let apk touch the network
    #[arg(long, global = true)]
    offline: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Install packages into a chroot; `!name` removes a package
    Install {
        #[arg(long, default_value = "native")]
        suffix: String,
        /// Do not build outdated local packages first
        #[arg(long)]
        no_build: bool,
        #[arg(required = true)]
        packages: Vec<String>,
    },
    /// Write the configured repository list into a chroot
    SyncRepos {
        #[arg(long, default_value = "native")]
        suffix: String,
    },
    /// List packages installed in a chroot
    Installed {
        #[arg(long, default_value = "native")]
        suffix: String,
        #[arg(long)]
        json: bool,
    },
    /// Compare two apk package versions
    Compare { left: String, right: String },
    Completions {
        #[arg(value_enum)]
        shell: CliCompletionShell,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut session = SessionCache::new();
    match run_cli(cli, &mut session) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{}", render_error_line(current_error_style(), &err));
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_log_level(verbose)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();
}

fn default_log_level(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    }
}
