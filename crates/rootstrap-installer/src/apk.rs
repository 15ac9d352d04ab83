use std::io::{BufRead, BufReader};
use std::process::{Command, Stdio};

use anyhow::{anyhow, Context, Result};
use rootstrap_core::ChrootSuffix;
use tracing::debug;

use crate::{ApkRunner, InstallError, WorkLayout};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApkProgress<'a> {
    pub line: &'a str,
    pub step: Option<(u64, u64)>,
}

pub type ProgressCallback = Box<dyn FnMut(&ApkProgress<'_>)>;

pub struct HostApkRunner {
    layout: WorkLayout,
    sudo: Option<String>,
    on_progress: Option<ProgressCallback>,
}

impl HostApkRunner {
    pub fn new(layout: WorkLayout, sudo: Option<String>) -> Self {
        Self {
            layout,
            sudo,
            on_progress: None,
        }
    }

    pub fn with_progress(mut self, on_progress: ProgressCallback) -> Self {
        self.on_progress = Some(on_progress);
        self
    }

    fn apk_command(&self, suffix: &ChrootSuffix) -> Command {
        let mut command = match &self.sudo {
            Some(sudo) => {
                let mut command = Command::new(sudo);
                command.arg("chroot");
                command
            }
            None => Command::new("chroot"),
        };
        command.arg(self.layout.chroot_dir(suffix)).arg("apk");
        command
    }
}

impl ApkRunner for HostApkRunner {
    fn run_with_progress(&mut self, suffix: &ChrootSuffix, args: &[String]) -> Result<()> {
        let mut command = self.apk_command(suffix);
        command
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit());
        debug!("({suffix}) running {command:?}");

        let mut child = command
            .spawn()
            .with_context(|| format!("({suffix}) failed to start apk {}", args.join(" ")))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| anyhow!("({suffix}) apk stdout was not captured"))?;
        let mut read_error = None;
        for line in BufReader::new(stdout).split(b'\n') {
            let line = match line {
                Ok(line) => line,
                Err(err) => {
                    read_error = Some(err);
                    break;
                }
            };
            let line = String::from_utf8_lossy(&line);
            let line = line.trim_end_matches('\r');
            let progress = ApkProgress {
                line,
                step: parse_progress_step(line),
            };
            match self.on_progress.as_mut() {
                Some(on_progress) => on_progress(&progress),
                None => println!("{line}"),
            }
        }

        // Wait for apk even when reading its output failed.
        let status = child
            .wait()
            .with_context(|| format!("({suffix}) failed waiting for apk"))?;
        if let Some(err) = read_error {
            return Err(err).with_context(|| {
                format!("({suffix}) failed reading apk output (apk exited with {status})")
            });
        }
        if status.success() {
            return Ok(());
        }
        Err(InstallError::ApkFailed {
            suffix: suffix.to_string(),
            command: args.join(" "),
            status: status.to_string(),
            detail: String::new(),
        }
        .into())
    }

    fn run_quiet(&mut self, suffix: &ChrootSuffix, args: &[String]) -> Result<()> {
        let mut command = self.apk_command(suffix);
        command.arg("--no-progress").args(args);
        debug!("({suffix}) running {command:?}");

        let output = command
            .output()
            .with_context(|| format!("({suffix}) failed to start apk {}", args.join(" ")))?;
        if output.status.success() {
            return Ok(());
        }
        Err(InstallError::ApkFailed {
            suffix: suffix.to_string(),
            command: args.join(" "),
            status: output.status.to_string(),
            detail: format!(
                ": stdout='{}' stderr='{}'",
                String::from_utf8_lossy(&output.stdout).trim(),
                String::from_utf8_lossy(&output.stderr).trim()
            ),
        }
        .into())
    }
}

// `(3/12) Installing foo (1.0-r0)` -> `(3, 12)`.
pub(crate) fn parse_progress_step(line: &str) -> Option<(u64, u64)> {
    let rest = line.trim_start().strip_prefix('(')?;
    let (step, _) = rest.split_once(')')?;
    let (current, total) = step.split_once('/')?;
    Some((current.trim().parse().ok()?, total.trim().parse().ok()?))
}
