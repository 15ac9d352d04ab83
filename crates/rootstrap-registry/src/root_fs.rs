use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};

use anyhow::{anyhow, Context, Result};

/// File operations on paths owned by root inside a chroot.
///
/// Implementations must never route path or line content through a shell.
pub trait RootFs {
    fn create_dir_all(&mut self, path: &Path) -> Result<()>;

    fn remove_file(&mut self, path: &Path) -> Result<()>;

    fn append_line(&mut self, path: &Path, line: &str) -> Result<()>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SudoRootFs {
    sudo: Option<String>,
}

impl SudoRootFs {
    pub fn new(sudo: Option<String>) -> Self {
        Self { sudo }
    }

    fn command(&self, program: &str) -> Command {
        match &self.sudo {
            Some(sudo) => {
                let mut command = Command::new(sudo);
                command.arg(program);
                command
            }
            None => Command::new(program),
        }
    }
}

impl RootFs for SudoRootFs {
    fn create_dir_all(&mut self, path: &Path) -> Result<()> {
        let mut command = self.command("mkdir");
        command.arg("-p").arg("--").arg(path);
        run_command(
            &mut command,
            &format!("failed to create directory {}", path.display()),
        )
    }

    fn remove_file(&mut self, path: &Path) -> Result<()> {
        let mut command = self.command("rm");
        command.arg("-f").arg("--").arg(path);
        run_command(
            &mut command,
            &format!("failed to remove {}", path.display()),
        )
    }

    fn append_line(&mut self, path: &Path, line: &str) -> Result<()> {
        if line.contains('\n') {
            return Err(anyhow!(
                "refusing to append a value containing a newline to {}",
                path.display()
            ));
        }

        let context_message = format!("failed to append to {}", path.display());
        let mut command = self.command("tee");
        command
            .arg("-a")
            .arg("--")
            .arg(path)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());
        let mut child = command
            .spawn()
            .with_context(|| format!("{context_message}: command failed to start"))?;
        {
            let mut stdin = child
                .stdin
                .take()
                .ok_or_else(|| anyhow!("{context_message}: stdin was not captured"))?;
            stdin
                .write_all(format!("{line}\n").as_bytes())
                .with_context(|| format!("{context_message}: failed writing to tee"))?;
        }

        let output = child
            .wait_with_output()
            .with_context(|| format!("{context_message}: failed waiting for tee"))?;
        if output.status.success() {
            return Ok(());
        }
        Err(anyhow!(
            "{context_message}: status={} stderr='{}'",
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        ))
    }
}

pub fn run_command(command: &mut Command, context_message: &str) -> Result<()> {
    let output = command
        .output()
        .with_context(|| format!("{context_message}: command failed to start"))?;
    if output.status.success() {
        return Ok(());
    }

    let stderr = String::from_utf8_lossy(&output.stderr);
    let stdout = String::from_utf8_lossy(&output.stdout);
    Err(anyhow!(
        "{context_message}: status={} stdout='{}' stderr='{}'",
        output.status,
        stdout.trim(),
        stderr.trim()
    ))
}
