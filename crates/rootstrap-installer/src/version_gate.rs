use std::cmp::Ordering;

use anyhow::{Context, Result};
use rootstrap_core::{compare_versions, ChrootSuffix};
use rootstrap_registry::SessionCache;
use tracing::debug;

use crate::{read_installed, InstallError, WorkLayout};

pub const APK_OUTDATED_HINT: &str =
    "Delete your http cache and zap all chroots, then try again.";

pub fn check_outdated(
    suffix: &ChrootSuffix,
    installed: &str,
    minimum: &str,
    hint: &str,
) -> Result<()> {
    let ordering = compare_versions(installed, minimum)
        .with_context(|| format!("failed to compare apk-tools versions in chroot '{suffix}'"))?;
    if ordering == Ordering::Less {
        return Err(InstallError::ApkOutdated {
            suffix: suffix.to_string(),
            installed: installed.to_string(),
            minimum: minimum.to_string(),
            hint: hint.to_string(),
        }
        .into());
    }
    Ok(())
}

pub fn check_min_version(
    session: &mut SessionCache,
    layout: &WorkLayout,
    suffix: &ChrootSuffix,
    minimum: &str,
) -> Result<()> {
    if session.apk_version_checked(suffix) {
        return Ok(());
    }

    if !layout.apk_binary_path(suffix).exists() {
        debug!("skipped apk version check for chroot '{suffix}', because apk is not installed yet");
        return Ok(());
    }

    let installed = read_installed(layout, suffix)?;
    let apk_tools = installed.get("apk-tools").ok_or_else(|| {
        InstallError::InternalConsistency(format!(
            "chroot '{suffix}' has {} but apk-tools is missing from its installed database",
            layout.apk_binary_path(suffix).display()
        ))
    })?;
    check_outdated(suffix, &apk_tools.version, minimum, APK_OUTDATED_HINT)?;

    session.mark_apk_version_checked(suffix);
    Ok(())
}
