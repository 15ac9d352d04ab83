use thiserror::Error;

#[derive(Debug, Error)]
pub enum InstallError {
    #[error("invalid-package-name: '{name}' must not start with '-'")]
    InvalidPackageName { name: String },

    #[error(
        "apk-outdated: apk-tools {installed} in chroot '{suffix}' is older than the minimum supported version {minimum}. {hint}"
    )]
    ApkOutdated {
        suffix: String,
        installed: String,
        minimum: String,
        hint: String,
    },

    #[error("internal-error: {0}")]
    InternalConsistency(String),

    #[error(
        "build-disabled: {package}: no binary package found for {arch}, and building packages during install has been disabled. Consider enabling build_pkgs_on_install."
    )]
    BuildDisabled { package: String, arch: String },

    #[error("apk-failed: ({suffix}) apk {command} exited with {status}{detail}")]
    ApkFailed {
        suffix: String,
        command: String,
        status: String,
        detail: String,
    },
}
