mod aports;
mod apk;
mod builder;
mod chroot;
mod collaborators;
mod errors;
mod installed;
mod layout;
mod local_paths;
mod necessity;
mod planner;
mod resolve;
mod version_gate;

pub use aports::AportsTree;
pub use apk::{ApkProgress, HostApkRunner, ProgressCallback};
pub use builder::{CommandPackageBuilder, DisabledBuilder};
pub use chroot::HostChrootInit;
pub use collaborators::{AportsLookup, ApkRunner, ChrootInit, DependencyResolver, PackageBuilder};
pub use errors::InstallError;
pub use installed::read_installed;
pub use layout::WorkLayout;
pub use local_paths::replace_aports_packages_with_path;
pub use necessity::{install_is_necessary, Necessity, NecessityCheck};
pub use planner::{
    compose_apk_commands, validate_package_names, InstallOutcome, InstallPolicy, Installer,
    VIRTUAL_PACKAGE,
};
pub use resolve::IndexResolver;
pub use version_gate::{check_min_version, check_outdated, APK_OUTDATED_HINT};
