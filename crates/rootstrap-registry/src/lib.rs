mod index;
mod repository_list;
mod root_fs;
mod session;

pub use index::{ApkIndexStore, PackageIndex};
pub use repository_list::{
    read_repository_list, repository_urls, update_repository_list, SyncError,
    LOCAL_PACKAGES_MOUNT,
};
pub use root_fs::{run_command, RootFs, SudoRootFs};
pub use session::SessionCache;

#[cfg(test)]
mod tests;
