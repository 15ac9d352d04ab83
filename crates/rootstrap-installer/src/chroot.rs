use anyhow::{anyhow, Result};
use rootstrap_core::ChrootSuffix;
use rootstrap_registry::{RootFs, SudoRootFs};

use crate::{ChrootInit, WorkLayout};

pub struct HostChrootInit {
    layout: WorkLayout,
    root_fs: SudoRootFs,
}

impl HostChrootInit {
    pub fn new(layout: WorkLayout, root_fs: SudoRootFs) -> Self {
        Self { layout, root_fs }
    }
}

impl ChrootInit for HostChrootInit {
    fn init(&mut self, suffix: &ChrootSuffix) -> Result<()> {
        let root = self.layout.chroot_dir(suffix);
        if !root.is_dir() {
            self.root_fs.create_dir_all(&root)?;
        }

        let apk = self.layout.apk_binary_path(suffix);
        if !apk.exists() {
            return Err(anyhow!(
                "chroot '{suffix}' at {} has no apk at {}: bootstrap it (e.g. with apk.static --initdb) before installing packages",
                root.display(),
                apk.display()
            ));
        }
        Ok(())
    }
}
