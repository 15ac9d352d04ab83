use std::collections::BTreeSet;

use rootstrap_core::ChrootSuffix;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionCache {
    repository_lists_synced: BTreeSet<ChrootSuffix>,
    apk_versions_checked: BTreeSet<ChrootSuffix>,
}

impl SessionCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn repository_list_synced(&self, suffix: &ChrootSuffix) -> bool {
        self.repository_lists_synced.contains(suffix)
    }

    pub fn mark_repository_list_synced(&mut self, suffix: &ChrootSuffix) {
        self.repository_lists_synced.insert(suffix.clone());
    }

    pub fn apk_version_checked(&self, suffix: &ChrootSuffix) -> bool {
        self.apk_versions_checked.contains(suffix)
    }

    pub fn mark_apk_version_checked(&mut self, suffix: &ChrootSuffix) {
        self.apk_versions_checked.insert(suffix.clone());
    }
}
