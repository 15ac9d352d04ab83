use std::collections::BTreeMap;
use std::fs;
use std::io;

use anyhow::{Context, Result};
use rootstrap_core::{parse_records, records_by_name, ChrootSuffix, PackageRecord};

use crate::WorkLayout;

pub fn read_installed(
    layout: &WorkLayout,
    suffix: &ChrootSuffix,
) -> Result<BTreeMap<String, PackageRecord>> {
    let path = layout.installed_db_path(suffix);
    let content = match fs::read_to_string(&path) {
        Ok(content) => content,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
        Err(err) => {
            return Err(err).with_context(|| {
                format!("failed to read installed database: {}", path.display())
            });
        }
    };

    let records = parse_records(&content)
        .with_context(|| format!("failed to parse installed database: {}", path.display()))?;
    Ok(records_by_name(records))
}
