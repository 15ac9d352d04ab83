use std::collections::BTreeMap;

use anyhow::{anyhow, Context, Result};
use serde::Serialize;

use crate::spec::PackageSpec;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PackageRecord {
    pub name: String,
    pub version: String,
    pub depends: Vec<PackageSpec>,
    pub provides: Vec<String>,
    pub timestamp: f64,
}

impl PackageRecord {
    pub fn provides_name(&self, name: &str) -> bool {
        self.provides.iter().any(|provided| provided == name)
    }
}

pub fn parse_records(content: &str) -> Result<Vec<PackageRecord>> {
    let mut records = Vec::new();
    let mut block = RecordBuilder::default();
    let mut block_start = 1_usize;

    for (index, line) in content.lines().enumerate() {
        let line_number = index + 1;
        if line.trim().is_empty() {
            if let Some(record) = block
                .finish()
                .with_context(|| format!("invalid record starting at line {block_start}"))?
            {
                records.push(record);
            }
            block = RecordBuilder::default();
            block_start = line_number + 1;
            continue;
        }

        let Some((key, value)) = line.split_once(':') else {
            return Err(anyhow!(
                "invalid record line {line_number}: expected 'K:value', got '{line}'"
            ));
        };
        block
            .apply(key, value)
            .with_context(|| format!("invalid record line {line_number}"))?;
    }

    if let Some(record) = block
        .finish()
        .with_context(|| format!("invalid record starting at line {block_start}"))?
    {
        records.push(record);
    }

    Ok(records)
}

pub fn records_by_name(records: Vec<PackageRecord>) -> BTreeMap<String, PackageRecord> {
    records
        .into_iter()
        .map(|record| (record.name.clone(), record))
        .collect()
}

// `foo>=1.2` -> `foo`, `so:libc.so=1` -> `so:libc.so`.
pub fn strip_version_operator(token: &str) -> &str {
    token
        .find(['<', '>', '=', '~'])
        .map_or(token, |index| &token[..index])
}

#[derive(Default)]
struct RecordBuilder {
    touched: bool,
    name: Option<String>,
    version: Option<String>,
    depends: Vec<PackageSpec>,
    provides: Vec<String>,
    timestamp: Option<f64>,
}

impl RecordBuilder {
    fn apply(&mut self, key: &str, value: &str) -> Result<()> {
        self.touched = true;
        match key {
            "P" => self.name = Some(value.to_string()),
            "V" => self.version = Some(value.to_string()),
            "D" => {
                self.depends = value
                    .split_whitespace()
                    .map(|token| PackageSpec::parse(strip_version_operator(token)))
                    .collect();
            }
            "p" => {
                self.provides = value
                    .split_whitespace()
                    .map(|token| strip_version_operator(token).to_string())
                    .collect();
            }
            "t" => {
                let timestamp = value
                    .trim()
                    .parse::<f64>()
                    .with_context(|| format!("invalid timestamp '{value}'"))?;
                self.timestamp = Some(timestamp);
            }
            _ => {}
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<Option<PackageRecord>> {
        if !self.touched {
            return Ok(None);
        }
        let name = self
            .name
            .take()
            .ok_or_else(|| anyhow!("record is missing the 'P' (name) field"))?;
        let version = self
            .version
            .take()
            .ok_or_else(|| anyhow!("record '{name}' is missing the 'V' (version) field"))?;

        Ok(Some(PackageRecord {
            name,
            version,
            depends: std::mem::take(&mut self.depends),
            provides: std::mem::take(&mut self.provides),
            timestamp: self.timestamp.unwrap_or(0.0),
        }))
    }
}
