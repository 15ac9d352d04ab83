use std::collections::{BTreeMap, VecDeque};

use anyhow::{anyhow, Result};
use rootstrap_core::{PackageRecord, PackageSpec};
use tracing::debug;

#[derive(Debug, Clone, PartialEq)]
pub enum Candidate {
    Record(PackageRecord),
    Source,
    Missing,
}

pub fn expand_closure<F>(requested: &[PackageSpec], mut lookup: F) -> Result<Vec<PackageSpec>>
where
    F: FnMut(&str) -> Result<Candidate>,
{
    let mut queue: VecDeque<PackageSpec> = requested.iter().cloned().collect();
    let mut decided: BTreeMap<String, bool> = BTreeMap::new();
    let mut visited_names: BTreeMap<String, String> = BTreeMap::new();
    let mut closure = Vec::new();

    while let Some(spec) = queue.pop_front() {
        match spec {
            PackageSpec::Remove(name) => {
                match decided.get(&name) {
                    Some(true) => return Err(conflict_error(&name)),
                    Some(false) => continue,
                    None => {}
                }
                decided.insert(name.clone(), false);
                closure.push(PackageSpec::Remove(name));
            }
            PackageSpec::Install(name) => {
                if let Some(real_name) = visited_names.get(&name) {
                    if decided.get(real_name) == Some(&false) {
                        return Err(conflict_error(real_name));
                    }
                    continue;
                }

                let (real_name, depends) = match lookup(&name)? {
                    Candidate::Record(record) => (record.name, record.depends),
                    Candidate::Source => {
                        debug!("'{name}' is only known as a source package");
                        (name.clone(), Vec::new())
                    }
                    Candidate::Missing => {
                        return Err(anyhow!(
                            "could not find package '{name}' in any index or source tree"
                        ));
                    }
                };
                visited_names.insert(name.clone(), real_name.clone());

                match decided.get(&real_name) {
                    Some(false) => return Err(conflict_error(&real_name)),
                    Some(true) => continue,
                    None => {}
                }
                decided.insert(real_name.clone(), true);
                closure.push(PackageSpec::Install(real_name));
                queue.extend(depends);
            }
        }
    }

    Ok(closure)
}

fn conflict_error(name: &str) -> anyhow::Error {
    anyhow!("package '{name}' is requested for both installation and removal")
}
