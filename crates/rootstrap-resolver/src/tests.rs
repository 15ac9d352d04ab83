use std::collections::BTreeMap;

use anyhow::Result;
use rootstrap_core::{PackageRecord, PackageSpec};

use super::*;

fn record(name: &str, depends: &[&str], provides: &[&str]) -> PackageRecord {
    PackageRecord {
        name: name.to_string(),
        version: "1.0-r0".to_string(),
        depends: depends.iter().map(|token| PackageSpec::parse(token)).collect(),
        provides: provides.iter().map(|value| value.to_string()).collect(),
        timestamp: 0.0,
    }
}

fn lookup_in(records: &[PackageRecord]) -> impl FnMut(&str) -> Result<Candidate> + '_ {
    move |name: &str| {
        let found = records
            .iter()
            .find(|record| record.name == name)
            .or_else(|| records.iter().find(|record| record.provides_name(name)));
        Ok(match found {
            Some(record) => Candidate::Record(record.clone()),
            None => Candidate::Missing,
        })
    }
}

fn specs(tokens: &[&str]) -> Vec<PackageSpec> {
    tokens.iter().map(|token| PackageSpec::parse(token)).collect()
}

#[test]
fn expand_follows_dependencies_breadth_first_without_duplicates() {
    let records = vec![
        record("a", &["b", "c"], &[]),
        record("b", &["c", "musl"], &[]),
        record("c", &["musl"], &[]),
        record("musl", &[], &["so:libc.musl-x86_64.so.1"]),
    ];

    let closure = expand_closure(&specs(&["a"]), lookup_in(&records)).expect("must expand");
    assert_eq!(closure, specs(&["a", "b", "c", "musl"]));
}

#[test]
fn expand_resolves_provided_names_to_real_packages() {
    let records = vec![
        record("app", &["so:libc.musl-x86_64.so.1", "/bin/sh"], &[]),
        record("musl", &[], &["so:libc.musl-x86_64.so.1"]),
        record("busybox", &[], &["/bin/sh"]),
    ];

    let closure = expand_closure(&specs(&["app"]), lookup_in(&records)).expect("must expand");
    assert_eq!(closure, specs(&["app", "musl", "busybox"]));
}

#[test]
fn expand_passes_removals_through() {
    let records = vec![record("a", &["!legacy"], &[])];

    let closure =
        expand_closure(&specs(&["a", "!b"]), lookup_in(&records)).expect("must expand");
    assert_eq!(closure, specs(&["a", "!b", "!legacy"]));
}

#[test]
fn expand_rejects_install_and_removal_of_same_package() {
    let records = vec![record("a", &["b"], &[]), record("b", &[], &[])];

    let err = expand_closure(&specs(&["a", "!b"]), lookup_in(&records))
        .expect_err("conflicting request must fail");
    assert!(err
        .to_string()
        .contains("'b' is requested for both installation and removal"));
}

#[test]
fn expand_keeps_source_only_packages_as_leaves() {
    let mut lookups = BTreeMap::new();
    let closure = expand_closure(&specs(&["device-foo"]), |name| {
        *lookups.entry(name.to_string()).or_insert(0) += 1;
        Ok(Candidate::Source)
    })
    .expect("must expand");

    assert_eq!(closure, specs(&["device-foo"]));
    assert_eq!(lookups.get("device-foo"), Some(&1));
}

#[test]
fn expand_fails_for_unknown_package() {
    let err = expand_closure(&specs(&["nope"]), |_| Ok(Candidate::Missing))
        .expect_err("unknown package must fail");
    assert!(err.to_string().contains("could not find package 'nope'"));
}
