use std::cmp::Ordering;

use anyhow::{anyhow, Context, Result};

// Rank of a suffix-less version among the `_suffix` tokens: pre-releases sort
// below it, post-release markers above.
const RELEASE_RANK: u8 = 4;

const SUFFIXES: [(&str, u8); 9] = [
    ("alpha", 0),
    ("beta", 1),
    ("pre", 2),
    ("rc", 3),
    ("cvs", 5),
    ("svn", 6),
    ("git", 7),
    ("hg", 8),
    ("p", 9),
];

/// A parsed Alpine package version such as `1.2.3b_rc1_p2-r4`.
///
/// Ordered field by field in declaration order. A version without `-rN`
/// sorts below `-r0`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct ApkVersion {
    numbers: Vec<Component>,
    letter: Option<char>,
    suffixes: Vec<(u8, Numeric)>,
    revision: Option<Numeric>,
}

// Components after the first that start with `0` compare as decimal
// fractions (`.01 < .1`) and sort below every plain integer component.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum Component {
    Fraction(String),
    Integer(Numeric),
}

impl Component {
    fn new(digits: Numeric, first: bool) -> Self {
        if first || !digits.0.starts_with('0') {
            return Self::Integer(digits);
        }
        Self::Fraction(digits.0.trim_end_matches('0').to_string())
    }
}

impl ApkVersion {
    pub fn parse(input: &str) -> Result<Self> {
        parse_version(input).with_context(|| format!("invalid package version '{input}'"))
    }
}

pub fn compare_versions(left: &str, right: &str) -> Result<Ordering> {
    let left = ApkVersion::parse(left)?;
    let right = ApkVersion::parse(right)?;
    Ok(left.cmp(&right))
}

// Digit run compared by numeric value without overflowing.
#[derive(Debug, Clone)]
struct Numeric(String);

impl Numeric {
    fn zero() -> Self {
        Self("0".to_string())
    }

    fn significant(&self) -> &str {
        let trimmed = self.0.trim_start_matches('0');
        if trimmed.is_empty() {
            "0"
        } else {
            trimmed
        }
    }
}

impl PartialEq for Numeric {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Numeric {}

impl PartialOrd for Numeric {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Numeric {
    fn cmp(&self, other: &Self) -> Ordering {
        let left = self.significant();
        let right = other.significant();
        left.len().cmp(&right.len()).then_with(|| left.cmp(right))
    }
}

fn parse_version(input: &str) -> Result<ApkVersion> {
    let (body, revision) = match input.rsplit_once("-r") {
        Some((body, revision)) => (body, Some(revision)),
        None => (input, None),
    };
    let revision = match revision {
        Some(raw) => Some(
            take_digits(raw)
                .filter(|(_, rest)| rest.is_empty())
                .map(|(digits, _)| digits)
                .ok_or_else(|| anyhow!("revision must be numeric: '-r{raw}'"))?,
        ),
        None => None,
    };

    // A trailing `~<hash>` only identifies a VCS commit and does not order.
    let body = body.split_once('~').map_or(body, |(head, _)| head);

    let mut rest = body;
    let mut numbers = Vec::new();
    loop {
        let Some((number, tail)) = take_digits(rest) else {
            return Err(anyhow!("expected a digit at '{rest}'"));
        };
        numbers.push(Component::new(number, numbers.is_empty()));
        rest = tail;
        match rest.strip_prefix('.') {
            Some(tail) => rest = tail,
            None => break,
        }
    }

    let mut letter = None;
    if let Some(ch) = rest.chars().next().filter(char::is_ascii_lowercase) {
        letter = Some(ch);
        rest = &rest[ch.len_utf8()..];
    }

    let mut suffixes = Vec::new();
    while let Some(tail) = rest.strip_prefix('_') {
        let name_len = tail
            .find(|ch: char| !ch.is_ascii_lowercase())
            .unwrap_or(tail.len());
        let (name, tail) = tail.split_at(name_len);
        let rank = SUFFIXES
            .iter()
            .find(|(candidate, _)| *candidate == name)
            .map(|(_, rank)| *rank)
            .ok_or_else(|| anyhow!("unknown version suffix '_{name}'"))?;
        let (number, tail) = take_digits(tail).unwrap_or((Numeric::zero(), tail));
        suffixes.push((rank, number));
        rest = tail;
    }
    suffixes.push((RELEASE_RANK, Numeric::zero()));

    if !rest.is_empty() {
        return Err(anyhow!("unexpected trailing characters '{rest}'"));
    }

    Ok(ApkVersion {
        numbers,
        letter,
        suffixes,
        revision,
    })
}

fn take_digits(input: &str) -> Option<(Numeric, &str)> {
    let len = input
        .find(|ch: char| !ch.is_ascii_digit())
        .unwrap_or(input.len());
    if len == 0 {
        return None;
    }
    let (digits, rest) = input.split_at(len);
    Some((Numeric(digits.to_string()), rest))
}
