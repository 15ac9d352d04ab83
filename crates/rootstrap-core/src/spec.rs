use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PackageSpec {
    Install(String),
    Remove(String),
}

impl PackageSpec {
    pub fn parse(token: &str) -> Self {
        match token.strip_prefix('!') {
            Some(name) => Self::Remove(name.to_string()),
            None => Self::Install(token.to_string()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Install(name) | Self::Remove(name) => name,
        }
    }

    pub fn is_removal(&self) -> bool {
        matches!(self, Self::Remove(_))
    }
}

impl fmt::Display for PackageSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Install(name) => f.write_str(name),
            Self::Remove(name) => write!(f, "!{name}"),
        }
    }
}
