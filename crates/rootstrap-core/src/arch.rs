use std::fmt;

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

const KNOWN_ARCHES: [&str; 10] = [
    "aarch64",
    "armhf",
    "armv7",
    "loongarch64",
    "ppc64le",
    "riscv64",
    "s390x",
    "x86",
    "x86_64",
    "noarch",
];

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Arch(String);

impl Arch {
    pub fn parse(value: &str) -> Result<Self> {
        if !KNOWN_ARCHES.contains(&value) {
            return Err(anyhow!(
                "unsupported architecture '{value}'; supported: {}",
                KNOWN_ARCHES.join(", ")
            ));
        }
        Ok(Self(value.to_string()))
    }

    pub fn native() -> Result<Self> {
        let alpine = match std::env::consts::ARCH {
            "x86_64" => "x86_64",
            "x86" => "x86",
            "aarch64" => "aarch64",
            "arm" => "armv7",
            "riscv64" => "riscv64",
            "powerpc64" => "ppc64le",
            "s390x" => "s390x",
            "loongarch64" => "loongarch64",
            other => return Err(anyhow!("unsupported host architecture '{other}'")),
        };
        Self::parse(alpine)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Arch {
    type Error = anyhow::Error;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<Arch> for String {
    fn from(value: Arch) -> Self {
        value.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ChrootSuffix(String);

impl ChrootSuffix {
    pub fn native() -> Self {
        Self("native".to_string())
    }

    pub fn parse(value: &str) -> Result<Self> {
        if value == "native" {
            return Ok(Self::native());
        }
        if let Some(arch) = value.strip_prefix("buildroot_") {
            Arch::parse(arch).map_err(|err| anyhow!("invalid chroot suffix '{value}': {err}"))?;
            return Ok(Self(value.to_string()));
        }

        let device = value
            .strip_prefix("rootfs_")
            .or_else(|| value.strip_prefix("installer_"))
            .ok_or_else(|| {
                anyhow!(
                    "invalid chroot suffix '{value}': expected native, buildroot_<arch>, rootfs_<device> or installer_<device>"
                )
            })?;
        if !is_device_name(device) {
            return Err(anyhow!(
                "invalid chroot suffix '{value}': device name '{device}' must use [a-z0-9-]"
            ));
        }
        Ok(Self(value.to_string()))
    }

    pub fn arch(&self, device_arch: &Arch) -> Result<Arch> {
        if self.0 == "native" {
            return Arch::native();
        }
        if let Some(arch) = self.0.strip_prefix("buildroot_") {
            return Arch::parse(arch);
        }
        Ok(device_arch.clone())
    }
}

impl fmt::Display for ChrootSuffix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn is_device_name(value: &str) -> bool {
    let bytes = value.as_bytes();
    !bytes.is_empty()
        && bytes[0].is_ascii_alphanumeric()
        && bytes
            .iter()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || *b == b'-')
}
