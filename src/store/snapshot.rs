use std::str::FromStr;

use serde::{
    Deserialize,
    Serialize,
};
use uuid::Uuid;

use crate::errors::NixCfgError;

/// Fully resolved installer answers plus derived identifiers,
/// ready for rendering. Never mutated after construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigurationSnapshot {
    pub info: Info,
    pub environment: Environment,
    pub fde: Fde,
    pub device: String,
    pub filesystems: Filesystems,
}

#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct Info {
    pub fullname: String,
    pub username: String,
    pub hostname: String,

    // Plaintext is transient: it is fed to the hasher, never dumped
    #[serde(skip_serializing, default)]
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Environment {
    pub phone_environment: PhoneEnvironment,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fde {
    pub enable: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filesystems {
    pub luks: LuksData,
    pub rootfs: RootFsData,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LuksData {
    // no label in LUKS v1
    pub uuid: Uuid,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RootFsData {
    pub label: String,
    pub uuid: Uuid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PhoneEnvironment {
    #[serde(rename = "phosh")]
    Phosh,

    #[serde(rename = "plamo")]
    PlasmaMobile,
}

impl PhoneEnvironment {
    /// Key used in answers files and the JSON dump
    pub fn key(&self) -> &'static str {
        match self {
            Self::Phosh => "phosh",
            Self::PlasmaMobile => "plamo",
        }
    }

    /// Human-readable name shown in the summary
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Phosh => "Phosh",
            Self::PlasmaMobile => "Plasma Mobile",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "phosh" => Some(Self::Phosh),
            "plamo" | "plasma-mobile" | "plasma_mobile" => Some(Self::PlasmaMobile),
            _ => None,
        }
    }
}

impl FromStr for PhoneEnvironment {
    type Err = NixCfgError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_key(s).ok_or_else(|| NixCfgError::UnsupportedEnvironment(s.to_string()))
    }
}

impl std::fmt::Display for PhoneEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}

impl std::fmt::Debug for Info {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Info")
            .field("fullname", &self.fullname)
            .field("username", &self.username)
            .field("hostname", &self.hostname)
            .field("password", &"<redacted>")
            .finish()
    }
}
