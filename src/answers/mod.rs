pub mod validation;

use std::path::Path;

use serde::{
    Deserialize,
    Serialize,
};

use crate::errors::NixCfgError;

/// Answers as collected by the installer steps, before any derived values
/// are attached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawAnswers {
    pub info: AnswersInfo,

    #[serde(alias = "env", alias = "desktop")]
    pub environment: AnswersEnvironment,

    #[serde(default, alias = "encryption", alias = "luks")]
    pub fde: AnswersFde,

    // Mobile NixOS device name
    #[serde(default)]
    pub device: Option<String>,
}

#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswersInfo {
    #[serde(default, alias = "full_name", alias = "full-name", alias = "name")]
    pub fullname: String,

    #[serde(alias = "user", alias = "user_name", alias = "user-name")]
    pub username: String,

    #[serde(alias = "host", alias = "host_name", alias = "host-name")]
    pub hostname: String,

    #[serde(alias = "passwd")]
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswersEnvironment {
    // Kept as a plain string here; unknown values are rejected
    // when the snapshot is built.
    #[serde(alias = "phone-environment", alias = "phoneEnvironment")]
    pub phone_environment: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnswersFde {
    #[serde(default, alias = "enabled")]
    pub enable: bool,
}

// Hand-written so that the plaintext password never ends up in debug output
impl std::fmt::Debug for AnswersInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnswersInfo")
            .field("fullname", &self.fullname)
            .field("username", &self.username)
            .field("hostname", &self.hostname)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswersFormat {
    Yaml,
    Json,
    Toml,
}

impl AnswersFormat {
    /// Guesses format from file extension, falling back to YAML
    /// (which also accepts JSON documents).
    pub fn from_path<P: AsRef<Path>>(path: P) -> Self {
        match path.as_ref().extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::Json,
            Some("toml") => Self::Toml,
            _ => Self::Yaml,
        }
    }
}

impl RawAnswers {
    #[inline]
    pub fn from_yaml(answers_yaml: &str) -> Result<Self, NixCfgError> {
        serde_yaml::from_str(answers_yaml)
            .map_err(|err| NixCfgError::BadAnswers(err.to_string()))
    }

    #[inline]
    pub fn from_json(answers_json: &str) -> Result<Self, NixCfgError> {
        serde_json::from_str(answers_json)
            .map_err(|err| NixCfgError::BadAnswers(err.to_string()))
    }

    #[inline]
    pub fn from_toml(answers_toml: &str) -> Result<Self, NixCfgError> {
        toml::from_str(answers_toml)
            .map_err(|err| NixCfgError::BadAnswers(err.to_string()))
    }

    pub fn parse(s: &str, format: AnswersFormat) -> Result<Self, NixCfgError> {
        match format {
            AnswersFormat::Yaml => Self::from_yaml(s),
            AnswersFormat::Json => Self::from_json(s),
            AnswersFormat::Toml => Self::from_toml(s),
        }
    }

    pub fn from_file(answers_file: &str) -> Result<Self, NixCfgError> {
        let content = std::fs::read_to_string(answers_file).map_err(|err| {
            NixCfgError::FileError(
                err,
                format!("failed to read answers file {answers_file}"),
            )
        })?;

        Self::parse(&content, AnswersFormat::from_path(answers_file))
    }
}
