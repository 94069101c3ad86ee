mod describe;
mod snapshot;

pub use self::describe::{
    describe,
    format_description,
};
pub use self::snapshot::*;

use std::cell::OnceCell;
use std::path::Path;

use uuid::Uuid;

use crate::answers::{
    validation,
    RawAnswers,
};
use crate::constants::{
    defaults,
    fs,
};
use crate::errors::NixCfgError;
use crate::utils;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FsKind {
    RootFs,
    Luks,
}

/// Holds the answers for one installer run and hands out derived values.
///
/// Instead of relying on the UUID generated by e.g. mkfs.ext4 or
/// cryptsetup luksFormat, we provide the UUIDs ourselves, so both
/// rendered documents and the partitioner agree on them without
/// having to probe devices afterwards. Each UUID is generated on first
/// use and then stays fixed for the lifetime of the store.
#[derive(Debug)]
pub struct ConfigurationStore {
    answers: RawAnswers,
    rootfs_uuid: OnceCell<Uuid>,
    luks_uuid: OnceCell<Uuid>,
}

impl ConfigurationStore {
    pub fn new(answers: RawAnswers) -> Self {
        Self {
            answers,
            rootfs_uuid: OnceCell::new(),
            luks_uuid: OnceCell::new(),
        }
    }

    pub fn uuid(&self, kind: FsKind) -> Uuid {
        let cell = match kind {
            FsKind::RootFs => &self.rootfs_uuid,
            FsKind::Luks => &self.luks_uuid,
        };

        *cell.get_or_init(Uuid::new_v4)
    }

    /// Filesystem label for `part`, prefixed with the hostname:
    /// uppercased, with `-`, `_` and `.` mapped to `_`, and cut
    /// down to `prefix_length` characters.
    pub fn label_for(&self, part: &str, prefix_length: usize) -> String {
        let prefix: String = self
            .answers
            .info
            .hostname
            .to_uppercase()
            .chars()
            .map(|c| match c {
                '-' | '_' | '.' => '_',
                c => c,
            })
            .take(prefix_length)
            .collect();

        format!("{prefix}_{}", part.to_uppercase())
    }

    pub fn rootfs_label(&self, max_prefix_length: usize) -> String {
        self.label_for("root", max_prefix_length)
    }

    pub fn filesystems_data(&self) -> Filesystems {
        Filesystems {
            luks: LuksData {
                uuid: self.uuid(FsKind::Luks),
            },
            rootfs: RootFsData {
                label: self.rootfs_label(fs::ROOTFS_LABEL_PREFIX_LEN),
                uuid: self.uuid(FsKind::RootFs),
            },
        }
    }

    /// Validates the answers, then merges them with derived filesystem data.
    /// Unknown phone environments are rejected here.
    pub fn build_snapshot(&self) -> Result<ConfigurationSnapshot, NixCfgError> {
        let answers = &self.answers;
        validation::validate(answers)?;

        let phone_environment = answers
            .environment
            .phone_environment
            .parse::<PhoneEnvironment>()?;

        Ok(ConfigurationSnapshot {
            info: Info {
                fullname: answers.info.fullname.clone(),
                username: answers.info.username.clone(),
                hostname: answers.info.hostname.clone(),
                password: answers.info.password.clone(),
            },
            environment: Environment { phone_environment },
            fde: Fde {
                enable: answers.fde.enable,
            },
            device: answers
                .device
                .clone()
                .unwrap_or(defaults::DEVICE.to_string()),
            filesystems: self.filesystems_data(),
        })
    }
}

impl ConfigurationSnapshot {
    pub fn to_json_string(&self) -> Result<String, NixCfgError> {
        serde_json::to_string_pretty(self).map_err(|err| {
            NixCfgError::NixCfgBug(format!("failed to serialize snapshot: {err}"))
        })
    }

    /// Dumps the snapshot as JSON for diagnostics.
    /// The plaintext password is not part of the dump.
    pub fn persist_json<P: AsRef<Path>>(&self, path: P) -> Result<(), NixCfgError> {
        let json = self.to_json_string()?;
        utils::fs::write_atomic(path.as_ref(), json.as_bytes())
    }
}

#[cfg(test)]
pub mod test_utils {
    use crate::answers::{
        AnswersEnvironment,
        AnswersFde,
        AnswersInfo,
        RawAnswers,
    };

    /// Answers of the "Jane Doe" example install, with FDE enabled
    pub fn answers(hostname: &str) -> RawAnswers {
        RawAnswers {
            info: AnswersInfo {
                fullname: "Jane Doe".into(),
                username: "jane".into(),
                hostname: hostname.into(),
                password: "x".into(),
            },
            environment: AnswersEnvironment {
                phone_environment: "phosh".into(),
            },
            fde: AnswersFde { enable: true },
            device: None,
        }
    }
}
