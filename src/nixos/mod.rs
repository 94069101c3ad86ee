pub mod escape;
mod fragments;
mod template;

use std::cell::OnceCell;
use std::path::{
    Path,
    PathBuf,
};

use self::fragments::*;
use crate::constants::{
    files,
    fs,
};
use crate::errors::NixCfgError;
use crate::linux::cpu;
use crate::linux::passwd::PasswordHasher;
use crate::store::{
    ConfigurationSnapshot,
    PhoneEnvironment,
};
use crate::utils;

/// Name of the LUKS container for `part`, e.g. `LUKS-MY-PHONE-ROOTFS`
/// for hostname `my-phone` and part `rootfs`.
pub fn luks_container_name(snapshot: &ConfigurationSnapshot, part: &str) -> String {
    let host: String = snapshot
        .info
        .hostname
        .to_uppercase()
        .chars()
        .map(|c| match c {
            '-' | '_' | '.' => '-',
            c => c,
        })
        .collect();

    format!("LUKS-{host}-{}", part.to_uppercase())
}

/// Renders `configuration.nix` and `hardware-configuration.nix`
/// for one snapshot.
///
/// The password hash and the job count are computed at most once
/// per instance, so both documents always agree.
pub struct NixosConfiguration<'a> {
    snapshot: &'a ConfigurationSnapshot,
    hasher: &'a dyn PasswordHasher,
    hashed_password: OnceCell<String>,
    max_jobs: Option<usize>,
    host_jobs: OnceCell<usize>,
}

impl<'a> NixosConfiguration<'a> {
    pub fn new(snapshot: &'a ConfigurationSnapshot, hasher: &'a dyn PasswordHasher) -> Self {
        Self {
            snapshot,
            hasher,
            hashed_password: OnceCell::new(),
            max_jobs: None,
            host_jobs: OnceCell::new(),
        }
    }

    /// Overrides the job count derived from the host CPUs
    pub fn with_max_jobs(mut self, jobs: usize) -> Self {
        self.max_jobs = Some(jobs.max(1));
        self
    }

    pub fn luks_name(&self, part: &str) -> String {
        luks_container_name(self.snapshot, part)
    }

    pub fn max_jobs(&self) -> usize {
        match self.max_jobs {
            Some(jobs) => jobs,
            None => *self.host_jobs.get_or_init(cpu::cpu_job_count),
        }
    }

    pub fn hashed_password(&self) -> Result<&str, NixCfgError> {
        if let Some(hashed) = self.hashed_password.get() {
            return Ok(hashed.as_str());
        }

        log::debug!("hashing password for user {}", self.snapshot.info.username);
        let hashed = self.hasher.hash(&self.snapshot.info.password)?;

        Ok(self.hashed_password.get_or_init(|| hashed).as_str())
    }

    fn imports_fragment(&self) -> Result<String, NixCfgError> {
        let device = escape::quote("device", &self.snapshot.device)?;

        template::fill(IMPORTS, &[(TOKEN_DEVICE, &device)])
    }

    fn system_fragment(&self) -> Result<String, NixCfgError> {
        let hostname = escape::quote("hostname", &self.snapshot.info.hostname)?;

        template::fill(SYSTEM, &[(TOKEN_HOSTNAME, &hostname)])
    }

    fn defaults_fragment(&self) -> String {
        DEFAULTS.to_string()
    }

    fn phone_environment_fragment(&self) -> Result<String, NixCfgError> {
        let username = escape::quote("username", &self.snapshot.info.username)?;
        let fragment = match self.snapshot.environment.phone_environment {
            PhoneEnvironment::Phosh => PHOSH,
            PhoneEnvironment::PlasmaMobile => PLASMA_MOBILE,
        };

        template::fill(fragment, &[(TOKEN_USERNAME, &username)])
    }

    fn user_fragment(&self) -> Result<String, NixCfgError> {
        let info = &self.snapshot.info;
        let username = escape::quote("username", &info.username)?;
        let fullname = escape::quote("fullname", &info.fullname)?;
        let hashed_password = escape::quote("hashed password", self.hashed_password()?)?;

        template::fill(
            USER,
            &[
                (TOKEN_USERNAME, &username),
                (TOKEN_FULLNAME, &fullname),
                (TOKEN_HASHED_PASSWORD, &hashed_password),
            ],
        )
    }

    /// Main system configuration
    pub fn configuration_nix(&self) -> Result<String, NixCfgError> {
        let fragments = [
            self.imports_fragment()?,
            self.system_fragment()?,
            self.defaults_fragment(),
            self.phone_environment_fragment()?,
            self.user_fragment()?,
        ];

        let body = fragments
            .iter()
            .map(|fragment| template::indent(fragment))
            .collect::<Vec<_>>()
            .join("\n\n");

        template::fill(CONFIGURATION_NIX, &[(TOKEN_BODY, &body)])
    }

    fn filesystems_fragment(&self) -> Result<String, NixCfgError> {
        let filesystems = &self.snapshot.filesystems;

        let rootfs_device = escape::quote(
            "rootfs uuid",
            &format!("{}/{}", fs::DISK_BY_UUID, filesystems.rootfs.uuid),
        )?;
        let rootfs_type = escape::quote("rootfs type", fs::ROOTFS_TYPE)?;

        let mut fragments = vec![template::fill(
            FILESYSTEMS,
            &[
                (TOKEN_ROOTFS_DEVICE, &rootfs_device),
                (TOKEN_ROOTFS_TYPE, &rootfs_type),
            ],
        )?];

        if self.snapshot.fde.enable {
            let luks_name = escape::quote("luks name", &self.luks_name(fs::ROOTFS_PART))?;
            let luks_device = escape::quote(
                "luks uuid",
                &format!("{}/{}", fs::DISK_BY_UUID, filesystems.luks.uuid),
            )?;

            fragments.push(template::fill(
                LUKS_DEVICES,
                &[
                    (TOKEN_LUKS_NAME, &luks_name),
                    (TOKEN_LUKS_DEVICE, &luks_device),
                ],
            )?);
        }

        Ok(fragments.join("\n\n"))
    }

    /// Hardware and filesystem configuration
    pub fn hardware_configuration_nix(&self) -> Result<String, NixCfgError> {
        let body = template::indent(&self.filesystems_fragment()?);
        let max_jobs = self.max_jobs().to_string();

        template::fill(
            HARDWARE_CONFIGURATION_NIX,
            &[(TOKEN_BODY, &body), (TOKEN_MAX_JOBS, &max_jobs)],
        )
    }

    /// Renders both documents, then writes them into `destination`.
    /// Nothing is written if either document fails to render.
    pub fn write_all<P: AsRef<Path>>(&self, destination: P) -> Result<Vec<PathBuf>, NixCfgError> {
        let destination = destination.as_ref();

        let configuration = self.configuration_nix()?;
        let hardware_configuration = self.hardware_configuration_nix()?;

        utils::fs::ensure_dir(destination)?;

        let documents = [
            (
                destination.join(files::CONFIGURATION_NIX),
                configuration.as_bytes(),
            ),
            (
                destination.join(files::HARDWARE_CONFIGURATION_NIX),
                hardware_configuration.as_bytes(),
            ),
        ];

        utils::fs::write_atomic_all(&documents)?;

        for (path, _) in documents.iter() {
            log::info!("wrote {}", path.display());
        }

        Ok(documents.into_iter().map(|(path, _)| path).collect())
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::store::test_utils::answers;
    use crate::store::ConfigurationStore;

    const FAKE_HASH: &str = "$6$salt$fakehash";

    /// Returns a fixed hash and counts how often it was asked
    struct CountingHasher {
        calls: Cell<usize>,
    }

    impl CountingHasher {
        fn new() -> Self {
            Self { calls: Cell::new(0) }
        }
    }

    impl PasswordHasher for CountingHasher {
        fn hash(&self, _password: &str) -> Result<String, NixCfgError> {
            self.calls.set(self.calls.get() + 1);
            Ok(FAKE_HASH.to_string())
        }

        fn describe(&self) -> String {
            "counting".to_string()
        }
    }

    struct FailingHasher;

    impl PasswordHasher for FailingHasher {
        fn hash(&self, _password: &str) -> Result<String, NixCfgError> {
            Err(NixCfgError::ExternalToolFailure {
                error: None,
                context: "command mkpasswd exited with non-zero status 1".to_string(),
            })
        }

        fn describe(&self) -> String {
            "failing".to_string()
        }
    }

    fn snapshot(hostname: &str) -> ConfigurationSnapshot {
        ConfigurationStore::new(answers(hostname))
            .build_snapshot()
            .unwrap()
    }

    #[test]
    fn test_luks_container_name() {
        let tests = [
            ("my-phone", "rootfs", "LUKS-MY-PHONE-ROOTFS"),
            ("a.b_c-d", "rootfs", "LUKS-A-B-C-D-ROOTFS"),
            ("Phone42", "home", "LUKS-PHONE42-HOME"),
        ];

        for (hostname, part, expected) in tests {
            assert_eq!(luks_container_name(&snapshot(hostname), part), expected);
        }
    }

    #[test]
    fn test_luks_container_name_charset() {
        let charset = "aZ09-_.xy";
        for len in 1..30 {
            let hostname: String = charset.chars().cycle().skip(len % 5).take(len).collect();
            let name = luks_container_name(&snapshot(&hostname), "rootfs");

            assert!(name.starts_with("LUKS-"));
            assert!(
                name.chars()
                    .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '-'),
                "bad luks name {name}"
            );
        }
    }

    #[test]
    fn test_end_to_end_example() {
        let snapshot = snapshot("my-phone");
        let hasher = CountingHasher::new();
        let config = NixosConfiguration::new(&snapshot, &hasher).with_max_jobs(2);

        let main = config.configuration_nix().unwrap();
        let hardware = config.hardware_configuration_nix().unwrap();

        assert!(main.starts_with("{ config, lib, pkgs, ... }:\n\n{\n"));
        assert!(main.ends_with("\n}\n"));
        assert!(main.contains("  networking.hostName = \"my-phone\";\n"));
        assert!(main.contains("  services.xserver.desktopManager.phosh = {\n    enable = true;\n    user = \"jane\";\n"));
        assert!(main.contains("  users.users.\"jane\" = {\n"));
        assert!(main.contains("    description = \"Jane Doe\";\n"));
        assert!(main.contains(&format!("    hashedPassword = \"{FAKE_HASH}\";\n")));
        assert!(main.contains("./hardware-configuration.nix"));
        assert!(!main.contains("plasma5"));

        assert!(hardware.contains("  boot.initrd.luks.devices = {\n    \"LUKS-MY-PHONE-ROOTFS\" = {\n"));
        assert!(hardware.contains(&format!(
            "      device = \"/dev/disk/by-uuid/{}\";",
            snapshot.filesystems.luks.uuid
        )));
        assert!(hardware.contains(&format!(
            "      device = \"/dev/disk/by-uuid/{}\";\n      fsType = \"ext4\";",
            snapshot.filesystems.rootfs.uuid
        )));
        assert!(hardware.contains("  nix.maxJobs = lib.mkDefault 2;\n"));
    }

    #[test]
    fn test_main_config_layout() {
        let snapshot = snapshot("my-phone");
        let hasher = CountingHasher::new();
        let main = NixosConfiguration::new(&snapshot, &hasher)
            .configuration_nix()
            .unwrap();

        let order = [
            "  imports = [",
            "  networking.hostName",
            "  # Opinionated defaults",
            "  # Phosh configuration",
            "  # User configuration",
        ];

        let positions: Vec<usize> = order
            .iter()
            .map(|needle| main.find(needle).unwrap_or_else(|| panic!("missing {needle}")))
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]), "fragments out of order");

        // Fragments are separated by exactly one blank line
        assert!(main.contains("  ];\n\n  networking.hostName"));
        assert!(!main.contains("\n\n\n"));

        // No trailing whitespace from indenting blank lines
        assert!(main.lines().all(|line| !line.ends_with(' ')));
    }

    #[test]
    fn test_plasma_mobile() {
        let mut a = answers("my-phone");
        a.environment.phone_environment = "plamo".into();
        let snapshot = ConfigurationStore::new(a).build_snapshot().unwrap();
        let hasher = CountingHasher::new();

        let main = NixosConfiguration::new(&snapshot, &hasher)
            .configuration_nix()
            .unwrap();

        assert!(main.contains("  # Plasma Mobile configuration"));
        assert!(main.contains("    desktopManager.plasma5.mobile.enable = true;"));
        assert!(main.contains("      user = \"jane\";"));
        assert!(main.contains("${pkgs.procps}/bin/pkill"));
        assert!(!main.contains("phosh"));
    }

    #[test]
    fn test_fde_disabled() {
        let mut a = answers("my-phone");
        a.fde.enable = false;
        let snapshot = ConfigurationStore::new(a).build_snapshot().unwrap();
        let hasher = CountingHasher::new();

        let hardware = NixosConfiguration::new(&snapshot, &hasher)
            .hardware_configuration_nix()
            .unwrap();

        assert!(!hardware.contains("luks"));
        assert!(!hardware.contains(&snapshot.filesystems.luks.uuid.to_string()));
        assert!(hardware.contains("fileSystems = {"));
    }

    #[test]
    fn test_fde_enabled_exactly_once() {
        let snapshot = snapshot("my-phone");
        let hasher = CountingHasher::new();

        let hardware = NixosConfiguration::new(&snapshot, &hasher)
            .hardware_configuration_nix()
            .unwrap();

        assert_eq!(hardware.matches("boot.initrd.luks.devices").count(), 1);
        assert_eq!(hardware.matches("\"LUKS-MY-PHONE-ROOTFS\"").count(), 1);
    }

    /// Decodes the string literal between `prefix` and `suffix` on the
    /// first line that starts with `prefix`
    fn decode_literal(document: &str, prefix: &str, suffix: &str) -> String {
        let line = document
            .lines()
            .map(str::trim_start)
            .find(|line| line.starts_with(prefix))
            .unwrap_or_else(|| panic!("no line starting with {prefix}"));

        let literal = line
            .strip_prefix(prefix)
            .and_then(|rest| rest.strip_suffix(suffix))
            .unwrap_or_else(|| panic!("unexpected line {line}"));

        serde_json::from_str(literal).unwrap()
    }

    #[test]
    fn test_escaped_values_roundtrip() {
        let mut a = answers("my-phone");
        a.info.fullname = "Jane \"JD\" Doe\\\nthe second".into();
        a.info.username = "ja\"ne\\x".into();
        let snapshot = ConfigurationStore::new(a).build_snapshot().unwrap();
        let hasher = CountingHasher::new();

        let main = NixosConfiguration::new(&snapshot, &hasher)
            .configuration_nix()
            .unwrap();

        assert_eq!(
            decode_literal(&main, "description = ", ";"),
            snapshot.info.fullname
        );
        assert_eq!(
            decode_literal(&main, "users.users.", " = {"),
            snapshot.info.username
        );
        assert_eq!(
            decode_literal(&main, "user = ", ";"),
            snapshot.info.username
        );
    }

    #[test]
    fn test_password_hashed_once() {
        let snapshot = snapshot("my-phone");
        let hasher = CountingHasher::new();
        let config = NixosConfiguration::new(&snapshot, &hasher);

        config.configuration_nix().unwrap();
        config.configuration_nix().unwrap();
        config.hardware_configuration_nix().unwrap();

        assert_eq!(config.hashed_password().unwrap(), FAKE_HASH);
        assert_eq!(hasher.calls.get(), 1);
    }

    #[test]
    fn test_max_jobs() {
        let snapshot = snapshot("my-phone");
        let hasher = CountingHasher::new();

        let config = NixosConfiguration::new(&snapshot, &hasher);
        assert_eq!(config.max_jobs(), cpu::cpu_job_count());

        let config = NixosConfiguration::new(&snapshot, &hasher).with_max_jobs(0);
        assert_eq!(config.max_jobs(), 1);

        let config = NixosConfiguration::new(&snapshot, &hasher)
            .with_max_jobs(4)
            .with_max_jobs(6);
        assert_eq!(config.max_jobs(), 6);
        assert!(config
            .hardware_configuration_nix()
            .unwrap()
            .contains("nix.maxJobs = lib.mkDefault 6;"));
    }

    #[test]
    fn test_write_all() {
        let dir = tempfile::tempdir().unwrap();
        let destination = dir.path().join("etc").join("nixos");

        let snapshot = snapshot("my-phone");
        let hasher = CountingHasher::new();
        let config = NixosConfiguration::new(&snapshot, &hasher);

        std::fs::create_dir_all(&destination).unwrap();
        std::fs::write(destination.join(files::CONFIGURATION_NIX), "stale").unwrap();

        let written = config.write_all(&destination).expect("write_all failed");
        assert_eq!(written.len(), 2);

        let main = std::fs::read_to_string(destination.join(files::CONFIGURATION_NIX)).unwrap();
        let hardware =
            std::fs::read_to_string(destination.join(files::HARDWARE_CONFIGURATION_NIX)).unwrap();

        assert_eq!(main, config.configuration_nix().unwrap());
        assert_eq!(hardware, config.hardware_configuration_nix().unwrap());
        assert_eq!(hasher.calls.get(), 1);
    }

    #[test]
    fn test_write_all_hash_failure_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let destination = dir.path().join("nixos");

        let snapshot = snapshot("my-phone");
        let config = NixosConfiguration::new(&snapshot, &FailingHasher);

        assert!(matches!(
            config.write_all(&destination),
            Err(NixCfgError::ExternalToolFailure { .. })
        ));
        assert!(!destination.join(files::CONFIGURATION_NIX).exists());
        assert!(!destination.join(files::HARDWARE_CONFIGURATION_NIX).exists());
    }

    #[test]
    fn test_unsafe_values_rejected_by_renderer() {
        let mut snapshot = snapshot("my-phone");
        snapshot.info.fullname = "${builtins.readFile /etc/shadow}".into();
        let hasher = CountingHasher::new();

        assert!(matches!(
            NixosConfiguration::new(&snapshot, &hasher).configuration_nix(),
            Err(NixCfgError::InvalidInput { field: "fullname", .. })
        ));
    }
}
