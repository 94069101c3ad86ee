pub mod defaults {
    pub const OUTPUT_LOCATION: &str = "/mnt/etc/nixos";
    pub const ANSWERS_FILE: &str = "./answers.yaml";
    pub const DEVICE: &str = "pine64-pinephone";

    pub const MKPASSWD: &str = "mkpasswd";
    pub const MKPASSWD_ARGS: [&str; 2] = ["--stdin", "--method=sha-512"];
    pub const HASH_TIMEOUT_SECS: u64 = 30;
}

pub mod files {
    pub const CONFIGURATION_NIX: &str = "configuration.nix";
    pub const HARDWARE_CONFIGURATION_NIX: &str = "hardware-configuration.nix";
}

pub mod fs {
    pub const ROOTFS_TYPE: &str = "ext4";
    pub const ROOTFS_PART: &str = "rootfs";
    pub const DISK_BY_UUID: &str = "/dev/disk/by-uuid";

    // ext4 labels are 16 chars; 11 + "_ROOT"
    pub const ROOTFS_LABEL_PREFIX_LEN: usize = 11;
}

pub const ENV_NIXCFG_OUT: &str = "NIXCFG_OUT";

pub const REQUIRED_COMMANDS: [&str; 1] = [defaults::MKPASSWD];
