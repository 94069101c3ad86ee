//! Fragments of the generated Nix files.
//!
//! Tokens are written as `{{ name }}` and always replaced with an
//! already-quoted Nix value, see [super::template::fill].

pub const TOKEN_DEVICE: &str = "device";
pub const TOKEN_HOSTNAME: &str = "hostname";
pub const TOKEN_USERNAME: &str = "username";
pub const TOKEN_FULLNAME: &str = "fullname";
pub const TOKEN_HASHED_PASSWORD: &str = "hashed_password";
pub const TOKEN_ROOTFS_DEVICE: &str = "rootfs_device";
pub const TOKEN_ROOTFS_TYPE: &str = "rootfs_type";
pub const TOKEN_LUKS_NAME: &str = "luks_name";
pub const TOKEN_LUKS_DEVICE: &str = "luks_device";
pub const TOKEN_MAX_JOBS: &str = "max_jobs";
pub const TOKEN_BODY: &str = "body";

pub const CONFIGURATION_NIX: &str = r#"{ config, lib, pkgs, ... }:

{
{{ body }}
}
"#;

pub const HARDWARE_CONFIGURATION_NIX: &str = r#"# NOTE: this file was generated by the Mobile NixOS installer.
{ config, lib, pkgs, ... }:

{
{{ body }}

  nix.maxJobs = lib.mkDefault {{ max_jobs }};
}
"#;

pub const IMPORTS: &str = r#"imports = [
  (import <mobile-nixos/lib/configuration.nix> { device = {{ device }}; })
  ./hardware-configuration.nix
];"#;

pub const SYSTEM: &str = r#"networking.hostName = {{ hostname }};"#;

pub const DEFAULTS: &str = r#"#
# Opinionated defaults
#

# Use Network Manager
networking.wireless.enable = false;
networking.networkmanager.enable = true;

# Use PulseAudio
hardware.pulseaudio.enable = true;

# Enable Bluetooth
hardware.bluetooth.enable = true;

# Bluetooth audio
hardware.pulseaudio.package = pkgs.pulseaudioFull;

# Enable power management options
powerManagement.enable = true;"#;

pub const PHOSH: &str = r#"#
# Phosh configuration
#

services.xserver.desktopManager.phosh = {
  enable = true;
  user = {{ username }};
  group = "users";
};

programs.calls.enable = true;
hardware.sensor.iio.enable = true;"#;

pub const PLASMA_MOBILE: &str = r#"#
# Plasma Mobile configuration
#

services.xserver = {
  enable = true;
  desktopManager.plasma5.mobile.enable = true;
  displayManager.defaultSession = "plasma-mobile";
  displayManager.autoLogin = {
    enable = true;
    user = {{ username }};
  };
  displayManager.lightdm = {
    enable = true;
    # Workaround for autologin only working at first launch.
    # A logout or session crashing will show the login screen otherwise.
    extraSeatDefaults = ''
      session-cleanup-script=${pkgs.procps}/bin/pkill -P1 -fx ${pkgs.lightdm}/sbin/lightdm
    '';
  };
  libinput.enable = true;
};"#;

pub const USER: &str = r#"#
# User configuration
#

users.users.{{ username }} = {
  isNormalUser = true;
  description = {{ fullname }};
  hashedPassword = {{ hashed_password }};
  extraGroups = [
    "dialout"
    "feedbackd"
    "networkmanager"
    "video"
    "wheel"
  ];
};"#;

pub const FILESYSTEMS: &str = r#"fileSystems = {
  "/" = {
    device = {{ rootfs_device }};
    fsType = {{ rootfs_type }};
  };
};"#;

pub const LUKS_DEVICES: &str = r#"boot.initrd.luks.devices = {
  {{ luks_name }} = {
    device = {{ luks_device }};
  };
};"#;
