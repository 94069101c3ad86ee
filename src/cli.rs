use clap::{
    Args,
    Parser,
    Subcommand,
    ValueEnum,
};

use crate::constants::defaults;
use crate::errors::NixCfgError;

#[derive(Debug, Parser)]
#[clap(
    version,
    about = "Renders Mobile NixOS configuration.nix and hardware-configuration.nix from installer answers"
)]
pub struct Cli {
    #[command(subcommand)]
    pub commands: Option<Commands>,

    /// Answers file (YAML, JSON or TOML, by extension)
    #[arg(
        global = true,
        short = 'f',
        long = "file",
        value_parser = validate_filename,
        default_value_t = String::from(defaults::ANSWERS_FILE)
    )]
    pub answers: String,

    /// Dry-run, nixcfg will not write any files,
    /// and will just print what would be written
    #[arg(global = true, short = 'n', long = "dry-run", default_value_t = false)]
    pub dry_run: bool,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Render configuration.nix and hardware-configuration.nix
    Render(ArgsRender),

    /// Validate answers file (default)
    Validate,

    /// Print a summary of the chosen answers
    Describe,

    /// Dump the configuration snapshot as JSON
    Dump(ArgsDump),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum HasherKind {
    /// External mkpasswd, password passed on stdin
    Mkpasswd,

    /// Built-in SHA-512 crypt
    Builtin,
}

#[derive(Debug, Args)]
pub struct ArgsRender {
    /// Output directory, defaults to $NIXCFG_OUT or /mnt/etc/nixos
    #[arg(short = 'o', long = "output")]
    pub output: Option<String>,

    /// Also dump the configuration snapshot as JSON to this path
    #[arg(long = "json")]
    pub json: Option<String>,

    /// Password hashing backend
    #[arg(long = "hasher", value_enum, default_value_t = HasherKind::Mkpasswd)]
    pub hasher: HasherKind,

    /// mkpasswd-compatible program to use with --hasher mkpasswd
    #[arg(long = "mkpasswd", default_value_t = String::from(defaults::MKPASSWD))]
    pub mkpasswd: String,

    /// Seconds to wait for the password hashing program
    #[arg(
        long = "timeout",
        value_parser = clap::value_parser!(u64).range(1..),
        default_value_t = defaults::HASH_TIMEOUT_SECS
    )]
    pub timeout: u64,

    /// Override nix.maxJobs, which defaults to half the host's logical CPUs
    #[arg(long = "max-jobs", value_parser = clap::value_parser!(u64).range(1..))]
    pub max_jobs: Option<u64>,

    /// Override the Mobile NixOS device from the answers file
    #[arg(long = "device")]
    pub device: Option<String>,
}

#[derive(Debug, Args)]
pub struct ArgsDump {
    /// Write JSON to this path instead of stdout
    #[arg(short = 'o', long = "output")]
    pub output: Option<String>,
}

fn validate_filename(name: &str) -> Result<String, NixCfgError> {
    if name.is_empty() {
        return Err(NixCfgError::BadArgs(String::from("empty filename")));
    }

    Ok(name.to_string())
}
