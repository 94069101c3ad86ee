pub mod describe;
pub mod dump;
pub mod render;
pub mod validate;

use std::env;

use crate::answers::RawAnswers;
use crate::constants::defaults;
use crate::errors::NixCfgError;
use crate::store::{
    ConfigurationSnapshot,
    ConfigurationStore,
};
use crate::{
    cli,
    constants,
};

pub fn run(cli_args: cli::Cli) -> Result<(), NixCfgError> {
    match cli_args.commands {
        // Default is to validate
        None | Some(cli::Commands::Validate) => validate::run(&cli_args.answers),

        Some(cli::Commands::Render(args_render)) => {
            match render::run(&cli_args.answers, cli_args.dry_run, args_render) {
                Err(err) => Err(err),
                Ok(report) => Ok(println!("{}", report.to_json_string())),
            }
        }

        Some(cli::Commands::Describe) => describe::run(&cli_args.answers),

        Some(cli::Commands::Dump(args_dump)) => {
            dump::run(&cli_args.answers, cli_args.dry_run, args_dump)
        }
    }
}

/// Reads answers, then validates them into a snapshot.
/// `device` overrides the device from the answers file.
fn load_snapshot(
    answers_file: &str,
    device: Option<String>,
) -> Result<ConfigurationSnapshot, NixCfgError> {
    let mut answers = RawAnswers::from_file(answers_file)?;
    if device.is_some() {
        answers.device = device;
    }

    log::debug!("answers from {answers_file}: {answers:?}");

    ConfigurationStore::new(answers).build_snapshot()
}

fn output_location(output: Option<String>) -> String {
    output
        .or_else(|| env::var(constants::ENV_NIXCFG_OUT).ok())
        .unwrap_or(defaults::OUTPUT_LOCATION.to_string())
}
