use colored::Colorize;

use crate::cli;
use crate::errors::NixCfgError;

pub(super) fn run(
    answers_file: &str,
    dry_run: bool,
    args: cli::ArgsDump,
) -> Result<(), NixCfgError> {
    let snapshot = super::load_snapshot(answers_file, None)?;

    match args.output {
        Some(path) if !dry_run => {
            snapshot.persist_json(&path)?;
            eprintln!("{}", format!("snapshot written to {path}").green());
        }
        _ => println!("{}", snapshot.to_json_string()?),
    }

    Ok(())
}
