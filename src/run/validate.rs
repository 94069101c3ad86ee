use colored::Colorize;

use crate::constants::REQUIRED_COMMANDS;
use crate::errors::NixCfgError;
use crate::utils::shell::in_path;

pub(super) fn run(answers_file: &str) -> Result<(), NixCfgError> {
    let start = std::time::Instant::now();

    let snapshot = super::load_snapshot(answers_file, None)?;

    for cmd in REQUIRED_COMMANDS {
        if !in_path(cmd) {
            eprintln!(
                "{}",
                format!("WARN: {cmd} not in PATH, render with --hasher builtin").yellow()
            );
        }
    }

    println!(
        "{}",
        format!(
            "answers for host {} are valid, validation done in {:?}",
            snapshot.info.hostname,
            start.elapsed()
        )
        .green()
    );

    Ok(())
}
