use std::path::{
    Path,
    PathBuf,
};
use std::time::Duration;

use colored::Colorize;

use crate::cli;
use crate::constants::files;
use crate::entity::report::{
    Report,
    Summary,
};
use crate::errors::NixCfgError;
use crate::linux::passwd::{
    Mkpasswd,
    PasswordHasher,
    Sha512Crypt,
};
use crate::nixos::NixosConfiguration;
use crate::store;
use crate::utils::fs::file_exists;

pub(super) fn run(
    answers_file: &str,
    dry_run: bool,
    args: cli::ArgsRender,
) -> Result<Report, NixCfgError> {
    let start = std::time::Instant::now();

    let snapshot = super::load_snapshot(answers_file, args.device)?;
    let location = super::output_location(args.output);

    let description = store::describe(&snapshot)?;
    eprintln!("{}", "Rendering configuration:".green());
    eprintln!("{}", store::format_description(&description));

    let mut summary = Summary {
        dry_run,
        ..Default::default()
    };

    // Dump before hashing, so a failing hasher still leaves diagnostics
    if let Some(json_path) = args.json {
        if dry_run {
            println!("{}", snapshot.to_json_string()?);
        } else {
            snapshot.persist_json(&json_path)?;
            summary.json_dump = Some(PathBuf::from(json_path));
        }
    }

    let hasher: Box<dyn PasswordHasher> = match args.hasher {
        cli::HasherKind::Builtin => Box::new(Sha512Crypt),
        cli::HasherKind::Mkpasswd => Box::new(Mkpasswd {
            timeout: Duration::from_secs(args.timeout),
            ..Mkpasswd::with_program(&args.mkpasswd)
        }),
    };
    summary.hasher = hasher.describe();

    let mut renderer = NixosConfiguration::new(&snapshot, hasher.as_ref());
    if let Some(jobs) = args.max_jobs {
        renderer = renderer.with_max_jobs(jobs as usize);
    }
    summary.max_jobs = renderer.max_jobs();

    if dry_run {
        print_documents(&renderer, Path::new(&location))?;
    } else {
        for name in [files::CONFIGURATION_NIX, files::HARDWARE_CONFIGURATION_NIX] {
            let path = Path::new(&location).join(name);
            if file_exists(&path) {
                log::warn!("overwriting existing {}", path.display());
            }
        }

        summary.files_written = renderer.write_all(&location)?;
    }

    Ok(Report {
        location,
        summary,
        duration: start.elapsed(),
    })
}

fn print_documents(renderer: &NixosConfiguration, location: &Path) -> Result<(), NixCfgError> {
    let documents = [
        (files::CONFIGURATION_NIX, renderer.configuration_nix()?),
        (
            files::HARDWARE_CONFIGURATION_NIX,
            renderer.hardware_configuration_nix()?,
        ),
    ];

    for (name, content) in documents {
        println!(
            "{}",
            format!("# [dry-run] {}", location.join(name).display()).yellow()
        );
        println!("{content}");
    }

    Ok(())
}
