mod answers;
mod cli;
mod constants;
mod entity;
mod errors;
mod linux;
mod nixos;
mod run;
mod store;
mod utils;

use clap::Parser;
use colored::Colorize;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = cli::Cli::parse();

    if let Err(err) = run::run(args) {
        eprintln!("{}", format!("nixcfg: {err}").red());
        std::process::exit(1);
    }
}
