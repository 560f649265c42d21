#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::struct_excessive_bools)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::uninlined_format_args)]

mod commands;
mod logging;

use clap::Parser;
use localdeps_core::{Config, InstallOptions};
use miette::Result;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "localdeps")]
#[command(author, version = localdeps_core::VERSION, about = "Install npm packages from local repositories, falling back to npm", long_about = None)]
#[command(arg_required_else_help = true)]
struct Cli {
    /// Package names, or package directories containing a package.json
    #[arg(value_name = "PACKAGE_OR_DIR", required = true)]
    packages: Vec<String>,

    /// Directories to search for packages (may be given several times)
    #[arg(long = "repo", value_name = "DIR", num_args = 1..)]
    repos: Vec<PathBuf>,

    /// Skip devDependencies
    #[arg(long)]
    production: bool,

    /// Never run npm; only print the command for missing packages
    #[arg(long)]
    local_only: bool,

    /// Symlink local packages instead of copying them
    #[arg(long)]
    symlink: bool,

    /// Increase logging verbosity (-v for DEBUG and duplicate warnings, -vv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Emit the install report as JSON on stdout
    #[arg(long)]
    json: bool,

    /// Override the working directory
    #[arg(long, value_name = "PATH")]
    cwd: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let cwd = cli
        .cwd
        .or_else(|| std::env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."));

    let config = Config::new(cwd)
        .with_verbosity(cli.verbose)
        .with_json_logs(cli.json);

    logging::init(config.verbosity, config.json_logs);

    let options = InstallOptions::default()
        .with_production(cli.production)
        .with_local_only(cli.local_only)
        .with_symlink(cli.symlink)
        .with_verbose(cli.verbose > 0);

    commands::install::run(&config, options, &cli.packages, &cli.repos)
}
