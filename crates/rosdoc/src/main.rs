//! rosdoc CLI - generate documentation for a ROS package.

use std::ffi::OsString;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use tracing_subscriber::{fmt, EnvFilter};

mod commands;

#[derive(Parser)]
#[command(name = "rosdoc")]
#[command(about = "Generate documentation for a ROS package")]
#[command(version)]
pub struct Cli {
    /// Package to document
    #[arg(value_name = "PACKAGE")]
    packages: Vec<String>,

    /// Suppress doxygen errors
    #[arg(short, long)]
    quiet: bool,

    /// The directory to write documentation to
    #[arg(short = 'o', long = "output", value_name = "OUTPUT_DIRECTORY", default_value = "html")]
    output_dir: PathBuf,

    /// Path to a YAML file listing tag files to link against
    #[arg(short = 't', long = "tagfile", value_name = "TAGFILE")]
    tagfile: Option<PathBuf>,

    /// Generate a tag file for this package at the given path
    #[arg(short = 'g', long = "generate_tagfile", value_name = "PATH")]
    generate_tagfile: Option<PathBuf>,

    /// Package search path, overriding ROS_PACKAGE_PATH
    #[arg(long, value_name = "DIRS")]
    package_path: Option<OsString>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<ExitCode> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        // --help and --version
        Err(e) if !e.use_stderr() => e.exit(),
        Err(e) => {
            e.print()?;
            return Ok(ExitCode::FAILURE);
        }
    };

    let [package] = cli.packages.as_slice() else {
        eprintln!("Please give rosdoc exactly one package");
        eprintln!("{}", Cli::command().render_help());
        return Ok(ExitCode::FAILURE);
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        }
    });

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    commands::document::run(commands::document::DocumentArgs {
        package: package.clone(),
        output_dir: cli.output_dir,
        quiet: cli.quiet,
        tagfile: cli.tagfile,
        generate_tagfile: cli.generate_tagfile,
        package_path: cli.package_path,
    })?;

    Ok(ExitCode::SUCCESS)
}
