//! Document one package.

use std::env;
use std::ffi::OsString;
use std::path::{self, PathBuf};

use anyhow::{Context, Result};
use rosdoc_pkg::PackageRegistry;
use rosdoc_site::{DocGenerator, GenerateConfig, TagfileOptions};

/// What to document and how.
#[derive(Debug)]
pub struct DocumentArgs {
    pub package: String,
    pub output_dir: PathBuf,
    pub quiet: bool,
    pub tagfile: Option<PathBuf>,
    pub generate_tagfile: Option<PathBuf>,
    /// Search path overriding `ROS_PACKAGE_PATH`
    pub package_path: Option<OsString>,
}

/// Run the document command.
pub fn run(args: DocumentArgs) -> Result<()> {
    let registry = match &args.package_path {
        Some(dirs) => {
            let roots: Vec<PathBuf> = env::split_paths(dirs)
                .filter(|p| !p.as_os_str().is_empty())
                .collect();
            PackageRegistry::crawl(&roots)
        }
        None => PackageRegistry::from_env(),
    }
    .context("Failed to build the package registry")?;
    tracing::debug!("Found {} packages", registry.len());

    let package = registry.get(&args.package)?;
    println!(
        "Documenting {} located here: {}",
        package.name,
        package.path.display()
    );

    // Doxygen runs from the package directory, so caller paths are made
    // absolute against the current directory first.
    let tagfiles = TagfileOptions {
        tagfile_spec: args
            .tagfile
            .map(path::absolute)
            .transpose()
            .context("Failed to resolve tag file path")?,
        generate_tagfile: args
            .generate_tagfile
            .map(path::absolute)
            .transpose()
            .context("Failed to resolve generated tag file path")?,
    };

    let config = GenerateConfig {
        output_dir: args.output_dir,
        quiet: args.quiet,
        tagfiles,
    };

    let result = DocGenerator::new(config)?
        .generate(&package.path, &package.name, &package.manifest)
        .with_context(|| format!("Failed to document {}", package.name))?;

    if result.report.failures() > 0 {
        tracing::warn!(
            "{} of {} builders failed for {}",
            result.report.failures(),
            result.report.outcomes.len(),
            package.name
        );
    }

    println!(
        "Done documenting {} you can find your documentation here: {}",
        package.name,
        result.output_dir.display()
    );

    Ok(())
}
