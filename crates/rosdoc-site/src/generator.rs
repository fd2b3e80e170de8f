//! The documentation pipeline for one package.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use rosdoc_builders::BuilderRegistry;
use rosdoc_pkg::Manifest;

use crate::assets::AssetPipeline;
use crate::config::load_config;
use crate::dispatch::{dispatch, DispatchContext, DispatchReport};
use crate::error::SiteError;
use crate::landing::generate_landing_page;
use crate::msgdocs::{discover, write_msg_docs, MSG_INDEX};
use crate::params::{inject_tagfiles, normalize, BuildParams, TagfileOptions};
use crate::templates::TemplateEngine;

/// Configuration for documenting a package.
#[derive(Debug, Clone)]
pub struct GenerateConfig {
    /// Documentation root
    pub output_dir: PathBuf,

    /// Suppress builder tool diagnostics
    pub quiet: bool,

    /// Tag file options from the command line
    pub tagfiles: TagfileOptions,
}

impl Default for GenerateConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("html"),
            quiet: false,
            tagfiles: TagfileOptions::default(),
        }
    }
}

/// Result of documenting a package.
#[derive(Debug)]
pub struct GenerateResult {
    /// What each builder did
    pub report: DispatchReport,

    /// The parameters builders ran with
    pub params: BuildParams,

    pub landing_page: PathBuf,

    /// Message, service and action pages
    pub msg_pages: Vec<PathBuf>,

    pub stylesheet: PathBuf,

    /// Absolute documentation root
    pub output_dir: PathBuf,

    /// Total time in milliseconds
    pub duration_ms: u64,
}

/// Runs the configured builders for a package and post-processes the result.
pub struct DocGenerator {
    config: GenerateConfig,
    registry: BuilderRegistry,
    templates: TemplateEngine,
}

impl DocGenerator {
    /// Create a generator using the standard builders.
    pub fn new(config: GenerateConfig) -> Result<Self, SiteError> {
        Ok(Self {
            config,
            registry: BuilderRegistry::standard(),
            templates: TemplateEngine::new()?,
        })
    }

    /// Replace the builder registry.
    pub fn with_registry(mut self, registry: BuilderRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Document the package rooted at `path`.
    ///
    /// Configuration problems and builder failures are logged and never
    /// abort the run. Failures while writing the landing page, message docs
    /// or stylesheet are returned.
    pub fn generate(
        &self,
        path: &Path,
        package: &str,
        manifest: &Manifest,
    ) -> Result<GenerateResult, SiteError> {
        let start = Instant::now();

        // Builders run from the package directory, so they need an
        // absolute output path.
        let requested = &self.config.output_dir;
        fs::create_dir_all(requested).map_err(SiteError::write(requested))?;
        let output_dir = fs::canonicalize(requested).map_err(SiteError::read(requested))?;

        let raw = load_config(path, manifest);
        let params = inject_tagfiles(normalize(&raw, package)?, &self.config.tagfiles);
        match serde_yaml::to_string(&params) {
            Ok(yaml) => tracing::debug!("Build params for {}:\n{}", package, yaml.trim_end()),
            Err(e) => tracing::debug!("Build params for {}: {:?} ({})", package, params, e),
        }

        let ctx = DispatchContext {
            source_path: path,
            package,
            manifest,
            output_dir: &output_dir,
            quiet: self.config.quiet,
        };
        let report = dispatch(&params, &self.registry, &ctx);

        // The landing page is written first and links the message docs
        // index only when there are definitions to document.
        let definitions = discover(path);
        let has_msg_docs = definitions.as_ref().is_ok_and(|d| !d.is_empty());
        let landing_page = generate_landing_page(
            package,
            manifest,
            &params,
            &output_dir,
            &self.templates,
            has_msg_docs.then_some(MSG_INDEX),
        )?;
        let msg_docs = write_msg_docs(package, &definitions?, &output_dir, &self.templates)?;
        let stylesheet = AssetPipeline::write_stylesheet(&output_dir)?;

        let duration = start.elapsed();
        tracing::info!(
            "Documented {} in {}ms ({} builders run, {} failed)",
            package,
            duration.as_millis(),
            report.outcomes.len(),
            report.failures()
        );

        Ok(GenerateResult {
            report,
            params,
            landing_page,
            msg_pages: msg_docs.pages,
            stylesheet,
            output_dir,
            duration_ms: duration.as_millis() as u64,
        })
    }
}
