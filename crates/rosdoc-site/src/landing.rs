//! Package landing page.

use std::fs;
use std::path::{Path, PathBuf};

use rosdoc_builders::BuilderKind;
use rosdoc_pkg::Manifest;

use crate::assets::STYLESHEET_NAME;
use crate::error::SiteError;
use crate::params::BuildParams;
use crate::templates::{BuilderEntry, LandingContext, TemplateEngine};

/// Landing page file name when no builder owns the documentation root.
pub const LANDING_PAGE: &str = "index.html";

/// Landing page file name when a builder writes its own `index.html` into
/// the documentation root.
pub const ROOT_TAKEN_LANDING_PAGE: &str = "landing.html";

/// File name the landing page is written to for these parameters.
pub fn landing_page_name(params: &BuildParams) -> &'static str {
    if params.any_targets_root() {
        ROOT_TAKEN_LANDING_PAGE
    } else {
        LANDING_PAGE
    }
}

/// Build the landing page context.
pub fn landing_context(
    package: &str,
    manifest: &Manifest,
    params: &BuildParams,
    msg_index: Option<&str>,
) -> LandingContext {
    let builders = params
        .iter()
        .map(|(name, spec)| {
            let href = if spec.targets_root() {
                LANDING_PAGE.to_string()
            } else {
                format!("{}/{}", spec.output_dir().trim_end_matches('/'), LANDING_PAGE)
            };

            BuilderEntry {
                name: name.clone(),
                output_dir: spec.output_dir().to_string(),
                href,
                known: BuilderKind::from_name(name).is_some(),
                params: spec.display_entries(),
            }
        })
        .collect();

    LandingContext {
        package: package.to_string(),
        version: manifest.version.clone(),
        description: manifest.description.clone(),
        maintainers: manifest.maintainers.clone(),
        authors: manifest.authors.clone(),
        licenses: manifest.licenses.clone(),
        urls: manifest.urls.clone(),
        builders,
        msg_index: msg_index.map(str::to_string),
        stylesheet: STYLESHEET_NAME.to_string(),
    }
}

/// Render and write the landing page, returning its path.
pub fn generate_landing_page(
    package: &str,
    manifest: &Manifest,
    params: &BuildParams,
    output_dir: &Path,
    templates: &TemplateEngine,
    msg_index: Option<&str>,
) -> Result<PathBuf, SiteError> {
    let context = landing_context(package, manifest, params, msg_index);
    let html = templates.render_landing(&context)?;

    fs::create_dir_all(output_dir).map_err(SiteError::write(output_dir))?;
    let path = output_dir.join(landing_page_name(params));
    fs::write(&path, html).map_err(SiteError::write(&path))?;

    tracing::debug!("Wrote landing page {}", path.display());
    Ok(path)
}
