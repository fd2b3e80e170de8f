//! Documentation pipeline for rosdoc.
//!
//! Loads a package's documentation configuration, runs the requested
//! builders, then writes the landing page, message docs and stylesheet.

pub mod assets;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod generator;
pub mod landing;
pub mod msgdocs;
pub mod params;
pub mod templates;

pub use config::{load_config, ConfigError, RawConfig};
pub use dispatch::{dispatch, BuilderOutcome, DispatchContext, DispatchReport};
pub use error::{error_chain, SiteError};
pub use generator::{DocGenerator, GenerateConfig, GenerateResult};
pub use params::{inject_tagfiles, normalize, BuildParams, TagfileOptions};
