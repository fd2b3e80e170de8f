//! Running the requested builders.

use std::path::Path;
use std::time::{Duration, Instant};

use rosdoc_builders::{BuildJob, BuilderKind, BuilderRegistry};
use rosdoc_pkg::Manifest;

use crate::error::error_chain;
use crate::params::BuildParams;

/// The package being documented and where its docs go.
#[derive(Debug, Clone, Copy)]
pub struct DispatchContext<'a> {
    pub source_path: &'a Path,
    pub package: &'a str,
    pub manifest: &'a Manifest,
    pub output_dir: &'a Path,
    pub quiet: bool,
}

/// How one builder run went.
#[derive(Debug, Clone)]
pub struct BuilderOutcome {
    pub kind: BuilderKind,
    pub duration: Duration,
    /// Error chain when the builder failed
    pub error: Option<String>,
}

impl BuilderOutcome {
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

/// Result of a dispatch pass.
#[derive(Debug, Clone, Default)]
pub struct DispatchReport {
    /// One entry per builder run, in run order
    pub outcomes: Vec<BuilderOutcome>,

    /// Requested names with no registered builder
    pub ignored: Vec<String>,
}

impl DispatchReport {
    /// Kinds that ran, in run order.
    pub fn ran(&self) -> Vec<BuilderKind> {
        self.outcomes.iter().map(|o| o.kind).collect()
    }

    pub fn failures(&self) -> usize {
        self.outcomes.iter().filter(|o| !o.succeeded()).count()
    }
}

/// Run every registered builder that `params` requests, in registry order.
///
/// A failing builder is logged and never stops the others.
pub fn dispatch(
    params: &BuildParams,
    registry: &BuilderRegistry,
    ctx: &DispatchContext<'_>,
) -> DispatchReport {
    let mut report = DispatchReport::default();

    for name in params.names() {
        let registered = BuilderKind::from_name(name).is_some_and(|kind| registry.get(kind).is_some());
        if !registered {
            tracing::warn!("No builder named [{}], ignoring its configuration", name);
            report.ignored.push(name.to_string());
        }
    }

    for (kind, builder) in registry.iter() {
        let Some(spec) = params.spec_for(kind) else {
            continue;
        };

        let job = BuildJob {
            source_path: ctx.source_path,
            package: ctx.package,
            manifest: ctx.manifest,
            spec,
            output_dir: ctx.output_dir,
            quiet: ctx.quiet,
        };

        tracing::info!("Running {} for {}", kind, ctx.package);
        let start = Instant::now();
        let result = builder.build(&job);
        let duration = start.elapsed();

        let error = match result {
            Ok(()) => {
                tracing::debug!("Builder [{}] finished in {}ms", kind, duration.as_millis());
                None
            }
            Err(e) => {
                let chain = error_chain(&e);
                tracing::error!("{}", chain);
                tracing::error!("Builder [{}] failed", kind);
                Some(chain)
            }
        };

        report.outcomes.push(BuilderOutcome {
            kind,
            duration,
            error,
        });
    }

    report
}
