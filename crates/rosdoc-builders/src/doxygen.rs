//! Doxygen backend: C/C++ API reference and tag files.

use std::fs;
use std::path::{Path, PathBuf};

use crate::command::ToolCommand;
use crate::tagfiles::{doxygen_tagfiles, load_tagfile_spec};
use crate::traits::{BuildJob, Builder, BuilderError, BuilderKind};

/// Key holding the path of a tag file list to link against.
pub const TAGFILE_SPEC_KEY: &str = "tagfile_spec";

/// Key holding the path to write this package's tag file to.
pub const GENERATE_TAGFILE_KEY: &str = "generate_tagfile";

const DEFAULT_FILE_PATTERNS: &str = "*.c *.cpp *.h *.cc *.hh *.hpp *.hxx *.py *.dox *.java *.md";

/// Runs `doxygen` with a generated Doxyfile.
#[derive(Debug)]
pub struct DoxygenBuilder {
    program: String,
}

impl DoxygenBuilder {
    pub fn new() -> Self {
        Self {
            program: "doxygen".to_string(),
        }
    }

    /// Use a different doxygen executable.
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Render the Doxyfile for a job.
    pub fn doxyfile(&self, job: &BuildJob<'_>) -> Result<String, BuilderError> {
        let spec = job.spec;
        let source = job.source_path;
        let html_dir = job.html_dir();
        let mut settings: Vec<(&str, String)> = Vec::new();

        settings.push(("PROJECT_NAME", quote(job.package)));
        if let Some(version) = &job.manifest.version {
            settings.push(("PROJECT_NUMBER", quote(version)));
        }
        let summary = job.manifest.summary();
        if !summary.is_empty() {
            settings.push(("PROJECT_BRIEF", quote(&summary)));
        }

        settings.push(("OUTPUT_DIRECTORY", quote_path(&html_dir)));
        settings.push(("HTML_OUTPUT", ".".to_string()));
        settings.push(("GENERATE_HTML", "YES".to_string()));
        settings.push(("GENERATE_LATEX", "NO".to_string()));
        settings.push(("EXTRACT_ALL", "YES".to_string()));
        settings.push(("RECURSIVE", "YES".to_string()));
        settings.push(("INPUT", quote_path(source)));

        let patterns = spec
            .get_str("file_patterns")
            .unwrap_or(DEFAULT_FILE_PATTERNS);
        settings.push(("FILE_PATTERNS", patterns.to_string()));

        // The documentation root may live inside the package.
        let mut excludes: Vec<String> = spec
            .get_words("exclude")
            .iter()
            .map(|e| quote_path(&source.join(e)))
            .collect();
        if html_dir.starts_with(source) {
            excludes.push(quote_path(&html_dir));
        }
        settings.push(("EXCLUDE", excludes.join(" ")));
        settings.push(("EXCLUDE_PATTERNS", spec.get_words("exclude_patterns").join(" ")));
        settings.push(("EXCLUDE_SYMBOLS", spec.get_words("exclude_symbols").join(" ")));

        settings.push(("EXAMPLE_PATH", quote_path(source)));
        settings.push(("EXAMPLE_PATTERNS", spec.get_words("example_patterns").join(" ")));
        if let Some(image_path) = spec.get_str("image_path") {
            settings.push(("IMAGE_PATH", quote_path(&source.join(image_path))));
        }
        if let Some(aliases) = spec.get_str("aliases") {
            settings.push(("ALIASES", aliases.to_string()));
        }
        if let Some(mainpage) = spec.get_str("use_mdfile_as_mainpage") {
            settings.push(("USE_MDFILE_AS_MAINPAGE", quote_path(&source.join(mainpage))));
        }

        settings.push((
            "JAVADOC_AUTOBRIEF",
            yes_no(spec.get_bool("javadoc_autobrief").unwrap_or(false)),
        ));
        settings.push((
            "MULTILINE_CPP_IS_BRIEF",
            yes_no(spec.get_bool("multiline_cpp_is_brief").unwrap_or(false)),
        ));
        settings.push((
            "TAB_SIZE",
            spec.get_u64("tab_size").unwrap_or(8).to_string(),
        ));

        settings.push(("QUIET", yes_no(job.quiet)));
        settings.push(("WARNINGS", yes_no(!job.quiet)));

        if let Some(list) = package_path(job, TAGFILE_SPEC_KEY) {
            let entries = load_tagfile_spec(&list)?;
            settings.push(("TAGFILES", doxygen_tagfiles(&entries).join(" ")));
        }
        if let Some(tagfile) = package_path(job, GENERATE_TAGFILE_KEY) {
            settings.push(("GENERATE_TAGFILE", quote_path(&tagfile)));
        }

        let mut doxyfile = String::new();
        for (key, value) in settings {
            doxyfile.push_str(key);
            doxyfile.push_str(" = ");
            doxyfile.push_str(&value);
            doxyfile.push('\n');
        }
        Ok(doxyfile)
    }
}

impl Default for DoxygenBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl Builder for DoxygenBuilder {
    fn kind(&self) -> BuilderKind {
        BuilderKind::Doxygen
    }

    fn build(&self, job: &BuildJob<'_>) -> Result<(), BuilderError> {
        let html_dir = job.html_dir();
        fs::create_dir_all(&html_dir).map_err(|source| BuilderError::Io {
            path: html_dir.clone(),
            source,
        })?;

        if let Some(tagfile) = package_path(job, GENERATE_TAGFILE_KEY) {
            if let Some(parent) = tagfile.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent).map_err(|source| BuilderError::Io {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        let doxyfile = self.doxyfile(job)?;

        let scratch = tempfile::tempdir().map_err(|source| BuilderError::Io {
            path: std::env::temp_dir(),
            source,
        })?;
        let doxyfile_path = scratch.path().join("Doxyfile");
        fs::write(&doxyfile_path, doxyfile).map_err(|source| BuilderError::Io {
            path: doxyfile_path.clone(),
            source,
        })?;

        ToolCommand::new(&self.program)
            .arg(&doxyfile_path)
            .current_dir(job.source_path)
            .run(job.quiet)
    }
}

/// A path option from the spec. Relative paths name files in the package.
fn package_path(job: &BuildJob<'_>, key: &str) -> Option<PathBuf> {
    job.spec.get_str(key).map(|value| job.source_path.join(value))
}

fn yes_no(value: bool) -> String {
    String::from(if value { "YES" } else { "NO" })
}

fn quote(value: &str) -> String {
    if value.chars().any(char::is_whitespace) || value.contains('"') {
        format!("\"{}\"", value.replace('"', "\\\""))
    } else {
        value.to_string()
    }
}

fn quote_path(path: &Path) -> String {
    quote(&path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::BuilderSpec;
    use rosdoc_pkg::{Manifest, ManifestKind};

    fn manifest() -> Manifest {
        Manifest::parse(
            "<package><name>nav</name><version>2.0.1</version><description>Path planning. More.</description></package>",
            ManifestKind::Package,
            "",
        )
        .unwrap()
    }

    fn setting<'a>(doxyfile: &'a str, key: &str) -> Option<&'a str> {
        doxyfile
            .lines()
            .find_map(|l| l.strip_prefix(key)?.strip_prefix(" = "))
    }

    #[test]
    fn renders_defaults_from_manifest() {
        let manifest = manifest();
        let spec = BuilderSpec::new("doxygen").with("output_dir", ".");
        let job = BuildJob {
            source_path: Path::new("/src/nav"),
            package: "nav",
            manifest: &manifest,
            spec: &spec,
            output_dir: Path::new("/out/html"),
            quiet: false,
        };

        let doxyfile = DoxygenBuilder::new().doxyfile(&job).unwrap();

        assert_eq!(setting(&doxyfile, "PROJECT_NAME"), Some("nav"));
        assert_eq!(setting(&doxyfile, "PROJECT_NUMBER"), Some("2.0.1"));
        assert_eq!(setting(&doxyfile, "PROJECT_BRIEF"), Some("\"Path planning.\""));
        assert_eq!(setting(&doxyfile, "OUTPUT_DIRECTORY"), Some("/out/html"));
        assert_eq!(setting(&doxyfile, "INPUT"), Some("/src/nav"));
        assert_eq!(setting(&doxyfile, "FILE_PATTERNS"), Some(DEFAULT_FILE_PATTERNS));
        assert_eq!(setting(&doxyfile, "TAB_SIZE"), Some("8"));
        assert_eq!(setting(&doxyfile, "QUIET"), Some("NO"));
        assert_eq!(setting(&doxyfile, "TAGFILES"), None);
    }

    #[test]
    fn applies_spec_options() {
        let manifest = manifest();
        let spec: BuilderSpec = BuilderSpec::from_mapping(
            serde_yaml::from_str(
                "builder: doxygen\noutput_dir: api\nfile_patterns: '*.hpp'\nexclude: [test, build]\njavadoc_autobrief: YES\ntab_size: 2\ngenerate_tagfile: /tags/nav.tag",
            )
            .unwrap(),
        );
        let job = BuildJob {
            source_path: Path::new("/src/nav"),
            package: "nav",
            manifest: &manifest,
            spec: &spec,
            output_dir: Path::new("/src/nav/doc"),
            quiet: true,
        };

        let doxyfile = DoxygenBuilder::new().doxyfile(&job).unwrap();

        assert_eq!(setting(&doxyfile, "OUTPUT_DIRECTORY"), Some("/src/nav/doc/api"));
        assert_eq!(setting(&doxyfile, "FILE_PATTERNS"), Some("*.hpp"));
        assert_eq!(
            setting(&doxyfile, "EXCLUDE"),
            Some("/src/nav/test /src/nav/build /src/nav/doc/api")
        );
        assert_eq!(setting(&doxyfile, "JAVADOC_AUTOBRIEF"), Some("YES"));
        assert_eq!(setting(&doxyfile, "TAB_SIZE"), Some("2"));
        assert_eq!(setting(&doxyfile, "QUIET"), Some("YES"));
        assert_eq!(setting(&doxyfile, "GENERATE_TAGFILE"), Some("/tags/nav.tag"));
    }

    #[test]
    fn links_tag_files_from_list() {
        let temp = tempfile::tempdir().unwrap();
        let list = temp.path().join("tags.yaml");
        fs::write(
            &list,
            "- docs_url: http://docs/roscpp\n  location: file:///tags/roscpp.tag\n",
        )
        .unwrap();

        let manifest = manifest();
        let spec = BuilderSpec::new("doxygen").with(TAGFILE_SPEC_KEY, list.display().to_string());
        let job = BuildJob {
            source_path: Path::new("/src/nav"),
            package: "nav",
            manifest: &manifest,
            spec: &spec,
            output_dir: Path::new("/out"),
            quiet: true,
        };

        let doxyfile = DoxygenBuilder::new().doxyfile(&job).unwrap();

        assert_eq!(
            setting(&doxyfile, "TAGFILES"),
            Some("/tags/roscpp.tag=http://docs/roscpp")
        );
    }

    #[test]
    fn relative_tag_paths_resolve_against_package() {
        let package = tempfile::tempdir().unwrap();
        fs::create_dir_all(package.path().join("doc")).unwrap();
        fs::write(
            package.path().join("doc/tags.yaml"),
            "- docs_url: http://docs/roscpp\n  location: file:///tags/roscpp.tag\n",
        )
        .unwrap();

        let manifest = manifest();
        let spec = BuilderSpec::new("doxygen")
            .with(TAGFILE_SPEC_KEY, "doc/tags.yaml")
            .with(GENERATE_TAGFILE_KEY, "tags/nav.tag");
        let job = BuildJob {
            source_path: package.path(),
            package: "nav",
            manifest: &manifest,
            spec: &spec,
            output_dir: Path::new("/out"),
            quiet: true,
        };

        let doxyfile = DoxygenBuilder::new().doxyfile(&job).unwrap();

        assert_eq!(
            setting(&doxyfile, "TAGFILES"),
            Some("/tags/roscpp.tag=http://docs/roscpp")
        );
        let expected = package.path().join("tags/nav.tag").display().to_string();
        assert_eq!(setting(&doxyfile, "GENERATE_TAGFILE"), Some(expected.as_str()));
    }

    #[test]
    fn missing_tag_list_fails_the_build() {
        let manifest = manifest();
        let spec = BuilderSpec::new("doxygen").with(TAGFILE_SPEC_KEY, "/nonexistent/tags.yaml");
        let job = BuildJob {
            source_path: Path::new("/src/nav"),
            package: "nav",
            manifest: &manifest,
            spec: &spec,
            output_dir: Path::new("/out"),
            quiet: true,
        };

        assert!(matches!(
            DoxygenBuilder::new().doxyfile(&job),
            Err(BuilderError::TagfileSpec { .. })
        ));
    }

    #[test]
    fn missing_executable_is_reported() {
        let temp = tempfile::tempdir().unwrap();
        let manifest = manifest();
        let spec = BuilderSpec::new("doxygen");
        let out = temp.path().join("html");
        let job = BuildJob {
            source_path: temp.path(),
            package: "nav",
            manifest: &manifest,
            spec: &spec,
            output_dir: &out,
            quiet: true,
        };

        let result = DoxygenBuilder::with_program("rosdoc-test-missing-doxygen").build(&job);

        assert!(matches!(result, Err(BuilderError::Spawn { .. })));
        assert!(PathBuf::from(&out).is_dir());
    }

    #[test]
    fn quotes_values_with_spaces() {
        assert_eq!(quote("plain"), "plain");
        assert_eq!(quote("two words"), "\"two words\"");
        assert_eq!(quote("say \"hi\""), "\"say \\\"hi\\\"\"");
    }
}
