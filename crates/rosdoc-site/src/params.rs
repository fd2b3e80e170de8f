//! Build parameter normalization.
//!
//! Turns a [`RawConfig`] into one [`BuilderSpec`] per requested builder,
//! then layers on the tag file options given on the command line.

use std::collections::btree_map;
use std::collections::BTreeMap;
use std::path::PathBuf;

use rosdoc_builders::doxygen::{GENERATE_TAGFILE_KEY, TAGFILE_SPEC_KEY};
use rosdoc_builders::{BuilderKind, BuilderSpec};
use serde_yaml::Value;

use crate::config::{ConfigError, RawConfig};

/// Builder parameters keyed by builder name.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
#[serde(transparent)]
pub struct BuildParams(BTreeMap<String, BuilderSpec>);

impl BuildParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parameters used when a package has no usable configuration: the
    /// primary builder, writing into the documentation root.
    pub fn primary_default() -> Self {
        let kind = BuilderKind::PRIMARY;
        let mut params = Self::new();
        params.insert(
            kind.name(),
            BuilderSpec::new(kind.name()).with(BuilderSpec::OUTPUT_DIR_KEY, "."),
        );
        params
    }

    /// Insert a spec, replacing any earlier one with the same name.
    pub fn insert(&mut self, name: impl Into<String>, spec: BuilderSpec) {
        self.0.insert(name.into(), spec);
    }

    pub fn get(&self, name: &str) -> Option<&BuilderSpec> {
        self.0.get(name)
    }

    /// Spec for a known builder, if requested.
    pub fn spec_for(&self, kind: BuilderKind) -> Option<&BuilderSpec> {
        self.get(kind.name())
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, BuilderSpec> {
        self.0.iter()
    }

    pub fn names(&self) -> Vec<&str> {
        self.0.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether any requested builder writes into the documentation root.
    pub fn any_targets_root(&self) -> bool {
        self.0.values().any(BuilderSpec::targets_root)
    }
}

impl<'a> IntoIterator for &'a BuildParams {
    type Item = (&'a String, &'a BuilderSpec);
    type IntoIter = btree_map::Iter<'a, String, BuilderSpec>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Tag file paths supplied by the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagfileOptions {
    /// Tag file list to link against
    pub tagfile_spec: Option<PathBuf>,

    /// Where to write this package's tag file
    pub generate_tagfile: Option<PathBuf>,
}

/// Normalize raw configuration into build parameters.
///
/// Absent, empty or non-sequence configuration falls back to
/// [`BuildParams::primary_default`]. In a sequence, an entry without a
/// `builder` key stops normalization: earlier entries are kept and the error
/// is logged. Entries that are not mappings, or whose `builder` is a
/// sequence or mapping, are returned as errors.
pub fn normalize(raw: &RawConfig, package: &str) -> Result<BuildParams, ConfigError> {
    let value = match raw {
        RawConfig::Loaded(value) if !is_empty(value) => value,
        _ => return Ok(BuildParams::primary_default()),
    };

    let Value::Sequence(entries) = value else {
        tracing::warn!("Package [{}] had an invalid rosdoc config", package);
        return Ok(BuildParams::primary_default());
    };

    let mut params = BuildParams::new();
    for (index, entry) in entries.iter().enumerate() {
        let Value::Mapping(mapping) = entry else {
            return Err(ConfigError::InvalidEntry {
                package: package.to_string(),
                index,
                message: "expected a mapping".to_string(),
            });
        };

        match mapping.get(BuilderSpec::BUILDER_KEY) {
            None => {
                tracing::error!(
                    "Config file for [{}] is invalid, missing required '{}' key",
                    package,
                    BuilderSpec::BUILDER_KEY
                );
                break;
            }
            Some(builder) => {
                let Some(name) = builder_name(builder) else {
                    return Err(ConfigError::InvalidEntry {
                        package: package.to_string(),
                        index,
                        message: format!("'{}' must be a scalar", BuilderSpec::BUILDER_KEY),
                    });
                };
                params.insert(name, BuilderSpec::from_mapping(mapping.clone()));
            }
        }
    }

    Ok(params)
}

/// Add the caller's tag file options to the cross-reference builder's spec.
///
/// Caller-supplied values replace configured ones. Parameters without the
/// cross-reference builder are returned unchanged.
pub fn inject_tagfiles(mut params: BuildParams, options: &TagfileOptions) -> BuildParams {
    if let Some(spec) = params.0.get_mut(BuilderKind::CROSS_REFERENCE.name()) {
        if let Some(path) = &options.tagfile_spec {
            spec.set(TAGFILE_SPEC_KEY, path.display().to_string());
        }
        if let Some(path) = &options.generate_tagfile {
            spec.set(GENERATE_TAGFILE_KEY, path.display().to_string());
        }
    }

    params
}

/// Name a builder entry is keyed by. Scalars other than strings use their
/// YAML rendering, so `5` and `true` become unknown builder names.
fn builder_name(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Null => Some("~".to_string()),
        Value::Sequence(_) | Value::Mapping(_) | Value::Tagged(_) => None,
    }
}

/// YAML values that count as "no configuration".
fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::String(s) => s.is_empty(),
        Value::Sequence(seq) => seq.is_empty(),
        Value::Mapping(map) => map.is_empty(),
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::Tagged(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn raw(yaml: &str) -> RawConfig {
        RawConfig::Loaded(serde_yaml::from_str(yaml).unwrap())
    }

    fn spec(yaml: &str) -> BuilderSpec {
        BuilderSpec::from_mapping(serde_yaml::from_str(yaml).unwrap())
    }

    #[test]
    fn absent_config_uses_primary_default() {
        let params = normalize(&RawConfig::Absent, "pkg").unwrap();

        assert_eq!(params.names(), vec!["doxygen"]);
        assert_eq!(
            params.get("doxygen"),
            Some(&spec("builder: doxygen\noutput_dir: ."))
        );
    }

    #[test]
    fn empty_sequence_and_mapping_use_primary_default() {
        assert_eq!(normalize(&raw("[]"), "pkg").unwrap(), BuildParams::primary_default());
        assert_eq!(normalize(&raw("{}"), "pkg").unwrap(), BuildParams::primary_default());
    }

    #[test]
    fn mapping_config_falls_back_to_default() {
        let params = normalize(&raw("builder: sphinx\noutput_dir: x"), "pkg").unwrap();
        assert_eq!(params, BuildParams::primary_default());
    }

    #[test]
    fn scalar_config_falls_back_to_default() {
        let params = normalize(&raw("just a string"), "pkg").unwrap();
        assert_eq!(params, BuildParams::primary_default());
    }

    #[test]
    fn sequence_is_keyed_by_builder() {
        let params = normalize(
            &raw("- builder: doxygen\n  output_dir: api\n- builder: sphinx\n  sphinx_root_dir: doc"),
            "pkg",
        )
        .unwrap();

        assert_eq!(params.names(), vec!["doxygen", "sphinx"]);
        assert_eq!(params.get("doxygen").unwrap().output_dir(), "api");
        assert_eq!(
            params.get("sphinx").unwrap().get_str("sphinx_root_dir"),
            Some("doc")
        );
    }

    #[test]
    fn duplicate_builder_last_wins() {
        let params = normalize(
            &raw("- builder: doxygen\n  output_dir: first\n- builder: doxygen\n  output_dir: second"),
            "pkg",
        )
        .unwrap();

        assert_eq!(params.len(), 1);
        assert_eq!(params.get("doxygen").unwrap().output_dir(), "second");
    }

    #[test]
    fn missing_builder_stops_normalization() {
        let params = normalize(
            &raw("- builder: epydoc\n- output_dir: lost\n- builder: sphinx"),
            "pkg",
        )
        .unwrap();

        assert_eq!(params.names(), vec!["epydoc"]);
    }

    #[test]
    fn missing_builder_first_yields_empty_params() {
        let params = normalize(&raw("- output_dir: x\n- builder: sphinx"), "pkg").unwrap();
        assert!(params.is_empty());
    }

    #[test]
    fn builder_names_are_exact_strings() {
        let params = normalize(&raw("- builder: Doxygen\n- builder: doxygen"), "pkg").unwrap();
        assert_eq!(params.names(), vec!["Doxygen", "doxygen"]);
    }

    #[test]
    fn non_mapping_entry_is_fatal() {
        let result = normalize(&raw("- builder: doxygen\n- sphinx"), "pkg");
        assert!(matches!(
            result,
            Err(ConfigError::InvalidEntry { index: 1, .. })
        ));
    }

    #[test]
    fn collection_builder_is_fatal() {
        let result = normalize(&raw("- builder: [doxygen]"), "pkg");
        assert!(matches!(result, Err(ConfigError::InvalidEntry { index: 0, .. })));

        let result = normalize(&raw("- builder: doxygen\n- builder: {name: sphinx}"), "pkg");
        assert!(matches!(result, Err(ConfigError::InvalidEntry { index: 1, .. })));
    }

    #[test]
    fn scalar_builders_are_keyed_by_their_rendering() {
        let params = normalize(
            &raw("- builder: 5\n- builder: true\n- builder:\n- builder: doxygen"),
            "pkg",
        )
        .unwrap();

        assert_eq!(params.names(), vec!["5", "doxygen", "true", "~"]);
        assert_eq!(
            params.get("5").unwrap().get("builder"),
            Some(&Value::from(5))
        );
    }

    #[test]
    fn injects_tagfiles_over_configured_values() {
        let params = normalize(
            &raw("- builder: doxygen\n  tagfile_spec: configured.yaml\n- builder: sphinx"),
            "pkg",
        )
        .unwrap();
        let options = TagfileOptions {
            tagfile_spec: Some(PathBuf::from("/tags/list.yaml")),
            generate_tagfile: Some(PathBuf::from("/tags/pkg.tag")),
        };

        let injected = inject_tagfiles(params.clone(), &options);
        let doxygen = injected.get("doxygen").unwrap();

        assert_eq!(doxygen.get_str(TAGFILE_SPEC_KEY), Some("/tags/list.yaml"));
        assert_eq!(doxygen.get_str(GENERATE_TAGFILE_KEY), Some("/tags/pkg.tag"));
        assert_eq!(injected.get("sphinx"), params.get("sphinx"));
        // The input is untouched.
        assert_eq!(
            params.get("doxygen").unwrap().get_str(TAGFILE_SPEC_KEY),
            Some("configured.yaml")
        );
    }

    #[test]
    fn injection_without_cross_reference_builder_is_identity() {
        let params = normalize(&raw("- builder: sphinx"), "pkg").unwrap();
        let options = TagfileOptions {
            tagfile_spec: Some(PathBuf::from("/tags/list.yaml")),
            generate_tagfile: None,
        };

        assert_eq!(inject_tagfiles(params.clone(), &options), params);
    }

    #[test]
    fn injection_without_options_keeps_configured_values() {
        let params = normalize(&raw("- builder: doxygen\n  generate_tagfile: mine.tag"), "pkg").unwrap();
        let injected = inject_tagfiles(params.clone(), &TagfileOptions::default());
        assert_eq!(injected, params);
    }

    #[test]
    fn detects_root_targets() {
        assert!(BuildParams::primary_default().any_targets_root());
        let nested = normalize(&raw("- builder: sphinx\n  output_dir: manual"), "pkg").unwrap();
        assert!(!nested.any_targets_root());
    }
}
