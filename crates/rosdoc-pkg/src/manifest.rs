//! Package manifest (`package.xml` / legacy `manifest.xml`) parsing.

use std::fs;
use std::path::{Path, PathBuf};

use roxmltree::{Document, Node};

/// File name of a catkin-style package manifest.
pub const PACKAGE_MANIFEST: &str = "package.xml";

/// File name of a legacy rosbuild manifest.
pub const LEGACY_MANIFEST: &str = "manifest.xml";

/// Which manifest flavour a package was described with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestKind {
    /// `package.xml`, formats 1 through 3
    Package,
    /// `manifest.xml`; the package name is the directory name
    Legacy,
}

impl ManifestKind {
    /// The file name this kind of manifest lives in.
    pub fn file_name(self) -> &'static str {
        match self {
            ManifestKind::Package => PACKAGE_MANIFEST,
            ManifestKind::Legacy => LEGACY_MANIFEST,
        }
    }
}

/// A maintainer or author entry.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Person {
    pub name: String,
    pub email: Option<String>,
}

/// A `<url>` entry.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Link {
    /// Value of the `type` attribute, `website` when absent
    pub kind: String,
    pub href: String,
}

/// One child element of `<export>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Export {
    /// Element name, e.g. `rosdoc`
    pub tag: String,
    /// Attributes in document order
    pub attributes: Vec<(String, String)>,
}

impl Export {
    /// Look up an attribute by name.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

/// Parsed package metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    pub kind: ManifestKind,
    pub name: String,
    pub version: Option<String>,
    /// Description with whitespace collapsed and markup stripped
    pub description: String,
    /// `brief` attribute of `<description>` (legacy manifests only)
    pub brief: Option<String>,
    pub maintainers: Vec<Person>,
    pub authors: Vec<Person>,
    pub licenses: Vec<String>,
    pub urls: Vec<Link>,
    pub exports: Vec<Export>,
}

impl Manifest {
    /// Load the manifest of the package rooted at `dir`.
    ///
    /// `package.xml` takes precedence over `manifest.xml`.
    pub fn load(dir: &Path) -> Result<Self, ManifestError> {
        let (kind, path) = locate(dir).ok_or_else(|| ManifestError::Missing(dir.to_path_buf()))?;

        let source = fs::read_to_string(&path).map_err(|source| ManifestError::Io {
            path: path.clone(),
            source,
        })?;

        let fallback_name = dir
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default();

        Self::parse(&source, kind, fallback_name)
    }

    /// Parse manifest XML.
    ///
    /// `dir_name` names the package for legacy manifests, which carry no
    /// `<name>` element.
    pub fn parse(source: &str, kind: ManifestKind, dir_name: &str) -> Result<Self, ManifestError> {
        let doc = Document::parse(source)?;
        let root = doc.root_element();

        if !root.has_tag_name("package") {
            return Err(ManifestError::UnexpectedRoot(
                root.tag_name().name().to_string(),
            ));
        }

        let name = match kind {
            ManifestKind::Package => child_text(root, "name")
                .filter(|n| !n.is_empty())
                .ok_or(ManifestError::MissingField("name"))?,
            ManifestKind::Legacy => dir_name.to_string(),
        };

        let description_node = children(root, "description").next();
        let description = description_node.map(flatten_text).unwrap_or_default();
        let brief = description_node
            .and_then(|n| n.attribute("brief"))
            .map(collapse_whitespace)
            .filter(|b| !b.is_empty());

        let maintainers = children(root, "maintainer").map(person).collect();

        // Legacy manifests list authors as a single comma-separated string.
        let authors = match kind {
            ManifestKind::Package => children(root, "author").map(person).collect(),
            ManifestKind::Legacy => children(root, "author")
                .flat_map(|n| {
                    flatten_text(n)
                        .split(',')
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .map(|s| Person {
                            name: s.to_string(),
                            email: None,
                        })
                        .collect::<Vec<_>>()
                })
                .collect(),
        };

        let licenses = children(root, "license")
            .map(flatten_text)
            .filter(|l| !l.is_empty())
            .collect();

        let urls = children(root, "url")
            .filter_map(|n| {
                let href = flatten_text(n);
                if href.is_empty() {
                    return None;
                }
                Some(Link {
                    kind: n.attribute("type").unwrap_or("website").to_string(),
                    href,
                })
            })
            .collect();

        let exports = children(root, "export")
            .flat_map(|export| export.children().filter(Node::is_element))
            .map(|node| Export {
                tag: node.tag_name().name().to_string(),
                attributes: node
                    .attributes()
                    .map(|a| (a.name().to_string(), a.value().to_string()))
                    .collect(),
            })
            .collect();

        Ok(Self {
            kind,
            name,
            version: child_text(root, "version"),
            description,
            brief,
            maintainers,
            authors,
            licenses,
            urls,
            exports,
        })
    }

    /// All values of attribute `attr` on `<export>` children named `tag`,
    /// in document order.
    pub fn exports(&self, tag: &str, attr: &str) -> Vec<&str> {
        self.exports
            .iter()
            .filter(|e| e.tag == tag)
            .filter_map(|e| e.attribute(attr))
            .collect()
    }

    /// One-line summary: the `brief` attribute, else the first sentence of
    /// the description.
    pub fn summary(&self) -> String {
        if let Some(brief) = &self.brief {
            return brief.clone();
        }
        match self.description.find(". ") {
            Some(end) => self.description[..=end].to_string(),
            None => self.description.clone(),
        }
    }
}

/// Find the manifest file in `dir`, if any.
pub fn locate(dir: &Path) -> Option<(ManifestKind, PathBuf)> {
    [ManifestKind::Package, ManifestKind::Legacy]
        .into_iter()
        .map(|kind| (kind, dir.join(kind.file_name())))
        .find(|(_, path)| path.is_file())
}

fn children<'a, 'input>(
    node: Node<'a, 'input>,
    tag: &'static str,
) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children().filter(move |n| n.has_tag_name(tag))
}

fn child_text(node: Node<'_, '_>, tag: &'static str) -> Option<String> {
    children(node, tag).next().map(flatten_text)
}

fn person(node: Node<'_, '_>) -> Person {
    Person {
        name: flatten_text(node),
        email: node.attribute("email").map(str::to_string),
    }
}

/// Concatenate every text descendant, dropping markup.
fn flatten_text(node: Node<'_, '_>) -> String {
    let raw: String = node
        .descendants()
        .filter(Node::is_text)
        .filter_map(|n| n.text())
        .collect();
    collapse_whitespace(&raw)
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Errors that can occur when reading a manifest.
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("No package.xml or manifest.xml in {0}")]
    Missing(PathBuf),

    #[error("Failed to read {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid manifest XML: {0}")]
    Xml(#[from] roxmltree::Error),

    #[error("Expected <package> root element, found <{0}>")]
    UnexpectedRoot(String),

    #[error("Manifest is missing required <{0}> element")]
    MissingField(&'static str),
}
