//! HTML pages for message, service and action definitions.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

use crate::assets::STYLESHEET_NAME;
use crate::error::SiteError;
use crate::templates::{
    DefinitionContext, DefinitionLine, DefinitionSection, IndexContext, IndexEntry, IndexGroup,
    TemplateEngine,
};

/// File name of the definitions index.
pub const MSG_INDEX: &str = "index-msg.html";

static DECLARATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*([A-Za-z][\w/]*(?:\[\d*\])?)\s+([A-Za-z]\w*)\s*(.*)$")
        .expect("Invalid declaration regex")
});

/// The kinds of interface definition a package can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DefinitionKind {
    Message,
    Service,
    Action,
}

impl DefinitionKind {
    pub const ALL: [DefinitionKind; 3] = [
        DefinitionKind::Message,
        DefinitionKind::Service,
        DefinitionKind::Action,
    ];

    /// Package subdirectory holding these definitions, which is also the
    /// output subdirectory for their pages.
    pub fn dir(self) -> &'static str {
        match self {
            DefinitionKind::Message => "msg",
            DefinitionKind::Service => "srv",
            DefinitionKind::Action => "action",
        }
    }

    /// Definition file extension.
    pub fn extension(self) -> &'static str {
        self.dir()
    }

    pub fn label(self) -> &'static str {
        match self {
            DefinitionKind::Message => "Message",
            DefinitionKind::Service => "Service",
            DefinitionKind::Action => "Action",
        }
    }

    fn plural(self) -> &'static str {
        match self {
            DefinitionKind::Message => "Messages",
            DefinitionKind::Service => "Services",
            DefinitionKind::Action => "Actions",
        }
    }

    /// Titles of the `---`-separated sections.
    fn section_titles(self) -> &'static [&'static str] {
        match self {
            DefinitionKind::Message => &[],
            DefinitionKind::Service => &["Request", "Response"],
            DefinitionKind::Action => &["Goal", "Result", "Feedback"],
        }
    }
}

/// One definition file found in a package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Definition {
    pub kind: DefinitionKind,
    /// File stem, e.g. `Pose`
    pub name: String,
    pub path: PathBuf,
    pub source: String,
}

impl Definition {
    /// Page path relative to the documentation root.
    pub fn page(&self) -> String {
        format!("{}/{}.html", self.kind.dir(), self.name)
    }

    /// First comment line, used as a short description.
    pub fn summary(&self) -> String {
        self.source
            .lines()
            .map(str::trim)
            .find_map(|line| line.strip_prefix('#'))
            .map(|comment| comment.trim().to_string())
            .unwrap_or_default()
    }
}

/// Pages written by [`write_msg_docs`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MsgDocs {
    pub pages: Vec<PathBuf>,
    /// The index page, absent when the package has no definitions
    pub index: Option<PathBuf>,
}

/// Find every definition in the package at `path`, grouped by kind and
/// sorted by name.
pub fn discover(path: &Path) -> Result<Vec<Definition>, SiteError> {
    let mut definitions = Vec::new();

    for kind in DefinitionKind::ALL {
        let dir = path.join(kind.dir());
        if !dir.is_dir() {
            continue;
        }

        let mut found = Vec::new();
        for entry in fs::read_dir(&dir).map_err(SiteError::read(&dir))? {
            let file = entry.map_err(SiteError::read(&dir))?.path();
            if !file.is_file() || file.extension().and_then(|e| e.to_str()) != Some(kind.extension())
            {
                continue;
            }
            let Some(name) = file.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };

            // Definitions are not always UTF-8; stray bytes show as U+FFFD.
            let bytes = fs::read(&file).map_err(SiteError::read(&file))?;
            let source = String::from_utf8_lossy(&bytes).into_owned();
            found.push(Definition {
                kind,
                name: name.to_string(),
                path: file.clone(),
                source,
            });
        }

        found.sort_by(|a, b| a.name.cmp(&b.name));
        definitions.extend(found);
    }

    Ok(definitions)
}

/// Split a definition into sections and mark up each line.
///
/// Field types naming a message of `package` link to that message's page.
pub fn parse_definition(
    definition: &Definition,
    package: &str,
    messages: &BTreeSet<&str>,
) -> Vec<DefinitionSection> {
    let titles = definition.kind.section_titles();
    let mut sections = vec![Vec::new()];

    for line in definition.source.lines() {
        if line.trim() == "---" {
            sections.push(Vec::new());
            continue;
        }
        let mut parsed = parse_line(line);
        if let Some(field_type) = &parsed.field_type {
            parsed.type_href = message_href(field_type, package, messages);
        }
        if let Some(current) = sections.last_mut() {
            current.push(parsed);
        }
    }

    sections
        .into_iter()
        .enumerate()
        .map(|(i, lines)| DefinitionSection {
            title: titles.get(i).map(|t| t.to_string()),
            lines,
        })
        .collect()
}

fn parse_line(line: &str) -> DefinitionLine {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return DefinitionLine::default();
    }

    if let Some(comment) = trimmed.strip_prefix('#') {
        return DefinitionLine {
            comment: Some(comment.to_string()),
            ..Default::default()
        };
    }

    let Some(caps) = DECLARATION.captures(line) else {
        return DefinitionLine {
            text: Some(trimmed.to_string()),
            ..Default::default()
        };
    };

    let field_type = caps[1].to_string();
    let rest = caps[3].trim();
    let mut parsed = DefinitionLine {
        name: Some(caps[2].to_string()),
        ..Default::default()
    };

    if let Some(value) = rest.strip_prefix('=') {
        // String constants run to the end of the line, `#` included.
        if field_type == "string" {
            parsed.value = Some(value.trim().to_string());
        } else {
            let (value, comment) = split_comment(value);
            parsed.value = Some(value.trim().to_string());
            parsed.comment = comment;
        }
    } else {
        parsed.comment = split_comment(rest).1;
    }

    parsed.field_type = Some(field_type);
    parsed
}

fn split_comment(text: &str) -> (&str, Option<String>) {
    match text.split_once('#') {
        Some((before, comment)) => (before, Some(comment.to_string())),
        None => (text, None),
    }
}

fn message_href(field_type: &str, package: &str, messages: &BTreeSet<&str>) -> Option<String> {
    let base = field_type.split('[').next().unwrap_or(field_type);
    let name = match base.split_once('/') {
        Some((owner, name)) if owner == package => name,
        Some(_) => return None,
        None => base,
    };

    messages
        .contains(name)
        .then(|| format!("../{}/{}.html", DefinitionKind::Message.dir(), name))
}

/// Write a page per definition plus [`MSG_INDEX`] into `output_dir`.
///
/// Nothing is written when `definitions` is empty.
pub fn write_msg_docs(
    package: &str,
    definitions: &[Definition],
    output_dir: &Path,
    templates: &TemplateEngine,
) -> Result<MsgDocs, SiteError> {
    if definitions.is_empty() {
        tracing::debug!("No message definitions in {}", package);
        return Ok(MsgDocs::default());
    }

    let messages: BTreeSet<&str> = definitions
        .iter()
        .filter(|d| d.kind == DefinitionKind::Message)
        .map(|d| d.name.as_str())
        .collect();

    let mut docs = MsgDocs::default();
    for definition in definitions {
        let context = DefinitionContext {
            package: package.to_string(),
            name: definition.name.clone(),
            kind: definition.kind.label().to_string(),
            sections: parse_definition(definition, package, &messages),
            raw: definition.source.clone(),
            stylesheet: format!("../{STYLESHEET_NAME}"),
            index_href: format!("../{MSG_INDEX}"),
        };
        let html = templates.render_definition(&context)?;

        let page = output_dir.join(definition.page());
        if let Some(parent) = page.parent() {
            fs::create_dir_all(parent).map_err(SiteError::write(parent))?;
        }
        fs::write(&page, html).map_err(SiteError::write(&page))?;
        docs.pages.push(page);
    }

    let groups = DefinitionKind::ALL
        .into_iter()
        .filter_map(|kind| {
            let entries: Vec<_> = definitions
                .iter()
                .filter(|d| d.kind == kind)
                .map(|d| IndexEntry {
                    name: d.name.clone(),
                    href: d.page(),
                    summary: d.summary(),
                })
                .collect();
            (!entries.is_empty()).then(|| IndexGroup {
                title: kind.plural().to_string(),
                entries,
            })
        })
        .collect();

    let html = templates.render_index(&IndexContext {
        package: package.to_string(),
        groups,
        stylesheet: STYLESHEET_NAME.to_string(),
    })?;
    let index = output_dir.join(MSG_INDEX);
    fs::write(&index, html).map_err(SiteError::write(&index))?;

    tracing::info!("Generated docs for {} message definitions", definitions.len());
    docs.index = Some(index);
    Ok(docs)
}
