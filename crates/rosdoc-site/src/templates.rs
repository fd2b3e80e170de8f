//! Template engine for the landing page and message docs.

use minijinja::Environment;
use rosdoc_pkg::{Link, Person};
use serde::Serialize;

/// One requested builder as shown on the landing page.
#[derive(Debug, Clone, Serialize)]
pub struct BuilderEntry {
    /// Builder name as configured
    pub name: String,
    /// Output subdirectory
    pub output_dir: String,
    /// Link to the builder's index page
    pub href: String,
    /// Whether rosdoc knows how to run this builder
    pub known: bool,
    /// Configured parameters
    pub params: Vec<(String, String)>,
}

/// Context for rendering the landing page.
#[derive(Debug, Clone, Serialize)]
pub struct LandingContext {
    pub package: String,
    pub version: Option<String>,
    pub description: String,
    pub maintainers: Vec<Person>,
    pub authors: Vec<Person>,
    pub licenses: Vec<String>,
    pub urls: Vec<Link>,
    pub builders: Vec<BuilderEntry>,
    /// Link to the message docs index, when there are message docs
    pub msg_index: Option<String>,
    pub stylesheet: String,
}

/// One line of a message definition.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DefinitionLine {
    pub field_type: Option<String>,
    /// Link to the type's own page, for types defined in this package
    pub type_href: Option<String>,
    pub name: Option<String>,
    /// Constant value
    pub value: Option<String>,
    pub comment: Option<String>,
    /// Lines that are neither declarations nor comments, shown as-is
    pub text: Option<String>,
}

/// A `---`-separated part of a definition (e.g. a service request).
#[derive(Debug, Clone, Serialize)]
pub struct DefinitionSection {
    pub title: Option<String>,
    pub lines: Vec<DefinitionLine>,
}

/// Context for rendering one message, service or action page.
#[derive(Debug, Clone, Serialize)]
pub struct DefinitionContext {
    pub package: String,
    pub name: String,
    pub kind: String,
    pub sections: Vec<DefinitionSection>,
    /// Unmodified definition text
    pub raw: String,
    pub stylesheet: String,
    pub index_href: String,
}

/// An entry on the message docs index.
#[derive(Debug, Clone, Serialize)]
pub struct IndexEntry {
    pub name: String,
    pub href: String,
    pub summary: String,
}

/// A group of index entries (messages, services, actions).
#[derive(Debug, Clone, Serialize)]
pub struct IndexGroup {
    pub title: String,
    pub entries: Vec<IndexEntry>,
}

/// Context for rendering the message docs index.
#[derive(Debug, Clone, Serialize)]
pub struct IndexContext {
    pub package: String,
    pub groups: Vec<IndexGroup>,
    pub stylesheet: String,
}

/// Template engine using minijinja.
pub struct TemplateEngine {
    env: Environment<'static>,
}

impl TemplateEngine {
    /// Create a template engine with the built-in templates.
    pub fn new() -> Result<Self, minijinja::Error> {
        let mut env = Environment::new();

        env.add_template("base.html", BASE_TEMPLATE)?;
        env.add_template("landing.html", LANDING_TEMPLATE)?;
        env.add_template("definition.html", DEFINITION_TEMPLATE)?;
        env.add_template("msg_index.html", INDEX_TEMPLATE)?;

        Ok(Self { env })
    }

    /// Render the landing page.
    pub fn render_landing(&self, context: &LandingContext) -> Result<String, minijinja::Error> {
        self.env.get_template("landing.html")?.render(context)
    }

    /// Render a message, service or action page.
    pub fn render_definition(
        &self,
        context: &DefinitionContext,
    ) -> Result<String, minijinja::Error> {
        self.env.get_template("definition.html")?.render(context)
    }

    /// Render the message docs index.
    pub fn render_index(&self, context: &IndexContext) -> Result<String, minijinja::Error> {
        self.env.get_template("msg_index.html")?.render(context)
    }
}

const BASE_TEMPLATE: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>{% block title %}{{ package }}{% endblock %}</title>
  <link rel="stylesheet" href="{{ stylesheet }}">
</head>
<body>
  <div class="rosdoc">
    {% block content %}{% endblock %}
  </div>
</body>
</html>"##;

const LANDING_TEMPLATE: &str = r##"{% extends "base.html" %}

{% block content %}
<h1 class="package-name">{{ package }}{% if version %} <span class="version">{{ version }}</span>{% endif %}</h1>
{% if description %}<p class="description">{{ description }}</p>{% endif %}

<table class="package-info">
  {% if maintainers %}<tr><th>Maintainers</th><td>{% for m in maintainers %}{% if m.email %}<a href="mailto:{{ m.email }}">{{ m.name }}</a>{% else %}{{ m.name }}{% endif %}{% if not loop.last %}, {% endif %}{% endfor %}</td></tr>{% endif %}
  {% if authors %}<tr><th>Authors</th><td>{% for a in authors %}{{ a.name }}{% if not loop.last %}, {% endif %}{% endfor %}</td></tr>{% endif %}
  {% if licenses %}<tr><th>License</th><td>{{ licenses | join(", ") }}</td></tr>{% endif %}
  {% for url in urls %}<tr><th>{{ url.kind }}</th><td><a href="{{ url.href }}">{{ url.href }}</a></td></tr>
  {% endfor %}
</table>

<h2>Documentation</h2>
<ul class="builders">
{% for builder in builders %}
  <li class="builder{% if not builder.known %} unknown{% endif %}">
    {% if builder.known %}<a href="{{ builder.href }}">{{ builder.name }}</a>{% else %}{{ builder.name }}{% endif %}
    <dl class="params">
    {% for key, value in builder.params %}
      <dt>{{ key }}</dt><dd>{{ value }}</dd>
    {% endfor %}
    </dl>
  </li>
{% endfor %}
{% if msg_index %}
  <li class="builder"><a href="{{ msg_index }}">Messages, services and actions</a></li>
{% endif %}
</ul>
{% endblock %}"##;

const DEFINITION_TEMPLATE: &str = r##"{% extends "base.html" %}

{% block title %}{{ package }}/{{ name }}{% endblock %}

{% block content %}
<p class="nav"><a href="{{ index_href }}">{{ package }}</a></p>
<h1>{{ package }}/{{ name }} <span class="kind">{{ kind }}</span></h1>

{% for section in sections %}
{% if section.title %}<h2>{{ section.title }}</h2>{% endif %}
<div class="definition">
{% for line in section.lines %}
  <div class="line">
    {%- if line.field_type %}<span class="type">{% if line.type_href %}<a href="{{ line.type_href }}">{{ line.field_type }}</a>{% else %}{{ line.field_type }}{% endif %}</span> <span class="name">{{ line.name }}</span>{% endif -%}
    {%- if line.value %}<span class="value">={{ line.value }}</span>{% endif -%}
    {%- if line.text %}{{ line.text }}{% endif -%}
    {%- if line.comment is not none %} <span class="comment">#{{ line.comment }}</span>{% endif -%}
  </div>
{% endfor %}
</div>
{% endfor %}

<h2>Raw definition</h2>
<pre class="raw">{{ raw }}</pre>
{% endblock %}"##;

const INDEX_TEMPLATE: &str = r##"{% extends "base.html" %}

{% block title %}{{ package }} message docs{% endblock %}

{% block content %}
<h1>{{ package }}</h1>
{% for group in groups %}
<h2>{{ group.title }}</h2>
<ul class="definitions">
{% for entry in group.entries %}
  <li><a href="{{ entry.href }}">{{ entry.name }}</a>{% if entry.summary %} <span class="summary">{{ entry.summary }}</span>{% endif %}</li>
{% endfor %}
</ul>
{% endfor %}
{% endblock %}"##;

/// Undo minijinja's escaping of `/` so tests can match paths.
#[cfg(test)]
pub(crate) fn unescape_slashes(html: &str) -> String {
    html.replace("&#x2f;", "/")
}
