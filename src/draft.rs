//! Filled-in template instances and their Markdown/JSON parsers.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{GidError, Result};
use crate::registry::{SectionKind, Template};
use crate::text::LIST_ITEM;

static HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(#{1,6})\s+(.+?)\s*#*\s*$").expect("valid heading regex"));

/// A design pillar: what the game promises and the mechanism that delivers it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pillar {
    pub name: String,
    #[serde(default)]
    pub mechanism: String,
}

impl Pillar {
    pub fn new(name: impl Into<String>, mechanism: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            mechanism: mechanism.into(),
        }
    }
}

/// Content of one draft section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SectionContent {
    Pillars(Vec<Pillar>),
    Text(String),
}

impl SectionContent {
    /// Empty or whitespace-only content counts as an absent section.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text(text) => text.trim().is_empty(),
            Self::Pillars(pillars) => pillars.is_empty(),
        }
    }

    /// Text view; pillar entries render as `name: mechanism` lines.
    pub fn as_text(&self) -> Cow<'_, str> {
        match self {
            Self::Text(text) => Cow::Borrowed(text.as_str()),
            Self::Pillars(pillars) => Cow::Owned(
                pillars
                    .iter()
                    .map(|p| {
                        if p.mechanism.is_empty() {
                            p.name.clone()
                        } else {
                            format!("{}: {}", p.name, p.mechanism)
                        }
                    })
                    .collect::<Vec<_>>()
                    .join("\n"),
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DraftSection {
    /// Canonical schema name, or the raw heading for sections outside the schema.
    pub name: String,
    pub content: SectionContent,
}

/// One in-progress instance of a template.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Draft {
    pub title: Option<String>,
    sections: Vec<DraftSection>,
}

/// On-disk JSON shape of a draft.
#[derive(Debug, Deserialize)]
struct JsonDraft {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    sections: BTreeMap<String, SectionContent>,
}

impl Draft {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when no section carries any content.
    pub fn is_empty(&self) -> bool {
        self.sections.iter().all(|s| s.content.is_empty())
    }

    /// Inserts or replaces a section.
    pub fn insert(&mut self, name: impl Into<String>, content: SectionContent) {
        let name = name.into();
        match self.sections.iter_mut().find(|s| s.name == name) {
            Some(existing) => existing.content = content,
            None => self.sections.push(DraftSection { name, content }),
        }
    }

    pub fn set_text(&mut self, name: impl Into<String>, text: impl Into<String>) {
        self.insert(name, SectionContent::Text(text.into()));
    }

    pub fn set_pillars(&mut self, name: impl Into<String>, pillars: Vec<Pillar>) {
        self.insert(name, SectionContent::Pillars(pillars));
    }

    pub fn remove(&mut self, name: &str) {
        self.sections.retain(|s| s.name != name);
    }

    /// Content of a section, or `None` when it is absent or empty.
    pub fn get(&self, name: &str) -> Option<&SectionContent> {
        self.sections
            .iter()
            .find(|s| s.name == name)
            .map(|s| &s.content)
            .filter(|c| !c.is_empty())
    }

    pub fn has_section(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn text(&self, name: &str) -> Option<Cow<'_, str>> {
        self.get(name).map(SectionContent::as_text)
    }

    /// Pillar entries of a section; empty for absent or free-text sections.
    pub fn pillars(&self, name: &str) -> &[Pillar] {
        match self.get(name) {
            Some(SectionContent::Pillars(pillars)) => pillars.as_slice(),
            _ => &[],
        }
    }

    pub fn sections(&self) -> &[DraftSection] {
        &self.sections
    }

    /// Reads a draft from disk; `.json` files are parsed as JSON, anything else as Markdown.
    pub fn load(path: &Path, template: &Template) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| GidError::MalformedDraft {
            path: path.to_path_buf(),
            reason: format!("cannot read file: {}", e),
        })?;

        let is_json = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("json"));

        let draft = if is_json {
            Self::from_json(&contents, template).map_err(|e| GidError::MalformedDraft {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?
        } else {
            Self::from_markdown(&contents, template)
        };

        debug!(
            path = %path.display(),
            sections = draft.sections.len(),
            json = is_json,
            "draft_loaded"
        );
        Ok(draft)
    }

    /// Parses a JSON draft, mapping section keys onto canonical names.
    pub fn from_json(src: &str, template: &Template) -> Result<Self> {
        let raw: JsonDraft = serde_json::from_str(src)?;
        let mut draft = Draft {
            title: raw.title,
            sections: Vec::new(),
        };
        for (key, content) in raw.sections {
            let name = canonical_or_raw(template, &key);
            let content = match content {
                SectionContent::Text(text) if is_pillar_section(template, &name) => {
                    pillar_content(&name, text.trim().to_string())
                }
                other => other,
            };
            draft.insert(name, content);
        }
        Ok(draft)
    }

    /// Parses a Markdown draft. Every `##` heading opens a section.
    pub fn from_markdown(src: &str, template: &Template) -> Self {
        let mut draft = Draft::new();
        let mut current: Option<(String, String)> = None;
        let mut in_fence = false;

        for line in src.lines() {
            let trimmed = line.trim_start();
            if trimmed.starts_with("```") || trimmed.starts_with("~~~") {
                in_fence = !in_fence;
            }

            // Headings that are not schema sections stay inside the open
            // section, so a GID pasted into a review keeps its structure.
            if !in_fence && let Some(caps) = HEADING.captures(line) {
                let level = caps[1].len();
                let text = caps[2].to_string();
                let known = template.canonical_name(&text).is_some();
                if level == 1 && current.is_none() {
                    if draft.title.is_none() {
                        draft.title = Some(text);
                    }
                    continue;
                }
                if level == 2 && (known || current.is_none()) {
                    if let Some((name, body)) = current.take() {
                        draft.push_markdown_section(template, name, body);
                    }
                    current = Some((canonical_or_raw(template, &text), String::new()));
                    continue;
                }
                if level == 2 {
                    debug!(heading = %text, "unknown_heading_folded");
                }
            }

            if let Some((_, body)) = current.as_mut() {
                body.push_str(line);
                body.push('\n');
            }
        }

        if let Some((name, body)) = current.take() {
            draft.push_markdown_section(template, name, body);
        }
        draft
    }

    fn push_markdown_section(&mut self, template: &Template, name: String, body: String) {
        let body = body.trim().to_string();
        let content = if is_pillar_section(template, &name) {
            pillar_content(&name, body)
        } else {
            SectionContent::Text(body)
        };
        if self.has_section(&name) {
            warn!(section = %name, "duplicate_section_replaced");
        }
        self.insert(name, content);
    }
}

fn is_pillar_section(template: &Template, name: &str) -> bool {
    template
        .section(name)
        .is_some_and(|s| s.kind == SectionKind::Pillars)
}

/// Pillar entries of a pillar-section body, or the raw text when none parse.
fn pillar_content(name: &str, body: String) -> SectionContent {
    let pillars = parse_pillars(&body);
    if pillars.is_empty() {
        if !body.is_empty() {
            warn!(section = %name, "pillar_section_unparsed");
        }
        SectionContent::Text(body)
    } else {
        SectionContent::Pillars(pillars)
    }
}

fn canonical_or_raw(template: &Template, heading: &str) -> String {
    match template.canonical_name(heading) {
        Some(name) => name.to_string(),
        None => {
            warn!(heading, template = template.id.label(), "unknown_section_heading");
            heading.trim().to_string()
        }
    }
}

/// Extracts pillar entries from list items or `###` sub-headings.
pub fn parse_pillars(body: &str) -> Vec<Pillar> {
    let mut pillars = Vec::new();
    let mut sub_heading: Option<(String, Vec<String>)> = None;

    for line in body.lines() {
        if let Some(caps) = HEADING.captures(line)
            && caps[1].len() >= 3
        {
            if let Some((name, lines)) = sub_heading.take() {
                pillars.push(Pillar::new(name, lines.join(" ")));
            }
            let name = strip_emphasis(&caps[2]);
            let name = name
                .strip_prefix("Pillar:")
                .map(str::trim)
                .unwrap_or(&name)
                .to_string();
            sub_heading = Some((name, Vec::new()));
            continue;
        }

        if let Some((_, lines)) = sub_heading.as_mut() {
            if !line.trim().is_empty() {
                lines.push(line.trim().to_string());
            }
            continue;
        }

        if let Some(caps) = LIST_ITEM.captures(line)
            && let Some(pillar) = parse_pillar_entry(&caps[1])
        {
            pillars.push(pillar);
        }
    }

    if let Some((name, lines)) = sub_heading.take() {
        pillars.push(Pillar::new(name, lines.join(" ")));
    }
    if pillars.is_empty() {
        // Plain `Name: mechanism` lines without list markers.
        pillars = body.lines().filter_map(parse_named_entry).collect();
    }
    pillars
}

fn parse_pillar_entry(entry: &str) -> Option<Pillar> {
    let entry = entry.trim();
    if entry.is_empty() {
        return None;
    }
    parse_named_entry(entry).or_else(|| Some(Pillar::new(strip_emphasis(entry), "")))
}

/// An entry with an explicit name: bold lead-in or a name separator.
fn parse_named_entry(entry: &str) -> Option<Pillar> {
    let entry = entry.trim();

    // **Name**: mechanism  /  **Name:** mechanism
    if let Some(rest) = entry.strip_prefix("**")
        && let Some(end) = rest.find("**")
    {
        let name = rest[..end].trim().trim_end_matches(':').trim();
        let mechanism = rest[end + 2..]
            .trim_start_matches(|c: char| c == ':' || c == '—' || c == '–' || c == '-')
            .trim();
        return (!name.is_empty()).then(|| Pillar::new(name, mechanism));
    }

    for sep in [": ", " — ", " – ", " - "] {
        if let Some((name, mechanism)) = entry.split_once(sep) {
            let name = strip_emphasis(name);
            if !name.is_empty() {
                return Some(Pillar::new(name, mechanism.trim()));
            }
        }
    }
    None
}

fn strip_emphasis(text: &str) -> String {
    text.replace(['*', '_', '`'], "").trim().to_string()
}
