//! Template identifiers, section schemas and the process-wide registry.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use serde::Serialize;
use tracing::{debug, info};

use crate::error::{GidError, Result};
use crate::mode::Mode;
use crate::rules::{self, ConstraintRule};
use crate::templates;

/// The fixed set of templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TemplateId {
    Gid,
    GidAdversarial,
    ProjectSnapshot,
}

impl TemplateId {
    pub const ALL: [TemplateId; 3] = [Self::Gid, Self::GidAdversarial, Self::ProjectSnapshot];

    /// Upper-case label used in reports.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Gid => "GID",
            Self::GidAdversarial => "GID_ADVERSARIAL",
            Self::ProjectSnapshot => "PROJECT_SNAPSHOT",
        }
    }

    /// Command-line spelling.
    pub fn slug(&self) -> &'static str {
        match self {
            Self::Gid => "gid",
            Self::GidAdversarial => "gid-adversarial",
            Self::ProjectSnapshot => "project-snapshot",
        }
    }

    /// Prompt text pasted into the chat tool.
    pub fn prompt(&self) -> &'static str {
        match self {
            Self::Gid => templates::GID_MD,
            Self::GidAdversarial => templates::GID_ADVERSARIAL_MD,
            Self::ProjectSnapshot => templates::PROJECT_SNAPSHOT_MD,
        }
    }
}

impl FromStr for TemplateId {
    type Err = GidError;

    /// Case-insensitive; `-` and `_` are interchangeable.
    fn from_str(s: &str) -> Result<Self> {
        let key = s.trim().to_ascii_lowercase().replace('_', "-");
        Self::ALL
            .into_iter()
            .find(|id| id.slug() == key)
            .ok_or_else(|| GidError::UnknownTemplate { id: s.to_string() })
    }
}

impl fmt::Display for TemplateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Shape of a section's content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionKind {
    /// Free text.
    Text,
    /// Repeated `name: mechanism` pillar entries.
    Pillars,
}

/// One section of a template schema.
#[derive(Debug, Clone, Serialize)]
pub struct SectionDef {
    pub name: &'static str,
    /// Legacy headings accepted for this section.
    pub aliases: &'static [&'static str],
    /// Required even in abbreviated mode.
    pub star: bool,
    /// Required in full mode.
    pub required: bool,
    pub kind: SectionKind,
}

impl SectionDef {
    const fn star(name: &'static str, aliases: &'static [&'static str]) -> Self {
        Self {
            name,
            aliases,
            star: true,
            required: true,
            kind: SectionKind::Text,
        }
    }

    const fn required(name: &'static str, aliases: &'static [&'static str]) -> Self {
        Self {
            name,
            aliases,
            star: false,
            required: true,
            kind: SectionKind::Text,
        }
    }

    const fn optional(name: &'static str, aliases: &'static [&'static str]) -> Self {
        Self {
            name,
            aliases,
            star: false,
            required: false,
            kind: SectionKind::Text,
        }
    }

    const fn pillars(self) -> Self {
        Self {
            kind: SectionKind::Pillars,
            ..self
        }
    }

    /// Whether a heading refers to this section.
    pub fn matches(&self, normalized_heading: &str) -> bool {
        normalize_heading(self.name) == normalized_heading
            || self
                .aliases
                .iter()
                .any(|a| normalize_heading(a) == normalized_heading)
    }

    /// Whether the section must be present under the given mode.
    pub fn is_required_in(&self, mode: Mode) -> bool {
        match mode {
            Mode::Abbreviated => self.star,
            Mode::Full => self.required,
        }
    }
}

pub const DESIGN_PILLARS: &str = "Design Pillars";
pub const ELEVATOR_PITCH: &str = "Elevator Pitch";
pub const CORE_LOOP: &str = "Core Loop";
pub const SESSION_DESIGN: &str = "Session Design";
pub const MONETIZATION_MODEL: &str = "Monetization Model";
pub const PLATFORM_PRIORITY: &str = "Platform Priority";
pub const INPUT_SCHEME: &str = "Input Scheme";

pub const CROSS_SECTION_CONTRADICTIONS: &str = "Cross-Section Contradictions";
pub const SCOPE_RISKS: &str = "Scope Risks";
pub const MARKET_ASSUMPTIONS: &str = "Market Assumptions";
pub const VERDICT: &str = "Verdict";

pub const LOCKED_DECISIONS: &str = "Locked Decisions";
pub const OPEN_QUESTIONS: &str = "Open Questions";
pub const NEXT_ACTIONS: &str = "Next Actions";

fn gid_sections() -> Vec<SectionDef> {
    vec![
        SectionDef::star("Working Title", &["Title"]),
        SectionDef::star(ELEVATOR_PITCH, &["Pitch", "Hook"]),
        SectionDef::star("Genre", &["Genre & References", "Genre and References"]),
        SectionDef::star(DESIGN_PILLARS, &["Pillars"]).pillars(),
        SectionDef::star("Core Mechanic", &["Core Mechanics"]),
        SectionDef::star(CORE_LOOP, &["Gameplay Loop"]),
        SectionDef::required("Level / World Structure", &["World Structure", "Level Structure"]),
        SectionDef::required(SESSION_DESIGN, &["Session Structure"]),
        SectionDef::required("Progression System", &["Progression"]),
        SectionDef::star("Target Audience", &["Audience"]),
        SectionDef::required(PLATFORM_PRIORITY, &["Platforms", "Platform"]),
        SectionDef::required(INPUT_SCHEME, &["Controls", "Input"]),
        SectionDef::required("Art Style", &["Visual Style", "Art Direction"]),
        SectionDef::required(MONETIZATION_MODEL, &["Monetization", "Business Model"]),
        SectionDef::required("Scope & Risks", &["Scope and Risks", "Scope", "Risks"]),
        SectionDef::optional("Open Decisions", &["Open Questions"]),
    ]
}

fn gid_adversarial_sections() -> Vec<SectionDef> {
    vec![
        SectionDef::star("Document Under Review", &["Document", "GID Under Review"]),
        SectionDef::star("Pillar Stress Test", &["Pillar Review"]),
        SectionDef::star(CROSS_SECTION_CONTRADICTIONS, &["Contradictions"]),
        SectionDef::required(SCOPE_RISKS, &["Scope"]),
        SectionDef::required(MARKET_ASSUMPTIONS, &["Assumptions"]),
        SectionDef::star(VERDICT, &["Recommendation"]),
    ]
}

fn project_snapshot_sections() -> Vec<SectionDef> {
    vec![
        SectionDef::star("Project", &["Project Name"]),
        SectionDef::star("Current Milestone", &["Milestone"]),
        SectionDef::star(LOCKED_DECISIONS, &["Decisions"]),
        SectionDef::star(OPEN_QUESTIONS, &["Questions"]),
        SectionDef::required("Recent Changes", &["Changes", "Changelog"]),
        SectionDef::star(NEXT_ACTIONS, &["Next Steps"]),
        SectionDef::optional("Known Risks", &["Risks"]),
    ]
}

/// A template schema plus the rules declared against it.
#[derive(Debug, Clone, Serialize)]
pub struct Template {
    pub id: TemplateId,
    pub sections: Vec<SectionDef>,
    #[serde(skip)]
    pub rules: Vec<ConstraintRule>,
}

impl Template {
    /// Builds the canonical schema for `id`.
    pub fn builtin(id: TemplateId) -> Self {
        let sections = match id {
            TemplateId::Gid => gid_sections(),
            TemplateId::GidAdversarial => gid_adversarial_sections(),
            TemplateId::ProjectSnapshot => project_snapshot_sections(),
        };
        Self {
            id,
            sections,
            rules: rules::rules_for(id),
        }
    }

    /// Looks up a section by its canonical name.
    pub fn section(&self, name: &str) -> Option<&SectionDef> {
        self.sections.iter().find(|s| s.name == name)
    }

    /// Maps a raw heading onto a canonical section name.
    pub fn canonical_name(&self, heading: &str) -> Option<&'static str> {
        let key = normalize_heading(heading);
        self.sections
            .iter()
            .find(|s| normalize_heading(s.name) == key)
            .or_else(|| self.sections.iter().find(|s| s.matches(&key)))
            .map(|s| s.name)
    }

    /// Sections that must be present under `mode`, in schema order.
    pub fn required_sections(&self, mode: Mode) -> impl Iterator<Item = &SectionDef> {
        self.sections.iter().filter(move |s| s.is_required_in(mode))
    }

    fn check_references(&self) -> Result<()> {
        for rule in &self.rules {
            for section in [rule.sections.0, rule.sections.1] {
                if self.section(section).is_none() {
                    return Err(GidError::UnresolvedReference {
                        template: self.id.label().to_string(),
                        rule: rule.id.to_string(),
                        section: section.to_string(),
                    });
                }
            }
        }
        Ok(())
    }
}

/// Read-only set of templates, built once per process.
#[derive(Debug)]
pub struct TemplateRegistry {
    templates: Vec<Template>,
}

static REGISTRY: OnceLock<TemplateRegistry> = OnceLock::new();

impl TemplateRegistry {
    /// Builds the registry from the built-in schemas.
    pub fn load() -> Result<Self> {
        Self::from_templates(TemplateId::ALL.into_iter().map(Template::builtin).collect())
    }

    /// Builds a registry, rejecting rules that name sections outside their schema.
    pub fn from_templates(templates: Vec<Template>) -> Result<Self> {
        for template in &templates {
            template.check_references()?;
            debug!(
                template = template.id.label(),
                sections = template.sections.len(),
                rules = template.rules.len(),
                "template_loaded"
            );
        }
        Ok(Self { templates })
    }

    /// Process-wide registry, initialised on first use.
    pub fn global() -> Result<&'static TemplateRegistry> {
        if let Some(registry) = REGISTRY.get() {
            return Ok(registry);
        }
        let registry = Self::load()?;
        info!(templates = registry.templates.len(), "registry_initialized");
        Ok(REGISTRY.get_or_init(|| registry))
    }

    /// Template by identifier string.
    pub fn get_template(&self, id: &str) -> Result<&Template> {
        let id: TemplateId = id.parse()?;
        self.template(id)
            .ok_or_else(|| GidError::UnknownTemplate { id: id.slug().to_string() })
    }

    pub fn template(&self, id: TemplateId) -> Option<&Template> {
        self.templates.iter().find(|t| t.id == id)
    }

    pub fn templates(&self) -> &[Template] {
        &self.templates
    }
}

/// Normalises a heading for schema matching.
///
/// Strips leading numbering (`3.`, `4.2`), star markers, emphasis and a
/// trailing colon, collapses whitespace and lowercases.
pub fn normalize_heading(heading: &str) -> String {
    let text = heading
        .trim()
        .replace("(*)", "")
        .replace(['★', '⭐', '*', '_'], "");

    let trimmed = text.trim_start();
    let numbering_len = trimmed
        .char_indices()
        .take_while(|(_, c)| c.is_ascii_digit() || *c == '.')
        .last()
        .map(|(i, c)| i + c.len_utf8())
        .unwrap_or(0);
    let rest = if numbering_len > 0
        && trimmed[..numbering_len].starts_with(|c: char| c.is_ascii_digit())
        && trimmed[numbering_len..].starts_with(char::is_whitespace)
    {
        &trimmed[numbering_len..]
    } else {
        trimmed
    };

    rest.trim()
        .trim_end_matches(':')
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}
