//! Cross-section constraint rules and the findings they produce.

mod gid;
mod review;
mod snapshot;

use std::fmt;

use serde::Serialize;

use crate::draft::Draft;
use crate::error::GidError;
use crate::registry::TemplateId;
use crate::text::entries;

/// Whether a finding follows from the draft's own text or from an unstated assumption.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Tag {
    Internal,
    External,
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Internal => "INTERNAL",
            Self::External => "EXTERNAL",
        })
    }
}

/// Unchecked output of a rule's check function.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawFinding {
    pub tag: Option<Tag>,
    /// What the finding is about (a pillar name, a decision topic).
    pub subject: Option<String>,
    pub text: String,
    pub consequence: String,
}

impl RawFinding {
    pub fn internal(text: impl Into<String>, consequence: impl Into<String>) -> Self {
        Self {
            tag: Some(Tag::Internal),
            subject: None,
            text: text.into(),
            consequence: consequence.into(),
        }
    }

    pub fn external(text: impl Into<String>, consequence: impl Into<String>) -> Self {
        Self {
            tag: Some(Tag::External),
            ..Self::internal(text, consequence)
        }
    }

    pub fn about(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }
}

/// A tagged, consequence-bearing observation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    pub rule: &'static str,
    pub tag: Tag,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    pub text: String,
    pub consequence: String,
}

impl Finding {
    /// Checks a raw finding; untagged or consequence-less output is rejected.
    pub fn from_raw(rule: &'static str, raw: RawFinding) -> Result<Self, GidError> {
        let tag = raw.tag.ok_or_else(|| GidError::MalformedFinding {
            rule: rule.to_string(),
            reason: "missing INTERNAL/EXTERNAL tag".to_string(),
        })?;
        if raw.consequence.trim().is_empty() {
            return Err(GidError::MalformedFinding {
                rule: rule.to_string(),
                reason: "empty consequence text".to_string(),
            });
        }
        Ok(Self {
            rule,
            tag,
            subject: raw.subject,
            text: raw.text,
            consequence: raw.consequence,
        })
    }
}

/// Result of applying one rule to one draft.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleOutcome {
    /// Both sections present, nothing to report.
    Clean,
    /// Both sections present and the check produced output.
    Violations(Vec<RawFinding>),
    /// A referenced section is absent or empty.
    Skipped { missing: &'static str },
}

pub type CheckFn = fn(&Draft) -> Vec<RawFinding>;

/// A check declared between two sections of one template.
#[derive(Debug, Clone)]
pub struct ConstraintRule {
    pub id: &'static str,
    pub sections: (&'static str, &'static str),
    /// Runs only when both sections are present.
    pub check: CheckFn,
}

impl ConstraintRule {
    pub fn evaluate(&self, draft: &Draft) -> RuleOutcome {
        for section in [self.sections.0, self.sections.1] {
            if !draft.has_section(section) {
                return RuleOutcome::Skipped { missing: section };
            }
        }
        let raw = (self.check)(draft);
        if raw.is_empty() {
            RuleOutcome::Clean
        } else {
            RuleOutcome::Violations(raw)
        }
    }
}

/// Filler entries such as "None" or "No issues found." that list nothing.
pub(crate) fn is_placeholder(entry: &str) -> bool {
    let normalized = entry
        .trim()
        .trim_end_matches(['.', '!'])
        .trim()
        .to_lowercase();
    matches!(
        normalized.as_str(),
        "" | "none" | "n/a" | "na" | "nothing" | "-" | "no issues found" | "nothing yet"
    )
}

/// Entries of a section with placeholders removed.
pub(crate) fn listed(draft: &Draft, section: &str) -> Vec<String> {
    entries(&draft.text(section).unwrap_or_default())
        .into_iter()
        .filter(|e| !is_placeholder(e))
        .collect()
}

/// Rules declared for a template, in evaluation order.
pub fn rules_for(id: TemplateId) -> Vec<ConstraintRule> {
    match id {
        TemplateId::Gid => gid::rules(),
        TemplateId::GidAdversarial => review::rules(),
        TemplateId::ProjectSnapshot => snapshot::rules(),
    }
}
