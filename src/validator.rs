//! Applies a template's schema and rules to a draft.

use serde::Serialize;
use tracing::{debug, error, info};

use crate::draft::Draft;
use crate::mode::{Mode, ModeResolution, ModeResolver};
use crate::registry::{Template, TemplateId};
use crate::rules::{Finding, RuleOutcome, Tag};

/// A section the resolved mode requires but the draft lacks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MissingRequiredSection {
    pub section: &'static str,
    pub star: bool,
}

/// A rule that did not run because one of its sections was absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedRule {
    pub rule: &'static str,
    pub missing: &'static str,
}

/// Everything one validation pass found, in a stable order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub template: TemplateId,
    #[serde(flatten)]
    pub resolution: ModeResolution,
    pub missing: Vec<MissingRequiredSection>,
    pub findings: Vec<Finding>,
    pub skipped: Vec<SkippedRule>,
}

impl ValidationReport {
    /// No missing sections and no INTERNAL findings.
    pub fn passed(&self) -> bool {
        self.missing.is_empty() && self.internal_count() == 0
    }

    pub fn mode(&self) -> Mode {
        self.resolution.mode
    }

    pub fn internal_count(&self) -> usize {
        self.findings
            .iter()
            .filter(|f| f.tag == Tag::Internal)
            .count()
    }

    pub fn external_count(&self) -> usize {
        self.findings.len() - self.internal_count()
    }
}

/// Runs every rule of `template` against `draft`, in declaration order.
///
/// Rules whose sections are absent are skipped. Raw findings without a tag
/// or consequence are logged and dropped.
pub fn validate(draft: &Draft, template: &Template) -> Vec<Finding> {
    evaluate_rules(draft, template).0
}

fn evaluate_rules(draft: &Draft, template: &Template) -> (Vec<Finding>, Vec<SkippedRule>) {
    let mut findings = Vec::new();
    let mut skipped = Vec::new();

    for rule in &template.rules {
        match rule.evaluate(draft) {
            RuleOutcome::Clean => debug!(rule = rule.id, "rule_clean"),
            RuleOutcome::Skipped { missing } => {
                debug!(rule = rule.id, section = missing, "rule_skipped");
                skipped.push(SkippedRule {
                    rule: rule.id,
                    missing,
                });
            }
            RuleOutcome::Violations(raw) => {
                for raw_finding in raw {
                    match Finding::from_raw(rule.id, raw_finding) {
                        Ok(finding) => findings.push(finding),
                        Err(e) => error!(rule = rule.id, error = %e, "finding_malformed"),
                    }
                }
            }
        }
    }

    (findings, skipped)
}

/// Required sections absent from `draft` under `mode`, in schema order.
pub fn missing_sections(
    draft: &Draft,
    template: &Template,
    mode: Mode,
) -> Vec<MissingRequiredSection> {
    template
        .required_sections(mode)
        .filter(|s| !draft.has_section(s.name))
        .map(|s| MissingRequiredSection {
            section: s.name,
            star: s.star,
        })
        .collect()
}

/// Mode resolution plus rule evaluation, sharing one configured resolver.
#[derive(Debug, Clone, Default)]
pub struct Validator {
    resolver: ModeResolver,
}

impl Validator {
    pub fn new(resolver: ModeResolver) -> Self {
        Self { resolver }
    }

    pub fn resolver(&self) -> &ModeResolver {
        &self.resolver
    }

    pub fn check(&self, draft: &Draft, template: &Template) -> ValidationReport {
        let resolution = self.resolver.resolve(draft, template);
        let missing = missing_sections(draft, template, resolution.mode);
        let (findings, skipped) = evaluate_rules(draft, template);

        let report = ValidationReport {
            template: template.id,
            resolution,
            missing,
            findings,
            skipped,
        };

        info!(
            template = template.id.label(),
            mode = %report.mode(),
            missing = report.missing.len(),
            internal = report.internal_count(),
            external = report.external_count(),
            passed = report.passed(),
            "validation_complete"
        );

        report
    }
}
