//! Rules for the adversarial review of a Game Idea Document.

use std::sync::LazyLock;

use regex::Regex;

use super::{ConstraintRule, RawFinding, listed};
use crate::draft::Draft;
use crate::registry::{CROSS_SECTION_CONTRADICTIONS, MARKET_ASSUMPTIONS, SCOPE_RISKS, VERDICT};
use crate::text::{excerpt, has_any_phrase};

pub(super) fn rules() -> Vec<ConstraintRule> {
    vec![
        ConstraintRule {
            id: "contradictions-vs-verdict",
            sections: (CROSS_SECTION_CONTRADICTIONS, VERDICT),
            check: contradictions_vs_verdict,
        },
        ConstraintRule {
            id: "scope-risks-vs-verdict",
            sections: (SCOPE_RISKS, VERDICT),
            check: scope_risks_vs_verdict,
        },
        ConstraintRule {
            id: "market-assumptions-vs-verdict",
            sections: (MARKET_ASSUMPTIONS, VERDICT),
            check: market_assumptions_vs_verdict,
        },
    ]
}

const APPROVE_TERMS: &[&str] = &[
    "no issues found",
    "approve",
    "approved",
    "greenlight",
    "greenlit",
    "green light",
    "green-light",
    "ready",
    "go ahead",
];
const WITHHOLD_TERMS: &[&str] = &[
    "reject",
    "rejected",
    "revise",
    "revision",
    "revisions",
    "rework",
    "not approve",
    "not approved",
    "cannot approve",
    "can't approve",
    "not ready",
    "no-go",
    "blocked",
    "on hold",
];
const SEVERE_TERMS: &[&str] = &["critical", "blocker", "blocking", "showstopper"];
const MILD_TERMS: &[&str] = &[
    "not critical",
    "non-critical",
    "no critical",
    "not a blocker",
    "no blockers",
    "non-blocking",
];
const ACKNOWLEDGE_TERMS: &[&str] = &[
    "assume",
    "assumes",
    "assuming",
    "assumption",
    "assumptions",
    "contingent",
    "depends on",
    "provided that",
];

static TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\[(internal|external)\]|^(internal|external)\b").expect("valid tag regex")
});
static CONSEQUENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bconsequence\s*:\s*\S").expect("valid consequence regex")
});

/// Whether the verdict lets the project proceed.
fn approves(verdict: &str) -> bool {
    has_any_phrase(verdict, APPROVE_TERMS) && !has_any_phrase(verdict, WITHHOLD_TERMS)
}

fn is_internal(entry: &str) -> bool {
    TAG.captures(entry).is_some_and(|caps| {
        caps.get(1)
            .or_else(|| caps.get(2))
            .is_some_and(|m| m.as_str().eq_ignore_ascii_case("internal"))
    })
}

fn contradictions_vs_verdict(draft: &Draft) -> Vec<RawFinding> {
    let verdict = draft.text(VERDICT).unwrap_or_default();
    let contradictions = listed(draft, CROSS_SECTION_CONTRADICTIONS);
    let mut findings = Vec::new();

    let internal = contradictions.iter().filter(|e| is_internal(e)).count();
    if internal > 0 && approves(&verdict) {
        findings.push(
            RawFinding::internal(
                format!(
                    "Verdict approves ('{}') while {} INTERNAL contradiction(s) are listed",
                    excerpt(&verdict, 60),
                    internal
                ),
                "An approval on a self-contradicting document sends it to production with the \
                 contradictions intact; each one becomes a late redesign instead of an early edit.",
            )
            .about("verdict"),
        );
    }

    for entry in &contradictions {
        let missing = match (TAG.is_match(entry), CONSEQUENCE.is_match(entry)) {
            (true, true) => continue,
            (false, true) => "an INTERNAL/EXTERNAL tag",
            (true, false) => "a 'Consequence:' clause",
            (false, false) => "an INTERNAL/EXTERNAL tag and a 'Consequence:' clause",
        };
        findings.push(
            RawFinding::internal(
                format!("Contradiction '{}' lacks {}", excerpt(entry, 60), missing),
                "Without a tag the reader cannot tell a document bug from a market bet, and \
                 without a consequence nobody can rank it against the other findings.",
            )
            .about(excerpt(entry, 40)),
        );
    }

    findings
}

fn scope_risks_vs_verdict(draft: &Draft) -> Vec<RawFinding> {
    let verdict = draft.text(VERDICT).unwrap_or_default();
    if !approves(&verdict) {
        return Vec::new();
    }

    listed(draft, SCOPE_RISKS)
        .into_iter()
        .filter(|risk| has_any_phrase(risk, SEVERE_TERMS) && !has_any_phrase(risk, MILD_TERMS))
        .map(|risk| {
            RawFinding::internal(
                format!(
                    "Scope risk '{}' is marked critical but the verdict approves",
                    excerpt(&risk, 60)
                ),
                "A critical risk left open at approval is accepted by default; the milestone it \
                 threatens will be planned as if it cannot slip.",
            )
            .about(excerpt(&risk, 40))
        })
        .collect()
}

fn market_assumptions_vs_verdict(draft: &Draft) -> Vec<RawFinding> {
    let verdict = draft.text(VERDICT).unwrap_or_default();
    let assumptions = listed(draft, MARKET_ASSUMPTIONS);
    if assumptions.is_empty() || has_any_phrase(&verdict, ACKNOWLEDGE_TERMS) {
        return Vec::new();
    }

    vec![
        RawFinding::external(
            format!(
                "{} market assumption(s) are listed but the verdict never says it depends on \
                 them (first: '{}')",
                assumptions.len(),
                excerpt(&assumptions[0], 60)
            ),
            "If any assumption turns out false the verdict silently stops holding; state which \
             assumptions it rests on so a failed one triggers a re-review.",
        )
        .about("market assumptions"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::Tag;

    fn review(contradictions: &str, verdict: &str) -> Draft {
        let mut draft = Draft::new();
        draft.set_text(CROSS_SECTION_CONTRADICTIONS, contradictions);
        draft.set_text(VERDICT, verdict);
        draft
    }

    #[test]
    fn test_approves() {
        assert!(approves("Approve. Ship the vertical slice."));
        assert!(approves("No issues found"));
        assert!(!approves("Revise: the loop ignores two pillars."));
        assert!(!approves("Cannot approve until pricing is settled."));
        assert!(!approves("Reject."));
    }

    #[test]
    fn test_approval_with_internal_contradiction() {
        let draft = review(
            "- [INTERNAL] Parry pillar never appears in the loop. Consequence: wasted scope.",
            "Approve.",
        );
        let findings = contradictions_vs_verdict(&draft);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].tag, Some(Tag::Internal));
        assert!(findings[0].text.contains("1 INTERNAL"));
    }

    #[test]
    fn test_revise_verdict_with_contradictions_is_clean() {
        let draft = review(
            "- [INTERNAL] Parry pillar never appears in the loop. Consequence: wasted scope.\n\
             - [EXTERNAL] Price assumes genre norms. Consequence: mispriced launch.",
            "Revise the core loop first.",
        );
        assert!(contradictions_vs_verdict(&draft).is_empty());
    }

    #[test]
    fn test_external_only_contradictions_allow_approval() {
        let draft = review(
            "- [EXTERNAL] Price assumes genre norms. Consequence: mispriced launch.",
            "Approve.",
        );
        assert!(contradictions_vs_verdict(&draft).is_empty());
    }

    #[test]
    fn test_untagged_and_consequence_less_entries() {
        let draft = review(
            "- Pitch says endless, loop is three rooms. Consequence: broken promise.\n\
             - [INTERNAL] Daily hook in a premium game\n\
             - [EXTERNAL] Touch-only on PC\n  Consequence: unplayable for most buyers",
            "Revise.",
        );
        let findings = contradictions_vs_verdict(&draft);
        assert_eq!(findings.len(), 2);
        assert!(findings[0].text.contains("tag"));
        assert!(findings[1].text.contains("Consequence"));
    }

    #[test]
    fn test_placeholder_contradictions_ignored() {
        let draft = review("No issues found.", "Approve.");
        assert!(contradictions_vs_verdict(&draft).is_empty());
    }

    #[test]
    fn test_critical_scope_risk_with_approval() {
        let mut draft = Draft::new();
        draft.set_text(
            SCOPE_RISKS,
            "- Netcode rewrite: critical\n- Art outsourcing: minor\n- Audio: non-critical",
        );
        draft.set_text(VERDICT, "Greenlight.");
        let findings = scope_risks_vs_verdict(&draft);
        assert_eq!(findings.len(), 1);
        assert!(findings[0].text.contains("Netcode"));

        draft.set_text(VERDICT, "Revise scope before approval.");
        assert!(scope_risks_vs_verdict(&draft).is_empty());
    }

    #[test]
    fn test_market_assumptions_unacknowledged() {
        let mut draft = Draft::new();
        draft.set_text(
            MARKET_ASSUMPTIONS,
            "- [EXTERNAL] Roguelite buyers pay $1 per hour",
        );
        draft.set_text(VERDICT, "Approve.");
        let findings = market_assumptions_vs_verdict(&draft);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].tag, Some(Tag::External));

        draft.set_text(VERDICT, "Approve, assuming the pricing benchmark holds.");
        assert!(market_assumptions_vs_verdict(&draft).is_empty());
    }
}
