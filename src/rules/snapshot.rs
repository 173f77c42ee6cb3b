//! Rules for the project-state snapshot.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;

use super::{ConstraintRule, RawFinding, listed};
use crate::draft::Draft;
use crate::registry::{LOCKED_DECISIONS, NEXT_ACTIONS, OPEN_QUESTIONS};
use crate::text::{excerpt, has_phrase, keywords, mentions};

pub(super) fn rules() -> Vec<ConstraintRule> {
    vec![
        ConstraintRule {
            id: "locked-decisions-vs-open-questions",
            sections: (LOCKED_DECISIONS, OPEN_QUESTIONS),
            check: locked_decisions_vs_open_questions,
        },
        ConstraintRule {
            id: "locked-decisions-vs-next-actions",
            sections: (LOCKED_DECISIONS, NEXT_ACTIONS),
            check: locked_decisions_vs_next_actions,
        },
    ]
}

static REVISIT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:revisit|reconsider|rethink|chang|switch|replac|re-?evaluat|reopen|redo|swap)\w*")
        .expect("valid revisit regex")
});

/// A locked decision reduced to the topic it settles.
struct Topic {
    label: String,
    terms: BTreeSet<String>,
}

impl Topic {
    fn parse(entry: &str) -> Self {
        let label = [":", " — ", " – ", " - ", "="]
            .iter()
            .filter_map(|sep| entry.find(sep))
            .min()
            .map_or(entry, |idx| &entry[..idx])
            .trim_matches(|c: char| c == '*' || c.is_whitespace())
            .to_string();
        let terms = keywords(&label);
        Self { label, terms }
    }

    /// Every distinctive word of the topic appears in `text`.
    fn reappears_in(&self, text: &str) -> bool {
        if self.terms.is_empty() {
            return has_phrase(text, &self.label);
        }
        let haystack = keywords(text);
        self.terms.iter().all(|t| mentions(&haystack, t))
    }
}

fn locked_topics(draft: &Draft) -> Vec<Topic> {
    listed(draft, LOCKED_DECISIONS)
        .iter()
        .map(|e| Topic::parse(e))
        .filter(|t| !t.label.is_empty())
        .collect()
}

fn locked_decisions_vs_open_questions(draft: &Draft) -> Vec<RawFinding> {
    let questions = listed(draft, OPEN_QUESTIONS);

    locked_topics(draft)
        .into_iter()
        .filter_map(|topic| {
            let question = questions.iter().find(|q| topic.reappears_in(q))?;
            Some(
                RawFinding::internal(
                    format!(
                        "Locked decision '{}' is reopened by open question '{}'",
                        topic.label,
                        excerpt(question, 60)
                    ),
                    "A new session will treat the topic as both settled and open; work built on \
                     the locked answer may be thrown away when the question is answered.",
                )
                .about(topic.label),
            )
        })
        .collect()
}

fn locked_decisions_vs_next_actions(draft: &Draft) -> Vec<RawFinding> {
    let topics = locked_topics(draft);

    listed(draft, NEXT_ACTIONS)
        .into_iter()
        .filter(|action| REVISIT.is_match(action))
        .filter_map(|action| {
            let topic = topics.iter().find(|t| t.reappears_in(&action))?;
            Some(
                RawFinding::internal(
                    format!(
                        "Next action '{}' revisits locked decision '{}'",
                        excerpt(&action, 60),
                        topic.label
                    ),
                    "Either the decision is no longer locked or the action is wasted effort; the \
                     snapshot cannot brief a new session on both.",
                )
                .about(topic.label.clone()),
            )
        })
        .collect()
}
