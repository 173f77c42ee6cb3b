//! Abbreviated/full mode selection for Game Idea Documents.

use std::fmt;

use regex::{Regex, RegexBuilder};
use serde::Serialize;
use tracing::{debug, warn};

use crate::config::ValidationConfig;
use crate::draft::Draft;
use crate::registry::{Template, TemplateId};

/// Default number of open decisions still allowed in abbreviated mode.
pub const DEFAULT_ABBREVIATED_THRESHOLD: usize = 3;

/// Default markers that flag a section as explicitly deferred.
pub const DEFAULT_DEFERRAL_MARKERS: &[&str] = &[
    "TBD",
    "TBC",
    "TODO",
    "undecided",
    "not decided",
    "to be decided",
    "to be determined",
    "not sure",
    "deferred",
    "???",
];

/// Which section set a draft is held to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Mode {
    /// Only star sections are required.
    Abbreviated,
    /// Every required section is required.
    Full,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Abbreviated => "ABBREVIATED",
            Self::Full => "FULL",
        })
    }
}

/// The eleven decisions a GID has to settle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionCategory {
    Genre,
    CoreMechanic,
    CoreLoopStructure,
    LevelWorldStructure,
    MonetizationModel,
    TargetAudience,
    PlatformPriority,
    InputScheme,
    ArtStyle,
    ProgressionSystem,
    SessionStructure,
}

impl DecisionCategory {
    pub const ALL: [DecisionCategory; 11] = [
        Self::Genre,
        Self::CoreMechanic,
        Self::CoreLoopStructure,
        Self::LevelWorldStructure,
        Self::MonetizationModel,
        Self::TargetAudience,
        Self::PlatformPriority,
        Self::InputScheme,
        Self::ArtStyle,
        Self::ProgressionSystem,
        Self::SessionStructure,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Genre => "genre",
            Self::CoreMechanic => "core mechanic",
            Self::CoreLoopStructure => "core loop structure",
            Self::LevelWorldStructure => "level/world structure",
            Self::MonetizationModel => "monetization model",
            Self::TargetAudience => "target audience",
            Self::PlatformPriority => "platform priority",
            Self::InputScheme => "input scheme",
            Self::ArtStyle => "art style",
            Self::ProgressionSystem => "progression system",
            Self::SessionStructure => "session structure",
        }
    }

    /// GID section that records this decision.
    pub fn section(&self) -> &'static str {
        match self {
            Self::Genre => "Genre",
            Self::CoreMechanic => "Core Mechanic",
            Self::CoreLoopStructure => "Core Loop",
            Self::LevelWorldStructure => "Level / World Structure",
            Self::MonetizationModel => "Monetization Model",
            Self::TargetAudience => "Target Audience",
            Self::PlatformPriority => "Platform Priority",
            Self::InputScheme => "Input Scheme",
            Self::ArtStyle => "Art Style",
            Self::ProgressionSystem => "Progression System",
            Self::SessionStructure => "Session Design",
        }
    }
}

/// Why a decision counts as open.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", content = "detail", rename_all = "snake_case")]
pub enum OpenReason {
    Absent,
    Deferred(String),
    MultipleOptions,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OpenDecision {
    pub category: DecisionCategory,
    pub reason: OpenReason,
}

/// Outcome of mode resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModeResolution {
    pub mode: Mode,
    pub open: Vec<OpenDecision>,
    /// Set when the draft has no content at all.
    pub vacuous: bool,
}

/// Counts open decisions and picks the section set.
#[derive(Debug, Clone)]
pub struct ModeResolver {
    threshold: usize,
    markers: Vec<(String, Regex)>,
    option_line: Regex,
    either_or: Regex,
    question_choice: Regex,
}

impl Default for ModeResolver {
    fn default() -> Self {
        Self::new(DEFAULT_ABBREVIATED_THRESHOLD, DEFAULT_DEFERRAL_MARKERS)
    }
}

impl ModeResolver {
    pub fn new<S: AsRef<str>>(threshold: usize, deferral_markers: &[S]) -> Self {
        let markers = deferral_markers
            .iter()
            .map(|m| m.as_ref())
            .filter(|m| !m.trim().is_empty())
            .filter_map(|m| match marker_regex(m) {
                Ok(re) => Some((m.to_string(), re)),
                Err(e) => {
                    warn!(marker = m, error = %e, "deferral_marker_invalid");
                    None
                }
            })
            .collect();

        Self {
            threshold,
            markers,
            option_line: case_insensitive(
                r"^\s*(?:[-*+]\s+|\d+[.)]\s+)?(?:\*\*)?(?:option|alternative)\b",
            ),
            either_or: case_insensitive(r"\beither\b.+\bor\b"),
            question_choice: case_insensitive(r"\S\s+(?:or|/)\s+\S.*\?\s*$"),
        }
    }

    pub fn from_config(config: &ValidationConfig) -> Self {
        Self::new(
            config.abbreviated_threshold,
            config.deferral_markers.as_slice(),
        )
    }

    pub fn threshold(&self) -> usize {
        self.threshold
    }

    /// Resolves the mode of `draft` under `template`.
    ///
    /// Only the GID template has an abbreviated form; every other template
    /// resolves to [`Mode::Full`]. A draft with no content is vacuously
    /// abbreviated and then fails on its missing star sections.
    pub fn resolve(&self, draft: &Draft, template: &Template) -> ModeResolution {
        if template.id != TemplateId::Gid {
            return ModeResolution {
                mode: Mode::Full,
                open: Vec::new(),
                vacuous: false,
            };
        }

        let open: Vec<OpenDecision> = DecisionCategory::ALL
            .into_iter()
            .filter_map(|category| {
                let reason = match draft.text(category.section()) {
                    None => OpenReason::Absent,
                    Some(text) => self.open_reason(&text)?,
                };
                Some(OpenDecision { category, reason })
            })
            .collect();

        let vacuous = draft.is_empty();
        let mode = if vacuous || open.len() <= self.threshold {
            Mode::Abbreviated
        } else {
            Mode::Full
        };

        debug!(
            open = open.len(),
            threshold = self.threshold,
            vacuous,
            mode = %mode,
            "mode_resolved"
        );

        ModeResolution {
            mode,
            open,
            vacuous,
        }
    }

    /// Why a present section still counts as open, if it does.
    pub fn open_reason(&self, text: &str) -> Option<OpenReason> {
        if let Some((marker, _)) = self.markers.iter().find(|(_, re)| re.is_match(text)) {
            return Some(OpenReason::Deferred(marker.clone()));
        }

        let option_lines = text.lines().filter(|l| self.option_line.is_match(l)).count();
        if option_lines >= 2
            || self.either_or.is_match(text)
            || text.lines().any(|l| self.question_choice.is_match(l))
        {
            return Some(OpenReason::MultipleOptions);
        }

        None
    }
}

/// Resolves the mode with the default threshold and markers.
pub fn resolve_mode(draft: &Draft, template: &Template) -> Mode {
    ModeResolver::default().resolve(draft, template).mode
}

fn marker_regex(marker: &str) -> Result<Regex, regex::Error> {
    let escaped = regex::escape(marker.trim());
    let starts_word = marker.trim().starts_with(|c: char| c.is_alphanumeric());
    let ends_word = marker.trim().ends_with(|c: char| c.is_alphanumeric());
    let pattern = format!(
        "{}{}{}",
        if starts_word { r"\b" } else { "" },
        escaped,
        if ends_word { r"\b" } else { "" }
    );
    RegexBuilder::new(&pattern).case_insensitive(true).build()
}

fn case_insensitive(pattern: &str) -> Regex {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .expect("static pattern compiles")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gid() -> Template {
        Template::builtin(TemplateId::Gid)
    }

    /// A draft where every decision category is settled.
    fn settled_draft() -> Draft {
        let mut draft = Draft::new();
        for category in DecisionCategory::ALL {
            draft.set_text(category.section(), "Decided.");
        }
        draft
    }

    fn with_open(count: usize) -> Draft {
        let mut draft = settled_draft();
        for category in DecisionCategory::ALL.iter().take(count) {
            draft.remove(category.section());
        }
        draft
    }

    #[test]
    fn test_all_settled_is_abbreviated() {
        let resolution = ModeResolver::default().resolve(&settled_draft(), &gid());
        assert_eq!(resolution.mode, Mode::Abbreviated);
        assert!(resolution.open.is_empty());
    }

    #[test]
    fn test_threshold_boundary() {
        let template = gid();
        for open in 0..=3 {
            assert_eq!(
                resolve_mode(&with_open(open), &template),
                Mode::Abbreviated,
                "{} open",
                open
            );
        }
        for open in 4..=10 {
            assert_eq!(
                resolve_mode(&with_open(open), &template),
                Mode::Full,
                "{} open",
                open
            );
        }
    }

    #[test]
    fn test_empty_draft_is_vacuously_abbreviated() {
        let resolution = ModeResolver::default().resolve(&Draft::new(), &gid());
        assert_eq!(resolution.mode, Mode::Abbreviated);
        assert!(resolution.vacuous);
        assert_eq!(resolution.open.len(), 11);
    }

    #[test]
    fn test_single_settled_section_is_full() {
        let mut draft = Draft::new();
        draft.set_text("Genre", "Roguelite");
        assert_eq!(resolve_mode(&draft, &gid()), Mode::Full);
    }

    #[test]
    fn test_deferral_markers_count_as_open() {
        let mut draft = settled_draft();
        draft.set_text("Art Style", "TBD");
        draft.set_text("Input Scheme", "Gamepad, touch is undecided");
        draft.set_text("Platform Priority", "PC first, console ???");
        draft.set_text("Monetization Model", "to be decided after playtests");
        let resolution = ModeResolver::default().resolve(&draft, &gid());
        assert_eq!(resolution.open.len(), 4);
        assert_eq!(resolution.mode, Mode::Full);
        assert!(resolution.open.iter().any(|o| o.category == DecisionCategory::ArtStyle
            && o.reason == OpenReason::Deferred("TBD".to_string())));
    }

    #[test]
    fn test_marker_needs_word_boundary() {
        let resolver = ModeResolver::default();
        assert_eq!(resolver.open_reason("Outbidding mechanics"), None);
        assert_eq!(
            resolver.open_reason("tbd"),
            Some(OpenReason::Deferred("TBD".to_string()))
        );
    }

    #[test]
    fn test_multiple_options_count_as_open() {
        let resolver = ModeResolver::default();
        assert_eq!(
            resolver.open_reason("- Option A: hub world\n- Option B: linear levels"),
            Some(OpenReason::MultipleOptions)
        );
        assert_eq!(
            resolver.open_reason("Either premium or free-to-play with ads."),
            Some(OpenReason::MultipleOptions)
        );
        assert_eq!(
            resolver.open_reason("Pixel art or low-poly 3D?"),
            Some(OpenReason::MultipleOptions)
        );
        assert_eq!(resolver.open_reason("Pixel art, 320x180."), None);
        assert_eq!(resolver.open_reason("Option A: hub world"), None);
    }

    #[test]
    fn test_custom_threshold_and_markers() {
        let resolver = ModeResolver::new(0, &["later"]);
        let mut draft = settled_draft();
        draft.set_text("Genre", "decide later");
        let resolution = resolver.resolve(&draft, &gid());
        assert_eq!(resolution.mode, Mode::Full);
        assert_eq!(
            resolution.open[0].reason,
            OpenReason::Deferred("later".to_string())
        );

        draft.set_text("Art Style", "TBD");
        let resolution = resolver.resolve(&draft, &gid());
        assert_eq!(resolution.open.len(), 1);
    }

    #[test]
    fn test_non_gid_templates_are_full() {
        for id in [TemplateId::GidAdversarial, TemplateId::ProjectSnapshot] {
            let template = Template::builtin(id);
            let resolution = ModeResolver::default().resolve(&Draft::new(), &template);
            assert_eq!(resolution.mode, Mode::Full);
            assert!(resolution.open.is_empty());
        }
    }

    #[test]
    fn test_every_category_maps_to_gid_section() {
        let template = gid();
        for category in DecisionCategory::ALL {
            assert!(template.section(category.section()).is_some(), "{:?}", category);
        }
    }
}
