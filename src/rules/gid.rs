//! Cross-section rules for the Game Idea Document.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use super::{ConstraintRule, RawFinding};
use crate::draft::Draft;
use crate::registry::{
    CORE_LOOP, DESIGN_PILLARS, ELEVATOR_PITCH, INPUT_SCHEME, MONETIZATION_MODEL,
    PLATFORM_PRIORITY, SESSION_DESIGN,
};
use crate::text::{
    excerpt, has_any_phrase, has_number, has_phrase, keywords, matched_phrases, mentions, stem,
    words,
};

pub(super) fn rules() -> Vec<ConstraintRule> {
    vec![
        ConstraintRule {
            id: "pillars-vs-core-loop",
            sections: (DESIGN_PILLARS, CORE_LOOP),
            check: pillars_vs_core_loop,
        },
        ConstraintRule {
            id: "elevator-pitch-vs-pillars",
            sections: (ELEVATOR_PITCH, DESIGN_PILLARS),
            check: elevator_pitch_vs_pillars,
        },
        ConstraintRule {
            id: "session-design-vs-monetization",
            sections: (SESSION_DESIGN, MONETIZATION_MODEL),
            check: session_design_vs_monetization,
        },
        ConstraintRule {
            id: "platform-vs-input-scheme",
            sections: (PLATFORM_PRIORITY, INPUT_SCHEME),
            check: platform_vs_input_scheme,
        },
    ]
}

/// Words that show up in almost any loop and say nothing about a mechanism.
const GENERIC_TERMS: &[&str] = &[
    "enemy", "enemies", "pattern", "patterns", "level", "levels", "world", "system", "systems",
    "mechanic", "mechanics", "gameplay", "action", "actions", "moment", "feature", "features",
    "content", "thing", "things", "stuff", "time", "experience", "element", "elements",
];

fn is_generic(term: &str) -> bool {
    GENERIC_TERMS.iter().any(|g| stem(g) == term)
}

fn pillars_vs_core_loop(draft: &Draft) -> Vec<RawFinding> {
    let core_loop = draft.text(CORE_LOOP).unwrap_or_default();
    let loop_words = keywords(&core_loop);

    draft
        .pillars(DESIGN_PILLARS)
        .iter()
        .filter(|pillar| {
            let name_terms = keywords(&pillar.name);
            let mechanism_terms: Vec<String> = keywords(&pillar.mechanism)
                .into_iter()
                .filter(|t| !is_generic(t))
                .collect();
            if name_terms.is_empty() && mechanism_terms.is_empty() {
                // Short names like "Fun" still have to show up verbatim.
                return !has_phrase(&core_loop, pillar.name.trim());
            }
            !name_terms
                .iter()
                .chain(&mechanism_terms)
                .any(|t| mentions(&loop_words, t))
        })
        .map(|pillar| {
            let described = if pillar.mechanism.is_empty() {
                format!("Pillar '{}'", pillar.name)
            } else {
                format!("Pillar '{}' ({})", pillar.name, pillar.mechanism)
            };
            RawFinding::internal(
                format!("{} is never exercised by the core loop", described),
                format!(
                    "Nothing in the moment-to-moment loop depends on '{}', so the effort spent \
                     protecting it from scope cuts is wasted and features justified by it have \
                     no anchor in play.",
                    pillar.name
                ),
            )
            .about(pillar.name.clone())
        })
        .collect()
}

const FREQUENCY_CLAIMS: &[&str] = &[
    "every",
    "always",
    "constant",
    "constantly",
    "non-stop",
    "nonstop",
    "never-ending",
    "relentless",
];
const SCALE_CLAIMS: &[&str] = &[
    "massive",
    "huge",
    "vast",
    "infinite",
    "endless",
    "limitless",
    "countless",
    "hundreds",
    "thousands",
    "millions",
    "sprawling",
    "enormous",
];
const SPECTACLE_CLAIMS: &[&str] = &[
    "epic",
    "spectacular",
    "explosive",
    "cinematic",
    "breathtaking",
    "jaw-dropping",
    "stunning",
    "dazzling",
];

fn elevator_pitch_vs_pillars(draft: &Draft) -> Vec<RawFinding> {
    let pitch = draft.text(ELEVATOR_PITCH).unwrap_or_default();
    let pillars = draft.text(DESIGN_PILLARS).unwrap_or_default();
    let core_loop = draft.text(CORE_LOOP).unwrap_or_default();

    if has_number(&pillars) || has_number(&core_loop) {
        return Vec::new();
    }

    [
        ("frequency", FREQUENCY_CLAIMS),
        ("scale", SCALE_CLAIMS),
        ("spectacle", SPECTACLE_CLAIMS),
    ]
    .into_iter()
    .filter_map(|(kind, phrases)| {
        let matched = matched_phrases(&pitch, phrases);
        if matched.is_empty() {
            return None;
        }
        Some(
            RawFinding::internal(
                format!(
                    "Elevator pitch promises {} ({}) that no pillar or core-loop step quantifies",
                    kind,
                    matched.join(", ")
                ),
                "The pitch sets an unbounded expectation; without a number behind it there is \
                 no way to scope, budget or cut the feature that has to deliver it, and players \
                 will measure the game against the promise.",
            )
            .about(kind),
        )
    })
    .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pricing {
    Premium,
    FreeToPlay,
    Subscription,
    Unknown,
}

const FREE_TO_PLAY_TERMS: &[&str] = &[
    "free-to-play",
    "free to play",
    "f2p",
    "freemium",
    "microtransaction",
    "microtransactions",
    "in-app purchase",
    "in-app purchases",
    "iap",
    "ad-supported",
    "ads",
];
const SUBSCRIPTION_TERMS: &[&str] = &["subscription", "monthly fee", "season pass only"];
const PREMIUM_TERMS: &[&str] = &[
    "premium",
    "one-time",
    "one time",
    "buy once",
    "buy-to-play",
    "paid",
    "$",
    "€",
    "£",
];
const DAILY_HOOK_TERMS: &[&str] = &[
    "daily",
    "every day",
    "login reward",
    "login rewards",
    "streak",
    "streaks",
    "energy",
    "come back",
    "return hook",
];
const RETENTION_TERMS: &[&str] = &[
    "retention",
    "retain",
    "monetize",
    "monetise",
    "monetization",
    "monetisation",
    "dau",
    "ltv",
    "lifetime value",
];
const ASSUMPTION_TERMS: &[&str] = &["assume", "assumes", "assuming", "assumption", "comparable", "benchmark"];

/// Below this many hours of content a free-to-play game has nothing to monetize.
const MIN_FREE_TO_PLAY_HOURS: f64 = 10.0;

static PRICE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:[$€£]\s?(\d+(?:\.\d{1,2})?))|(?:(\d+(?:\.\d{1,2})?)\s?(?:usd|eur|gbp|dollars|euros)\b)")
        .expect("valid price regex")
});
static HOURS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d+(?:\.\d+)?)(?:\s*(?:-|–|to)\s*(\d+(?:\.\d+)?))?\+?\s*(?:hours?|hrs?|h)\b")
        .expect("valid hours regex")
});
static TOTAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:total|overall|campaign|completion|complete|lifetime|playtime|engagement)\b")
        .expect("valid total regex")
});
static SESSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bsessions?\b").expect("valid session regex"));
// Clause boundaries. The dot in "1.5" is not one.
static CLAUSE_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[,;\n]|\.(?:\s|$)").expect("valid clause regex"));
static MINUTES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d+(?:\.\d+)?)(?:\s*(?:-|–|to)\s*(\d+(?:\.\d+)?))?\s*(?:minutes?|mins?|m)\b")
        .expect("valid minutes regex")
});

fn classify_pricing(text: &str) -> Pricing {
    if has_any_phrase(text, FREE_TO_PLAY_TERMS) {
        Pricing::FreeToPlay
    } else if has_any_phrase(text, SUBSCRIPTION_TERMS) {
        Pricing::Subscription
    } else if has_any_phrase(text, PREMIUM_TERMS) {
        Pricing::Premium
    } else {
        Pricing::Unknown
    }
}

fn price(text: &str) -> Option<f64> {
    PRICE.captures(text).and_then(|caps| {
        caps.get(1)
            .or_else(|| caps.get(2))
            .and_then(|m| m.as_str().parse().ok())
    })
}

fn range_upper(caps: &Captures<'_>) -> Option<f64> {
    caps.get(2)
        .or_else(|| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Upper bound of the first range matched by `re` in `text`.
fn upper_bound(re: &Regex, text: &str) -> Option<f64> {
    re.captures(text).and_then(|caps| range_upper(&caps))
}

/// Expected total engagement in hours.
///
/// Clauses naming the whole game win, taking the hour figure nearest the
/// total term. Otherwise the first figure outside a session clause counts.
fn total_hours(text: &str) -> Option<f64> {
    let clauses: Vec<&str> = CLAUSE_BREAK.split(text).collect();
    clauses
        .iter()
        .find_map(|clause| hours_near_total(clause))
        .or_else(|| {
            clauses
                .iter()
                .filter(|clause| !SESSION.is_match(clause))
                .find_map(|clause| upper_bound(&HOURS, clause))
        })
}

fn hours_near_total(clause: &str) -> Option<f64> {
    let anchors: Vec<(usize, usize)> = TOTAL
        .find_iter(clause)
        .map(|m| (m.start(), m.end()))
        .collect();
    if anchors.is_empty() {
        return None;
    }
    HOURS
        .captures_iter(clause)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let distance = anchors
                .iter()
                .map(|&(start, end)| {
                    if end <= whole.start() {
                        whole.start() - end
                    } else {
                        start.saturating_sub(whole.end())
                    }
                })
                .min()?;
            Some((distance, range_upper(&caps)?))
        })
        .min_by_key(|(distance, _)| *distance)
        .map(|(_, hours)| hours)
}

fn session_minutes(text: &str) -> Option<f64> {
    upper_bound(&MINUTES, text)
}

fn format_amount(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{:.0}", value)
    } else {
        format!("{:.2}", value)
    }
}

fn session_design_vs_monetization(draft: &Draft) -> Vec<RawFinding> {
    let session = draft.text(SESSION_DESIGN).unwrap_or_default();
    let monetization = draft.text(MONETIZATION_MODEL).unwrap_or_default();
    let pricing = classify_pricing(&monetization);
    let hours = total_hours(&session);
    let mut findings = Vec::new();

    let daily_hook = has_any_phrase(&session, DAILY_HOOK_TERMS);
    let retention_framing =
        has_any_phrase(&session, RETENTION_TERMS) || has_any_phrase(&monetization, RETENTION_TERMS);
    if pricing == Pricing::Premium && daily_hook && retention_framing {
        findings.push(
            RawFinding::internal(
                "Session design relies on a daily return hook framed as retention \
                 monetization, but the game is sold for a one-time premium price",
                "A premium buyer has already paid, so retention mechanics earn nothing; the hook \
                 costs development time and reads as free-to-play padding to the audience that \
                 chose a premium game.",
            )
            .about("daily return hook"),
        );
    }

    if pricing == Pricing::FreeToPlay
        && let Some(hours) = hours
        && hours < MIN_FREE_TO_PLAY_HOURS
    {
        findings.push(
            RawFinding::internal(
                format!(
                    "Free-to-play monetization with only {} hours of expected total engagement",
                    format_amount(hours)
                ),
                format!(
                    "Free-to-play revenue comes from players who stay for months; content that \
                     runs out after {} hours leaves no window to convert them and the model \
                     cannot recoup its cost.",
                    format_amount(hours)
                ),
            )
            .about("engagement"),
        );
    }

    let assumption_stated =
        has_any_phrase(&monetization, ASSUMPTION_TERMS) || has_any_phrase(&session, ASSUMPTION_TERMS);
    if let (Some(amount), Some(hours)) = (price(&monetization), hours)
        && hours > 0.0
        && !assumption_stated
    {
        let session_note = session_minutes(&session)
            .map(|m| format!(", in sessions of up to {} minutes", format_amount(m)))
            .unwrap_or_default();
        findings.push(
            RawFinding::external(
                format!(
                    "Price {} for about {} hours of play ({} per hour{}) is judged against genre \
                     pricing norms the document does not state",
                    format_amount(amount),
                    format_amount(hours),
                    format_amount(amount / hours),
                    session_note
                ),
                "Whether the price feels fair depends on what comparable games charge; without a \
                 written assumption every reviewer applies their own norm and the pricing case \
                 cannot be checked.",
            )
            .about("pricing"),
        );
    }

    findings
}

const MOBILE_TERMS: &[&str] = &["mobile", "ios", "android", "phone", "phones", "iphone", "tablet", "tablets"];
const PC_TERMS: &[&str] = &["pc", "steam", "windows", "macos", "linux", "desktop"];
const CONSOLE_TERMS: &[&str] = &[
    "console",
    "consoles",
    "switch",
    "playstation",
    "ps4",
    "ps5",
    "xbox",
];
const TOUCH_TERMS: &[&str] = &["touch", "touchscreen", "tap", "taps", "swipe", "swipes", "gesture", "gestures"];
const PAD_TERMS: &[&str] = &["controller", "controllers", "gamepad", "gamepads", "joystick", "pad", "joy-con"];
const KEYBOARD_MOUSE_TERMS: &[&str] = &["keyboard", "mouse", "kbm", "wasd"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Platform {
    Mobile,
    Pc,
    Console,
}

impl Platform {
    fn label(&self) -> &'static str {
        match self {
            Self::Mobile => "mobile",
            Self::Pc => "PC",
            Self::Console => "console",
        }
    }
}

/// The platform named first in the priority list.
fn launch_platform(text: &str) -> Option<Platform> {
    let tokens = words(text);
    tokens.iter().find_map(|token| {
        [
            (Platform::Mobile, MOBILE_TERMS),
            (Platform::Pc, PC_TERMS),
            (Platform::Console, CONSOLE_TERMS),
        ]
        .into_iter()
        .find(|(_, terms)| terms.contains(&token.as_str()))
        .map(|(platform, _)| platform)
    })
}

fn platform_vs_input_scheme(draft: &Draft) -> Vec<RawFinding> {
    let platforms = draft.text(PLATFORM_PRIORITY).unwrap_or_default();
    let input = draft.text(INPUT_SCHEME).unwrap_or_default();
    let Some(platform) = launch_platform(&platforms) else {
        return Vec::new();
    };

    let touch = has_any_phrase(&input, TOUCH_TERMS);
    let pads = has_any_phrase(&input, PAD_TERMS);
    let keyboard_mouse = has_any_phrase(&input, KEYBOARD_MOUSE_TERMS);

    match platform {
        Platform::Mobile if !touch => vec![
            RawFinding::internal(
                format!(
                    "Launch platform is mobile but the input scheme never mentions touch \
                     controls: '{}'",
                    excerpt(&input, 80)
                ),
                "The launch build cannot be played as designed on the platform it ships on; a \
                 touch scheme retrofitted late reshapes every mechanic already tuned for other \
                 inputs.",
            )
            .about("touch input"),
        ],
        Platform::Pc | Platform::Console if touch && !pads && !keyboard_mouse => vec![
            RawFinding::external(
                format!(
                    "Launch platform is {} but the input scheme is touch-only",
                    platform.label()
                ),
                format!(
                    "This only works if the {} audience owns touch-capable hardware; state that \
                     assumption or plan a controller or keyboard scheme before tuning mechanics.",
                    platform.label()
                ),
            )
            .about("touch input"),
        ],
        _ => Vec::new(),
    }
}
