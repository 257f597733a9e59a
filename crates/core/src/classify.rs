use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::{Lang, ProgramKey, QuestionFocus, Topic};

/// Program name patterns, checked before generic categories. The same table
/// feeds topic detection and the Tier-0 keyword scorer so the two can never
/// drift apart.
pub const PROGRAM_KEYWORDS: &[(ProgramKey, &[&str])] = &[
    (
        ProgramKey::Sora,
        &[
            "sora",
            "unarmed security",
            "security officer",
            "guard card",
            "security license",
        ],
    ),
    (
        ProgramKey::Culinary,
        &[
            "emilio culinary",
            "emilio's culinary",
            "culinary academy",
            "culinary",
            "cooking program",
            "food service",
            "servsafe",
        ],
    ),
    (
        ProgramKey::Forklift,
        &[
            "forklift",
            "fork lift",
            "warehouse",
            "logistics",
            "forklift certification",
        ],
    ),
];

/// Generic category patterns in registration order; first match wins.
pub const CATEGORY_KEYWORDS: &[(Topic, &[&str])] = &[
    (
        Topic::Appointments,
        &[
            "appointment",
            "book",
            "schedule a",
            "meet with",
            "call specialist",
            "case management",
            "social worker",
            "iep",
            "employment plan",
            "see someone",
            "consultation",
        ],
    ),
    (
        Topic::Events,
        &[
            "event",
            "workshop",
            "info session",
            "orientation",
            "career tips",
            "star method",
        ],
    ),
    (
        Topic::Jobs,
        &[
            "job",
            "jobs",
            "employment",
            "resume",
            "interview",
            "hiring",
            "career services",
            "job board",
            "help finding work",
        ],
    ),
    (
        Topic::Resources,
        &[
            "resource",
            "resources",
            "housing",
            "legal",
            "childcare",
            "creative arts",
            "patron services",
            "hygiene",
            "mail service",
            "glasses",
            "meal",
        ],
    ),
    (
        Topic::Transit,
        &[
            "nj transit",
            "trip planner",
            "bus",
            "train",
            "route",
            "transit",
            "get there",
        ],
    ),
    (
        Topic::Crisis,
        &[
            "suicide",
            "kill myself",
            "self harm",
            "overwhelmed",
            "abuse",
            "harassed",
            "crisis",
            "panic",
            "depressed",
            "emergency",
        ],
    ),
];

/// Vague continuations that inherit the previous turn's topic.
const FOLLOW_UP_PHRASES: &[&str] = &[
    "info",
    "information",
    "details",
    "more",
    "more info",
    "tell me more",
    "what about it",
    "how much",
    "cost",
    "price",
    "when",
    "where",
    "who",
    "why",
    "how long",
    "eligibility",
    "requirements",
    "sign up",
];

static FOCUS_PATTERNS: Lazy<Vec<(Regex, QuestionFocus)>> = Lazy::new(|| {
    [
        (r"(?i)\bwho\b", QuestionFocus::Who),
        (r"(?i)\bwhere\b", QuestionFocus::Where),
        (
            r"(?i)\bwhy\b|\bwhat (do|will) i (learn|get)\b|outcome|cert",
            QuestionFocus::Why,
        ),
        (
            r"(?i)\bhow long\b|weeks|hours|duration",
            QuestionFocus::HowLong,
        ),
        (
            r"(?i)\bwhen\b|next (start|class|cohort|session)",
            QuestionFocus::When,
        ),
        (r"(?i)\bhow much\b|cost|price|tuition", QuestionFocus::Cost),
        (
            r"(?i)\brequirements?\b|eligibility|qualifications?",
            QuestionFocus::Eligibility,
        ),
    ]
    .iter()
    .map(|(pattern, focus)| {
        (
            Regex::new(pattern).expect("valid focus pattern"),
            *focus,
        )
    })
    .collect()
});

const ES_MARKERS: &[&str] = &[
    "necesito", "trabajo", "ayuda", "hola", "gracias", "donde", "dónde", "cuando", "cuándo",
    "quiero", "busco", "empleo", "clase", "clases", "comida", "cita", "cursos", "por", "favor",
];

const HT_MARKERS: &[&str] = &[
    "mwen", "bezwen", "travay", "tanpri", "bonjou", "kijan", "kote", "manje", "kreyòl", "kreyol",
    "èd", "ede", "yon", "ki",
];

pub fn normalize_text(input: &str) -> String {
    input
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .trim()
        .to_string()
}

/// First program or category pattern found in the text, or None. Program
/// names are checked first so "forklift job" resolves to the program, not
/// the jobs category.
pub fn detect_topic(text: &str) -> Option<Topic> {
    let lower = text.to_lowercase();

    for (key, keywords) in PROGRAM_KEYWORDS {
        if contains_any(&lower, keywords) {
            return Some(Topic::Program(*key));
        }
    }

    for (topic, keywords) in CATEGORY_KEYWORDS {
        if contains_any(&lower, keywords) {
            return Some(*topic);
        }
    }

    None
}

/// True iff the trimmed text is one of a small closed set of vague
/// continuations ("info", "details", bare "?", "how much", ...).
pub fn is_generic_follow_up(text: &str) -> bool {
    let stripped = text
        .trim()
        .trim_end_matches(['?', '!', '.'])
        .trim()
        .to_lowercase();

    // A bare "?" strips down to nothing.
    if stripped.is_empty() {
        return !text.trim().is_empty();
    }

    FOLLOW_UP_PHRASES.contains(&stripped.as_str())
}

/// Ordered wh-pattern cascade; first match wins, default General.
pub fn classify_question_focus(text: &str) -> QuestionFocus {
    for (pattern, focus) in FOCUS_PATTERNS.iter() {
        if pattern.is_match(text) {
            return *focus;
        }
    }

    QuestionFocus::General
}

/// Keyword spotting over the user's original message. Defaults to English;
/// the two non-English sets compete on distinct word hits.
pub fn detect_lang(text: &str) -> Lang {
    let mut es_count = 0usize;
    let mut ht_count = 0usize;

    for word in text
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric() && c != '\'')
        .filter(|w| !w.is_empty())
    {
        if ES_MARKERS.contains(&word) {
            es_count += 1;
        }
        if HT_MARKERS.contains(&word) {
            ht_count += 1;
        }
    }

    if ht_count > es_count && ht_count > 0 {
        Lang::Ht
    } else if es_count > 0 {
        Lang::Es
    } else {
        Lang::En
    }
}

pub(crate) fn contains_any(input: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| input.contains(needle))
}
