use chrono::{DateTime, NaiveDate, Utc};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

pub const ORG_NAME: &str = "Trenton Area Soup Kitchen (TASK)";
pub const ORG_PHONE: &str = "(609) 695-5456";
pub const ORG_ADDRESS: &str = "72 1/2 Escher Street, Trenton, NJ 08609";
pub const WORKFORCE_PHONE: &str = "(609) 337-1624";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Lang {
    En,
    Es,
    Ht,
}

impl Lang {
    pub fn from_optional_str(value: Option<&str>) -> Option<Self> {
        match value.map(|v| v.trim().to_lowercase()) {
            Some(v) if v == "en" || v == "english" => Some(Self::En),
            Some(v) if v == "es" || v == "spanish" => Some(Self::Es),
            Some(v) if v == "ht" || v == "haitian creole" || v == "creole" => Some(Self::Ht),
            _ => None,
        }
    }

    pub fn as_code(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Es => "es",
            Self::Ht => "ht",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Self::En => "English",
            Self::Es => "Spanish",
            Self::Ht => "Haitian Creole",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgramKey {
    Sora,
    Culinary,
    Forklift,
}

impl ProgramKey {
    pub fn as_code(self) -> &'static str {
        match self {
            Self::Sora => "sora",
            Self::Culinary => "culinary",
            Self::Forklift => "forklift",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "sora" => Some(Self::Sora),
            "culinary" => Some(Self::Culinary),
            "forklift" => Some(Self::Forklift),
            _ => None,
        }
    }
}

/// Subject of the current turn: a specific program or a generic category.
/// The caller persists the resolved topic and echoes it back on the next
/// turn; nothing here holds conversational state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    Program(ProgramKey),
    Appointments,
    Events,
    Jobs,
    Resources,
    Transit,
    Crisis,
}

impl Topic {
    pub fn as_code(self) -> &'static str {
        match self {
            Self::Program(key) => key.as_code(),
            Self::Appointments => "appointments",
            Self::Events => "events",
            Self::Jobs => "jobs",
            Self::Resources => "resources",
            Self::Transit => "transit",
            Self::Crisis => "crisis",
        }
    }

    /// Lenient parse for caller-supplied context; unknown codes are treated
    /// as "no prior topic" rather than an error.
    pub fn parse(value: &str) -> Option<Self> {
        let code = value.trim().to_lowercase();
        if let Some(key) = ProgramKey::parse(&code) {
            return Some(Self::Program(key));
        }
        match code.as_str() {
            "appointments" | "appointment" => Some(Self::Appointments),
            "events" | "event" => Some(Self::Events),
            "jobs" | "job" | "employment" => Some(Self::Jobs),
            "resources" | "resource" => Some(Self::Resources),
            "transit" => Some(Self::Transit),
            "crisis" => Some(Self::Crisis),
            _ => None,
        }
    }

    /// Search term used when a sticky topic has to be turned back into
    /// something a substring filter can work with.
    pub fn search_term(self) -> &'static str {
        self.as_code()
    }
}

impl Serialize for Topic {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_code())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionFocus {
    Who,
    Where,
    Why,
    HowLong,
    When,
    Cost,
    Eligibility,
    General,
}

/// One inbound turn. `last_topic` is the topic code the caller got back on
/// the previous turn, if any.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatInput {
    pub text: String,
    #[serde(default)]
    pub last_topic: Option<String>,
    #[serde(default)]
    pub lang: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerSource {
    Canned,
    Records,
    Disambiguation,
    Generative,
    Apology,
}

impl AnswerSource {
    pub fn as_code(self) -> &'static str {
        match self {
            Self::Canned => "canned",
            Self::Records => "records",
            Self::Disambiguation => "disambiguation",
            Self::Generative => "generative",
            Self::Apology => "apology",
        }
    }
}

/// Final output of one routed turn.
#[derive(Debug, Clone, Serialize)]
pub struct Answer {
    pub text: String,
    pub source: AnswerSource,
    pub topic: Option<Topic>,
    pub lang: Lang,
}

/// Authoritative static description of one TASK offering. Loaded once at
/// process start; never overridden by an external record of the same name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgramRecord {
    pub key: ProgramKey,
    pub keywords: Vec<String>,
    pub label: String,
    pub location: String,
    pub schedule: String,
    pub duration: String,
    pub purpose_outcomes: String,
    #[serde(default)]
    pub instructor: Option<String>,
    pub eligibility: String,
    pub cost: String,
    #[serde(default)]
    pub next_start_date: Option<NaiveDate>,
    #[serde(default)]
    pub application_window: Option<String>,
    #[serde(default)]
    pub signup_link: Option<String>,
    #[serde(default)]
    pub contact_info: Option<String>,
    #[serde(default)]
    pub exclusivity_note: Option<String>,
}

/// Keyword set plus canned text for a non-program intent.
#[derive(Debug, Clone)]
pub struct GenericIntentCard {
    pub id: &'static str,
    pub topic: Topic,
    pub keywords: &'static [&'static str],
    pub body: String,
}

/// Row fetched on demand from the external training table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingRow {
    pub name: String,
    pub description: String,
    pub schedule: Option<String>,
    pub next_start_date: Option<NaiveDate>,
    pub signup_link: Option<String>,
    pub contact_info: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobRow {
    pub title: String,
    pub company: String,
    pub location: String,
    pub description: String,
    pub apply_link: Option<String>,
    pub posted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceRow {
    pub name: String,
    pub category: String,
    pub description: String,
    pub website: Option<String>,
    pub phone_number: Option<String>,
}

/// A posted TASK or community event. `date` is the calendar day it runs;
/// undated rows are standing announcements and stay listed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventRow {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub signup_link: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn topic_codes_round_trip() {
        for topic in [
            Topic::Program(ProgramKey::Sora),
            Topic::Program(ProgramKey::Culinary),
            Topic::Program(ProgramKey::Forklift),
            Topic::Appointments,
            Topic::Events,
            Topic::Jobs,
            Topic::Resources,
            Topic::Transit,
            Topic::Crisis,
        ] {
            assert_eq!(Topic::parse(topic.as_code()), Some(topic));
        }
    }

    #[test]
    fn unknown_topic_code_is_none() {
        assert_eq!(Topic::parse("astrology"), None);
    }
}
