use crate::models::{
    JobRow, ProgramRecord, QuestionFocus, ResourceRow, TrainingRow, ORG_PHONE,
};

/// Last-resort apology; the user never sees a raw error payload.
pub const APOLOGY_FALLBACK: &str = "Sorry, something went wrong on our end and I couldn't find an answer. Please call us at (609) 695-5456 and a staff member will help you directly.";

/// Substituted when the generative service succeeds but returns no text.
pub const EMPTY_COMPLETION_FALLBACK: &str = "I couldn't find that one. Please call us at (609) 695-5456 and we'll point you in the right direction.";

/// Focus-specific view over a program record. Missing optionals are omitted
/// entirely, except the next start date which always renders as "TBD".
pub fn format_program_answer(record: &ProgramRecord, focus: QuestionFocus) -> String {
    let mut lines = vec![format!("**{}**", record.label)];

    match focus {
        QuestionFocus::Who => {
            if let Some(instructor) = &record.instructor {
                lines.push(format!("Instructor: {instructor}"));
            }
        }
        QuestionFocus::Where => lines.push(format!("Location: {}", record.location)),
        QuestionFocus::Why => lines.push(format!("What you get: {}", record.purpose_outcomes)),
        QuestionFocus::Cost => lines.push(format!("Cost: {}", record.cost)),
        QuestionFocus::Eligibility => lines.push(format!("Eligibility: {}", record.eligibility)),
        QuestionFocus::HowLong => {
            lines.push(format!("Duration: {}", record.duration));
            lines.push(format!("Schedule: {}", record.schedule));
        }
        QuestionFocus::When => {
            lines.push(format!("Next start: {}", next_start(record)));
            if let Some(window) = &record.application_window {
                lines.push(format!("Application window: {window}"));
            }
            lines.push(format!("Schedule: {}", record.schedule));
        }
        QuestionFocus::General => {
            lines.push(format!("Location: {}", record.location));
            lines.push(format!("Schedule: {}", record.schedule));
            lines.push(format!("Duration: {}", record.duration));
            lines.push(format!("What you get: {}", record.purpose_outcomes));
            if let Some(instructor) = &record.instructor {
                lines.push(format!("Instructor: {instructor}"));
            }
            lines.push(format!("Eligibility: {}", record.eligibility));
            lines.push(format!("Cost: {}", record.cost));
            lines.push(format!("Next start: {}", next_start(record)));
            if let Some(window) = &record.application_window {
                lines.push(format!("Application window: {window}"));
            }
            if let Some(note) = &record.exclusivity_note {
                lines.push(format!("Note: {note}"));
            }
        }
    }

    push_footer(&mut lines, record.signup_link.as_deref(), record.contact_info.as_deref());
    lines.join("\n")
}

fn next_start(record: &ProgramRecord) -> String {
    record
        .next_start_date
        .map(|date| date.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "TBD".to_string())
}

fn push_footer(lines: &mut Vec<String>, signup_link: Option<&str>, contact_info: Option<&str>) {
    if let Some(link) = signup_link {
        lines.push(format!("Sign up: {link}"));
    }
    if let Some(contact) = contact_info {
        lines.push(format!("Call: {contact}"));
    }
}

/// Full detail card for a single external training row, program-style.
pub fn format_training_detail(row: &TrainingRow) -> String {
    let mut lines = vec![format!("📋 **{}**", row.name)];

    if !row.description.trim().is_empty() {
        lines.push(row.description.trim().to_string());
    }
    lines.push(format!(
        "Next start: {}",
        row.next_start_date
            .map(|date| date.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "TBD".to_string())
    ));
    if let Some(schedule) = &row.schedule {
        lines.push(format!("Schedule: {schedule}"));
    }
    push_footer(&mut lines, row.signup_link.as_deref(), row.contact_info.as_deref());

    lines.join("\n")
}

pub fn format_job_summary(row: &JobRow) -> String {
    let mut lines = vec![format!("💼 **{}** at {}", row.title, row.company)];

    lines.push(format!("Location: {}", row.location));
    if !row.description.trim().is_empty() {
        lines.push(row.description.trim().to_string());
    }
    if let Some(link) = &row.apply_link {
        lines.push(format!("Apply: {link}"));
    }
    lines.push(format!("Questions? Call TASK Employment Services at {ORG_PHONE}."));

    lines.join("\n")
}

pub fn format_resource_summary(row: &ResourceRow) -> String {
    let mut lines = vec![format!("🧭 **{}** ({})", row.name, row.category)];

    if !row.description.trim().is_empty() {
        lines.push(row.description.trim().to_string());
    }
    if let Some(website) = &row.website {
        lines.push(format!("Website: {website}"));
    }
    if let Some(phone) = &row.phone_number {
        lines.push(format!("Phone: {phone}"));
    }

    lines.join("\n")
}

/// One entry of a disambiguation list: the display name plus one key fact
/// (a date or a link), when the row has one.
#[derive(Debug, Clone)]
pub struct DisambiguationItem {
    pub name: String,
    pub detail: Option<String>,
}

impl DisambiguationItem {
    pub fn from_training(row: &TrainingRow) -> Self {
        Self {
            name: row.name.clone(),
            detail: row
                .next_start_date
                .map(|date| format!("starts {}", date.format("%Y-%m-%d"))),
        }
    }

    pub fn from_job(row: &JobRow) -> Self {
        Self {
            name: format!("{} at {}", row.title, row.company),
            detail: row.apply_link.clone(),
        }
    }

    pub fn from_resource(row: &ResourceRow) -> Self {
        Self {
            name: row.name.clone(),
            detail: row.website.clone(),
        }
    }
}

/// Multiple candidates are never auto-selected; the user picks one.
pub fn format_disambiguation(items: &[DisambiguationItem]) -> String {
    let mut lines = vec!["I found more than one match. Which one do you mean?".to_string()];

    for (idx, item) in items.iter().enumerate() {
        match &item.detail {
            Some(detail) => lines.push(format!("{}. {} ({})", idx + 1, item.name, detail)),
            None => lines.push(format!("{}. {}", idx + 1, item.name)),
        }
    }
    lines.push("Reply with the name of the one you want.".to_string());

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ProgramKey;
    use chrono::NaiveDate;

    fn sample_record() -> ProgramRecord {
        ProgramRecord {
            key: ProgramKey::Culinary,
            keywords: vec!["culinary".to_string()],
            label: "Emilio's Culinary Academy".to_string(),
            location: "Trenton Area Soup Kitchen (Escher St.)".to_string(),
            schedule: "See cohort schedule; 8 weeks instruction + 2-week internship".to_string(),
            duration: "10 weeks".to_string(),
            purpose_outcomes: "ServSafe certification and job placement support.".to_string(),
            instructor: Some("Experienced chefs".to_string()),
            eligibility: "18+".to_string(),
            cost: "Free (covered by TASK).".to_string(),
            next_start_date: NaiveDate::from_ymd_opt(2025, 10, 8),
            application_window: Some("Application open Sept 25 – Oct 1".to_string()),
            signup_link: Some("https://forms.office.com/r/Me7avaaXWx".to_string()),
            contact_info: Some("(609) 337-1624".to_string()),
            exclusivity_note: Some("Not eligible to take SORA at the same time.".to_string()),
        }
    }

    #[test]
    fn when_focus_renders_next_start_and_schedule() {
        let text = format_program_answer(&sample_record(), QuestionFocus::When);
        assert!(text.contains("Next start: 2025-10-08"));
        assert!(text.contains("Schedule: See cohort schedule"));
        assert!(text.contains("Application window: Application open Sept 25"));
    }

    #[test]
    fn cost_focus_is_one_labeled_line() {
        let text = format_program_answer(&sample_record(), QuestionFocus::Cost);
        assert!(text.contains("Cost: Free (covered by TASK)."));
        assert!(!text.contains("Eligibility:"));
    }

    #[test]
    fn missing_next_start_renders_tbd() {
        let mut record = sample_record();
        record.next_start_date = None;
        let text = format_program_answer(&record, QuestionFocus::When);
        assert!(text.contains("Next start: TBD"));
    }

    #[test]
    fn missing_optionals_are_omitted() {
        let mut record = sample_record();
        record.instructor = None;
        record.signup_link = None;
        record.application_window = None;
        let text = format_program_answer(&record, QuestionFocus::General);
        assert!(!text.contains("Instructor:"));
        assert!(!text.contains("Sign up:"));
        assert!(!text.contains("Application window:"));
        assert!(!text.to_lowercase().contains("null"));
        assert!(!text.to_lowercase().contains("undefined"));
    }

    #[test]
    fn general_focus_surfaces_exclusivity_note() {
        let text = format_program_answer(&sample_record(), QuestionFocus::General);
        assert!(text.contains("Note: Not eligible to take SORA at the same time."));
    }

    #[test]
    fn disambiguation_lists_all_candidates() {
        let items = vec![
            DisambiguationItem {
                name: "Forklift Certification Class".to_string(),
                detail: Some("starts 2025-11-01".to_string()),
            },
            DisambiguationItem {
                name: "Warehouse Associate at Acme".to_string(),
                detail: None,
            },
        ];
        let text = format_disambiguation(&items);
        assert!(text.contains("1. Forklift Certification Class (starts 2025-11-01)"));
        assert!(text.contains("2. Warehouse Associate at Acme"));
        assert!(text.contains("Which one do you mean?"));
    }
}
