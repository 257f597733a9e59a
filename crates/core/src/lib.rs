pub mod classify;
pub mod format;
pub mod models;
pub mod topic;

pub use classify::{
    classify_question_focus, detect_lang, detect_topic, is_generic_follow_up, normalize_text,
};
pub use format::{
    format_disambiguation, format_job_summary, format_program_answer, format_resource_summary,
    format_training_detail, DisambiguationItem, APOLOGY_FALLBACK, EMPTY_COMPLETION_FALLBACK,
};
pub use models::*;
pub use topic::{resolve_topic, TopicResolution};
