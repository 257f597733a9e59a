use crate::classify::{detect_topic, is_generic_follow_up};
use crate::models::Topic;

/// Outcome of resolving the topic for one turn. `effective_text` is what the
/// downstream tiers should search with; for a sticky follow-up it is the
/// query expanded with the inherited topic so a substring filter still has a
/// usable term.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicResolution {
    pub topic: Option<Topic>,
    pub effective_text: String,
    pub continuation: bool,
}

/// Explicit topic in the text wins; a generic follow-up reuses the caller's
/// `last_topic`; anything else is open-domain. Holds no state: the caller
/// persists the resolved topic and echoes it back on the next turn.
pub fn resolve_topic(text: &str, last_topic: Option<Topic>) -> TopicResolution {
    if let Some(topic) = detect_topic(text) {
        return TopicResolution {
            topic: Some(topic),
            effective_text: text.to_string(),
            continuation: false,
        };
    }

    if let Some(last) = last_topic {
        if is_generic_follow_up(text) {
            return TopicResolution {
                topic: Some(last),
                effective_text: format!("details about {}", last.search_term()),
                continuation: true,
            };
        }
    }

    TopicResolution {
        topic: None,
        effective_text: text.to_string(),
        continuation: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ProgramKey;

    #[test]
    fn explicit_topic_beats_sticky_topic() {
        let resolved = resolve_topic("tell me about sora", Some(Topic::Program(ProgramKey::Forklift)));
        assert_eq!(resolved.topic, Some(Topic::Program(ProgramKey::Sora)));
        assert!(!resolved.continuation);
    }

    #[test]
    fn follow_up_reuses_last_topic_and_expands_text() {
        let resolved = resolve_topic("cost?", Some(Topic::Program(ProgramKey::Forklift)));
        assert_eq!(resolved.topic, Some(Topic::Program(ProgramKey::Forklift)));
        assert!(resolved.continuation);
        assert_eq!(resolved.effective_text, "details about forklift");
    }

    #[test]
    fn follow_up_without_context_is_open_domain() {
        let resolved = resolve_topic("details", None);
        assert_eq!(resolved.topic, None);
        assert_eq!(resolved.effective_text, "details");
    }

    #[test]
    fn non_follow_up_without_topic_is_open_domain() {
        let resolved = resolve_topic("zxqwv", Some(Topic::Jobs));
        assert_eq!(resolved.topic, None);
        assert!(!resolved.continuation);
    }
}
