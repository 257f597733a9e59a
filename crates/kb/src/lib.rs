mod data;

use std::path::Path;

use anyhow::{Context, Result};
use task_core::classify::{CATEGORY_KEYWORDS, PROGRAM_KEYWORDS};
use task_core::{GenericIntentCard, ProgramKey, ProgramRecord, Topic};
use walkdir::WalkDir;

/// Tier-0 knowledge: program records and generic intent cards, loaded once
/// at process start and immutable afterwards.
#[derive(Debug, Clone)]
pub struct AnswerBank {
    programs: Vec<ProgramRecord>,
    cards: Vec<GenericIntentCard>,
}

/// A Tier-0 hit: either an authoritative program record (formatted per
/// question focus by the caller) or a canned intent card.
#[derive(Debug)]
pub enum CannedHit<'a> {
    Program(&'a ProgramRecord),
    Card(&'a GenericIntentCard),
}

impl AnswerBank {
    pub fn builtin() -> Self {
        Self {
            programs: data::builtin_programs(),
            cards: data::builtin_cards(),
        }
    }

    /// Builtin bank with program records overridden by any `*.json` files
    /// under `root` (each file holds an array of program records). Cards
    /// stay builtin.
    pub fn from_data_dir(root: impl AsRef<Path>) -> Result<Self> {
        let mut bank = Self::builtin();

        for entry in WalkDir::new(root.as_ref())
            .into_iter()
            .filter_map(std::result::Result::ok)
            .filter(|entry| entry.file_type().is_file())
            .filter(|entry| {
                entry.path().extension().and_then(|ext| ext.to_str()) == Some("json")
            })
        {
            let path = entry.path();
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("failed reading program data: {}", path.display()))?;
            let records: Vec<ProgramRecord> = serde_json::from_str(&raw)
                .with_context(|| format!("invalid program data: {}", path.display()))?;

            for record in records {
                match bank.programs.iter_mut().find(|p| p.key == record.key) {
                    Some(existing) => *existing = record,
                    None => bank.programs.push(record),
                }
            }
        }

        Ok(bank)
    }

    pub fn programs(&self) -> &[ProgramRecord] {
        &self.programs
    }

    pub fn cards(&self) -> &[GenericIntentCard] {
        &self.cards
    }

    pub fn program(&self, key: ProgramKey) -> Option<&ProgramRecord> {
        self.programs.iter().find(|record| record.key == key)
    }

    pub fn card_for_topic(&self, topic: Topic) -> Option<&GenericIntentCard> {
        self.cards.iter().find(|card| card.topic == topic)
    }

    /// Tier-0 lookup. A resolved topic short-circuits to its record or card;
    /// otherwise the text is scanned against programs and cards and the two
    /// candidates are arbitrated.
    pub fn lookup(&self, topic: Option<Topic>, text: &str) -> Option<CannedHit<'_>> {
        match topic {
            Some(Topic::Program(key)) => return self.program(key).map(CannedHit::Program),
            Some(generic) => {
                if let Some(card) = self.card_for_topic(generic) {
                    return Some(CannedHit::Card(card));
                }
            }
            None => {}
        }

        let lower = text.to_lowercase();
        let program = self.best_program(&lower);
        let card = self.first_card(&lower);

        match (program, card) {
            // A matched program record is authoritative unless the card
            // accrues at least two of its own keyword hits.
            (Some(record), Some((_, hits))) if hits < 2 => Some(CannedHit::Program(record)),
            (_, Some((matched, _))) => Some(CannedHit::Card(matched)),
            (Some(record), None) => Some(CannedHit::Program(record)),
            (None, None) => None,
        }
    }

    /// Highest-scoring program: +1 per keyword hit, +2 for a full-label
    /// substring hit. Ties break by registration order.
    fn best_program(&self, lower: &str) -> Option<&ProgramRecord> {
        let mut best: Option<(&ProgramRecord, usize)> = None;

        for record in &self.programs {
            let mut score = record
                .keywords
                .iter()
                .filter(|keyword| lower.contains(&keyword.to_lowercase()))
                .count();
            if lower.contains(&record.label.to_lowercase()) {
                score += 2;
            }

            if score > 0 && best.map(|(_, s)| score > s).unwrap_or(true) {
                best = Some((record, score));
            }
        }

        best.map(|(record, _)| record)
    }

    /// First registered card with any keyword hit, plus its hit count.
    fn first_card(&self, lower: &str) -> Option<(&GenericIntentCard, usize)> {
        for card in &self.cards {
            let hits = card
                .keywords
                .iter()
                .filter(|keyword| lower.contains(*keyword))
                .count();
            if hits > 0 {
                return Some((card, hits));
            }
        }

        None
    }
}

impl Default for AnswerBank {
    fn default() -> Self {
        Self::builtin()
    }
}

/// The classifier keyword tables and the builtin records must agree on the
/// program keys they know about.
pub fn verify_keyword_tables(bank: &AnswerBank) -> Result<()> {
    for (key, _) in PROGRAM_KEYWORDS {
        anyhow::ensure!(
            bank.program(*key).is_some(),
            "classifier knows program {:?} but the answer bank has no record for it",
            key
        );
    }
    for (topic, _) in CATEGORY_KEYWORDS {
        anyhow::ensure!(
            bank.card_for_topic(*topic).is_some(),
            "classifier knows category {:?} but the answer bank has no card for it",
            topic
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_bank_is_consistent_with_classifier_tables() {
        verify_keyword_tables(&AnswerBank::builtin()).unwrap();
    }

    #[test]
    fn program_name_substring_beats_single_card_hit() {
        let bank = AnswerBank::builtin();
        // The forklift quick card matches once, but the program record wins.
        match bank.lookup(None, "is the forklift class good for getting a job") {
            Some(CannedHit::Program(record)) => assert_eq!(record.key, ProgramKey::Forklift),
            other => panic!("expected forklift program, got {:?}", other),
        }
    }

    #[test]
    fn two_card_hits_beat_a_program_match() {
        let bank = AnswerBank::builtin();
        // "appointment" and "social worker" both hit the appointments card.
        match bank.lookup(None, "book an appointment with a social worker about forklift") {
            Some(CannedHit::Card(card)) => assert_eq!(card.id, "appointments"),
            other => panic!("expected appointments card, got {:?}", other),
        }
    }

    #[test]
    fn resolved_program_topic_short_circuits() {
        let bank = AnswerBank::builtin();
        match bank.lookup(Some(Topic::Program(ProgramKey::Culinary)), "details about culinary") {
            Some(CannedHit::Program(record)) => assert_eq!(record.key, ProgramKey::Culinary),
            other => panic!("expected culinary program, got {:?}", other),
        }
    }

    #[test]
    fn lookup_is_deterministic() {
        let bank = AnswerBank::builtin();
        let first = match bank.lookup(None, "warehouse certification") {
            Some(CannedHit::Program(record)) => record.key,
            other => panic!("expected a program, got {:?}", other),
        };
        for _ in 0..5 {
            match bank.lookup(None, "warehouse certification") {
                Some(CannedHit::Program(record)) => assert_eq!(record.key, first),
                other => panic!("expected a program, got {:?}", other),
            }
        }
    }

    #[test]
    fn no_match_returns_none() {
        let bank = AnswerBank::builtin();
        assert!(bank.lookup(None, "zxqwv plumbing on mars").is_none());
    }

    #[test]
    fn crisis_keywords_reach_the_crisis_card() {
        let bank = AnswerBank::builtin();
        match bank.lookup(None, "I feel overwhelmed and depressed") {
            Some(CannedHit::Card(card)) => assert_eq!(card.topic, Topic::Crisis),
            other => panic!("expected crisis card, got {:?}", other),
        }
    }
}
