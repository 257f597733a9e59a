use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use task_core::{
    classify_question_focus, detect_lang, format_disambiguation, format_job_summary,
    format_program_answer, format_resource_summary, format_training_detail, normalize_text,
    resolve_topic, Answer, AnswerSource, ChatInput, DisambiguationItem, JobRow, Lang, QuestionFocus,
    ResourceRow, Topic, TopicResolution, TrainingRow, APOLOGY_FALLBACK,
};
use task_kb::{AnswerBank, CannedHit};
use task_llm::{answer_fallback, translate_answer, GenerativeClient};
use task_observability::AppMetrics;
use task_records::{RecordStore, StoreResult};
use tracing::{info, instrument, warn};

/// Knobs for the tiered pipeline. Defaults match production behavior: a
/// broken record store degrades to the generative tier instead of failing
/// the turn, and non-English answers go through the translation pass.
#[derive(Debug, Clone)]
pub struct RouterConfig {
    pub fall_through_on_store_error: bool,
    pub translate_answers: bool,
    pub search_limit: usize,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            fall_through_on_store_error: true,
            translate_answers: true,
            search_limit: 8,
        }
    }
}

/// The tiered router: Tier-0 canned answers, Tier-1 external records,
/// Tier-2 generative fallback. Stateless per call; topic continuity rides
/// on the `last_topic` the caller echoes back.
pub struct QueryRouter<S, G> {
    bank: Arc<AnswerBank>,
    store: Arc<S>,
    generative: Arc<G>,
    metrics: Arc<AppMetrics>,
    config: RouterConfig,
}

/// One Tier-1 candidate, in merge-priority order: trainings, then jobs,
/// then resources.
enum RecordHit {
    Training(TrainingRow),
    Job(JobRow),
    Resource(ResourceRow),
}

impl RecordHit {
    fn detail(&self) -> String {
        match self {
            Self::Training(row) => format_training_detail(row),
            Self::Job(row) => format_job_summary(row),
            Self::Resource(row) => format_resource_summary(row),
        }
    }

    fn disambiguation_item(&self) -> DisambiguationItem {
        match self {
            Self::Training(row) => DisambiguationItem::from_training(row),
            Self::Job(row) => DisambiguationItem::from_job(row),
            Self::Resource(row) => DisambiguationItem::from_resource(row),
        }
    }
}

impl<S: RecordStore, G: GenerativeClient> QueryRouter<S, G> {
    pub fn new(
        bank: Arc<AnswerBank>,
        store: Arc<S>,
        generative: Arc<G>,
        metrics: Arc<AppMetrics>,
    ) -> Self {
        Self {
            bank,
            store,
            generative,
            metrics,
            config: RouterConfig::default(),
        }
    }

    pub fn with_config(mut self, config: RouterConfig) -> Self {
        self.config = config;
        self
    }

    pub fn metrics(&self) -> Arc<AppMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Route one turn through the tiers. Always answers unless the store
    /// fails and `fall_through_on_store_error` is off.
    #[instrument(skip(self, input))]
    pub async fn handle(&self, input: ChatInput) -> Result<Answer> {
        let started = Instant::now();
        self.metrics.inc_request();

        let text = normalize_text(&input.text);
        // Language detection always looks at the user's original words, not
        // the topic-expanded query.
        let lang = Lang::from_optional_str(input.lang.as_deref())
            .unwrap_or_else(|| detect_lang(&input.text));
        let last_topic = input.last_topic.as_deref().and_then(Topic::parse);
        let resolved = resolve_topic(&text, last_topic);
        let focus = classify_question_focus(&text);

        let answer = self.route(&input.text, &resolved, focus, lang).await?;

        self.metrics.observe_latency(started.elapsed());
        info!(
            source = answer.source.as_code(),
            topic = answer.topic.map(Topic::as_code).unwrap_or("none"),
            lang = answer.lang.as_code(),
            continuation = resolved.continuation,
            "routed chat turn"
        );

        Ok(answer)
    }

    async fn route(
        &self,
        original: &str,
        resolved: &TopicResolution,
        focus: QuestionFocus,
        lang: Lang,
    ) -> Result<Answer> {
        // The resolved topic only short-circuits sticky follow-ups. A fresh
        // turn goes through the full scored scan so a card with enough of
        // its own keyword hits can outrank a mentioned program.
        let canned_topic = if resolved.continuation {
            resolved.topic
        } else {
            None
        };
        if let Some(hit) = self.bank.lookup(canned_topic, &resolved.effective_text) {
            self.metrics.inc_tier0_hit();
            let (text, topic) = match hit {
                CannedHit::Program(record) => (
                    format_program_answer(record, focus),
                    Topic::Program(record.key),
                ),
                CannedHit::Card(card) => (card.body.clone(), card.topic),
            };
            let text = self.localize(text, lang).await;
            return Ok(Answer {
                text,
                source: AnswerSource::Canned,
                topic: Some(topic),
                lang,
            });
        }

        let terms = search_terms(resolved);
        if !terms.is_empty() {
            match self.search_records(&terms, resolved.topic).await {
                Ok(hits) if hits.len() == 1 => {
                    self.metrics.inc_tier1_hit();
                    let text = self.localize(hits[0].detail(), lang).await;
                    return Ok(Answer {
                        text,
                        source: AnswerSource::Records,
                        topic: resolved.topic,
                        lang,
                    });
                }
                Ok(hits) if hits.len() > 1 => {
                    // Multiple candidates are never auto-selected.
                    self.metrics.inc_disambiguation();
                    let items: Vec<DisambiguationItem> =
                        hits.iter().map(RecordHit::disambiguation_item).collect();
                    let text = self.localize(format_disambiguation(&items), lang).await;
                    return Ok(Answer {
                        text,
                        source: AnswerSource::Disambiguation,
                        topic: resolved.topic,
                        lang,
                    });
                }
                Ok(_) => {}
                Err(err) => {
                    self.metrics.inc_store_error();
                    warn!(error = %err, "record store lookup failed");
                    if !self.config.fall_through_on_store_error {
                        return Err(err.into());
                    }
                }
            }
        }

        self.tier2(original, resolved.topic, lang).await
    }

    /// Tier-1. A program topic scopes the search to trainings, jobs and
    /// resources topics to their own tables; everything else fans out to
    /// all three concurrently, merged trainings first.
    async fn search_records(
        &self,
        terms: &[String],
        topic: Option<Topic>,
    ) -> StoreResult<Vec<RecordHit>> {
        let limit = self.config.search_limit;

        match topic {
            Some(Topic::Program(_)) => Ok(self
                .store
                .search_trainings(terms, limit)
                .await?
                .into_iter()
                .map(RecordHit::Training)
                .collect()),
            Some(Topic::Jobs) => Ok(self
                .store
                .search_jobs(terms, limit)
                .await?
                .into_iter()
                .map(RecordHit::Job)
                .collect()),
            Some(Topic::Resources) => Ok(self
                .store
                .search_resources(terms, limit)
                .await?
                .into_iter()
                .map(RecordHit::Resource)
                .collect()),
            _ => {
                let (trainings, jobs, resources) = tokio::join!(
                    self.store.search_trainings(terms, limit),
                    self.store.search_jobs(terms, limit),
                    self.store.search_resources(terms, limit),
                );

                let mut hits: Vec<RecordHit> =
                    trainings?.into_iter().map(RecordHit::Training).collect();
                hits.extend(jobs?.into_iter().map(RecordHit::Job));
                hits.extend(resources?.into_iter().map(RecordHit::Resource));
                Ok(hits)
            }
        }
    }

    /// Tier-2. The generative service sees the user's original message, not
    /// the expanded query, and its output is never translated. An upstream
    /// failure becomes the fixed apology answer instead of an error payload.
    async fn tier2(&self, original: &str, topic: Option<Topic>, lang: Lang) -> Result<Answer> {
        self.metrics.inc_fallback();

        match answer_fallback(self.generative.as_ref(), original).await {
            Ok(text) => Ok(Answer {
                text,
                source: AnswerSource::Generative,
                topic,
                lang,
            }),
            Err(err) => {
                warn!(error = %err, "generative fallback failed, serving apology");
                Ok(Answer {
                    text: APOLOGY_FALLBACK.to_string(),
                    source: AnswerSource::Apology,
                    topic,
                    lang,
                })
            }
        }
    }

    /// Translation pass for Tier-0/Tier-1 output. Failure is non-fatal: the
    /// English text goes out and the failure is counted.
    async fn localize(&self, text: String, lang: Lang) -> String {
        if !self.config.translate_answers || lang == Lang::En {
            return text;
        }

        match translate_answer(self.generative.as_ref(), &text, lang).await {
            Ok(translated) => translated,
            Err(err) => {
                self.metrics.inc_translation_failure();
                warn!(error = %err, lang = lang.as_code(), "translation failed, returning original text");
                text
            }
        }
    }
}

/// Tier-1 hint terms: a resolved topic supplies its search term; otherwise
/// the raw query is the sole term when it has at least three characters.
fn search_terms(resolved: &TopicResolution) -> Vec<String> {
    if let Some(topic) = resolved.topic {
        return vec![topic.search_term().to_string()];
    }

    let text = resolved.effective_text.trim();
    if text.chars().count() < 3 {
        Vec::new()
    } else {
        vec![text.to_string()]
    }
}
