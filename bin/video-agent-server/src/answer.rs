//! Deterministic retrieval-based answering over video transcripts.
//!
//! Queries are tokenized, stop words dropped, and transcript sentences
//! ranked by term overlap. The top sentences become the answer together
//! with their start timestamps and a step-by-step trace of the run.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entities::TranscriptSentence;

/// How many sentences back an answer at most.
const TOP_K: usize = 3;

/// Reply used when no transcript sentence shares a term with the query.
pub const NO_MATCH_ANSWER: &str =
    "I could not find relevant content in the video transcript for this question.";

/// A transcript sentence retrieved for a query, with its time range in
/// seconds.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RetrievedDocument {
    pub text: String,
    pub begin_time: f64,
    pub end_time: f64,
}

/// One step of the answering pipeline, recorded for display in the UI.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ThinkingStep {
    pub step_type: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub documents: Option<Vec<RetrievedDocument>>,
}

#[derive(Debug, Clone)]
pub struct QueryAnswer {
    pub answer: String,
    /// Start times of the matched sentences, in seconds, ascending.
    pub timestamps: Vec<f64>,
    pub steps: Vec<ThinkingStep>,
}

/// Answer `query` using the transcript `sentences` of a single video.
pub fn answer_query(sentences: &[TranscriptSentence], query: &str) -> QueryAnswer {
    let mut steps = Vec::new();

    let terms = tokenize(query);
    steps.push(ThinkingStep {
        step_type: "analyze".to_string(),
        description: "Extracted search terms from the question".to_string(),
        result: Some(terms.join(", ")),
        documents: None,
    });

    let mut scored: Vec<(usize, &TranscriptSentence)> = sentences
        .iter()
        .filter_map(|s| {
            let score = overlap_score(&terms, s);
            (score > 0).then_some((score, s))
        })
        .collect();
    // Equal scores break by earlier start time, regardless of the channel
    // ordering the sentences arrive in.
    scored.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.begin_time.cmp(&b.1.begin_time)));
    scored.truncate(TOP_K);

    let documents: Vec<RetrievedDocument> = scored
        .iter()
        .map(|(_, s)| RetrievedDocument {
            text: s.text.clone(),
            begin_time: s.begin_time as f64 / 1000.0,
            end_time: s.end_time as f64 / 1000.0,
        })
        .collect();
    steps.push(ThinkingStep {
        step_type: "retrieve".to_string(),
        description: format!(
            "Searched {} transcript sentences, kept the {} best matches",
            sentences.len(),
            documents.len()
        ),
        result: None,
        documents: Some(documents.clone()),
    });

    if documents.is_empty() {
        steps.push(ThinkingStep {
            step_type: "answer".to_string(),
            description: "No sentence shared a term with the question".to_string(),
            result: Some(NO_MATCH_ANSWER.to_string()),
            documents: None,
        });
        return QueryAnswer {
            answer: NO_MATCH_ANSWER.to_string(),
            timestamps: Vec::new(),
            steps,
        };
    }

    let answer = documents
        .iter()
        .map(|d| d.text.trim())
        .collect::<Vec<_>>()
        .join(" ");
    let mut timestamps: Vec<f64> = documents.iter().map(|d| d.begin_time).collect();
    timestamps.sort_by(f64::total_cmp);

    steps.push(ThinkingStep {
        step_type: "answer".to_string(),
        description: "Composed the answer from the matched sentences".to_string(),
        result: Some(answer.clone()),
        documents: None,
    });

    QueryAnswer {
        answer,
        timestamps,
        steps,
    }
}

/// Lowercased alphanumeric terms of `text`, stop words removed,
/// deduplicated in first-seen order.
fn tokenize(text: &str) -> Vec<String> {
    let mut terms = Vec::new();
    for raw in text.split(|c: char| !c.is_alphanumeric()) {
        if raw.is_empty() {
            continue;
        }
        let term = raw.to_lowercase();
        if is_stop_word(&term) || terms.contains(&term) {
            continue;
        }
        terms.push(term);
    }
    terms
}

fn is_stop_word(term: &str) -> bool {
    matches!(
        term,
        "a" | "an"
            | "and"
            | "are"
            | "at"
            | "be"
            | "by"
            | "did"
            | "do"
            | "does"
            | "for"
            | "from"
            | "how"
            | "in"
            | "is"
            | "it"
            | "of"
            | "on"
            | "or"
            | "that"
            | "the"
            | "this"
            | "to"
            | "was"
            | "what"
            | "when"
            | "where"
            | "which"
            | "who"
            | "why"
            | "with"
    )
}

/// Number of query terms that appear in the sentence.
fn overlap_score(terms: &[String], sentence: &TranscriptSentence) -> usize {
    let sentence_terms = tokenize(&sentence.text);
    terms
        .iter()
        .filter(|t| sentence_terms.contains(t))
        .count()
}

#[cfg(test)]
mod test {
    use super::*;

    fn sentence(id: i64, begin_ms: i64, end_ms: i64, text: &str) -> TranscriptSentence {
        TranscriptSentence {
            id: format!("s{id}"),
            video_id: "v1".to_string(),
            channel_id: 0,
            sentence_id: id,
            begin_time: begin_ms,
            end_time: end_ms,
            language: "en".to_string(),
            emotion: "neutral".to_string(),
            text: text.to_string(),
        }
    }

    #[test]
    fn tokenize_drops_stop_words_and_duplicates() {
        let terms = tokenize("What is the training loss of the model?");
        assert_eq!(terms, vec!["training", "loss", "model"]);
    }

    #[test]
    fn answers_with_best_matching_sentences() {
        let sentences = vec![
            sentence(1, 0, 4000, "Welcome everyone to the lecture."),
            sentence(2, 4000, 9000, "The training loss decreases over time."),
            sentence(3, 9000, 15000, "Our model uses attention layers."),
        ];
        let result = answer_query(&sentences, "How does the training loss change?");
        assert!(result.answer.contains("training loss"));
        assert_eq!(result.timestamps, vec![4.0]);
        assert_eq!(result.steps.len(), 3);
    }

    #[test]
    fn timestamps_are_seconds_in_ascending_order() {
        let sentences = vec![
            sentence(1, 30_000, 35_000, "The model converges quickly."),
            sentence(2, 5_000, 10_000, "We train the model on video data."),
        ];
        let result = answer_query(&sentences, "Tell me about the model training");
        assert_eq!(result.timestamps, vec![5.0, 30.0]);
    }

    #[test]
    fn limits_matches_to_top_three() {
        let sentences: Vec<_> = (0..6)
            .map(|i| sentence(i, i * 1000, (i + 1) * 1000, "the model is great"))
            .collect();
        let result = answer_query(&sentences, "model");
        assert_eq!(result.timestamps.len(), 3);
    }

    #[test]
    fn equal_scores_prefer_earlier_start_across_channels() {
        // Channel 0 sorts first in store order but starts latest.
        let mut sentences = vec![sentence(1, 50_000, 55_000, "the model is great")];
        for (i, begin_ms) in [(2, 5_000), (3, 10_000), (4, 20_000)] {
            let mut s = sentence(i, begin_ms, begin_ms + 4_000, "the model is great");
            s.channel_id = 1;
            sentences.push(s);
        }
        let result = answer_query(&sentences, "model");
        assert_eq!(result.timestamps, vec![5.0, 10.0, 20.0]);
    }

    #[test]
    fn falls_back_when_nothing_matches() {
        let sentences = vec![sentence(1, 0, 5000, "Completely unrelated content.")];
        let result = answer_query(&sentences, "quantum entanglement");
        assert_eq!(result.answer, NO_MATCH_ANSWER);
        assert!(result.timestamps.is_empty());
    }

    #[test]
    fn empty_transcript_falls_back() {
        let result = answer_query(&[], "anything at all");
        assert_eq!(result.answer, NO_MATCH_ANSWER);
    }
}
