use std::collections::HashMap;

use serde::Serialize;

use crate::{
    anki::{
        AnkiClient,
        NewNote,
    },
    llm::LlmClient,
};

/// Everything a batch run shares across words.
pub struct BatchJob<'a> {
    pub deck_name: &'a str,
    pub model_name: &'a str,
    pub field_names: &'a [String],
    pub language: &'a str,
    pub instructions: Option<&'a str>,
    pub sources: &'a [&'a str],
    pub default_tags: &'a [String],
}

#[derive(Debug, Serialize)]
pub struct WordOutcome {
    pub word: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note_id: Option<u64>,
    pub fields: HashMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl WordOutcome {
    fn added(word: &str, note_id: u64, fields: HashMap<String, String>) -> Self {
        Self { word: word.to_string(), success: true, note_id: Some(note_id), fields, error: None }
    }

    fn failed(word: &str, fields: HashMap<String, String>, error: String) -> Self {
        Self { word: word.to_string(), success: false, note_id: None, fields, error: Some(error) }
    }
}

#[derive(Debug, Serialize)]
pub struct BatchSummary {
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
}

impl BatchSummary {
    pub fn from_results(results: &[WordOutcome]) -> Self {
        let successful = results.iter().filter(|r| r.success).count();
        Self { total: results.len(), successful, failed: results.len() - successful }
    }
}

#[derive(Debug, Serialize)]
pub struct BatchReport {
    pub results: Vec<WordOutcome>,
    pub summary: BatchSummary,
}

/// Generate fields for one word and push the note to the flashcard app.
/// Every failure is captured in the outcome; nothing propagates.
pub async fn generate_one(
    anki: &AnkiClient,
    llm: &LlmClient,
    word: &str,
    job: &BatchJob<'_>,
) -> WordOutcome {
    let fields = match llm
        .generate_note(
            word,
            job.model_name,
            job.field_names,
            job.language,
            job.instructions,
            None,
        )
        .await
    {
        Ok(fields) => fields,
        Err(e) => return WordOutcome::failed(word, HashMap::new(), e.to_string()),
    };

    let note = NewNote::generated(
        job.deck_name,
        job.model_name,
        fields.clone(),
        job.language,
        job.sources,
        job.default_tags,
    );

    match anki.add_notes(&[note]).await {
        Ok(ids) => match ids.into_iter().next().flatten() {
            Some(note_id) => WordOutcome::added(word, note_id, fields),
            None => {
                WordOutcome::failed(word, fields, "Failed to add note to Anki".to_string())
            }
        },
        Err(e) => WordOutcome::failed(word, fields, e.to_string()),
    }
}

/// Sequential generate-and-add over the whole word list, continuing past
/// per-word failures. Summary counts always sum to the input size.
pub async fn run_batch(
    anki: &AnkiClient,
    llm: &LlmClient,
    words: &[String],
    job: &BatchJob<'_>,
) -> BatchReport {
    let mut results = Vec::with_capacity(words.len());
    for word in words {
        let outcome = generate_one(anki, llm, word, job).await;
        if let Some(error) = &outcome.error {
            tracing::warn!("Batch item '{}' failed: {}", word, error);
        }
        results.push(outcome);
    }

    let summary = BatchSummary::from_results(&results);
    BatchReport { results, summary }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(word: &str, success: bool) -> WordOutcome {
        WordOutcome {
            word: word.to_string(),
            success,
            note_id: success.then_some(1),
            fields: HashMap::new(),
            error: (!success).then(|| "boom".to_string()),
        }
    }

    #[test]
    fn summary_counts_sum_to_input_size() {
        let results =
            vec![outcome("a", true), outcome("b", false), outcome("c", true), outcome("d", false)];
        let summary = BatchSummary::from_results(&results);
        assert_eq!(summary.total, 4);
        assert_eq!(summary.successful, 2);
        assert_eq!(summary.failed, 2);
        assert_eq!(summary.successful + summary.failed, summary.total);
    }

    #[test]
    fn empty_batch_has_zero_summary() {
        let summary = BatchSummary::from_results(&[]);
        assert_eq!(summary.total, 0);
        assert_eq!(summary.successful, 0);
        assert_eq!(summary.failed, 0);
    }

    #[test]
    fn failed_outcome_serializes_error_and_skips_note_id() {
        let json = serde_json::to_value(outcome("a", false)).unwrap();
        assert_eq!(json["error"], "boom");
        assert!(json.get("note_id").is_none());
    }
}
