use serde::{Deserialize, Serialize};

/// One student's run through an assessment, owned by the server. The client
/// holds a read-mostly cached copy plus locally buffered edits.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct Attempt {
    pub(crate) id: i64,
    pub(crate) assessment_id: i64,
    /// Raw server timestamp; parsed as UTC by `core::time::parse_utc_timestamp`.
    pub(crate) started_at: String,
    #[serde(default)]
    pub(crate) submitted_at: Option<String>,
    #[serde(default)]
    pub(crate) answers: Vec<SavedAnswer>,
}

/// A server-confirmed answer, unique per (attempt, question).
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct SavedAnswer {
    pub(crate) question_id: i64,
    pub(crate) selected_answer: String,
}

/// Payload for the answer upsert endpoint.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct AnswerSubmit {
    pub(crate) question_id: i64,
    pub(crate) selected_answer: String,
    pub(crate) time_taken: i64,
}
