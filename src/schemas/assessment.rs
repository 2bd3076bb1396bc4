use serde::Deserialize;

/// Assessment detail as served to the student client. Immutable for the
/// duration of an attempt; the correct answers are never present.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct AssessmentDetail {
    pub(crate) id: i64,
    pub(crate) title: String,
    /// Seconds granted per question. Absent means the attempt is untimed.
    #[serde(default)]
    pub(crate) time_per_question: Option<i64>,
    #[serde(default)]
    pub(crate) questions: Vec<Question>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct Question {
    pub(crate) id: i64,
    pub(crate) question_text: String,
    pub(crate) options: Vec<String>,
}
