use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;
use time::OffsetDateTime;

use crate::core::time::parse_utc_timestamp;
use crate::schemas::assessment::{AssessmentDetail, Question};
use crate::schemas::attempt::AnswerSubmit;
use crate::services::attempt_api::{AttemptService, ServiceError};
use crate::services::attempt_timing::{remaining_seconds, total_duration_seconds};

#[derive(Debug, Error)]
pub(crate) enum LoadError {
    #[error("you have already submitted this assessment")]
    AlreadySubmitted,
    #[error("this assessment has no questions")]
    NoQuestions,
    #[error("failed to load assessment: {0}")]
    Unavailable(String),
}

impl From<ServiceError> for LoadError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Forbidden(_) => LoadError::AlreadySubmitted,
            other => LoadError::Unavailable(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Phase {
    InProgress,
    Submitting,
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SubmitMode {
    Manual,
    Auto,
}

#[derive(Debug)]
pub(crate) enum AdvanceOutcome {
    /// Empty selection, another call in flight, or the attempt is no longer
    /// in progress. Nothing happened, no network call was made.
    Ignored,
    /// Answer persisted, moved to the next question.
    Moved { index: usize },
    /// Answer persisted on the last question and the attempt was submitted.
    Submitted,
    /// The server reports the attempt closed; nothing left to do here.
    Closed,
    /// Save failed; the student stays on the question and may retry.
    SaveFailed(ServiceError),
    /// Final manual submit failed; the single-flight guard has been reset.
    SubmitFailed(ServiceError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TickOutcome {
    /// Untimed attempt, countdown already exhausted, or not in progress.
    Idle,
    Running(i64),
    /// The 1 -> 0 transition. Reported exactly once per attempt.
    Expired,
}

#[derive(Debug)]
pub(crate) enum SubmitOutcome {
    /// A submit is already in flight or the attempt is already done.
    Ignored,
    Submitted(SubmitMode),
    Failed(ServiceError),
}

/// Client-side state machine for exactly one attempt.
///
/// All state lives here and is only touched from the session event loop, so
/// every mutating operation is serialized and the expiry handler always
/// observes the live selection and question index.
pub(crate) struct AttemptController {
    service: Arc<dyn AttemptService>,
    assessment: AssessmentDetail,
    attempt_id: i64,
    questions: Vec<Question>,
    /// Local mirror of server-confirmed answers, keyed by question id.
    saved_answers: HashMap<i64, String>,
    current_index: usize,
    selected_option: Option<String>,
    /// `None` when the assessment carries no per-question duration.
    remaining: Option<i64>,
    /// Countdown value when the current question came on screen; the delta to
    /// `remaining` is reported as `time_taken` on save.
    question_entered_at: Option<i64>,
    advance_in_flight: bool,
    submit_in_flight: bool,
    phase: Phase,
}

impl AttemptController {
    /// Fetches the assessment, starts or resumes the attempt, hydrates
    /// previously saved answers and computes the initial countdown.
    pub(crate) async fn initialize(
        service: Arc<dyn AttemptService>,
        assessment_id: i64,
        now: OffsetDateTime,
    ) -> Result<Self, LoadError> {
        let assessment = service.get_assessment(assessment_id).await?;
        let attempt = service.start_or_resume_attempt(assessment_id).await?;

        if attempt.submitted_at.is_some() {
            // The server normally answers 403 for a closed attempt; this
            // covers a resume response that carries the closed state instead.
            return Err(LoadError::AlreadySubmitted);
        }

        if assessment.questions.is_empty() {
            return Err(LoadError::NoQuestions);
        }

        let remaining = match assessment.time_per_question {
            Some(per_question) => {
                let started_at = parse_utc_timestamp(&attempt.started_at)
                    .map_err(|err| LoadError::Unavailable(err.to_string()))?;
                let total = total_duration_seconds(per_question, assessment.questions.len());
                Some(remaining_seconds(total, started_at, now))
            }
            None => None,
        };

        let saved_answers: HashMap<i64, String> = attempt
            .answers
            .iter()
            .map(|answer| (answer.question_id, answer.selected_answer.clone()))
            .collect();

        let questions = assessment.questions.clone();
        let selected_option = saved_answers.get(&questions[0].id).cloned();

        tracing::info!(
            assessment_id = attempt.assessment_id,
            attempt_id = attempt.id,
            questions = questions.len(),
            hydrated_answers = saved_answers.len(),
            remaining = ?remaining,
            "attempt initialized"
        );

        Ok(Self {
            service,
            assessment,
            attempt_id: attempt.id,
            questions,
            saved_answers,
            current_index: 0,
            selected_option,
            remaining,
            question_entered_at: remaining,
            advance_in_flight: false,
            submit_in_flight: false,
            phase: Phase::InProgress,
        })
    }

    pub(crate) fn title(&self) -> &str {
        &self.assessment.title
    }

    pub(crate) fn attempt_id(&self) -> i64 {
        self.attempt_id
    }

    pub(crate) fn question_count(&self) -> usize {
        self.questions.len()
    }

    pub(crate) fn current_index(&self) -> usize {
        self.current_index
    }

    pub(crate) fn current_question(&self) -> &Question {
        &self.questions[self.current_index]
    }

    pub(crate) fn selected_option(&self) -> Option<&str> {
        self.selected_option.as_deref()
    }

    pub(crate) fn remaining(&self) -> Option<i64> {
        self.remaining
    }

    pub(crate) fn has_countdown(&self) -> bool {
        self.remaining.is_some()
    }

    pub(crate) fn time_expired(&self) -> bool {
        self.remaining == Some(0)
    }

    pub(crate) fn is_done(&self) -> bool {
        self.phase == Phase::Done
    }

    /// Pure local update of the pending selection. Ignored once time has
    /// expired, so a click cannot race the expiry tick, and ignored for
    /// options the current question does not offer.
    pub(crate) fn select_option(&mut self, option: &str) {
        if self.phase != Phase::InProgress || self.time_expired() {
            return;
        }
        if !self.current_question().options.iter().any(|candidate| candidate.as_str() == option) {
            return;
        }
        self.selected_option = Some(option.to_string());
    }

    /// Persists the pending selection, then advances, or submits when this
    /// was the last question. Single-flight; an empty selection is a no-op.
    pub(crate) async fn confirm_and_advance(&mut self) -> AdvanceOutcome {
        if self.phase != Phase::InProgress || self.advance_in_flight || self.submit_in_flight {
            return AdvanceOutcome::Ignored;
        }
        let Some(selection) = self.selected_option.clone() else {
            return AdvanceOutcome::Ignored;
        };

        self.advance_in_flight = true;
        let question_id = self.current_question().id;
        let payload = AnswerSubmit {
            question_id,
            selected_answer: selection.clone(),
            time_taken: self.time_on_question(),
        };

        match self.service.save_answer(self.attempt_id, &payload).await {
            Ok(()) => {}
            Err(ServiceError::Forbidden(detail)) => {
                tracing::warn!(
                    attempt_id = self.attempt_id,
                    question_id,
                    detail = %detail,
                    "attempt closed server-side while saving answer"
                );
                self.advance_in_flight = false;
                self.phase = Phase::Done;
                return AdvanceOutcome::Closed;
            }
            Err(err) => {
                tracing::error!(
                    attempt_id = self.attempt_id,
                    question_id,
                    error = %err,
                    "failed to save answer"
                );
                self.advance_in_flight = false;
                return AdvanceOutcome::SaveFailed(err);
            }
        }

        self.saved_answers.insert(question_id, selection);
        self.advance_in_flight = false;

        if self.current_index + 1 < self.questions.len() {
            self.current_index += 1;
            self.selected_option = self.saved_answers.get(&self.current_question().id).cloned();
            self.question_entered_at = self.remaining;
            return AdvanceOutcome::Moved { index: self.current_index };
        }

        match self.submit(SubmitMode::Manual).await {
            SubmitOutcome::Submitted(_) => AdvanceOutcome::Submitted,
            SubmitOutcome::Failed(err) => AdvanceOutcome::SubmitFailed(err),
            SubmitOutcome::Ignored => AdvanceOutcome::Ignored,
        }
    }

    /// One-second countdown step. Returns `Expired` exactly once, on the
    /// transition to zero; later ticks are idle.
    pub(crate) fn tick(&mut self) -> TickOutcome {
        if self.phase != Phase::InProgress {
            return TickOutcome::Idle;
        }
        let Some(remaining) = self.remaining else {
            return TickOutcome::Idle;
        };
        if remaining == 0 {
            return TickOutcome::Idle;
        }

        let next = remaining - 1;
        self.remaining = Some(next);
        if next == 0 {
            TickOutcome::Expired
        } else {
            TickOutcome::Running(next)
        }
    }

    /// Expiry path: flush the selection that is live *now*, not whatever was
    /// current when the ticker started, then submit. The flush is
    /// best-effort; submission proceeds whether or not it landed.
    pub(crate) async fn auto_submit(&mut self) -> SubmitOutcome {
        if self.phase != Phase::InProgress || self.submit_in_flight {
            return SubmitOutcome::Ignored;
        }

        if let Some(selection) = self.selected_option.clone() {
            let question_id = self.current_question().id;
            let payload = AnswerSubmit {
                question_id,
                selected_answer: selection.clone(),
                time_taken: self.time_on_question(),
            };
            match self.service.save_answer(self.attempt_id, &payload).await {
                Ok(()) => {
                    self.saved_answers.insert(question_id, selection);
                }
                Err(err) => {
                    tracing::warn!(
                        attempt_id = self.attempt_id,
                        question_id,
                        error = %err,
                        "failed to flush final answer before auto-submit"
                    );
                }
            }
        }

        self.submit(SubmitMode::Auto).await
    }

    /// Finalizes the attempt. Single-flight; `Forbidden` from the server
    /// means someone already submitted, which reads the same as success.
    pub(crate) async fn submit(&mut self, mode: SubmitMode) -> SubmitOutcome {
        if self.submit_in_flight || self.phase == Phase::Done {
            return SubmitOutcome::Ignored;
        }

        self.submit_in_flight = true;
        self.phase = Phase::Submitting;

        match self.service.submit_attempt(self.attempt_id).await {
            Ok(()) => {
                tracing::info!(attempt_id = self.attempt_id, mode = ?mode, "attempt submitted");
                self.phase = Phase::Done;
                SubmitOutcome::Submitted(mode)
            }
            Err(ServiceError::Forbidden(detail)) => {
                tracing::info!(
                    attempt_id = self.attempt_id,
                    detail = %detail,
                    "attempt was already submitted"
                );
                self.phase = Phase::Done;
                SubmitOutcome::Submitted(mode)
            }
            Err(err) => match mode {
                SubmitMode::Manual => {
                    tracing::error!(
                        attempt_id = self.attempt_id,
                        error = %err,
                        "manual submit failed, student may retry"
                    );
                    self.submit_in_flight = false;
                    self.phase = Phase::InProgress;
                    SubmitOutcome::Failed(err)
                }
                SubmitMode::Auto => {
                    // Time is already up; there is no user action to retry
                    // against, so the session ends here regardless.
                    tracing::error!(
                        attempt_id = self.attempt_id,
                        error = %err,
                        "auto-submit failed after expiry"
                    );
                    self.phase = Phase::Done;
                    SubmitOutcome::Failed(err)
                }
            },
        }
    }

    fn time_on_question(&self) -> i64 {
        match (self.question_entered_at, self.remaining) {
            (Some(entered), Some(remaining)) => (entered - remaining).max(0),
            _ => 0,
        }
    }
}
