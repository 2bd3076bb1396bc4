use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::schemas::assessment::{AssessmentDetail, Question};
use crate::schemas::attempt::{AnswerSubmit, Attempt, SavedAnswer};
use crate::services::attempt_api::{AttemptService, ServiceError};

/// Scripted response for one mock call. An exhausted script means `Ok`.
pub(crate) enum Canned {
    Ok,
    Forbidden,
    Fail,
}

impl Canned {
    fn into_result(self) -> Result<(), ServiceError> {
        match self {
            Canned::Ok => Ok(()),
            Canned::Forbidden => Err(ServiceError::Forbidden("attempt already submitted".into())),
            Canned::Fail => Err(ServiceError::Api { status: 500, detail: "boom".into() }),
        }
    }
}

/// In-memory `AttemptService` that records mutating calls in order, so tests
/// can assert save/submit sequencing.
pub(crate) struct MockAttemptService {
    assessment: AssessmentDetail,
    attempt: Attempt,
    pub(crate) calls: Mutex<Vec<String>>,
    get_script: Mutex<VecDeque<Canned>>,
    start_script: Mutex<VecDeque<Canned>>,
    save_script: Mutex<VecDeque<Canned>>,
    submit_script: Mutex<VecDeque<Canned>>,
}

impl MockAttemptService {
    pub(crate) fn new(assessment: AssessmentDetail, attempt: Attempt) -> Self {
        Self {
            assessment,
            attempt,
            calls: Mutex::new(Vec::new()),
            get_script: Mutex::new(VecDeque::new()),
            start_script: Mutex::new(VecDeque::new()),
            save_script: Mutex::new(VecDeque::new()),
            submit_script: Mutex::new(VecDeque::new()),
        }
    }

    pub(crate) fn script_get_assessment(self, responses: Vec<Canned>) -> Self {
        *self.get_script.lock().unwrap() = responses.into();
        self
    }

    pub(crate) fn script_start(self, responses: Vec<Canned>) -> Self {
        *self.start_script.lock().unwrap() = responses.into();
        self
    }

    pub(crate) fn script_save(self, responses: Vec<Canned>) -> Self {
        *self.save_script.lock().unwrap() = responses.into();
        self
    }

    pub(crate) fn script_submit(self, responses: Vec<Canned>) -> Self {
        *self.submit_script.lock().unwrap() = responses.into();
        self
    }

    pub(crate) fn recorded_calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn next(script: &Mutex<VecDeque<Canned>>) -> Result<(), ServiceError> {
        script.lock().unwrap().pop_front().unwrap_or(Canned::Ok).into_result()
    }
}

#[async_trait]
impl AttemptService for MockAttemptService {
    async fn get_assessment(&self, _assessment_id: i64) -> Result<AssessmentDetail, ServiceError> {
        Self::next(&self.get_script)?;
        Ok(self.assessment.clone())
    }

    async fn start_or_resume_attempt(&self, _assessment_id: i64) -> Result<Attempt, ServiceError> {
        Self::next(&self.start_script)?;
        Ok(self.attempt.clone())
    }

    async fn save_answer(
        &self,
        _attempt_id: i64,
        answer: &AnswerSubmit,
    ) -> Result<(), ServiceError> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("save:{}:{}", answer.question_id, answer.selected_answer));
        Self::next(&self.save_script)
    }

    async fn submit_attempt(&self, _attempt_id: i64) -> Result<(), ServiceError> {
        self.calls.lock().unwrap().push("submit".to_string());
        Self::next(&self.submit_script)
    }
}

pub(crate) fn question(id: i64, text: &str) -> Question {
    Question {
        id,
        question_text: text.to_string(),
        options: vec!["A".to_string(), "B".to_string(), "C".to_string(), "D".to_string()],
    }
}

pub(crate) fn assessment(
    time_per_question: Option<i64>,
    question_count: usize,
) -> AssessmentDetail {
    AssessmentDetail {
        id: 7,
        title: "Algebra quiz".to_string(),
        time_per_question,
        questions: (1..=question_count as i64)
            .map(|id| question(id, &format!("Question {id}")))
            .collect(),
    }
}

pub(crate) fn attempt(started_at: &str, answers: Vec<(i64, &str)>) -> Attempt {
    Attempt {
        id: 42,
        assessment_id: 7,
        started_at: started_at.to_string(),
        submitted_at: None,
        answers: answers
            .into_iter()
            .map(|(question_id, selected_answer)| SavedAnswer {
                question_id,
                selected_answer: selected_answer.to_string(),
            })
            .collect(),
    }
}
