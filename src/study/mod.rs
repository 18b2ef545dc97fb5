pub mod answer;

use std::collections::HashMap;
use std::time::Instant;

use chrono::Utc;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rust_i18n::t;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

pub use crate::api::types::StudyHistoryItem;
use crate::api::types::{Question, QuestionId, QuestionsPage, SubmitAnswerResponse};
use crate::dispatch::ApiCall;
use crate::error::ApiError;
pub use answer::Answer;

/// In-memory history is capped; the server keeps the full record.
const HISTORY_CAP: usize = 200;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StudyMode {
    #[default]
    Choice,
    Typed,
}

impl StudyMode {
    pub fn toggle(self) -> Self {
        match self {
            StudyMode::Choice => StudyMode::Typed,
            StudyMode::Typed => StudyMode::Choice,
        }
    }

    pub fn label(self) -> String {
        match self {
            StudyMode::Choice => t!("settings.mode_choice").into_owned(),
            StudyMode::Typed => t!("settings.mode_typed").into_owned(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Navigation {
    Moved(usize),
    EndOfSet,
    StartOfSet,
}

/// Result of a committed submission, shown under the question.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Feedback {
    pub correct: bool,
    pub answer: String,
    pub explanation: String,
}

struct PendingSubmit {
    tag: u64,
    question_id: QuestionId,
    correct: bool,
    answer: String,
    started: Instant,
}

/// The learner's pass through one set of questions.
pub struct StudyFlow {
    questions: Vec<Question>,
    index: usize,
    total: u64,
    page: u32,
    page_size: u32,
    options: Vec<String>,
    shown_at: Instant,
    answered: HashMap<QuestionId, Feedback>,
    correct: u32,
    attempted: u32,
    history: Vec<StudyHistoryItem>,
    loading_tag: Option<u64>,
    pending_submit: Option<PendingSubmit>,
    next_tag: u64,
    error: Option<ApiError>,
    rng: SmallRng,
}

impl StudyFlow {
    pub fn new() -> Self {
        Self::with_rng(SmallRng::from_entropy())
    }

    pub fn with_rng(rng: SmallRng) -> Self {
        Self {
            questions: Vec::new(),
            index: 0,
            total: 0,
            page: 1,
            page_size: 10,
            options: Vec::new(),
            shown_at: Instant::now(),
            answered: HashMap::new(),
            correct: 0,
            attempted: 0,
            history: Vec::new(),
            loading_tag: None,
            pending_submit: None,
            next_tag: 0,
            error: None,
            rng,
        }
    }

    fn tag(&mut self) -> u64 {
        self.next_tag += 1;
        self.next_tag
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn current(&self) -> Option<&Question> {
        self.questions.get(self.index)
    }

    /// Server-side question count.
    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Multiple-choice options for the current question, shuffled once
    /// when the question is shown.
    pub fn options(&self) -> &[String] {
        &self.options
    }

    /// (correct, attempted) over this run.
    pub fn tally(&self) -> (u32, u32) {
        (self.correct, self.attempted)
    }

    pub fn history(&self) -> &[StudyHistoryItem] {
        &self.history
    }

    pub fn error(&self) -> Option<&ApiError> {
        self.error.as_ref()
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    pub fn is_loading(&self) -> bool {
        self.loading_tag.is_some()
    }

    pub fn is_submitting(&self) -> bool {
        self.pending_submit.is_some()
    }

    pub fn feedback(&self) -> Option<&Feedback> {
        self.current().and_then(|q| self.answered.get(&q.id))
    }

    pub fn load_page(&mut self, page: u32, page_size: u32) -> Result<(u64, ApiCall), ApiError> {
        if page_size == 0 {
            return Err(ApiError::validation(t!("study.invalid_page_size")));
        }
        if page == 0 {
            return Err(ApiError::validation(t!("study.invalid_page")));
        }
        let tag = self.tag();
        self.loading_tag = Some(tag);
        self.page = page;
        self.page_size = page_size;
        debug!(page, page_size, tag, "loading question page");
        Ok((
            tag,
            ApiCall::Questions {
                page,
                limit: page_size,
            },
        ))
    }

    /// Commit a page. Only the most recent request is honoured; returns
    /// whether the reply was applied.
    pub fn complete_page(&mut self, tag: u64, result: Result<QuestionsPage, ApiError>) -> bool {
        if self.loading_tag != Some(tag) {
            debug!(tag, "stale page reply dropped");
            return false;
        }
        self.loading_tag = None;
        match result {
            Ok(page) => {
                info!(count = page.questions.len(), total = page.total, "question page loaded");
                self.total = page.total;
                self.replace_questions(page.questions);
            }
            Err(e) => {
                warn!(error = %e, "question page failed");
                self.error = Some(e);
            }
        }
        true
    }

    /// Study a single question, e.g. one picked from recommendations.
    pub fn load_single(&mut self, id: QuestionId) -> (u64, ApiCall) {
        let tag = self.tag();
        self.loading_tag = Some(tag);
        (tag, ApiCall::Question(id))
    }

    pub fn complete_single(&mut self, tag: u64, result: Result<Question, ApiError>) -> bool {
        if self.loading_tag != Some(tag) {
            return false;
        }
        self.loading_tag = None;
        match result {
            Ok(question) => {
                self.total = 1;
                self.replace_questions(vec![question]);
            }
            Err(e) => self.error = Some(e),
        }
        true
    }

    fn replace_questions(&mut self, questions: Vec<Question>) {
        // Verdicts belong to the set they were given in; the tally and
        // history keep the running record.
        self.answered.clear();
        self.questions = questions;
        self.index = 0;
        self.error = None;
        self.pending_submit = None;
        self.show_current();
    }

    fn show_current(&mut self) {
        self.shown_at = Instant::now();
        self.options.clear();
        if let Some(q) = self.questions.get(self.index) {
            self.options.push(q.correct_answer.clone());
            if let Some(wrong) = q.wrong_answer.as_ref().filter(|w| **w != q.correct_answer) {
                self.options.push(wrong.clone());
            }
            self.options.shuffle(&mut self.rng);
        }
    }

    pub fn submit_answer(&mut self, answer: Answer) -> Result<(u64, ApiCall), ApiError> {
        let question = self
            .current()
            .ok_or_else(|| ApiError::validation(t!("study.no_question")))?;
        if answer.text().trim().is_empty() {
            return Err(ApiError::validation(t!("study.empty_answer")));
        }
        if self.answered.contains_key(&question.id)
            || self
                .pending_submit
                .as_ref()
                .is_some_and(|p| p.question_id == question.id)
        {
            return Err(ApiError::validation(t!("study.already_answered")));
        }
        let correct = answer::is_correct(question, &answer);
        let question_id = question.id.clone();
        let tag = self.tag();
        self.pending_submit = Some(PendingSubmit {
            tag,
            question_id: question_id.clone(),
            correct,
            answer: answer.text().to_string(),
            started: self.shown_at,
        });
        debug!(%question_id, correct, tag, "submitting answer");
        Ok((
            tag,
            ApiCall::SubmitAnswer {
                question_id,
                correct,
                answer: Some(answer.text().to_string()),
            },
        ))
    }

    pub fn complete_submit(
        &mut self,
        tag: u64,
        result: Result<SubmitAnswerResponse, ApiError>,
    ) -> bool {
        if self.pending_submit.as_ref().map(|p| p.tag) != Some(tag) {
            return false;
        }
        let Some(pending) = self.pending_submit.take() else {
            return false;
        };
        let response = match result {
            Ok(response) if response.success => response,
            Ok(_) => {
                self.error = Some(ApiError::Server {
                    code: "submit_rejected".to_string(),
                    message: t!("study.submit_failed").into_owned(),
                });
                return true;
            }
            Err(e) => {
                warn!(error = %e, "answer submission failed");
                self.error = Some(e);
                return true;
            }
        };

        self.attempted += 1;
        if pending.correct {
            self.correct += 1;
        }
        let explanation = response
            .explanation
            .filter(|e| !e.is_empty())
            .or_else(|| {
                self.questions
                    .iter()
                    .find(|q| q.id == pending.question_id)
                    .map(|q| q.explanation.clone())
            })
            .unwrap_or_default();
        let sentence = self
            .questions
            .iter()
            .find(|q| q.id == pending.question_id)
            .map(|q| q.correct_answer.clone());
        self.history.insert(
            0,
            StudyHistoryItem {
                question_id: pending.question_id.clone(),
                is_correct: pending.correct,
                timestamp: Some(Utc::now()),
                time_spent: pending.started.elapsed().as_secs_f64(),
                sentence,
            },
        );
        self.history.truncate(HISTORY_CAP);
        self.answered.insert(
            pending.question_id,
            Feedback {
                correct: pending.correct,
                answer: pending.answer,
                explanation,
            },
        );
        self.error = None;
        true
    }

    pub fn next(&mut self) -> Navigation {
        if self.questions.is_empty() || self.index + 1 >= self.questions.len() {
            return Navigation::EndOfSet;
        }
        self.index += 1;
        self.show_current();
        Navigation::Moved(self.index)
    }

    pub fn previous(&mut self) -> Navigation {
        if self.index == 0 {
            return Navigation::StartOfSet;
        }
        self.index -= 1;
        self.show_current();
        Navigation::Moved(self.index)
    }

    /// Whether another server page follows the current one.
    pub fn has_next_page(&self) -> bool {
        (self.page as u64) * (self.page_size as u64) < self.total
    }
}

impl Default for StudyFlow {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(id: u64, answer: &str, wrong: &str) -> Question {
        Question {
            id: QuestionId::from(id),
            prompt: format!("q{id}"),
            wrong_sentence: None,
            right_sentence: None,
            correct_answer: answer.to_string(),
            wrong_answer: Some(wrong.to_string()),
            category: None,
            difficulty: 1,
            explanation: format!("e{id}"),
            span: None,
        }
    }

    fn loaded(count: u64, total: u64) -> StudyFlow {
        let mut flow = StudyFlow::with_rng(SmallRng::seed_from_u64(7));
        let (tag, _) = flow.load_page(1, 10).unwrap();
        let questions = (1..=count).map(|i| question(i, "right", "wrong")).collect();
        assert!(flow.complete_page(tag, Ok(QuestionsPage { questions, total })));
        flow
    }

    fn ok_submit() -> Result<SubmitAnswerResponse, ApiError> {
        Ok(SubmitAnswerResponse {
            success: true,
            is_correct: None,
            explanation: None,
            next_question_id: None,
        })
    }

    #[test]
    fn page_load_sets_bounds() {
        let mut flow = loaded(10, 42);
        assert_eq!(flow.index(), 0);
        assert_eq!(flow.questions().len(), 10);
        assert_eq!(flow.total(), 42);
        assert!(flow.has_next_page());
        assert_eq!(flow.previous(), Navigation::StartOfSet);
        for _ in 0..9 {
            assert!(matches!(flow.next(), Navigation::Moved(_)));
        }
        assert_eq!(flow.index(), 9);
        assert_eq!(flow.next(), Navigation::EndOfSet);
        assert_eq!(flow.index(), 9);
    }

    #[test]
    fn invalid_page_arguments() {
        let mut flow = StudyFlow::new();
        assert!(matches!(flow.load_page(1, 0), Err(ApiError::Validation(_))));
        assert!(matches!(flow.load_page(0, 10), Err(ApiError::Validation(_))));
    }

    #[test]
    fn only_latest_page_reply_commits() {
        let mut flow = StudyFlow::new();
        let (first, _) = flow.load_page(1, 10).unwrap();
        let (second, _) = flow.load_page(2, 10).unwrap();
        assert!(!flow.complete_page(
            first,
            Ok(QuestionsPage {
                questions: vec![question(1, "a", "b")],
                total: 1
            })
        ));
        assert!(flow.questions().is_empty());
        assert!(flow.complete_page(
            second,
            Ok(QuestionsPage {
                questions: vec![question(11, "a", "b")],
                total: 11
            })
        ));
        assert_eq!(flow.current().unwrap().id, QuestionId::from(11u64));
    }

    #[test]
    fn failed_page_keeps_existing_list() {
        let mut flow = loaded(3, 3);
        let (tag, _) = flow.load_page(2, 10).unwrap();
        flow.complete_page(tag, Err(ApiError::Network("down".into())));
        assert_eq!(flow.questions().len(), 3);
        assert!(flow.error().is_some());
    }

    #[test]
    fn tally_counts_committed_submissions() {
        let mut flow = loaded(3, 3);
        for answer in ["right", "wrong", "right"] {
            let (tag, _) = flow.submit_answer(Answer::Choice(answer.into())).unwrap();
            assert!(flow.complete_submit(tag, ok_submit()));
            flow.next();
        }
        assert_eq!(flow.tally(), (2, 3));
        assert_eq!(flow.history().len(), 3);
        assert_eq!(flow.history()[0].question_id, QuestionId::from(3u64));
        assert!(flow.history()[0].is_correct);
        assert!(!flow.history()[1].is_correct);
    }

    #[test]
    fn new_page_starts_without_verdicts() {
        let mut flow = loaded(2, 20);
        let (tag, _) = flow.submit_answer(Answer::Choice("right".into())).unwrap();
        assert!(flow.complete_submit(tag, ok_submit()));
        assert!(flow.feedback().is_some());

        let (tag, _) = flow.load_page(2, 10).unwrap();
        let questions = (11..=12).map(|i| question(i, "right", "wrong")).collect();
        assert!(flow.complete_page(tag, Ok(QuestionsPage { questions, total: 20 })));
        assert!(flow.feedback().is_none());
        assert!(flow.answered.is_empty());
        assert_eq!(flow.tally(), (1, 1));
        assert_eq!(flow.history().len(), 1);
    }

    #[test]
    fn duplicate_submission_is_rejected() {
        let mut flow = loaded(2, 2);
        let (tag, _) = flow.submit_answer(Answer::Choice("right".into())).unwrap();
        assert!(matches!(
            flow.submit_answer(Answer::Choice("right".into())),
            Err(ApiError::Validation(_))
        ));
        flow.complete_submit(tag, ok_submit());
        assert!(matches!(
            flow.submit_answer(Answer::Choice("wrong".into())),
            Err(ApiError::Validation(_))
        ));
        assert_eq!(flow.feedback().unwrap().explanation, "e1");
    }

    #[test]
    fn failed_submission_leaves_tally_and_allows_retry() {
        let mut flow = loaded(2, 2);
        let (tag, _) = flow.submit_answer(Answer::Typed("right".into())).unwrap();
        flow.complete_submit(tag, Err(ApiError::Timeout));
        assert_eq!(flow.tally(), (0, 0));
        assert!(flow.error().is_some());
        assert_eq!(flow.index(), 0);
        assert!(flow.submit_answer(Answer::Typed("right".into())).is_ok());
    }

    #[test]
    fn options_contain_both_answers() {
        let flow = loaded(1, 1);
        let mut options = flow.options().to_vec();
        options.sort();
        assert_eq!(options, vec!["right".to_string(), "wrong".to_string()]);
    }

    #[test]
    fn single_question_replaces_set() {
        let mut flow = loaded(5, 5);
        let (tag, call) = flow.load_single(QuestionId::from(99u64));
        assert!(matches!(call, ApiCall::Question(_)));
        flow.complete_single(tag, Ok(question(99, "a", "b")));
        assert_eq!(flow.questions().len(), 1);
        assert_eq!(flow.index(), 0);
    }
}
