use serde_json::json;

use crate::api::gateway::Gateway;
use crate::api::transport::Method;
use crate::api::types::{
    QuestionId, StudyHistoryItem, StudyHistoryRequest, StudyHistoryResponse,
    SubmitAnswerRequest, SubmitAnswerResponse,
};
use crate::error::ApiError;

impl Gateway {
    /// Record an answer. Correctness goes out in the configured encoding.
    pub fn submit_answer(
        &self,
        question_id: &QuestionId,
        correct: bool,
        answer: Option<&str>,
    ) -> Result<SubmitAnswerResponse, ApiError> {
        let token = self.session_token()?;
        let body = json!(SubmitAnswerRequest {
            session_token: &token,
            question_id,
            correct: self.encoding().encode(correct),
            answer,
        });
        self.request_as(Method::Post, "/api/study/submit", Some(&body), Some(token))
    }

    pub fn study_history(&self, limit: u32) -> Result<Vec<StudyHistoryItem>, ApiError> {
        let token = self.session_token()?;
        let body = json!(StudyHistoryRequest {
            session_token: &token,
            limit,
        });
        let response: StudyHistoryResponse =
            self.request_as(Method::Post, "/api/study/history", Some(&body), Some(token))?;
        let encoding = self.encoding();
        Ok(response
            .history
            .into_iter()
            .map(|row| StudyHistoryItem::from_row(row, encoding))
            .collect())
    }
}
