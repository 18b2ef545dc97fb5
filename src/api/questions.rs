use crate::api::gateway::Gateway;
use crate::api::types::{Question, QuestionId, QuestionPayload, QuestionsPage};
use crate::error::ApiError;

impl Gateway {
    /// One page of questions; `page` is 1-based.
    pub fn questions(&self, page: u32, limit: u32) -> Result<QuestionsPage, ApiError> {
        self.get(&format!("/api/questions?page={page}&limit={limit}"))
    }

    pub fn question(&self, id: &QuestionId) -> Result<Question, ApiError> {
        let payload: QuestionPayload = self.get(&format!(
            "/api/questions/{}",
            urlencoding::encode(id.as_str())
        ))?;
        Ok(payload.into_question())
    }
}
