use serde_json::json;

use crate::api::gateway::Gateway;
use crate::api::transport::Method;
use crate::api::types::{QuestionId, QuestionStats, QuestionStatsPayload, SessionTokenRequest, UserStats};
use crate::error::ApiError;

impl Gateway {
    pub fn user_stats(&self) -> Result<UserStats, ApiError> {
        let token = self.session_token()?;
        let body = json!(SessionTokenRequest {
            session_token: &token
        });
        self.request_as(Method::Post, "/api/stats/user", Some(&body), Some(token))
    }

    pub fn question_stats(&self, id: &QuestionId) -> Result<QuestionStats, ApiError> {
        let payload: QuestionStatsPayload =
            self.get(&format!("/api/stats/questions/{}", urlencoding::encode(id.as_str())))?;
        Ok(payload.into_stats(self.encoding()))
    }
}
