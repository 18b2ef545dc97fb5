use serde_json::json;

use crate::api::gateway::Gateway;
use crate::api::transport::Method;
use crate::api::types::{RecommendationJob, RecommendationStatus, SessionTokenRequest};
use crate::error::ApiError;

impl Gateway {
    /// Start a recommendation job on the backend.
    pub fn request_recommendations(&self) -> Result<RecommendationJob, ApiError> {
        let token = self.session_token()?;
        let body = json!(SessionTokenRequest {
            session_token: &token
        });
        self.request_as(
            Method::Post,
            "/api/recommendations",
            Some(&body),
            Some(token),
        )
    }

    pub fn recommendation_status(&self, rec_id: &str) -> Result<RecommendationStatus, ApiError> {
        self.get(&format!(
            "/api/recommendations/success?rec_id={}",
            urlencoding::encode(rec_id)
        ))
    }
}
