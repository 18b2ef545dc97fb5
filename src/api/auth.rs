use serde_json::json;

use crate::api::gateway::Gateway;
use crate::api::transport::Method;
use crate::api::types::{
    AuthResponse, GoogleLoginRequest, LogoutResponse, ProfileUpdate, SessionTokenRequest,
    UpdateProfileRequest, UpdateProfileResponse, VerifyResponse,
};
use crate::error::ApiError;

impl Gateway {
    /// Exchange a Google OAuth access token for a backend session.
    pub fn login_with_google(&self, access_token: &str) -> Result<AuthResponse, ApiError> {
        let body = json!(GoogleLoginRequest { access_token });
        self.post("/api/auth/google", &body)
    }

    pub fn verify_session(&self, token: &str) -> Result<VerifyResponse, ApiError> {
        let body = json!(SessionTokenRequest {
            session_token: token
        });
        self.request_as(
            Method::Post,
            "/api/auth/verify",
            Some(&body),
            Some(token.to_string()),
        )
    }

    /// Takes the token explicitly: the store is already cleared by the
    /// time this runs.
    pub fn logout(&self, token: &str) -> Result<LogoutResponse, ApiError> {
        let body = json!(SessionTokenRequest {
            session_token: token
        });
        self.request_as(
            Method::Post,
            "/api/auth/logout",
            Some(&body),
            Some(token.to_string()),
        )
    }

    pub fn update_profile(&self, update: &ProfileUpdate) -> Result<UpdateProfileResponse, ApiError> {
        let token = self.session_token()?;
        let body = json!(UpdateProfileRequest {
            session_token: &token,
            display_name: &update.display_name,
            gender: update.gender,
            age: update.age,
        });
        self.request_as(Method::Post, "/api/auth/detail", Some(&body), Some(token))
    }
}
