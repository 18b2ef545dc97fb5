use rust_i18n::t;
use tracing::{info, warn};

use crate::api::types::{
    AuthResponse, ProfileUpdate, UpdateProfileResponse, User, VerifyResponse,
};
use crate::dispatch::ApiCall;
use crate::error::ApiError;
use crate::store::{Session, SessionStore};

pub const MAX_DISPLAY_NAME_CHARS: usize = 20;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AuthState {
    Uninitialized,
    Verifying,
    Authenticated,
    Anonymous,
}

/// Owns the session lifecycle. Network work is returned as [`ApiCall`]s;
/// results come back through the `complete_*` methods on the UI thread.
pub struct AuthSessionManager {
    store: SessionStore,
    state: AuthState,
    session: Option<Session>,
    user: Option<User>,
    pending_profile: Option<ProfileUpdate>,
    epoch: u64,
}

impl AuthSessionManager {
    pub fn new(store: SessionStore) -> Self {
        Self {
            store,
            state: AuthState::Uninitialized,
            session: None,
            user: None,
            pending_profile: None,
            epoch: 0,
        }
    }

    pub fn state(&self) -> AuthState {
        self.state
    }

    pub fn is_authenticated(&self) -> bool {
        self.state == AuthState::Authenticated
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn token(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.token.as_str())
    }

    /// Bumped on every transition; replies tagged with an older value
    /// must be ignored.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn profile_pending(&self) -> bool {
        self.pending_profile.is_some()
    }

    fn transition(&mut self, state: AuthState) {
        if self.state != state {
            info!(from = ?self.state, to = ?state, "auth state");
        }
        self.state = state;
        self.epoch += 1;
    }

    fn clear_store(&self) {
        if let Err(e) = self.store.clear() {
            warn!(error = %e, "failed to clear session store");
        }
    }

    pub fn initialize(&mut self) -> Option<ApiCall> {
        match self.store.load() {
            None => {
                self.transition(AuthState::Anonymous);
                None
            }
            Some(session) => {
                let token = session.token.clone();
                self.session = Some(session);
                self.transition(AuthState::Verifying);
                Some(ApiCall::VerifySession { token })
            }
        }
    }

    pub fn complete_verify(&mut self, result: Result<VerifyResponse, ApiError>) {
        if self.state != AuthState::Verifying {
            return;
        }
        match result {
            Ok(response) if response.is_valid => {
                let mut user = response.user();
                if let Some(session) = self.session.as_mut() {
                    if user.display_name.is_empty() {
                        user.display_name = session.display_name.clone();
                    } else {
                        session.display_name = user.display_name.clone();
                    }
                    if user.study_level.is_empty() {
                        user.study_level = session.study_level.clone();
                    } else {
                        session.study_level = user.study_level.clone();
                    }
                    if let Err(e) = self.store.save(session) {
                        warn!(error = %e, "failed to refresh stored session");
                    }
                }
                self.user = Some(user);
                self.transition(AuthState::Authenticated);
            }
            Ok(_) => {
                info!("stored session rejected by verify");
                self.drop_session();
            }
            Err(e) => {
                warn!(error = %e, "session verification failed");
                self.drop_session();
            }
        }
    }

    fn drop_session(&mut self) {
        self.clear_store();
        self.session = None;
        self.user = None;
        self.pending_profile = None;
        self.transition(AuthState::Anonymous);
    }

    pub fn login(&self, access_token: &str) -> Result<ApiCall, ApiError> {
        let access_token = access_token.trim();
        if access_token.is_empty() {
            return Err(ApiError::validation(t!("auth.token_required")));
        }
        Ok(ApiCall::Login {
            access_token: access_token.to_string(),
        })
    }

    /// On failure the error is handed back and nothing changes.
    pub fn complete_login(&mut self, result: Result<AuthResponse, ApiError>) -> Result<(), ApiError> {
        let response = result?;
        let user = response.user.clone().unwrap_or_else(|| User {
            display_name: response.display_name.clone(),
            study_level: response.study_level.clone(),
            ..User::default()
        });
        let display_name = if response.display_name.is_empty() {
            user.display_name.clone()
        } else {
            response.display_name.clone()
        };
        let study_level = if response.study_level.is_empty() {
            user.study_level.clone()
        } else {
            response.study_level.clone()
        };
        let session = Session::new(response.session_token, display_name, study_level);
        if let Err(e) = self.store.save(&session) {
            warn!(error = %e, "failed to persist session");
        }
        self.session = Some(session);
        self.user = Some(user);
        self.transition(AuthState::Authenticated);
        Ok(())
    }

    /// Always succeeds locally. The returned server-side logout is best
    /// effort.
    pub fn logout(&mut self) -> Option<ApiCall> {
        let token = self.session.as_ref().map(|s| s.token.clone());
        self.drop_session();
        token.map(|token| ApiCall::Logout { token })
    }

    pub fn update_profile(&mut self, update: ProfileUpdate) -> Result<ApiCall, ApiError> {
        if !self.is_authenticated() {
            return Err(ApiError::NotAuthenticated);
        }
        let update = validate_profile(update)?;
        self.pending_profile = Some(update.clone());
        Ok(ApiCall::UpdateProfile(update))
    }

    pub fn complete_profile(
        &mut self,
        result: Result<UpdateProfileResponse, ApiError>,
    ) -> Result<(), ApiError> {
        let Some(update) = self.pending_profile.take() else {
            return Ok(());
        };
        let response = result?;
        if !response.success {
            return Err(ApiError::Server {
                code: "profile_update_failed".to_string(),
                message: t!("profile.update_failed").into_owned(),
            });
        }
        let display_name = response
            .display_name
            .filter(|n| !n.is_empty())
            .unwrap_or(update.display_name);
        if let Some(user) = self.user.as_mut() {
            user.display_name = display_name.clone();
            user.gender = update.gender;
            user.age = update.age;
        }
        if let Some(session) = self.session.as_mut() {
            session.display_name = display_name.clone();
        }
        if let Err(e) = self.store.update_display_name(&display_name) {
            warn!(error = %e, "failed to persist display name");
        }
        info!("profile updated");
        Ok(())
    }

    /// The server rejected our token.
    pub fn invalidate(&mut self) {
        self.drop_session();
    }

    /// Invalidate only if `rejected` is the token we currently hold (or no
    /// token was sent while we believe we are signed in). Returns whether
    /// the session was dropped.
    pub fn handle_rejected(&mut self, rejected: Option<&str>) -> bool {
        let matches = match (rejected, self.token()) {
            (Some(rejected), Some(current)) => rejected == current,
            (None, Some(_)) => self.store.load().is_none(),
            (_, None) => false,
        };
        if matches {
            self.invalidate();
        }
        matches
    }
}

pub fn validate_profile(update: ProfileUpdate) -> Result<ProfileUpdate, ApiError> {
    let display_name = update.display_name.trim().to_string();
    if display_name.is_empty() {
        return Err(ApiError::validation(t!("profile.name_required")));
    }
    if display_name.chars().count() > MAX_DISPLAY_NAME_CHARS {
        return Err(ApiError::validation(t!(
            "profile.name_too_long",
            max = MAX_DISPLAY_NAME_CHARS
        )));
    }
    if let Some(age) = update.age {
        if !(1..=119).contains(&age) {
            return Err(ApiError::validation(t!("profile.age_range")));
        }
    }
    Ok(ProfileUpdate {
        display_name,
        ..update
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::{Gender, StudyLevel};
    use tempfile::TempDir;

    fn manager() -> (TempDir, AuthSessionManager) {
        let dir = TempDir::new().unwrap();
        let store = SessionStore::with_base_dir(dir.path().to_path_buf()).unwrap();
        (dir, AuthSessionManager::new(store))
    }

    fn login_response(token: &str) -> AuthResponse {
        AuthResponse {
            session_token: token.to_string(),
            display_name: "길동".to_string(),
            study_level: StudyLevel::from("우"),
            user: None,
        }
    }

    #[test]
    fn initialize_without_token_is_anonymous() {
        let (_dir, mut auth) = manager();
        assert_eq!(auth.state(), AuthState::Uninitialized);
        assert!(auth.initialize().is_none());
        assert_eq!(auth.state(), AuthState::Anonymous);
    }

    #[test]
    fn invalid_verify_clears_store() {
        let (_dir, mut auth) = manager();
        auth.store
            .save(&Session::new("tok", "a", StudyLevel::default()))
            .unwrap();
        assert!(matches!(
            auth.initialize(),
            Some(ApiCall::VerifySession { .. })
        ));
        assert_eq!(auth.state(), AuthState::Verifying);
        auth.complete_verify(Ok(VerifyResponse {
            is_valid: false,
            display_name: String::new(),
            study_level: StudyLevel::default(),
            google_id: String::new(),
            email: String::new(),
            created_at: None,
            last_login: None,
            user_info: None,
        }));
        assert_eq!(auth.state(), AuthState::Anonymous);
        assert!(auth.store.load().is_none());
    }

    #[test]
    fn empty_access_token_is_rejected() {
        let (_dir, auth) = manager();
        assert!(matches!(auth.login("   "), Err(ApiError::Validation(_))));
        assert!(matches!(auth.login("ya29.x"), Ok(ApiCall::Login { .. })));
    }

    #[test]
    fn login_failure_leaves_state_unchanged() {
        let (_dir, mut auth) = manager();
        auth.initialize();
        let epoch = auth.epoch();
        let err = auth
            .complete_login(Err(ApiError::Server {
                code: "http_400".into(),
                message: "bad token".into(),
            }))
            .unwrap_err();
        assert_eq!(err.code(), "http_400");
        assert_eq!(auth.state(), AuthState::Anonymous);
        assert_eq!(auth.epoch(), epoch);
    }

    #[test]
    fn login_then_logout() {
        let (_dir, mut auth) = manager();
        auth.initialize();
        auth.complete_login(Ok(login_response("tok-1"))).unwrap();
        assert!(auth.is_authenticated());
        assert_eq!(auth.store.token().as_deref(), Some("tok-1"));
        assert_eq!(auth.user().unwrap().display_name, "길동");

        let call = auth.logout();
        assert!(matches!(call, Some(ApiCall::Logout { ref token }) if token == "tok-1"));
        assert_eq!(auth.state(), AuthState::Anonymous);
        assert!(auth.store.load().is_none());
    }

    #[test]
    fn profile_requires_authentication_and_valid_fields() {
        let (_dir, mut auth) = manager();
        auth.initialize();
        let update = ProfileUpdate {
            display_name: "새이름".into(),
            gender: Some(Gender::Female),
            age: Some(30),
        };
        assert_eq!(
            auth.update_profile(update.clone()).unwrap_err(),
            ApiError::NotAuthenticated
        );

        auth.complete_login(Ok(login_response("tok"))).unwrap();
        let too_long = ProfileUpdate {
            display_name: "가".repeat(21),
            ..update.clone()
        };
        assert!(matches!(
            auth.update_profile(too_long),
            Err(ApiError::Validation(_))
        ));
        let bad_age = ProfileUpdate {
            age: Some(0),
            ..update.clone()
        };
        assert!(matches!(
            auth.update_profile(bad_age),
            Err(ApiError::Validation(_))
        ));

        auth.update_profile(update).unwrap();
        assert!(auth.profile_pending());
        auth.complete_profile(Ok(UpdateProfileResponse {
            success: true,
            display_name: None,
            user: None,
        }))
        .unwrap();
        let user = auth.user().unwrap();
        assert_eq!(user.display_name, "새이름");
        assert_eq!(user.age, Some(30));
        let stored = auth.store.load().unwrap();
        assert_eq!(stored.token, "tok");
        assert_eq!(stored.display_name, "새이름");
    }

    #[test]
    fn rejected_token_must_match_current() {
        let (_dir, mut auth) = manager();
        auth.initialize();
        auth.complete_login(Ok(login_response("new"))).unwrap();
        assert!(!auth.handle_rejected(Some("old")));
        assert!(auth.is_authenticated());
        assert!(auth.handle_rejected(Some("new")));
        assert_eq!(auth.state(), AuthState::Anonymous);
    }
}
