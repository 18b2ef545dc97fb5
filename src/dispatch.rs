//! Runs gateway calls off the UI thread and routes their results back into
//! the event loop as tagged [`Reply`] values.

use std::sync::Arc;
use std::sync::mpsc::Sender;
use std::thread;
use std::time::Duration;

use tracing::debug;

use crate::api::Gateway;
use crate::api::types::{
    AuthResponse, LogoutResponse, ProfileUpdate, Question, QuestionId, QuestionStats,
    QuestionsPage, RecommendationJob, StudyHistoryItem, SubmitAnswerResponse,
    UpdateProfileResponse, UserStats, VerifyResponse,
};
use crate::error::ApiError;
use crate::event::AppEvent;
use crate::recommend::{PollOutcome, PollTask};

#[derive(Clone, Debug)]
pub enum ApiCall {
    VerifySession { token: String },
    Login { access_token: String },
    Logout { token: String },
    UpdateProfile(ProfileUpdate),
    Questions { page: u32, limit: u32 },
    Question(QuestionId),
    SubmitAnswer {
        question_id: QuestionId,
        correct: bool,
        answer: Option<String>,
    },
    StudyHistory { limit: u32 },
    RequestRecommendations,
    PollRecommendations(PollTask),
    UserStats,
    QuestionStats(QuestionId),
}

impl ApiCall {
    pub fn name(&self) -> &'static str {
        match self {
            ApiCall::VerifySession { .. } => "verify_session",
            ApiCall::Login { .. } => "login",
            ApiCall::Logout { .. } => "logout",
            ApiCall::UpdateProfile(_) => "update_profile",
            ApiCall::Questions { .. } => "questions",
            ApiCall::Question(_) => "question",
            ApiCall::SubmitAnswer { .. } => "submit_answer",
            ApiCall::StudyHistory { .. } => "study_history",
            ApiCall::RequestRecommendations => "request_recommendations",
            ApiCall::PollRecommendations(_) => "poll_recommendations",
            ApiCall::UserStats => "user_stats",
            ApiCall::QuestionStats(_) => "question_stats",
        }
    }
}

#[derive(Debug)]
pub enum ApiOutcome {
    Verified(Result<VerifyResponse, ApiError>),
    LoggedIn(Result<AuthResponse, ApiError>),
    LoggedOut(Result<LogoutResponse, ApiError>),
    ProfileUpdated(Result<UpdateProfileResponse, ApiError>),
    Page(Result<QuestionsPage, ApiError>),
    Question(Result<Question, ApiError>),
    Submitted(Result<SubmitAnswerResponse, ApiError>),
    History(Result<Vec<StudyHistoryItem>, ApiError>),
    RecommendationRequested(Result<RecommendationJob, ApiError>),
    PollProgress { rec_id: String, attempt: u32 },
    PollFinished { rec_id: String, outcome: PollOutcome },
    UserStats(Result<UserStats, ApiError>),
    QuestionStats(Result<QuestionStats, ApiError>),
}

/// A call plus the state it was issued against: the auth epoch and a
/// per-feature tag. Replies echo both so stale ones can be dropped.
#[derive(Clone, Debug)]
pub struct Request {
    pub epoch: u64,
    pub tag: u64,
    pub call: ApiCall,
}

#[derive(Debug)]
pub struct Reply {
    pub epoch: u64,
    pub tag: u64,
    pub outcome: ApiOutcome,
}

pub trait Dispatch {
    fn dispatch(&self, request: Request);
}

/// Perform one call synchronously. Poll loops report each attempt through
/// `progress` before returning their final outcome.
pub fn execute(
    gateway: &Gateway,
    call: ApiCall,
    sleep: &dyn Fn(Duration),
    progress: &mut dyn FnMut(ApiOutcome),
) -> ApiOutcome {
    match call {
        ApiCall::VerifySession { token } => ApiOutcome::Verified(gateway.verify_session(&token)),
        ApiCall::Login { access_token } => {
            ApiOutcome::LoggedIn(gateway.login_with_google(&access_token))
        }
        ApiCall::Logout { token } => ApiOutcome::LoggedOut(gateway.logout(&token)),
        ApiCall::UpdateProfile(update) => {
            ApiOutcome::ProfileUpdated(gateway.update_profile(&update))
        }
        ApiCall::Questions { page, limit } => ApiOutcome::Page(gateway.questions(page, limit)),
        ApiCall::Question(id) => ApiOutcome::Question(gateway.question(&id)),
        ApiCall::SubmitAnswer {
            question_id,
            correct,
            answer,
        } => ApiOutcome::Submitted(gateway.submit_answer(&question_id, correct, answer.as_deref())),
        ApiCall::StudyHistory { limit } => ApiOutcome::History(gateway.study_history(limit)),
        ApiCall::RequestRecommendations => {
            ApiOutcome::RecommendationRequested(gateway.request_recommendations())
        }
        ApiCall::PollRecommendations(task) => {
            let rec_id = task.rec_id.clone();
            let outcome = task.run(
                |id| gateway.recommendation_status(id),
                sleep,
                |attempt| {
                    progress(ApiOutcome::PollProgress {
                        rec_id: rec_id.clone(),
                        attempt,
                    })
                },
            );
            ApiOutcome::PollFinished { rec_id, outcome }
        }
        ApiCall::UserStats => ApiOutcome::UserStats(gateway.user_stats()),
        ApiCall::QuestionStats(id) => ApiOutcome::QuestionStats(gateway.question_stats(&id)),
    }
}

/// One short-lived worker thread per call.
pub struct ThreadDispatcher {
    gateway: Arc<Gateway>,
    tx: Sender<AppEvent>,
}

impl ThreadDispatcher {
    pub fn new(gateway: Arc<Gateway>, tx: Sender<AppEvent>) -> Self {
        Self { gateway, tx }
    }
}

impl Dispatch for ThreadDispatcher {
    fn dispatch(&self, request: Request) {
        let gateway = self.gateway.clone();
        let tx = self.tx.clone();
        let Request { epoch, tag, call } = request;
        debug!(call = call.name(), epoch, tag, "dispatch");
        thread::spawn(move || {
            let progress_tx = tx.clone();
            let outcome = execute(&gateway, call, &thread::sleep, &mut |outcome| {
                let _ = progress_tx.send(AppEvent::Api(Reply {
                    epoch,
                    tag,
                    outcome,
                }));
            });
            // The loop may already be gone on shutdown.
            let _ = tx.send(AppEvent::Api(Reply {
                epoch,
                tag,
                outcome,
            }));
        });
    }
}
