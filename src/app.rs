use rust_i18n::t;
use tracing::{debug, info, warn};

use crate::api::types::{Gender, ProfileUpdate, QuestionId};
use crate::auth::{AuthSessionManager, AuthState, MAX_DISPLAY_NAME_CHARS};
use crate::config::{Config, SUPPORTED_LOCALES};
use crate::dispatch::{ApiCall, ApiOutcome, Dispatch, Reply, Request};
use crate::error::ApiError;
use crate::recommend::{PollPolicy, RecommendationPoller};
use crate::route::{self, Route};
use crate::stats::{QuestionStatsView, StatisticsView};
use crate::store::SessionStore;
use crate::study::{Answer, Navigation, StudyFlow, StudyMode};
use crate::ui::components::menu::{Menu, MenuAction};
use crate::ui::line_input::LineInput;
use crate::ui::theme::Theme;

const PAGE_SIZES: [u32; 5] = [5, 10, 20, 30, 50];
pub const SETTINGS_FIELDS: usize = 4;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusLevel {
    Info,
    Warn,
    Error,
}

/// One-line message under the current screen.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Status {
    pub text: String,
    pub level: StatusLevel,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ProfileField {
    #[default]
    Name,
    Gender,
    Age,
}

impl ProfileField {
    pub fn next(self) -> Self {
        match self {
            ProfileField::Name => ProfileField::Gender,
            ProfileField::Gender => ProfileField::Age,
            ProfileField::Age => ProfileField::Name,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            ProfileField::Name => ProfileField::Age,
            ProfileField::Gender => ProfileField::Name,
            ProfileField::Age => ProfileField::Gender,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct ProfileForm {
    pub name: LineInput,
    pub gender: Option<Gender>,
    pub age: LineInput,
    pub focus: ProfileField,
    pub error: Option<String>,
}

impl ProfileForm {
    pub fn cycle_gender(&mut self) {
        self.gender = match self.gender {
            None => Some(Gender::Male),
            Some(Gender::Male) => Some(Gender::Female),
            Some(Gender::Female) => None,
        };
    }

    /// Age is optional; anything that is not a number is rejected here
    /// before range validation.
    pub fn to_update(&self) -> Result<ProfileUpdate, ApiError> {
        let age = match self.age.value().trim() {
            "" => None,
            raw => Some(
                raw.parse::<u32>()
                    .map_err(|_| ApiError::validation(t!("profile.age_range")))?,
            ),
        };
        Ok(ProfileUpdate {
            display_name: self.name.value().to_string(),
            gender: self.gender,
            age,
        })
    }
}

pub struct App {
    pub route: Route,
    pub auth: AuthSessionManager,
    pub study: StudyFlow,
    pub poller: RecommendationPoller,
    pub stats: StatisticsView,
    pub question_stats: QuestionStatsView,
    pub menu: Menu<'static>,
    pub theme: &'static Theme,
    pub config: Config,
    pub status: Option<Status>,
    pub login_input: LineInput,
    pub login_error: Option<String>,
    pub profile: ProfileForm,
    pub answer_input: LineInput,
    pub selected_option: usize,
    pub rec_selected: usize,
    pub settings_selected: usize,
    pub should_quit: bool,
    dispatcher: Box<dyn Dispatch>,
    login_pending: bool,
    queued_login: Option<String>,
}

impl App {
    pub fn with_parts(
        config: Config,
        store: SessionStore,
        dispatcher: Box<dyn Dispatch>,
        theme: &'static Theme,
    ) -> Self {
        let poller = RecommendationPoller::new(poll_policy(&config));
        Self {
            route: Route::Home,
            auth: AuthSessionManager::new(store),
            study: StudyFlow::new(),
            poller,
            stats: StatisticsView::default(),
            question_stats: QuestionStatsView::default(),
            menu: Menu::new(theme, false),
            theme,
            config,
            status: None,
            login_input: LineInput::default().masked(),
            login_error: None,
            profile: ProfileForm::default(),
            answer_input: LineInput::default(),
            selected_option: 0,
            rec_selected: 0,
            settings_selected: 0,
            should_quit: false,
            dispatcher,
            login_pending: false,
            queued_login: None,
        }
    }

    /// Restore a stored session (if any) and optionally sign in with an
    /// access token handed over on the command line.
    pub fn start(&mut self, access_token: Option<&str>) {
        if let Some(call) = self.auth.initialize() {
            self.set_status(StatusLevel::Info, t!("auth.verifying"));
            self.send(0, call);
        }
        if let Some(token) = access_token {
            self.submit_login(token);
        }
        self.refresh_menu();
    }

    fn send(&self, tag: u64, call: ApiCall) {
        self.dispatcher.dispatch(Request {
            epoch: self.auth.epoch(),
            tag,
            call,
        });
    }

    pub fn set_status(&mut self, level: StatusLevel, text: impl Into<String>) {
        self.status = Some(Status {
            text: text.into(),
            level,
        });
    }

    fn error_status(&mut self, error: &ApiError) {
        self.set_status(StatusLevel::Error, error.user_message());
    }

    pub fn is_login_pending(&self) -> bool {
        self.login_pending || self.queued_login.is_some()
    }

    fn refresh_menu(&mut self) {
        self.menu.rebuild(self.auth.is_authenticated());
        self.menu.greeting = self
            .auth
            .user()
            .filter(|u| !u.display_name.is_empty())
            .map(|u| {
                t!(
                    "menu.greeting",
                    name = u.display_name.as_str(),
                    level = u.study_level.label()
                )
                .into_owned()
            });
    }

    /// While a stored session is being verified it is treated as signed
    /// in; a failed verification re-guards the current screen.
    fn signed_in(&self) -> bool {
        matches!(
            self.auth.state(),
            AuthState::Authenticated | AuthState::Verifying
        )
    }

    // ---------------------------------------------------------------------
    // Navigation
    // ---------------------------------------------------------------------

    pub fn navigate(&mut self, requested: Route) {
        let target = route::guard(requested, self.signed_in());
        if target != requested {
            info!(from = requested.path(), to = target.path(), "route redirected");
        }
        if self.route == Route::Recommendations && target != Route::Recommendations {
            self.poller.cancel();
        }
        if target != Route::Study {
            self.question_stats.close();
        }
        debug!(route = target.path(), "navigate");
        self.route = target;
        self.status = None;
        self.on_enter(target);
    }

    pub fn navigate_path(&mut self, path: &str) {
        self.navigate(Route::parse(path));
    }

    fn reguard(&mut self) {
        if route::guard(self.route, self.signed_in()) != self.route {
            self.navigate(self.route);
        }
    }

    fn on_enter(&mut self, route: Route) {
        match route {
            Route::Home => self.refresh_menu(),
            Route::Login => {
                self.login_input.clear();
                self.login_error = None;
            }
            Route::Study => {
                if self.study.questions().is_empty() && !self.study.is_loading() {
                    self.load_study_page(1);
                }
            }
            Route::Statistics => self.load_statistics(),
            Route::Recommendations => {
                if !self.poller.is_busy() {
                    self.request_recommendations();
                }
            }
            Route::Profile => self.fill_profile_form(),
            Route::Settings => {}
        }
    }

    pub fn menu_action(&mut self, action: MenuAction) {
        match action {
            MenuAction::Go(route) => self.navigate(route),
            MenuAction::Logout => self.logout(),
            MenuAction::Quit => self.should_quit = true,
        }
    }

    // ---------------------------------------------------------------------
    // Auth
    // ---------------------------------------------------------------------

    pub fn submit_login(&mut self, access_token: &str) {
        match self.auth.login(access_token) {
            Err(e) => self.login_error = Some(e.user_message()),
            Ok(_) if self.auth.state() == AuthState::Verifying => {
                // Sent once verification settles so its epoch bump does not
                // discard the login reply.
                self.queued_login = Some(access_token.trim().to_string());
            }
            Ok(call) => {
                self.login_error = None;
                self.login_pending = true;
                self.send(0, call);
            }
        }
    }

    pub fn logout(&mut self) {
        if let Some(call) = self.auth.logout() {
            self.send(0, call);
        }
        self.reset_user_state();
        self.refresh_menu();
        self.navigate(Route::Home);
        self.set_status(StatusLevel::Info, t!("auth.logged_out"));
    }

    /// The backend rejected `token`. Stale rejections (a token we no
    /// longer hold) are ignored.
    pub fn handle_session_rejected(&mut self, token: Option<String>) {
        let dropped = self.auth.handle_rejected(token.as_deref());
        if dropped {
            warn!("session rejected by backend");
            self.reset_user_state();
            self.refresh_menu();
        }
        if dropped || !self.signed_in() {
            self.navigate(Route::Login);
            self.login_error = Some(ApiError::Unauthenticated.user_message());
        }
        self.flush_queued_login();
    }

    /// Send a login held back during verification once auth has settled,
    /// however it settled.
    fn flush_queued_login(&mut self) {
        if self.auth.state() == AuthState::Verifying {
            return;
        }
        if let Some(token) = self.queued_login.take() {
            self.submit_login(&token);
        }
    }

    fn reset_user_state(&mut self) {
        self.poller.cancel();
        self.poller = RecommendationPoller::new(poll_policy(&self.config));
        self.study = StudyFlow::new();
        self.stats = StatisticsView::default();
        self.question_stats = QuestionStatsView::default();
        self.profile = ProfileForm::default();
        self.answer_input.clear();
        self.selected_option = 0;
        self.rec_selected = 0;
        self.login_pending = false;
    }

    fn fill_profile_form(&mut self) {
        let mut form = ProfileForm {
            name: LineInput::default().max_chars(MAX_DISPLAY_NAME_CHARS),
            age: LineInput::default().max_chars(3),
            ..ProfileForm::default()
        };
        if let Some(user) = self.auth.user() {
            form.name.set_value(&user.display_name);
            form.gender = user.gender;
            if let Some(age) = user.age {
                form.age.set_value(&age.to_string());
            }
        }
        self.profile = form;
    }

    pub fn submit_profile(&mut self) {
        if self.auth.profile_pending() {
            return;
        }
        let call = self
            .profile
            .to_update()
            .and_then(|update| self.auth.update_profile(update));
        match call {
            Ok(call) => {
                self.profile.error = None;
                self.send(0, call);
            }
            Err(e) => self.profile.error = Some(e.user_message()),
        }
    }

    // ---------------------------------------------------------------------
    // Study
    // ---------------------------------------------------------------------

    pub fn load_study_page(&mut self, page: u32) {
        match self.study.load_page(page, self.config.page_size) {
            Ok((tag, call)) => self.send(tag, call),
            Err(e) => self.error_status(&e),
        }
    }

    pub fn study_question(&mut self, id: QuestionId) {
        let (tag, call) = self.study.load_single(id);
        self.send(tag, call);
        self.reset_answer();
        self.navigate(Route::Study);
    }

    fn reset_answer(&mut self) {
        self.answer_input.clear();
        self.selected_option = 0;
    }

    pub fn submit_answer(&mut self) {
        let answer = match self.config.study_mode {
            StudyMode::Choice => match self.study.options().get(self.selected_option) {
                Some(option) => Answer::Choice(option.clone()),
                None => return,
            },
            StudyMode::Typed => Answer::Typed(self.answer_input.value().to_string()),
        };
        match self.study.submit_answer(answer) {
            Ok((tag, call)) => {
                self.study.clear_error();
                self.send(tag, call);
            }
            Err(e) => self.error_status(&e),
        }
    }

    pub fn select_option(&mut self, delta: isize) {
        let count = self.study.options().len();
        if count == 0 {
            return;
        }
        self.selected_option =
            (self.selected_option as isize + delta).rem_euclid(count as isize) as usize;
    }

    pub fn next_question(&mut self) {
        match self.study.next() {
            Navigation::Moved(_) => {
                self.reset_answer();
                self.status = None;
            }
            Navigation::EndOfSet if self.study.has_next_page() => {
                let page = self.study.page() + 1;
                self.reset_answer();
                self.load_study_page(page);
            }
            Navigation::EndOfSet => self.set_status(StatusLevel::Warn, t!("study.end_of_set")),
            Navigation::StartOfSet => {}
        }
    }

    pub fn previous_question(&mut self) {
        match self.study.previous() {
            Navigation::Moved(_) => {
                self.reset_answer();
                self.status = None;
            }
            Navigation::StartOfSet if self.study.page() > 1 => {
                let page = self.study.page() - 1;
                self.reset_answer();
                self.load_study_page(page);
            }
            _ => self.set_status(StatusLevel::Warn, t!("study.start_of_set")),
        }
    }

    pub fn retry_study(&mut self) {
        self.study.clear_error();
        self.status = None;
        if self.study.questions().is_empty() {
            self.load_study_page(self.study.page().max(1));
        }
    }

    pub fn toggle_study_mode(&mut self) {
        self.config.study_mode = self.config.study_mode.toggle();
        self.reset_answer();
    }

    pub fn open_question_stats(&mut self) {
        let Some(id) = self.study.current().map(|q| q.id.clone()) else {
            return;
        };
        let tag = self.question_stats.begin();
        self.send(tag, ApiCall::QuestionStats(id));
    }

    // ---------------------------------------------------------------------
    // Statistics / recommendations
    // ---------------------------------------------------------------------

    pub fn load_statistics(&mut self) {
        let tag = self.stats.begin_user_stats();
        self.send(tag, ApiCall::UserStats);
        let tag = self.stats.begin_history();
        self.send(
            tag,
            ApiCall::StudyHistory {
                limit: self.config.history_limit,
            },
        );
    }

    pub fn request_recommendations(&mut self) {
        let generation = self.poller.request();
        self.rec_selected = 0;
        self.send(generation, ApiCall::RequestRecommendations);
    }

    pub fn select_recommendation(&mut self, delta: isize) {
        let count = self.poller.items().len();
        if count == 0 {
            return;
        }
        self.rec_selected =
            (self.rec_selected as isize + delta).clamp(0, count as isize - 1) as usize;
    }

    pub fn solve_selected_recommendation(&mut self) {
        if let Some(item) = self.poller.items().get(self.rec_selected) {
            let id = item.question_id.clone();
            self.study_question(id);
        }
    }

    // ---------------------------------------------------------------------
    // Settings
    // ---------------------------------------------------------------------

    pub fn settings_cycle(&mut self, forward: bool) {
        match self.settings_selected {
            0 => {
                let themes = Theme::available_themes();
                if let Some(name) = cycle(&themes, &self.config.theme, forward) {
                    if let Some(theme) = Theme::load(&name) {
                        let theme = theme.leak();
                        self.theme = theme;
                        self.menu.theme = theme;
                        self.config.theme = name;
                    }
                }
            }
            1 => {
                if let Some(size) = cycle(&PAGE_SIZES, &self.config.page_size, forward) {
                    self.config.page_size = size;
                }
            }
            2 => self.toggle_study_mode(),
            3 => {
                let current = self.config.locale.clone();
                if let Some(locale) = cycle(SUPPORTED_LOCALES, &current.as_str(), forward) {
                    rust_i18n::set_locale(locale);
                    self.config.locale = locale.to_string();
                    self.refresh_menu();
                }
            }
            _ => {}
        }
    }

    pub fn save_settings(&mut self) {
        if let Err(e) = self.config.save() {
            warn!(error = %e, "failed to save config");
            self.set_status(StatusLevel::Error, t!("settings.save_failed"));
        }
    }

    // ---------------------------------------------------------------------
    // Replies
    // ---------------------------------------------------------------------

    pub fn handle_reply(&mut self, reply: Reply) {
        let Reply {
            epoch,
            tag,
            outcome,
        } = reply;
        if epoch != self.auth.epoch() {
            debug!(epoch, current = self.auth.epoch(), "stale reply dropped");
            return;
        }
        match outcome {
            ApiOutcome::Verified(result) => {
                self.auth.complete_verify(result);
                self.status = None;
                self.refresh_menu();
                self.reguard();
                self.flush_queued_login();
            }
            ApiOutcome::LoggedIn(result) => {
                self.login_pending = false;
                match self.auth.complete_login(result) {
                    Ok(()) => {
                        self.login_input.clear();
                        self.login_error = None;
                        self.refresh_menu();
                        self.navigate(Route::Study);
                    }
                    Err(e) => self.login_error = Some(e.user_message()),
                }
            }
            ApiOutcome::LoggedOut(result) => {
                if let Err(e) = result {
                    warn!(error = %e, "server-side logout failed");
                }
            }
            ApiOutcome::ProfileUpdated(result) => match self.auth.complete_profile(result) {
                Ok(()) => {
                    self.refresh_menu();
                    self.set_status(StatusLevel::Info, t!("profile.saved"));
                }
                Err(e) => self.profile.error = Some(e.user_message()),
            },
            ApiOutcome::Page(result) => {
                self.study.complete_page(tag, result);
            }
            ApiOutcome::Question(result) => {
                self.study.complete_single(tag, result);
            }
            ApiOutcome::Submitted(result) => {
                if self.study.complete_submit(tag, result) && self.study.error().is_none() {
                    self.answer_input.clear();
                }
            }
            ApiOutcome::History(result) => {
                self.stats.complete_history(tag, result);
            }
            ApiOutcome::UserStats(result) => {
                self.stats.complete_user_stats(tag, result);
            }
            ApiOutcome::QuestionStats(result) => {
                self.question_stats.complete(tag, result);
            }
            ApiOutcome::RecommendationRequested(result) => {
                if let Some(task) = self.poller.complete_request(tag, result) {
                    self.send(tag, ApiCall::PollRecommendations(task));
                }
            }
            ApiOutcome::PollProgress { rec_id, attempt } => {
                self.poller.record_attempt(tag, &rec_id, attempt);
            }
            ApiOutcome::PollFinished { rec_id, outcome } => {
                if self.poller.complete_poll(tag, &rec_id, outcome) {
                    self.rec_selected = 0;
                }
            }
        }
    }
}

fn poll_policy(config: &Config) -> PollPolicy {
    PollPolicy {
        interval: config.poll_interval(),
        max_attempts: config.poll_max_attempts,
    }
}

/// Neighbour of `current` in `values`, wrapping. Unknown values start over
/// at the first entry.
fn cycle<T: Clone + PartialEq>(values: &[T], current: &T, forward: bool) -> Option<T> {
    if values.is_empty() {
        return None;
    }
    let len = values.len();
    let next = match values.iter().position(|v| v == current) {
        Some(i) if forward => (i + 1) % len,
        Some(i) => (i + len - 1) % len,
        None => 0,
    };
    values.get(next).cloned()
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::api::types::{AuthResponse, QuestionsPage, StudyLevel, VerifyResponse};
    use crate::store::Session;
    use tempfile::TempDir;

    #[derive(Clone, Default)]
    struct Recorder(Rc<RefCell<Vec<Request>>>);

    impl Dispatch for Recorder {
        fn dispatch(&self, request: Request) {
            self.0.borrow_mut().push(request);
        }
    }

    impl Recorder {
        fn take(&self) -> Vec<Request> {
            std::mem::take(&mut *self.0.borrow_mut())
        }
    }

    fn app() -> (TempDir, Recorder, App) {
        let dir = TempDir::new().unwrap();
        let store = SessionStore::with_base_dir(dir.path().to_path_buf()).unwrap();
        let recorder = Recorder::default();
        let app = App::with_parts(
            Config::default(),
            store,
            Box::new(recorder.clone()),
            Theme::default().leak(),
        );
        (dir, recorder, app)
    }

    fn reply(app: &App, request: &Request, outcome: ApiOutcome) -> Reply {
        Reply {
            epoch: app.auth.epoch(),
            tag: request.tag,
            outcome,
        }
    }

    fn login(app: &mut App, recorder: &Recorder) {
        app.submit_login("google-token");
        let sent = recorder.take();
        assert!(matches!(sent[0].call, ApiCall::Login { .. }));
        let outcome = ApiOutcome::LoggedIn(Ok(AuthResponse {
            session_token: "s-1".into(),
            display_name: "길동".into(),
            study_level: StudyLevel::from("우"),
            user: None,
        }));
        let r = reply(app, &sent[0], outcome);
        app.handle_reply(r);
    }

    #[test]
    fn guarded_routes_redirect_to_login() {
        let (_dir, _rec, mut app) = app();
        app.start(None);
        app.navigate(Route::Statistics);
        assert_eq!(app.route, Route::Login);
        app.navigate_path("/nowhere");
        assert_eq!(app.route, Route::Home);
    }

    #[test]
    fn login_lands_on_study_and_loads_first_page() {
        let (_dir, recorder, mut app) = app();
        app.start(None);
        login(&mut app, &recorder);
        assert!(app.auth.is_authenticated());
        assert_eq!(app.route, Route::Study);
        let sent = recorder.take();
        assert!(matches!(sent[0].call, ApiCall::Questions { page: 1, limit: 10 }));

        app.navigate(Route::Login);
        assert_eq!(app.route, Route::Study);
    }

    #[test]
    fn empty_login_token_is_rejected_locally() {
        let (_dir, recorder, mut app) = app();
        app.start(None);
        app.submit_login("   ");
        assert!(app.login_error.is_some());
        assert!(recorder.take().is_empty());
    }

    #[test]
    fn replies_from_an_older_epoch_are_dropped() {
        let (_dir, recorder, mut app) = app();
        app.start(None);
        login(&mut app, &recorder);
        let page_request = recorder.take().remove(0);
        let stale = Reply {
            epoch: app.auth.epoch() - 1,
            tag: page_request.tag,
            outcome: ApiOutcome::Page(Ok(QuestionsPage::default())),
        };
        app.handle_reply(stale);
        assert!(app.study.is_loading());
    }

    #[test]
    fn rejection_of_current_token_routes_to_login() {
        let (_dir, recorder, mut app) = app();
        app.start(None);
        login(&mut app, &recorder);
        app.handle_session_rejected(Some("s-1".into()));
        assert_eq!(app.route, Route::Login);
        assert!(!app.auth.is_authenticated());
        assert!(app.auth.session().is_none());
    }

    #[test]
    fn rejection_of_old_token_is_ignored() {
        let (_dir, recorder, mut app) = app();
        app.start(None);
        login(&mut app, &recorder);
        app.handle_session_rejected(Some("s-0".into()));
        assert_eq!(app.route, Route::Study);
        assert!(app.auth.is_authenticated());
    }

    #[test]
    fn stored_session_is_verified_on_start() {
        let dir = TempDir::new().unwrap();
        let store = SessionStore::with_base_dir(dir.path().to_path_buf()).unwrap();
        store
            .save(&Session::new("stored", "", StudyLevel::default()))
            .unwrap();
        let recorder = Recorder::default();
        let mut app = App::with_parts(
            Config::default(),
            store,
            Box::new(recorder.clone()),
            Theme::default().leak(),
        );
        app.start(Some("fresh-token"));
        let sent = recorder.take();
        assert_eq!(sent.len(), 1);
        assert!(matches!(sent[0].call, ApiCall::VerifySession { .. }));
        assert!(app.is_login_pending());

        let verified = ApiOutcome::Verified(Ok(VerifyResponse {
            is_valid: false,
            ..VerifyResponse::default()
        }));
        let r = reply(&app, &sent[0], verified);
        app.handle_reply(r);
        assert_eq!(app.auth.state(), AuthState::Anonymous);
        // The queued login goes out once verification settles.
        let sent = recorder.take();
        assert!(matches!(sent[0].call, ApiCall::Login { .. }));
    }

    #[test]
    fn queued_login_survives_verify_rejected_with_401() {
        let dir = TempDir::new().unwrap();
        let store = SessionStore::with_base_dir(dir.path().to_path_buf()).unwrap();
        store
            .save(&Session::new("stale", "", StudyLevel::default()))
            .unwrap();
        let recorder = Recorder::default();
        let mut app = App::with_parts(
            Config::default(),
            store,
            Box::new(recorder.clone()),
            Theme::default().leak(),
        );
        app.start(Some("fresh-token"));
        let verify = recorder.take().remove(0);

        // The gateway's 401 hook lands before the verify reply itself.
        app.handle_session_rejected(Some("stale".into()));
        app.handle_reply(Reply {
            epoch: verify.epoch,
            tag: verify.tag,
            outcome: ApiOutcome::Verified(Err(ApiError::Unauthenticated)),
        });

        assert_eq!(app.route, Route::Login);
        let sent = recorder.take();
        assert_eq!(sent.len(), 1);
        assert!(matches!(
            &sent[0].call,
            ApiCall::Login { access_token } if access_token == "fresh-token"
        ));
        assert!(app.is_login_pending());

        let outcome = ApiOutcome::LoggedIn(Ok(AuthResponse {
            session_token: "s-2".into(),
            display_name: "길동".into(),
            study_level: StudyLevel::from("우"),
            user: None,
        }));
        let r = reply(&app, &sent[0], outcome);
        app.handle_reply(r);
        assert!(app.auth.is_authenticated());
        assert!(!app.is_login_pending());
        assert_eq!(app.route, Route::Study);
    }

    #[test]
    fn leaving_recommendations_cancels_polling() {
        let (_dir, recorder, mut app) = app();
        app.start(None);
        login(&mut app, &recorder);
        recorder.take();
        app.navigate(Route::Recommendations);
        assert!(app.poller.is_busy());
        app.navigate(Route::Home);
        assert!(!app.poller.is_busy());
    }

    #[test]
    fn profile_form_rejects_non_numeric_age() {
        let mut form = ProfileForm::default();
        form.name.set_value("길동");
        form.age.set_value("열살");
        assert!(matches!(form.to_update(), Err(ApiError::Validation(_))));
        form.age.set_value("");
        assert_eq!(form.to_update().unwrap().age, None);
    }

    #[test]
    fn settings_cycle_wraps() {
        assert_eq!(cycle(&PAGE_SIZES, &50, true), Some(5));
        assert_eq!(cycle(&PAGE_SIZES, &5, false), Some(50));
        assert_eq!(cycle(&PAGE_SIZES, &7, true), Some(5));
    }
}
