use rust_i18n::t;

/// Screens, keyed by the paths the web client used.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Route {
    Login,
    Home,
    Study,
    Statistics,
    Recommendations,
    Profile,
    Settings,
}

impl Route {
    pub fn path(self) -> &'static str {
        match self {
            Route::Login => "/login",
            Route::Home => "/",
            Route::Study => "/study",
            Route::Statistics => "/statistics",
            Route::Recommendations => "/recommendations",
            Route::Profile => "/profile",
            Route::Settings => "/settings",
        }
    }

    /// Unknown paths land on home.
    pub fn parse(path: &str) -> Route {
        let path = path.trim();
        let path = path.split(['?', '#']).next().unwrap_or(path);
        let path = if path.len() > 1 {
            path.trim_end_matches('/')
        } else {
            path
        };
        match path {
            "/login" | "/auth/login" => Route::Login,
            "/study" => Route::Study,
            "/statistics" => Route::Statistics,
            "/recommendations" => Route::Recommendations,
            "/profile" | "/auth/profile" => Route::Profile,
            "/settings" => Route::Settings,
            _ => Route::Home,
        }
    }

    pub fn requires_auth(self) -> bool {
        matches!(
            self,
            Route::Study | Route::Statistics | Route::Recommendations | Route::Profile
        )
    }

    pub fn title(self) -> String {
        match self {
            Route::Login => t!("route.login").into_owned(),
            Route::Home => t!("route.home").into_owned(),
            Route::Study => t!("route.study").into_owned(),
            Route::Statistics => t!("route.statistics").into_owned(),
            Route::Recommendations => t!("route.recommendations").into_owned(),
            Route::Profile => t!("route.profile").into_owned(),
            Route::Settings => t!("route.settings").into_owned(),
        }
    }
}

/// Where a navigation to `route` actually ends up.
pub fn guard(route: Route, authenticated: bool) -> Route {
    match route {
        Route::Login if authenticated => Route::Study,
        r if r.requires_auth() && !authenticated => Route::Login,
        r => r,
    }
}
