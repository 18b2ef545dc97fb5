use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info, warn};

use rust_i18n::t;

use crate::api::transport::{HttpRequest, HttpResponse, Method, Transport};
use crate::api::types::CorrectnessEncoding;
use crate::error::ApiError;
use crate::store::SessionStore;

/// Called after a 401, with the token the rejected request carried.
pub type UnauthorizedHook = Box<dyn Fn(Option<&str>) + Send + Sync>;

/// Single point of contact with the backend.
///
/// Every call reads the bearer token from the [`SessionStore`] at send time
/// and remembers it, so a 401 can clear exactly that session and nothing
/// newer.
pub struct Gateway {
    base_url: String,
    transport: Box<dyn Transport>,
    store: SessionStore,
    encoding: CorrectnessEncoding,
    on_unauthorized: Option<UnauthorizedHook>,
}

impl Gateway {
    pub fn new(
        base_url: impl Into<String>,
        transport: Box<dyn Transport>,
        store: SessionStore,
        encoding: CorrectnessEncoding,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            transport,
            store,
            encoding,
            on_unauthorized: None,
        }
    }

    pub fn with_unauthorized_hook(mut self, hook: UnauthorizedHook) -> Self {
        self.on_unauthorized = Some(hook);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn encoding(&self) -> CorrectnessEncoding {
        self.encoding
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// The stored token, or `NotAuthenticated` for calls that need one.
    pub(crate) fn session_token(&self) -> Result<String, ApiError> {
        self.store.token().ok_or(ApiError::NotAuthenticated)
    }

    pub fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<T, ApiError> {
        let token = self.store.token();
        self.request_as(method, path, body, token)
    }

    pub fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.request(Method::Get, path, None)
    }

    pub fn post<T: DeserializeOwned>(&self, path: &str, body: &Value) -> Result<T, ApiError> {
        self.request(Method::Post, path, Some(body))
    }

    /// Send with an explicit bearer token. Wrappers that also put the
    /// token in the body use this so both always agree.
    pub(crate) fn request_as<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        token: Option<String>,
    ) -> Result<T, ApiError> {
        let request = HttpRequest {
            method,
            url: format!("{}{}", self.base_url, path),
            bearer: token,
            body: body.map(Value::to_string),
        };
        debug!(method = method.as_str(), url = %request.url, "api request");

        let response = self.transport.send(&request).map_err(|e| {
            warn!(url = %request.url, error = %e, "transport failure");
            e
        })?;

        if response.status == 401 {
            self.handle_unauthorized(request.bearer.as_deref());
            return Err(ApiError::Unauthenticated);
        }
        if !response.is_success() {
            let err = normalize_failure(&response);
            warn!(url = %request.url, status = response.status, code = err.code(), "api failure");
            return Err(err);
        }

        let text = if response.body.trim().is_empty() {
            "{}"
        } else {
            response.body.as_str()
        };
        serde_json::from_str(text).map_err(|e| {
            warn!(url = %request.url, error = %e, "undecodable response");
            ApiError::Decode(e.to_string())
        })
    }

    fn handle_unauthorized(&self, sent_token: Option<&str>) {
        if let Some(token) = sent_token {
            match self.store.clear_if(token) {
                Ok(true) => info!("session rejected by server, cleared"),
                Ok(false) => info!("stale 401 ignored, a newer session is stored"),
                Err(e) => warn!(error = %e, "failed to clear rejected session"),
            }
        }
        if let Some(hook) = &self.on_unauthorized {
            hook(sent_token);
        }
    }
}

/// Turn a non-2xx, non-401 response into `ApiError::Server`.
pub fn normalize_failure(response: &HttpResponse) -> ApiError {
    let parsed: Option<Value> = serde_json::from_str(&response.body).ok();
    let message = parsed
        .as_ref()
        .and_then(extract_message)
        .unwrap_or_else(|| t!("errors.unknown").into_owned());
    let code = parsed
        .as_ref()
        .and_then(|v| v.get("code"))
        .and_then(|c| match c {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
        .unwrap_or_else(|| format!("http_{}", response.status));
    ApiError::Server { code, message }
}

fn extract_message(value: &Value) -> Option<String> {
    if let Some(message) = value.get("message").and_then(Value::as_str) {
        return Some(message.to_string());
    }
    match value.get("detail") {
        Some(Value::String(detail)) => return Some(detail.clone()),
        // Validation errors arrive as a list of {loc, msg, type}.
        Some(Value::Array(items)) => {
            if let Some(msg) = items.first().and_then(|i| i.get("msg")).and_then(Value::as_str) {
                return Some(msg.to_string());
            }
        }
        _ => {}
    }
    match value.get("error") {
        Some(Value::String(error)) => Some(error.clone()),
        Some(error) => error
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string),
        None => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use crate::store::Session;
    use crate::api::types::{QuestionId, StudyLevel};
    use tempfile::TempDir;

    struct Canned {
        response: Result<HttpResponse, ApiError>,
        seen: Arc<Mutex<Vec<HttpRequest>>>,
    }

    impl Transport for Canned {
        fn send(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
            self.seen.lock().unwrap().push(request.clone());
            self.response.clone()
        }
    }

    fn gateway(status: u16, body: &str) -> (TempDir, Gateway, Arc<Mutex<Vec<HttpRequest>>>) {
        let dir = TempDir::new().unwrap();
        let store = SessionStore::with_base_dir(dir.path().to_path_buf()).unwrap();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let transport = Canned {
            response: Ok(HttpResponse {
                status,
                body: body.to_string(),
            }),
            seen: seen.clone(),
        };
        let gw = Gateway::new(
            "http://api.test/",
            Box::new(transport),
            store,
            CorrectnessEncoding::Boolean,
        );
        (dir, gw, seen)
    }

    #[test]
    fn attaches_bearer_from_store() {
        let (_dir, gw, seen) = gateway(200, r#"{"success": true}"#);
        gw.store()
            .save(&Session::new("tok-9", "a", StudyLevel::default()))
            .unwrap();
        let _: Value = gw.get("/api/questions/1").unwrap();
        let sent = seen.lock().unwrap();
        assert_eq!(sent[0].url, "http://api.test/api/questions/1");
        assert_eq!(sent[0].bearer.as_deref(), Some("tok-9"));
    }

    #[test]
    fn unauthorized_clears_store_and_fires_hook() {
        let (_dir, gw, _) = gateway(401, "");
        let fired = Arc::new(Mutex::new(None));
        let sink = fired.clone();
        let gw = gw.with_unauthorized_hook(Box::new(move |token| {
            *sink.lock().unwrap() = Some(token.map(str::to_string));
        }));
        gw.store()
            .save(&Session::new("tok", "a", StudyLevel::default()))
            .unwrap();
        let err = gw.get::<Value>("/api/stats/questions/1").unwrap_err();
        assert_eq!(err, ApiError::Unauthenticated);
        assert!(gw.store().load().is_none());
        assert_eq!(*fired.lock().unwrap(), Some(Some("tok".to_string())));
    }

    #[test]
    fn server_error_message_sources() {
        let resp = |body: &str| HttpResponse {
            status: 400,
            body: body.to_string(),
        };
        assert_eq!(
            normalize_failure(&resp(r#"{"message": "bad page"}"#)),
            ApiError::Server {
                code: "http_400".to_string(),
                message: "bad page".to_string()
            }
        );
        assert_eq!(
            normalize_failure(&resp(r#"{"detail": "Invalid session token"}"#)).user_message(),
            "Invalid session token"
        );
        assert_eq!(
            normalize_failure(&resp(r#"{"detail": [{"loc": ["body"], "msg": "field required"}]}"#))
                .user_message(),
            "field required"
        );
        assert_eq!(
            normalize_failure(&resp(r#"{"error": {"message": "nope"}, "code": "E42"}"#)),
            ApiError::Server {
                code: "E42".to_string(),
                message: "nope".to_string()
            }
        );
        let fallback = normalize_failure(&resp("<html>oops</html>"));
        assert_eq!(fallback.code(), "http_400");
        assert!(!fallback.user_message().is_empty());
    }

    #[test]
    fn undecodable_success_is_decode_error() {
        let (_dir, gw, _) = gateway(200, "not json");
        assert!(matches!(
            gw.get::<Value>("/x").unwrap_err(),
            ApiError::Decode(_)
        ));
    }

    #[test]
    fn transport_failure_passes_through() {
        let dir = TempDir::new().unwrap();
        let store = SessionStore::with_base_dir(dir.path().to_path_buf()).unwrap();
        let gw = Gateway::new(
            "http://api.test",
            Box::new(crate::api::transport::OfflineTransport),
            store,
            CorrectnessEncoding::Boolean,
        );
        assert!(matches!(
            gw.get::<Value>("/x").unwrap_err(),
            ApiError::Network(_)
        ));
    }

    #[test]
    fn ids_are_percent_encoded_in_paths_and_queries() {
        let (_dir, gw, seen) = gateway(200, r#"{"success": false}"#);
        gw.recommendation_status("r 1&x=한").unwrap();
        let (_dir2, gw2, seen2) = gateway(500, "");
        let _ = gw2.question_stats(&QuestionId::from("7/8"));
        assert_eq!(
            seen.lock().unwrap()[0].url,
            "http://api.test/api/recommendations/success?rec_id=r%201%26x%3D%ED%95%9C"
        );
        assert_eq!(
            seen2.lock().unwrap()[0].url,
            "http://api.test/api/stats/questions/7%2F8"
        );
    }
}
