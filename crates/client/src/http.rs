//! HTTP implementation of the API traits
//!
//! Talks JSON to the task backend with `reqwest`. The backend keeps the
//! session in a cookie; the client stores it in a cookie jar so it can be
//! persisted between CLI runs and seeded back in.

use std::sync::Arc;
use std::time::Duration;

use reqwest::cookie::{CookieStore, Jar};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode, Url};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::debug;

use crate::api::{AdminApi, AuthApi, TaskApi};
use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::filter::FilterContext;
use crate::models::{Credentials, Page, Role, Task, TaskDraft, TaskPatch, User};

/// Name of the session cookie issued by the backend
pub const SESSION_COOKIE: &str = "fgkt";

/// What a request refers to, for 404 reporting
#[derive(Debug, Clone, Copy)]
struct Target<'a> {
    resource: &'static str,
    id: &'a str,
}

impl<'a> Target<'a> {
    fn new(resource: &'static str, id: &'a str) -> Self {
        Self { resource, id }
    }
}

/// Auth responses wrap the user, verify returns it bare
#[derive(Deserialize)]
#[serde(untagged)]
enum UserBody {
    Wrapped { user: User },
    Bare(User),
}

impl UserBody {
    fn into_user(self) -> User {
        match self {
            UserBody::Wrapped { user } | UserBody::Bare(user) => user,
        }
    }
}

#[derive(Deserialize)]
struct DataBody<T> {
    data: T,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// API client backed by `reqwest`
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    base_url: Url,
    jar: Arc<Jar>,
}

impl HttpClient {
    /// Create a client for `base_url` with a per-request timeout.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::InvalidUrl` if `base_url` is not an absolute
    /// http(s) URL, or `ClientError::Http` if the TLS backend fails to
    /// initialise.
    pub fn new(base_url: &str, timeout: Duration) -> ClientResult<Self> {
        let base_url = parse_base_url(base_url)?;
        let jar = Arc::new(Jar::default());
        let client = Client::builder()
            .cookie_provider(Arc::clone(&jar))
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::Http {
                url: base_url.to_string(),
                source: Box::new(e),
            })?;

        Ok(Self {
            client,
            base_url,
            jar,
        })
    }

    /// Create a client from resolved configuration.
    pub fn from_config(config: &ClientConfig) -> ClientResult<Self> {
        Self::new(&config.api_url, config.request_timeout)
    }

    /// Seed the session cookie, e.g. from a saved session.
    pub fn with_session_token(self, token: &str) -> Self {
        let cookie = format!("{}={}; Path=/", SESSION_COOKIE, token);
        self.jar.add_cookie_str(&cookie, &self.base_url);
        self
    }

    /// The current session cookie value, if the backend has issued one.
    pub fn session_token(&self) -> Option<String> {
        let header = self.jar.cookies(&self.base_url)?;
        let header = header.to_str().ok()?;
        header
            .split(';')
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(name, _)| *name == SESSION_COOKIE)
            .map(|(_, value)| value.to_string())
            .filter(|value| !value.is_empty())
    }

    /// Base URL requests are resolved against
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, segments: &[&str]) -> ClientResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ClientError::InvalidUrl {
                url: self.base_url.to_string(),
                reason: "URL cannot be a base".to_string(),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, url: &Url) -> RequestBuilder {
        debug!(%method, %url, "sending request");
        self.client.request(method, url.clone())
    }

    async fn send(
        &self,
        request: RequestBuilder,
        url: &Url,
        target: Target<'_>,
    ) -> ClientResult<Response> {
        let response = request
            .send()
            .await
            .map_err(|e| transport_error(url, e))?;
        let status = response.status();
        debug!(%url, status = status.as_u16(), "received response");

        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(status_error(status, &body, target))
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        url: &Url,
        target: Target<'_>,
    ) -> ClientResult<T> {
        let response = self.send(request, url, target).await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| transport_error(url, e))?;
        serde_json::from_slice(&bytes).map_err(|e| ClientError::Decode {
            url: url.to_string(),
            message: e.to_string(),
        })
    }

    async fn send_empty(
        &self,
        request: RequestBuilder,
        url: &Url,
        target: Target<'_>,
    ) -> ClientResult<()> {
        self.send(request, url, target).await.map(|_| ())
    }

    async fn authenticate(&self, path: &str, credentials: &Credentials) -> ClientResult<User> {
        let url = self.endpoint(&["auth", path])?;
        let request = self.request(Method::POST, &url).json(credentials);
        let body: UserBody = self
            .send_json(request, &url, Target::new("Account", &credentials.email))
            .await
            .map_err(|e| match e {
                // A 401 here means bad credentials, not an expired session
                ClientError::Unauthorized => ClientError::Status {
                    code: 401,
                    message: "Invalid email or password".to_string(),
                },
                other => other,
            })?;
        Ok(body.into_user())
    }
}

fn parse_base_url(raw: &str) -> ClientResult<Url> {
    let invalid = |reason: String| ClientError::InvalidUrl {
        url: raw.to_string(),
        reason,
    };
    let mut url = Url::parse(raw.trim()).map_err(|e| invalid(e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme '{}'", url.scheme())));
    }
    if url.cannot_be_a_base() {
        return Err(invalid("URL cannot be a base".to_string()));
    }
    url.set_query(None);
    url.set_fragment(None);
    Ok(url)
}

fn transport_error(url: &Url, err: reqwest::Error) -> ClientError {
    if err.is_timeout() {
        ClientError::Timeout {
            url: url.to_string(),
        }
    } else {
        ClientError::Http {
            url: url.to_string(),
            source: Box::new(err),
        }
    }
}

fn status_error(status: StatusCode, body: &str, target: Target<'_>) -> ClientError {
    let message = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.message)
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("Unknown error").to_string());

    match status {
        StatusCode::UNAUTHORIZED => ClientError::Unauthorized,
        StatusCode::FORBIDDEN => ClientError::Forbidden { message },
        StatusCode::NOT_FOUND => ClientError::NotFound {
            resource: target.resource,
            id: target.id.to_string(),
        },
        other => ClientError::Status {
            code: other.as_u16(),
            message,
        },
    }
}

impl TaskApi for HttpClient {
    async fn list(&self, filter: &FilterContext) -> ClientResult<Page<Task>> {
        let url = self.endpoint(&["tasks"])?;
        let request = self
            .request(Method::GET, &url)
            .query(&filter.query_pairs());
        let page = filter.page.to_string();
        self.send_json(request, &url, Target::new("Page", &page)).await
    }

    async fn create(&self, draft: &TaskDraft) -> ClientResult<Task> {
        let url = self.endpoint(&["tasks"])?;
        let request = self.request(Method::POST, &url).json(draft);
        self.send_json(request, &url, Target::new("Task", &draft.title))
            .await
    }

    async fn update(&self, id: &str, patch: &TaskPatch) -> ClientResult<Task> {
        let url = self.endpoint(&["tasks", id])?;
        let request = self.request(Method::PUT, &url).json(patch);
        self.send_json(request, &url, Target::new("Task", id)).await
    }

    async fn delete(&self, id: &str) -> ClientResult<()> {
        let url = self.endpoint(&["tasks", id])?;
        let request = self.request(Method::DELETE, &url);
        self.send_empty(request, &url, Target::new("Task", id)).await
    }

    async fn update_position(&self, id: &str, position: u32) -> ClientResult<()> {
        let url = self.endpoint(&["tasks", id, "position"])?;
        let request = self
            .request(Method::PATCH, &url)
            .json(&json!({ "position": position }));
        self.send_empty(request, &url, Target::new("Task", id)).await
    }
}

impl AuthApi for HttpClient {
    async fn login(&self, credentials: &Credentials) -> ClientResult<User> {
        self.authenticate("login", credentials).await
    }

    async fn register(&self, credentials: &Credentials) -> ClientResult<User> {
        self.authenticate("register", credentials).await
    }

    async fn logout(&self) -> ClientResult<()> {
        let url = self.endpoint(&["auth", "logout"])?;
        let request = self.request(Method::POST, &url);
        self.send_empty(request, &url, Target::new("Session", SESSION_COOKIE))
            .await
    }

    async fn verify(&self) -> ClientResult<User> {
        let url = self.endpoint(&["auth", "verify"])?;
        let request = self.request(Method::GET, &url);
        let body: UserBody = self
            .send_json(request, &url, Target::new("Session", SESSION_COOKIE))
            .await?;
        Ok(body.into_user())
    }
}

impl AdminApi for HttpClient {
    async fn list_users(&self) -> ClientResult<Vec<User>> {
        let url = self.endpoint(&["admin", "users"])?;
        let request = self.request(Method::GET, &url);
        self.send_json(request, &url, Target::new("Users", "*")).await
    }

    async fn user_tasks(&self, user_id: &str) -> ClientResult<Vec<Task>> {
        let url = self.endpoint(&["admin", "users", user_id, "tasks"])?;
        let request = self.request(Method::GET, &url);
        let body: DataBody<Vec<Task>> = self
            .send_json(request, &url, Target::new("User", user_id))
            .await?;
        Ok(body.data)
    }

    async fn delete_user(&self, user_id: &str) -> ClientResult<()> {
        let url = self.endpoint(&["admin", "users", user_id])?;
        let request = self.request(Method::DELETE, &url);
        self.send_empty(request, &url, Target::new("User", user_id))
            .await
    }

    async fn update_user_role(&self, user_id: &str, role: Role) -> ClientResult<()> {
        let url = self.endpoint(&["admin", "users", user_id, "role"])?;
        let request = self
            .request(Method::PUT, &url)
            .json(&json!({ "role": role }));
        self.send_empty(request, &url, Target::new("User", user_id))
            .await
    }
}

static_assertions::assert_impl_all!(HttpClient: Send, Sync, Clone);
