pub mod refresh;

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::auth::{AuthService, LoginRedirect};
use crate::config::Config;
use crate::errors::{AuthError, ClientError, SessionError};
use crate::models::session::{LoginCredentials, Session};
use crate::models::user::UserProfile;
use crate::session::{SessionManager, SessionStore};
use crate::utils::jwt;

use refresh::{Attempt, Entry, RefreshCoordinator};

pub(crate) fn build_url(base: &str, path: &str) -> String {
    let trimmed_base = base.trim_end_matches('/');
    let trimmed_path = path.trim_start_matches('/');
    format!("{}/{}", trimmed_base, trimmed_path)
}

/// Method, headers and a caller-serialized body for one request.
#[derive(Debug, Clone)]
pub struct RequestOptions {
    pub method: Method,
    pub headers: HeaderMap,
    pub body: Option<String>,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self::new(Method::GET)
    }
}

impl RequestOptions {
    pub fn new(method: Method) -> Self {
        Self {
            method,
            headers: HeaderMap::new(),
            body: None,
        }
    }

    pub fn get() -> Self {
        Self::new(Method::GET)
    }

    pub fn post() -> Self {
        Self::new(Method::POST)
    }

    pub fn put() -> Self {
        Self::new(Method::PUT)
    }

    pub fn delete() -> Self {
        Self::new(Method::DELETE)
    }

    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn json<T: Serialize + ?Sized>(self, body: &T) -> Result<Self, serde_json::Error> {
        Ok(self.body(serde_json::to_string(body)?))
    }

    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }
}

/// What a proactive refresh tick decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// No access or refresh token stored.
    NoSession,
    /// Expired or undecodable; the next rejected request recovers it.
    Expired,
    NotNeeded,
    /// Another refresh cycle is running.
    InFlight,
    Refreshed,
}

/// HTTP client that attaches the session's bearer token and recovers from
/// expired tokens with a single shared refresh per cycle.
pub struct AuthenticatedClient {
    http: Client,
    api_url: String,
    auth: AuthService,
    sessions: SessionManager,
    redirect: Arc<dyn LoginRedirect>,
    refresh: RefreshCoordinator,
}

impl AuthenticatedClient {
    pub fn new(
        config: &Config,
        store: Arc<dyn SessionStore>,
        redirect: Arc<dyn LoginRedirect>,
    ) -> Result<Self, ClientError> {
        let http = Client::builder().timeout(config.http_timeout).build()?;
        Ok(Self::with_client(http, &config.api_url, store, redirect))
    }

    pub fn with_client(
        http: Client,
        api_url: impl Into<String>,
        store: Arc<dyn SessionStore>,
        redirect: Arc<dyn LoginRedirect>,
    ) -> Self {
        let api_url = api_url.into();
        Self {
            auth: AuthService::new(http.clone(), api_url.clone()),
            http,
            api_url,
            sessions: SessionManager::new(store),
            redirect,
            refresh: RefreshCoordinator::default(),
        }
    }

    pub fn url(&self, path: &str) -> String {
        build_url(&self.api_url, path)
    }

    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    pub fn is_refreshing(&self) -> bool {
        self.refresh.is_refreshing()
    }

    pub fn is_authenticated(&self) -> Result<bool, ClientError> {
        Ok(self.sessions.is_authenticated()?)
    }

    pub fn current_user(&self) -> Result<Option<UserProfile>, ClientError> {
        Ok(self.sessions.user()?)
    }

    pub async fn login(&self, credentials: &LoginCredentials) -> Result<UserProfile, AuthError> {
        let session = self.auth.login(credentials).await?;
        self.sessions.save(&session)?;
        Ok(session.user)
    }

    /// Revokes the refresh token remotely when possible, then always clears the local session.
    pub async fn logout(&self) -> Result<(), ClientError> {
        let refresh_token = self.sessions.refresh_token().unwrap_or_else(|err| {
            warn!(error = %err, "could not read refresh token for remote logout");
            None
        });
        if let Some(refresh_token) = refresh_token {
            self.auth.logout(&refresh_token).await;
        }
        self.sessions.clear()?;
        info!("logged out");
        Ok(())
    }

    /// Sends a request with the current bearer token.
    ///
    /// A `401` triggers one refresh-and-replay; every other status is returned
    /// untouched for the caller to interpret.
    pub async fn request(
        &self,
        url: &str,
        options: RequestOptions,
    ) -> Result<Response, ClientError> {
        let access_token = self.sessions.access_token()?;
        if access_token.is_none() && self.sessions.refresh_token()?.is_none() {
            warn!(url, "no session available; forcing logout");
            self.force_logout();
            return Err(SessionError::MissingRefreshToken.into());
        }

        let response = self
            .build(url, &options, access_token.as_deref())
            .send()
            .await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        debug!(url, method = %options.method, "request unauthorized; recovering session");
        let token = self.recover(access_token.as_deref()).await?;
        let replay = self.build(url, &options, Some(&token)).send().await?;
        Ok(replay)
    }

    /// Refreshes the access token ahead of expiry when less than `threshold` remains.
    pub async fn refresh_if_needed(
        &self,
        threshold: Duration,
    ) -> Result<RefreshOutcome, ClientError> {
        let (Some(access_token), Some(refresh_token)) =
            (self.sessions.access_token()?, self.sessions.refresh_token()?)
        else {
            return Ok(RefreshOutcome::NoSession);
        };

        let ttl = match jwt::time_to_live(&access_token, Utc::now()) {
            Ok(ttl) => ttl,
            Err(err) => {
                warn!(error = %err, "access token could not be decoded; treating it as expired");
                return Ok(RefreshOutcome::Expired);
            }
        };
        let remaining = match ttl.to_std() {
            Ok(remaining) if !remaining.is_zero() => remaining,
            _ => return Ok(RefreshOutcome::Expired),
        };
        if remaining >= threshold {
            return Ok(RefreshOutcome::NotNeeded);
        }

        let guard = match self
            .refresh
            .try_lead(Some(&access_token), || self.stored_access_token())
        {
            Attempt::Lead(guard) => guard,
            Attempt::Busy => return Ok(RefreshOutcome::InFlight),
            Attempt::Current(_) => return Ok(RefreshOutcome::NotNeeded),
        };

        info!(
            remaining_secs = remaining.as_secs(),
            "access token nearing expiry; refreshing"
        );
        match self.refresh_session(&refresh_token).await {
            Ok(token) => {
                guard.settle(Ok(token));
                Ok(RefreshOutcome::Refreshed)
            }
            Err(err) => {
                // Queued requests receive a terminal error, so the session ends with them.
                let released = guard.settle_with(Err(err.clone()), |queued| {
                    if queued > 0 {
                        self.clear_session();
                    }
                });
                if released > 0 {
                    warn!(error = %err, released, "proactive refresh failed with requests waiting; logging out");
                    self.redirect.redirect_to_login();
                }
                Err(err.into())
            }
        }
    }

    async fn recover(&self, rejected: Option<&str>) -> Result<String, ClientError> {
        loop {
            let Some(refresh_token) = self.sessions.refresh_token()? else {
                warn!("access token rejected and no refresh token stored; forcing logout");
                self.force_logout();
                return Err(SessionError::MissingRefreshToken.into());
            };

            let guard = match self
                .refresh
                .join_or_lead(rejected, || self.stored_access_token())
            {
                Entry::Current(token) => return Ok(token),
                Entry::Wait(rx) => match rx.await {
                    Ok(Ok(token)) => return Ok(token),
                    Ok(Err(SessionError::Abandoned)) | Err(_) => {
                        debug!("refresh cycle abandoned by its leader; retrying");
                        continue;
                    }
                    Ok(Err(err)) => return Err(err.into()),
                },
                Entry::Lead(guard) => guard,
            };

            return match self.refresh_session(&refresh_token).await {
                Ok(token) => {
                    let released = guard.settle(Ok(token.clone()));
                    info!(released, "session refreshed");
                    Ok(token)
                }
                Err(err) => {
                    warn!(error = %err, "session refresh failed; logging out");
                    self.force_logout();
                    guard.settle(Err(err.clone()));
                    Err(err.into())
                }
            };
        }
    }

    /// Exchanges the refresh token and persists the new session. The new access
    /// token is written before this returns, so nothing is released early.
    async fn refresh_session(&self, refresh_token: &str) -> Result<String, SessionError> {
        let tokens = self.auth.refresh(refresh_token).await?;
        let user = match tokens.user {
            Some(user) => user,
            None => self.sessions.user()?.ok_or_else(|| {
                SessionError::InvalidResponse("refresh returned no user and none is stored".into())
            })?,
        };
        let session = Session {
            access_token: tokens.access_token,
            refresh_token: tokens
                .refresh_token
                .unwrap_or_else(|| refresh_token.to_string()),
            user,
        };
        self.sessions.save(&session)?;
        Ok(session.access_token)
    }

    fn stored_access_token(&self) -> Option<String> {
        self.sessions.access_token().ok().flatten()
    }

    fn force_logout(&self) {
        self.clear_session();
        self.redirect.redirect_to_login();
    }

    fn clear_session(&self) {
        if let Err(err) = self.sessions.clear() {
            error!(error = %err, "failed to clear session during forced logout");
        }
    }

    fn build(&self, url: &str, options: &RequestOptions, token: Option<&str>) -> RequestBuilder {
        let mut headers = options.headers.clone();
        if !headers.contains_key(CONTENT_TYPE) {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        }

        let mut request = self
            .http
            .request(options.method.clone(), url)
            .headers(headers);
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = &options.body {
            request = request.body(body.clone());
        }
        request
    }
}
