use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::{info, warn};

use crate::errors::{AuthError, SessionError};
use crate::http::build_url;
use crate::models::session::{
    AuthResponse, LoginCredentials, RefreshResponse, RefreshedTokens, Session,
};

pub const LOGIN_ENDPOINT: &str = "/auth/login/";
pub const REFRESH_ENDPOINT: &str = "/auth/refresh-token/";
pub const LOGOUT_ENDPOINT: &str = "/auth/logout";

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// The unauthenticated auth endpoints. These never go through the refresh wrapper.
#[derive(Clone)]
pub struct AuthService {
    client: Client,
    api_url: String,
}

impl AuthService {
    pub fn new(client: Client, api_url: impl Into<String>) -> Self {
        Self {
            client,
            api_url: api_url.into(),
        }
    }

    pub async fn login(&self, credentials: &LoginCredentials) -> Result<Session, AuthError> {
        let response = self
            .client
            .post(build_url(&self.api_url, LOGIN_ENDPOINT))
            .json(credentials)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorBody>(&body)
                .ok()
                .and_then(|b| b.message)
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| "Login failed".to_string());
            warn!(status = %status, email = %credentials.email, "login rejected");
            return Err(AuthError::LoginRejected { status, message });
        }

        let body: AuthResponse = response
            .json()
            .await
            .map_err(|err| AuthError::InvalidResponse(err.to_string()))?;
        info!(user_id = %body.data.user.id, "login succeeded");
        Ok(body.data)
    }

    pub async fn refresh(&self, refresh_token: &str) -> Result<RefreshedTokens, SessionError> {
        let response = self
            .client
            .post(build_url(&self.api_url, REFRESH_ENDPOINT))
            .json(&json!({ "refreshToken": refresh_token }))
            .send()
            .await
            .map_err(|err| SessionError::Transport(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = %status, "token refresh rejected");
            return Err(SessionError::RefreshRejected(status.as_u16()));
        }

        let body: RefreshResponse = response
            .json()
            .await
            .map_err(|err| SessionError::InvalidResponse(err.to_string()))?;
        Ok(body.into_tokens())
    }

    /// Best effort. The caller clears its local session whatever happens here.
    pub async fn logout(&self, refresh_token: &str) {
        let result = self
            .client
            .post(build_url(&self.api_url, LOGOUT_ENDPOINT))
            .json(&json!({ "refreshToken": refresh_token }))
            .send()
            .await;

        match result {
            Ok(response) if response.status().is_success() => {
                info!("remote session revoked");
            }
            Ok(response) => {
                warn!(status = %response.status(), "logout endpoint refused; continuing with local logout");
            }
            Err(err) => {
                warn!(error = %err, "logout request failed; continuing with local logout");
            }
        }
    }
}
