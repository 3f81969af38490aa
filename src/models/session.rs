use serde::{Deserialize, Serialize};

use crate::models::user::UserProfile;

/// Credentials and profile persisted on the client between runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    pub user: UserProfile,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginCredentials {
    pub email: String,
    pub password: String,
}

impl LoginCredentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

/// `{ success, data: { accessToken, refreshToken, user } }` returned by login.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    #[serde(default)]
    pub success: bool,
    pub data: Session,
}

/// Token material returned by the refresh endpoint. Missing fields mean the
/// stored value is kept.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshedTokens {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub user: Option<UserProfile>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum RefreshResponse {
    Enveloped { data: RefreshedTokens },
    Flat(RefreshedTokens),
}

impl RefreshResponse {
    pub(crate) fn into_tokens(self) -> RefreshedTokens {
        match self {
            RefreshResponse::Enveloped { data } => data,
            RefreshResponse::Flat(tokens) => tokens,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn refresh_response_accepts_enveloped_and_flat_shapes() {
        let enveloped: RefreshResponse = serde_json::from_value(json!({
            "success": true,
            "data": { "accessToken": "a1", "refreshToken": "r1" }
        }))
        .unwrap();
        let tokens = enveloped.into_tokens();
        assert_eq!(tokens.access_token, "a1");
        assert_eq!(tokens.refresh_token.as_deref(), Some("r1"));

        let flat: RefreshResponse = serde_json::from_value(json!({
            "accessToken": "a2",
            "user": {
                "id": "u-1",
                "email": "crew@example.com",
                "firstName": "Crew",
                "lastName": "Member",
                "role": "VIEWER"
            }
        }))
        .unwrap();
        let tokens = flat.into_tokens();
        assert_eq!(tokens.access_token, "a2");
        assert!(tokens.refresh_token.is_none());
        assert_eq!(tokens.user.unwrap().email, "crew@example.com");
    }
}
