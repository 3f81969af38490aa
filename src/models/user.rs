use core::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::airline::AirlineRef;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    SuperAdmin,
    Admin,
    Editor,
    Viewer,
}

impl UserRole {
    /// Super admins operate across every airline; every other role is tied to one.
    pub fn is_global(self) -> bool {
        matches!(self, UserRole::SuperAdmin)
    }

    pub fn requires_airline(self) -> bool {
        !self.is_global()
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            UserRole::SuperAdmin => "SUPER_ADMIN",
            UserRole::Admin => "ADMIN",
            UserRole::Editor => "EDITOR",
            UserRole::Viewer => "VIEWER",
        };
        write!(f, "{}", s)
    }
}

/// The signed-in user as returned by the auth endpoints and kept in the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    pub role: UserRole,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub airline_id: Option<String>,
}

impl UserProfile {
    /// Airline this user is restricted to. Derived from the role; a super admin is
    /// never scoped even if the API happens to report an airline id.
    pub fn scoped_airline(&self) -> Option<&str> {
        if self.role.is_global() {
            return None;
        }
        self.airline_id.as_deref().filter(|id| !id.is_empty())
    }

    pub fn display_name(&self) -> String {
        if !self.first_name.is_empty() && !self.last_name.is_empty() {
            return format!("{} {}", self.first_name, self.last_name);
        }
        if self.email.is_empty() {
            "User".to_string()
        } else {
            self.email.clone()
        }
    }

    pub fn initials(&self) -> String {
        let initials: String = self
            .first_name
            .chars()
            .take(1)
            .chain(self.last_name.chars().take(1))
            .collect::<String>()
            .to_uppercase();
        if !initials.is_empty() {
            return initials;
        }
        self.email
            .chars()
            .next()
            .map(|c| c.to_uppercase().collect())
            .unwrap_or_else(|| "U".to_string())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: UserRole,
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub airline_id: Option<String>,
    #[serde(default)]
    pub airline: Option<AirlineRef>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_login: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub role: UserRole,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub airline_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
}

impl NewUser {
    /// Drops the airline for global roles so the API never receives a scoping it ignores.
    pub fn normalized(mut self) -> Self {
        if self.role.is_global() {
            self.airline_id = None;
        }
        self
    }
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUser {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<UserRole>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub airline_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
}
