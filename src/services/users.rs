use std::sync::Arc;

use crate::errors::ApiError;
use crate::http::{AuthenticatedClient, RequestOptions};
use crate::models::user::{NewUser, UpdateUser, User};

use super::{delete_resource, get_data, send_data};

#[derive(Clone)]
pub struct UserService {
    client: Arc<AuthenticatedClient>,
}

impl UserService {
    pub fn new(client: Arc<AuthenticatedClient>) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> Result<Vec<User>, ApiError> {
        get_data(&self.client, &self.client.url("/users"), "Failed to fetch users").await
    }

    pub async fn get(&self, id: &str) -> Result<User, ApiError> {
        let url = self.client.url(&format!("/users/{id}"));
        get_data(&self.client, &url, "Failed to fetch user").await
    }

    pub async fn create(&self, user: &NewUser) -> Result<User, ApiError> {
        let user = user.clone().normalized();
        send_data(
            &self.client,
            &self.client.url("/users"),
            RequestOptions::post(),
            &user,
            "Failed to create user",
        )
        .await
    }

    pub async fn update(&self, id: &str, changes: &UpdateUser) -> Result<User, ApiError> {
        let url = self.client.url(&format!("/users/{id}"));
        send_data(&self.client, &url, RequestOptions::put(), changes, "Failed to update user").await
    }

    pub async fn delete(&self, id: &str) -> Result<(), ApiError> {
        let url = self.client.url(&format!("/users/{id}"));
        delete_resource(&self.client, &url, "Failed to delete user").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::test_support::harness;
    use crate::models::user::UserRole;
    use httpmock::{Method::GET, Method::POST, MockServer};
    use serde_json::json;

    fn user_json(role: &str, airline_id: Option<&str>) -> serde_json::Value {
        json!({
            "id": "u-9",
            "email": "fo@example.com",
            "firstName": "First",
            "lastName": "Officer",
            "role": role,
            "active": true,
            "airlineId": airline_id,
            "lastLogin": null
        })
    }

    #[tokio::test]
    async fn super_admin_is_created_without_airline() {
        let server = MockServer::start_async().await;
        let h = harness(&server);
        h.sign_in("access-1", "refresh-1");
        let create = server
            .mock_async(|when, then| {
                when.method(POST).path("/api/users").json_body(json!({
                    "email": "fo@example.com",
                    "password": "hunter22",
                    "firstName": "First",
                    "lastName": "Officer",
                    "role": "SUPER_ADMIN"
                }));
                then.status(201).json_body(json!({
                    "success": true,
                    "data": user_json("SUPER_ADMIN", None)
                }));
            })
            .await;

        let user = UserService::new(h.client.clone())
            .create(&NewUser {
                email: "fo@example.com".into(),
                password: "hunter22".into(),
                first_name: "First".into(),
                last_name: "Officer".into(),
                role: UserRole::SuperAdmin,
                airline_id: Some("air-1".into()),
                active: None,
            })
            .await
            .unwrap();

        create.assert_async().await;
        assert_eq!(user.role, UserRole::SuperAdmin);
        assert_eq!(user.airline_id, None);
    }

    #[tokio::test]
    async fn get_reads_single_user() {
        let server = MockServer::start_async().await;
        let h = harness(&server);
        h.sign_in("access-1", "refresh-1");
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/users/u-9");
                then.status(200).json_body(json!({
                    "success": true,
                    "data": user_json("EDITOR", Some("air-1"))
                }));
            })
            .await;

        let user = UserService::new(h.client.clone()).get("u-9").await.unwrap();
        assert_eq!(user.role, UserRole::Editor);
        assert_eq!(user.airline_id.as_deref(), Some("air-1"));
        assert!(user.active);
    }

    #[tokio::test]
    async fn expired_session_surfaces_as_session_invalid() {
        let server = MockServer::start_async().await;
        let h = harness(&server);
        h.sign_in("access-1", "refresh-1");
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/users");
                then.status(401);
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/api/auth/refresh-token/");
                then.status(401).json_body(json!({ "message": "Refresh token expired" }));
            })
            .await;

        let err = UserService::new(h.client.clone()).list().await.unwrap_err();
        assert!(err.is_session_invalid());
        assert_eq!(h.redirect.count(), 1);
    }
}
