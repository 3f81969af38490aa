use std::sync::Arc;

use crate::errors::ApiError;
use crate::http::{AuthenticatedClient, RequestOptions};
use crate::models::chapter::{Chapter, NewChapter, UpdateChapter};

use super::{delete_resource, get_data, send_data, with_query};

#[derive(Clone)]
pub struct ChapterService {
    client: Arc<AuthenticatedClient>,
}

impl ChapterService {
    pub fn new(client: Arc<AuthenticatedClient>) -> Self {
        Self { client }
    }

    /// Chapters, optionally narrowed to one airline. Inactive chapters are
    /// included only when `include_inactive` says so.
    pub async fn list(
        &self,
        airline_id: Option<&str>,
        include_inactive: Option<bool>,
    ) -> Result<Vec<Chapter>, ApiError> {
        let url = with_query(
            self.client.url("/chapters"),
            &[
                ("airlineId", airline_id.map(str::to_string)),
                ("includeInactive", include_inactive.map(|v| v.to_string())),
            ],
        )?;
        get_data(&self.client, &url, "Failed to fetch chapters").await
    }

    pub async fn get(&self, id: &str) -> Result<Chapter, ApiError> {
        let url = self.client.url(&format!("/chapters/{id}"));
        get_data(&self.client, &url, "Failed to fetch chapter").await
    }

    pub async fn create(&self, chapter: &NewChapter) -> Result<Chapter, ApiError> {
        send_data(
            &self.client,
            &self.client.url("/chapters"),
            RequestOptions::post(),
            chapter,
            "Failed to create chapter",
        )
        .await
    }

    pub async fn update(&self, id: &str, changes: &UpdateChapter) -> Result<Chapter, ApiError> {
        let url = self.client.url(&format!("/chapters/{id}"));
        send_data(
            &self.client,
            &url,
            RequestOptions::put(),
            changes,
            "Failed to update chapter",
        )
        .await
    }

    pub async fn delete(&self, id: &str) -> Result<(), ApiError> {
        let url = self.client.url(&format!("/chapters/{id}"));
        delete_resource(&self.client, &url, "Failed to delete chapter").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::test_support::harness;
    use httpmock::{Method::GET, Method::PUT, MockServer};
    use serde_json::json;

    #[tokio::test]
    async fn list_passes_airline_and_inactive_filters() {
        let server = MockServer::start_async().await;
        let h = harness(&server);
        h.sign_in("access-1", "refresh-1");
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/api/chapters")
                    .query_param("airlineId", "air-1")
                    .query_param("includeInactive", "true");
                then.status(200).json_body(json!({
                    "success": true,
                    "data": [{
                        "id": "ch-1",
                        "title": "Normal Procedures",
                        "order": 1,
                        "active": false,
                        "airlineId": "air-1"
                    }]
                }));
            })
            .await;

        let chapters = ChapterService::new(h.client.clone())
            .list(Some("air-1"), Some(true))
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(chapters.len(), 1);
        assert_eq!(chapters[0].title, "Normal Procedures");
        assert!(!chapters[0].active);
    }

    #[tokio::test]
    async fn update_reports_error_field_when_message_missing() {
        let server = MockServer::start_async().await;
        let h = harness(&server);
        h.sign_in("access-1", "refresh-1");
        server
            .mock_async(|when, then| {
                when.method(PUT)
                    .path("/api/chapters/ch-1")
                    .json_body(json!({ "order": 3 }));
                then.status(403).json_body(json!({ "error": "Insufficient permissions" }));
            })
            .await;

        let err = ChapterService::new(h.client.clone())
            .update(
                "ch-1",
                &UpdateChapter {
                    order: Some(3),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();

        assert_eq!(err.status().map(|s| s.as_u16()), Some(403));
        assert!(err.to_string().ends_with("Insufficient permissions"));
    }
}
