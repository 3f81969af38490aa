use std::sync::Arc;

use crate::errors::ApiError;
use crate::http::{AuthenticatedClient, RequestOptions};
use crate::models::section::{NewSection, Section, UpdateSection};

use super::{delete_resource, get_data, send_data, with_query};

#[derive(Clone)]
pub struct SectionService {
    client: Arc<AuthenticatedClient>,
}

impl SectionService {
    pub fn new(client: Arc<AuthenticatedClient>) -> Self {
        Self { client }
    }

    pub async fn list_by_chapter(
        &self,
        chapter_id: &str,
        include_inactive: Option<bool>,
    ) -> Result<Vec<Section>, ApiError> {
        let url = with_query(
            self.client.url("/sections"),
            &[
                ("chapterId", Some(chapter_id.to_string())),
                ("includeInactive", include_inactive.map(|v| v.to_string())),
            ],
        )?;
        get_data(&self.client, &url, "Failed to fetch sections").await
    }

    pub async fn get(&self, id: &str) -> Result<Section, ApiError> {
        let url = self.client.url(&format!("/sections/{id}"));
        get_data(&self.client, &url, "Failed to fetch section").await
    }

    pub async fn create(&self, section: &NewSection) -> Result<Section, ApiError> {
        send_data(
            &self.client,
            &self.client.url("/sections"),
            RequestOptions::post(),
            section,
            "Failed to create section",
        )
        .await
    }

    pub async fn update(&self, id: &str, changes: &UpdateSection) -> Result<Section, ApiError> {
        let url = self.client.url(&format!("/sections/{id}"));
        send_data(
            &self.client,
            &url,
            RequestOptions::put(),
            changes,
            "Failed to update section",
        )
        .await
    }

    pub async fn delete(&self, id: &str) -> Result<(), ApiError> {
        let url = self.client.url(&format!("/sections/{id}"));
        delete_resource(&self.client, &url, "Failed to delete section").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::test_support::harness;
    use httpmock::{Method::DELETE, Method::GET, Method::POST, MockServer};
    use serde_json::json;

    #[tokio::test]
    async fn list_by_chapter_always_sends_chapter_id() {
        let server = MockServer::start_async().await;
        let h = harness(&server);
        h.sign_in("access-1", "refresh-1");
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/api/sections")
                    .query_param("chapterId", "ch-1");
                then.status(200).json_body(json!({
                    "success": true,
                    "count": 1,
                    "data": [{
                        "id": "sec-1",
                        "title": "Engine start",
                        "order": 2,
                        "active": true,
                        "chapterId": "ch-1"
                    }]
                }));
            })
            .await;

        let sections = SectionService::new(h.client.clone())
            .list_by_chapter("ch-1", None)
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(sections[0].chapter_id, "ch-1");
        assert_eq!(sections[0].order, 2);
    }

    #[tokio::test]
    async fn create_then_delete() {
        let server = MockServer::start_async().await;
        let h = harness(&server);
        h.sign_in("access-1", "refresh-1");
        let create = server
            .mock_async(|when, then| {
                when.method(POST).path("/api/sections").json_body(json!({
                    "title": "Taxi",
                    "description": null,
                    "order": 3,
                    "chapterId": "ch-1"
                }));
                then.status(201).json_body(json!({
                    "success": true,
                    "data": { "id": "sec-3", "title": "Taxi", "order": 3, "chapterId": "ch-1" }
                }));
            })
            .await;
        let delete = server
            .mock_async(|when, then| {
                when.method(DELETE).path("/api/sections/sec-3");
                then.status(200).json_body(json!({ "success": true, "message": "Deleted" }));
            })
            .await;

        let service = SectionService::new(h.client.clone());
        let section = service
            .create(&NewSection {
                title: "Taxi".into(),
                description: None,
                order: 3,
                chapter_id: "ch-1".into(),
                active: None,
            })
            .await
            .unwrap();
        service.delete(&section.id).await.unwrap();

        create.assert_async().await;
        delete.assert_async().await;
    }
}
