use std::sync::Arc;

use crate::errors::ApiError;
use crate::http::{AuthenticatedClient, RequestOptions};
use crate::models::content::{Content, NewContent, UpdateContent};

use super::{delete_resource, get_data, send_data, with_query};

#[derive(Clone)]
pub struct ContentService {
    client: Arc<AuthenticatedClient>,
}

impl ContentService {
    pub fn new(client: Arc<AuthenticatedClient>) -> Self {
        Self { client }
    }

    pub async fn list_by_section(
        &self,
        section_id: &str,
        include_inactive: Option<bool>,
    ) -> Result<Vec<Content>, ApiError> {
        let url = with_query(
            self.client.url(&format!("/contents/sections/{section_id}")),
            &[("includeInactive", include_inactive.map(|v| v.to_string()))],
        )?;
        get_data(&self.client, &url, "Failed to fetch content").await
    }

    pub async fn get(&self, id: &str) -> Result<Content, ApiError> {
        let url = self.client.url(&format!("/contents/{id}"));
        get_data(&self.client, &url, "Failed to fetch content").await
    }

    pub async fn create(&self, content: &NewContent) -> Result<Content, ApiError> {
        let url = self
            .client
            .url(&format!("/contents/sections/{}/contents", content.section_id));
        send_data(
            &self.client,
            &url,
            RequestOptions::post(),
            content,
            "Failed to create content",
        )
        .await
    }

    pub async fn update(&self, id: &str, changes: &UpdateContent) -> Result<Content, ApiError> {
        let url = self.client.url(&format!("/contents/{id}"));
        send_data(
            &self.client,
            &url,
            RequestOptions::put(),
            changes,
            "Failed to update content",
        )
        .await
    }

    pub async fn delete(&self, id: &str) -> Result<(), ApiError> {
        let url = self.client.url(&format!("/contents/{id}"));
        delete_resource(&self.client, &url, "Failed to delete content").await
    }

    /// Full-text search across manual content, optionally within one chapter.
    pub async fn search(
        &self,
        query: &str,
        chapter_id: Option<&str>,
    ) -> Result<Vec<Content>, ApiError> {
        let url = with_query(
            self.client.url("/contents/search"),
            &[
                ("query", Some(query.to_string())),
                ("chapterId", chapter_id.map(str::to_string)),
            ],
        )?;
        get_data(&self.client, &url, "Failed to search content").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::test_support::harness;
    use crate::models::content::ContentType;
    use httpmock::{Method::GET, Method::POST, MockServer};
    use serde_json::json;

    fn content_json() -> serde_json::Value {
        json!({
            "id": "ct-1",
            "title": "Cold weather start",
            "content": "<p>Pre-heat for 10 minutes.</p>",
            "type": "TEXT",
            "order": 0,
            "metadata": {},
            "active": true,
            "sectionId": "sec-1",
            "section": {
                "id": "sec-1",
                "title": "Engine start",
                "chapter": { "id": "ch-1", "title": "Normal Procedures", "airlineId": "air-1" }
            }
        })
    }

    #[tokio::test]
    async fn create_posts_to_section_without_section_id_in_body() {
        let server = MockServer::start_async().await;
        let h = harness(&server);
        h.sign_in("access-1", "refresh-1");
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/api/contents/sections/sec-1/contents")
                    .json_body(json!({
                        "title": "Cold weather start",
                        "content": "<p>Pre-heat for 10 minutes.</p>",
                        "type": "TEXT"
                    }));
                then.status(201)
                    .json_body(json!({ "success": true, "data": content_json() }));
            })
            .await;

        let content = ContentService::new(h.client.clone())
            .create(&NewContent {
                title: "Cold weather start".into(),
                content: "<p>Pre-heat for 10 minutes.</p>".into(),
                content_type: ContentType::Text,
                section_id: "sec-1".into(),
                order: None,
                metadata: None,
                active: None,
            })
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(content.content_type, ContentType::Text);
        let chapter = &content.section.expect("section").chapter;
        assert_eq!(chapter.airline_id, "air-1");
    }

    #[tokio::test]
    async fn search_sends_query_and_optional_chapter() {
        let server = MockServer::start_async().await;
        let h = harness(&server);
        h.sign_in("access-1", "refresh-1");
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/api/contents/search")
                    .query_param("query", "cold start")
                    .query_param("chapterId", "ch-1");
                then.status(200).json_body(json!({
                    "success": true,
                    "count": 1,
                    "data": [content_json()]
                }));
            })
            .await;

        let results = ContentService::new(h.client.clone())
            .search("cold start", Some("ch-1"))
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, "ct-1");
    }

    #[tokio::test]
    async fn list_by_section_rejects_malformed_payload() {
        let server = MockServer::start_async().await;
        let h = harness(&server);
        h.sign_in("access-1", "refresh-1");
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/contents/sections/sec-1");
                then.status(200).json_body(json!({ "success": true, "data": { "unexpected": 1 } }));
            })
            .await;

        let err = ContentService::new(h.client.clone())
            .list_by_section("sec-1", None)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidResponse(_)));
    }
}
