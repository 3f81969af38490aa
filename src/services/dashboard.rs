use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use crate::errors::ApiError;
use crate::http::AuthenticatedClient;
use crate::models::airline::Airline;
use crate::models::chapter::Chapter;
use crate::models::user::User;

use super::{AirlineService, ChapterService, UserService};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub airlines: usize,
    pub active_airlines: usize,
    pub users: usize,
    pub active_users: usize,
    pub chapters: usize,
    pub active_chapters: usize,
    /// Users counted per airline by the API.
    pub airline_users: u64,
    /// Manual chapters counted per airline by the API.
    pub manual_chapters: u64,
}

impl DashboardSummary {
    pub fn from_parts(airlines: &[Airline], users: &[User], chapters: &[Chapter]) -> Self {
        let counts = airlines.iter().filter_map(|a| a.counts);
        Self {
            airlines: airlines.len(),
            active_airlines: airlines.iter().filter(|a| a.active).count(),
            users: users.len(),
            active_users: users.iter().filter(|u| u.active).count(),
            chapters: chapters.len(),
            active_chapters: chapters.iter().filter(|c| c.active).count(),
            airline_users: counts.clone().map(|c| c.users).sum(),
            manual_chapters: counts.map(|c| c.manual_chapters).sum(),
        }
    }
}

#[derive(Clone)]
pub struct DashboardService {
    airlines: AirlineService,
    users: UserService,
    chapters: ChapterService,
}

impl DashboardService {
    pub fn new(client: Arc<AuthenticatedClient>) -> Self {
        Self {
            airlines: AirlineService::new(client.clone()),
            users: UserService::new(client.clone()),
            chapters: ChapterService::new(client),
        }
    }

    /// Loads airlines, users and chapters concurrently. Any failure fails the summary.
    pub async fn summary(&self) -> Result<DashboardSummary, ApiError> {
        let (airlines, users, chapters) = tokio::try_join!(
            self.airlines.list(),
            self.users.list(),
            self.chapters.list(None, None),
        )?;
        let summary = DashboardSummary::from_parts(&airlines, &users, &chapters);
        debug!(?summary, "dashboard summary loaded");
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::test_support::harness;
    use httpmock::{Method::GET, Method::POST, MockServer};
    use serde_json::json;

    #[tokio::test]
    async fn summary_counts_totals_and_active_records() {
        let server = MockServer::start_async().await;
        let h = harness(&server);
        h.sign_in("access-1", "refresh-1");
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/airlines");
                then.status(200).json_body(json!({
                    "success": true,
                    "data": [
                        { "id": "a-1", "name": "One", "code": "ONE", "active": true,
                          "_count": { "users": 3, "manualChapters": 2 } },
                        { "id": "a-2", "name": "Two", "code": "TWO", "active": false,
                          "_count": { "users": 1, "manualChapters": 5 } }
                    ]
                }));
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/users");
                then.status(200).json_body(json!({
                    "success": true,
                    "data": [
                        { "id": "u-1", "email": "a@x.io", "firstName": "A", "lastName": "A",
                          "role": "ADMIN", "active": true },
                        { "id": "u-2", "email": "b@x.io", "firstName": "B", "lastName": "B",
                          "role": "VIEWER", "active": false },
                        { "id": "u-3", "email": "c@x.io", "firstName": "C", "lastName": "C",
                          "role": "EDITOR", "active": true }
                    ]
                }));
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/chapters");
                then.status(200).json_body(json!({
                    "success": true,
                    "data": [
                        { "id": "ch-1", "title": "Normal", "active": true, "airlineId": "a-1" }
                    ]
                }));
            })
            .await;

        let summary = DashboardService::new(h.client.clone())
            .summary()
            .await
            .unwrap();

        assert_eq!(
            summary,
            DashboardSummary {
                airlines: 2,
                active_airlines: 1,
                users: 3,
                active_users: 2,
                chapters: 1,
                active_chapters: 1,
                airline_users: 4,
                manual_chapters: 7,
            }
        );
    }

    #[tokio::test]
    async fn concurrent_loads_share_one_refresh() {
        let server = MockServer::start_async().await;
        let h = harness(&server);
        h.sign_in("old-access", "refresh-1");

        for path in ["/api/airlines", "/api/users", "/api/chapters"] {
            server
                .mock_async(|when, then| {
                    when.method(GET)
                        .path(path)
                        .header("authorization", "Bearer old-access");
                    then.status(401);
                })
                .await;
            server
                .mock_async(|when, then| {
                    when.method(GET)
                        .path(path)
                        .header("authorization", "Bearer new-access");
                    then.status(200).json_body(json!({ "success": true, "data": [] }));
                })
                .await;
        }
        let refresh = server
            .mock_async(|when, then| {
                when.method(POST).path("/api/auth/refresh-token/");
                then.status(200)
                    .delay(std::time::Duration::from_millis(200))
                    .json_body(json!({ "accessToken": "new-access" }));
            })
            .await;

        let summary = DashboardService::new(h.client.clone())
            .summary()
            .await
            .unwrap();

        assert_eq!(summary, DashboardSummary::default());
        assert_eq!(refresh.hits_async().await, 1);
    }
}
