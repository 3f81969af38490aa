pub mod airlines;
pub mod chapters;
pub mod contacts;
pub mod content;
pub mod dashboard;
pub mod sections;
pub mod users;

use reqwest::{Response, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::errors::ApiError;
use crate::http::{AuthenticatedClient, RequestOptions};

pub use airlines::AirlineService;
pub use chapters::ChapterService;
pub use contacts::{ContactGroupService, ContactService};
pub use content::ContentService;
pub use dashboard::{DashboardService, DashboardSummary};
pub use sections::SectionService;
pub use users::UserService;

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: T,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    error: Option<String>,
}

/// The best human-readable message in an error body: `message`, then `error`.
fn error_message(body: &str) -> Option<String> {
    let body: ErrorBody = serde_json::from_str(body).ok()?;
    body.message
        .into_iter()
        .chain(body.error)
        .find(|m| !m.trim().is_empty())
}

async fn ensure_success(response: Response, fallback: &str) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = error_message(&body).unwrap_or_else(|| fallback.to_string());
    warn!(status = %status, %message, "API request failed");
    Err(ApiError::Api { status, message })
}

async fn read_data<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let envelope: Envelope<T> = response
        .json()
        .await
        .map_err(|err| ApiError::InvalidResponse(err.to_string()))?;
    Ok(envelope.data)
}

pub(crate) async fn get_data<T: DeserializeOwned>(
    client: &AuthenticatedClient,
    url: &str,
    fallback: &str,
) -> Result<T, ApiError> {
    let response = client.request(url, RequestOptions::get()).await?;
    read_data(ensure_success(response, fallback).await?).await
}

pub(crate) async fn send_data<B, T>(
    client: &AuthenticatedClient,
    url: &str,
    options: RequestOptions,
    body: &B,
    fallback: &str,
) -> Result<T, ApiError>
where
    B: Serialize + ?Sized,
    T: DeserializeOwned,
{
    let options = options
        .json(body)
        .map_err(|err| ApiError::InvalidRequest(err.to_string()))?;
    let response = client.request(url, options).await?;
    read_data(ensure_success(response, fallback).await?).await
}

pub(crate) async fn delete_resource(
    client: &AuthenticatedClient,
    url: &str,
    fallback: &str,
) -> Result<(), ApiError> {
    let response = client.request(url, RequestOptions::delete()).await?;
    ensure_success(response, fallback).await?;
    Ok(())
}

/// Appends query parameters to `url`, skipping absent ones.
pub(crate) fn with_query(url: String, params: &[(&str, Option<String>)]) -> Result<String, ApiError> {
    if params.iter().all(|(_, value)| value.is_none()) {
        return Ok(url);
    }
    let mut parsed = Url::parse(&url).map_err(|err| ApiError::InvalidRequest(err.to_string()))?;
    {
        let mut pairs = parsed.query_pairs_mut();
        for (key, value) in params {
            if let Some(value) = value {
                pairs.append_pair(key, value);
            }
        }
    }
    Ok(parsed.into())
}
