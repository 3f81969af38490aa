use std::sync::Arc;

use crate::errors::ApiError;
use crate::http::{AuthenticatedClient, RequestOptions};
use crate::models::airline::{Airline, NewAirline, UpdateAirline};

use super::{delete_resource, get_data, send_data};

#[derive(Clone)]
pub struct AirlineService {
    client: Arc<AuthenticatedClient>,
}

impl AirlineService {
    pub fn new(client: Arc<AuthenticatedClient>) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> Result<Vec<Airline>, ApiError> {
        get_data(&self.client, &self.client.url("/airlines"), "Failed to fetch airlines").await
    }

    pub async fn get(&self, id: &str) -> Result<Airline, ApiError> {
        let url = self.client.url(&format!("/airlines/{id}"));
        get_data(&self.client, &url, "Failed to fetch airline").await
    }

    pub async fn create(&self, airline: &NewAirline) -> Result<Airline, ApiError> {
        send_data(
            &self.client,
            &self.client.url("/airlines"),
            RequestOptions::post(),
            airline,
            "Failed to create airline",
        )
        .await
    }

    pub async fn update(&self, id: &str, changes: &UpdateAirline) -> Result<Airline, ApiError> {
        let url = self.client.url(&format!("/airlines/{id}"));
        send_data(
            &self.client,
            &url,
            RequestOptions::put(),
            changes,
            "Failed to update airline",
        )
        .await
    }

    pub async fn delete(&self, id: &str) -> Result<(), ApiError> {
        let url = self.client.url(&format!("/airlines/{id}"));
        delete_resource(&self.client, &url, "Failed to delete airline").await
    }
}
