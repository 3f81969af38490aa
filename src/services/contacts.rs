use std::sync::Arc;

use crate::errors::ApiError;
use crate::http::{AuthenticatedClient, RequestOptions};
use crate::models::contact::{
    Contact, ContactGroup, NewContact, NewContactGroup, UpdateContact, UpdateContactGroup,
};

use super::{delete_resource, get_data, send_data, with_query};

fn inactive_filter(include_inactive: Option<bool>) -> [(&'static str, Option<String>); 1] {
    [("includeInactive", include_inactive.map(|v| v.to_string()))]
}

#[derive(Clone)]
pub struct ContactGroupService {
    client: Arc<AuthenticatedClient>,
}

impl ContactGroupService {
    pub fn new(client: Arc<AuthenticatedClient>) -> Self {
        Self { client }
    }

    pub async fn list(&self, include_inactive: Option<bool>) -> Result<Vec<ContactGroup>, ApiError> {
        let url = with_query(
            self.client.url("/contacts/groups"),
            &inactive_filter(include_inactive),
        )?;
        get_data(&self.client, &url, "Failed to fetch contact groups").await
    }

    pub async fn get(&self, id: &str) -> Result<ContactGroup, ApiError> {
        let url = self.client.url(&format!("/contacts/groups/{id}"));
        get_data(&self.client, &url, "Failed to fetch contact group").await
    }

    pub async fn create(&self, group: &NewContactGroup) -> Result<ContactGroup, ApiError> {
        send_data(
            &self.client,
            &self.client.url("/contacts/groups"),
            RequestOptions::post(),
            group,
            "Failed to create contact group",
        )
        .await
    }

    pub async fn update(
        &self,
        id: &str,
        changes: &UpdateContactGroup,
    ) -> Result<ContactGroup, ApiError> {
        let url = self.client.url(&format!("/contacts/groups/{id}"));
        send_data(
            &self.client,
            &url,
            RequestOptions::put(),
            changes,
            "Failed to update contact group",
        )
        .await
    }

    pub async fn delete(&self, id: &str) -> Result<(), ApiError> {
        let url = self.client.url(&format!("/contacts/groups/{id}"));
        delete_resource(&self.client, &url, "Failed to delete contact group").await
    }
}

#[derive(Clone)]
pub struct ContactService {
    client: Arc<AuthenticatedClient>,
}

impl ContactService {
    pub fn new(client: Arc<AuthenticatedClient>) -> Self {
        Self { client }
    }

    pub async fn list_by_group(
        &self,
        group_id: &str,
        include_inactive: Option<bool>,
    ) -> Result<Vec<Contact>, ApiError> {
        let url = with_query(
            self.client.url(&format!("/contacts/groups/{group_id}/contacts")),
            &inactive_filter(include_inactive),
        )?;
        get_data(&self.client, &url, "Failed to fetch contacts").await
    }

    pub async fn get(&self, id: &str) -> Result<Contact, ApiError> {
        let url = self.client.url(&format!("/contacts/{id}"));
        get_data(&self.client, &url, "Failed to fetch contact").await
    }

    /// Contacts are created inside a group; the group id travels in the path.
    pub async fn create(&self, group_id: &str, contact: &NewContact) -> Result<Contact, ApiError> {
        let url = self
            .client
            .url(&format!("/contacts/groups/{group_id}/contacts"));
        send_data(
            &self.client,
            &url,
            RequestOptions::post(),
            contact,
            "Failed to create contact",
        )
        .await
    }

    pub async fn update(&self, id: &str, changes: &UpdateContact) -> Result<Contact, ApiError> {
        let url = self.client.url(&format!("/contacts/{id}"));
        send_data(
            &self.client,
            &url,
            RequestOptions::put(),
            changes,
            "Failed to update contact",
        )
        .await
    }

    pub async fn delete(&self, id: &str) -> Result<(), ApiError> {
        let url = self.client.url(&format!("/contacts/{id}"));
        delete_resource(&self.client, &url, "Failed to delete contact").await
    }
}
