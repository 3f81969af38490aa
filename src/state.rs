use std::sync::Arc;

use crate::auth::{LogRedirect, LoginRedirect};
use crate::config::Config;
use crate::errors::ClientError;
use crate::http::AuthenticatedClient;
use crate::services::{
    AirlineService, ChapterService, ContactGroupService, ContactService, ContentService,
    DashboardService, SectionService, UserService,
};
use crate::session::{FileSessionStore, SessionStore};

/// One authenticated client shared by every resource service.
#[derive(Clone)]
pub struct AppState {
    pub client: Arc<AuthenticatedClient>,
    pub airlines: AirlineService,
    pub users: UserService,
    pub contact_groups: ContactGroupService,
    pub contacts: ContactService,
    pub chapters: ChapterService,
    pub sections: SectionService,
    pub content: ContentService,
    pub dashboard: DashboardService,
}

impl AppState {
    pub fn new(client: Arc<AuthenticatedClient>) -> Self {
        Self {
            airlines: AirlineService::new(client.clone()),
            users: UserService::new(client.clone()),
            contact_groups: ContactGroupService::new(client.clone()),
            contacts: ContactService::new(client.clone()),
            chapters: ChapterService::new(client.clone()),
            sections: SectionService::new(client.clone()),
            content: ContentService::new(client.clone()),
            dashboard: DashboardService::new(client.clone()),
            client,
        }
    }

    /// File-backed session and log-only redirect, as used by the binary.
    pub fn from_config(config: &Config) -> Result<Self, ClientError> {
        let store = Arc::new(FileSessionStore::new(config.session_file.clone())) as Arc<dyn SessionStore>;
        let redirect = Arc::new(LogRedirect) as Arc<dyn LoginRedirect>;
        Self::with_parts(config, store, redirect)
    }

    pub fn with_parts(
        config: &Config,
        store: Arc<dyn SessionStore>,
        redirect: Arc<dyn LoginRedirect>,
    ) -> Result<Self, ClientError> {
        let client = AuthenticatedClient::new(config, store, redirect)?;
        Ok(Self::new(Arc::new(client)))
    }
}
