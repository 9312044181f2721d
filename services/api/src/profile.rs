//! Profile screen: contribution statistics, data export and contact details

use auth::SessionHandle;
use auth::validation::{mask_email, mask_phone_number};
use common::error::ClientResult;
use common::http::BackendClient;
use tracing::info;

use crate::models::{ExportJob, UserStats};

pub const STATS_PATH: &str = "/users/me/stats";
pub const EXPORT_PATH: &str = "/users/me/export";

/// Contact details of the signed-in user, masked unless revealed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactDetails {
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
}

#[derive(Clone)]
pub struct ProfileService {
    client: BackendClient,
    session: SessionHandle,
}

impl ProfileService {
    pub fn new(client: BackendClient, session: SessionHandle) -> Self {
        Self { client, session }
    }

    pub async fn stats(&self) -> ClientResult<UserStats> {
        let token = self.session.require_token().await?;
        self.client
            .send_json(self.client.get(STATS_PATH, Some(&token)))
            .await
    }

    /// Ask the backend to prepare an export of the user's data
    pub async fn request_export(&self) -> ClientResult<ExportJob> {
        let token = self.session.require_token().await?;
        let job: ExportJob = self
            .client
            .send_json(self.client.post(EXPORT_PATH, Some(&token)))
            .await?;

        info!(task_id = %job.task_id, status = %job.status, "Data export requested");
        Ok(job)
    }

    pub async fn contact_details(&self, reveal: bool) -> Option<ContactDetails> {
        let session = self.session.current().await?;
        let user = session.user;

        let shown = |value: Option<String>, mask: fn(&str) -> String| {
            value
                .filter(|v| !v.trim().is_empty())
                .map(|v| if reveal { v } else { mask(&v) })
        };

        Some(ContactDetails {
            name: user.display_name().to_string(),
            phone: shown(user.phone.clone(), mask_phone_number),
            email: shown(user.email.clone(), mask_email),
        })
    }
}
