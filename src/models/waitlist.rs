use crate::entities::waitlist_entry_entity as waitlist_entries;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct JoinWaitlistRequest {
    #[schema(example = "bob@example.com")]
    pub email: String,
    #[schema(example = "78701")]
    pub zip_code: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct JoinWaitlistResponse {
    /// Always "pending_verification" on success.
    pub status: String,
    /// Seconds until the emailed code expires.
    pub expires_in: i64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct VerifyWaitlistRequest {
    #[schema(example = "bob@example.com")]
    pub email: String,
    #[schema(example = "123456")]
    pub code: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct WaitlistEntryResponse {
    pub id: i64,
    pub email: String,
    pub zip_code: String,
    pub verified: bool,
    pub created_at: DateTime<Utc>,
}

impl From<waitlist_entries::Model> for WaitlistEntryResponse {
    fn from(entry: waitlist_entries::Model) -> Self {
        Self {
            id: entry.id,
            email: entry.email,
            zip_code: entry.zip_code,
            verified: entry.verified,
            created_at: entry.created_at,
        }
    }
}
