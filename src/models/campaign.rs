use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SendCampaignRequest {
    /// Explicit recipient list; takes precedence over any filter.
    pub custom_recipients: Option<Vec<String>>,
    /// ZIP codes to match against verified waitlist entries.
    pub zip_codes: Option<Vec<String>>,
    /// Overrides the template's sender address.
    pub from_email: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SendCampaignResponse {
    pub success_count: i64,
    pub error_count: i64,
    pub total_recipients: i64,
    /// First 10 failures as "<email>: <message>"; counts stay exact.
    pub errors: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SendTestEmailRequest {
    /// "welcome", "verification", or a custom template id.
    #[schema(example = "42")]
    pub template_id: String,
    #[schema(example = "admin@lawnly.example")]
    pub test_email: String,
}
