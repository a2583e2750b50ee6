use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AdminLoginRequest {
    #[schema(example = "admin@lawnly.example")]
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AdminAuthResponse {
    pub email: String,
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
}
