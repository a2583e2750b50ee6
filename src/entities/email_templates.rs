use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(
    Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(Some(16))")]
#[serde(rename_all = "snake_case")]
pub enum RecipientType {
    /// Every waitlist entry, pending ones included.
    #[sea_orm(string_value = "all")]
    All,
    /// Verified waitlist entries only.
    #[sea_orm(string_value = "waitlist")]
    Waitlist,
    /// Recipients come from the template's stored filter or the send request.
    #[sea_orm(string_value = "custom")]
    Custom,
}

impl std::fmt::Display for RecipientType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecipientType::All => write!(f, "all"),
            RecipientType::Waitlist => write!(f, "waitlist"),
            RecipientType::Custom => write!(f, "custom"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "email_templates")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub name: String,
    pub subject: String,
    pub html_content: String,
    pub from_email: Option<String>,
    pub recipient_type: RecipientType,
    pub recipient_filter: Option<Json>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
