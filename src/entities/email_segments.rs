use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

/// Append-only audit row, one per campaign send. `template_id` is NULL for
/// system templates; `template_name` is always populated.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "email_segments")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub template_id: Option<i64>,
    pub template_name: String,
    pub zip_codes: Option<Json>,
    pub sent_at: DateTime<Utc>,
    pub total_recipients: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
