use crate::entities::{RecipientType, email_template_entity as email_templates};
use crate::error::{AppError, AppResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// The two built-in, file-backed templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SystemTemplateKind {
    Welcome,
    Verification,
}

impl SystemTemplateKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SystemTemplateKind::Welcome => "welcome",
            SystemTemplateKind::Verification => "verification",
        }
    }
}

impl std::fmt::Display for SystemTemplateKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Template addressing: system templates go by name, custom ones by row id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateRef {
    System(SystemTemplateKind),
    Custom(i64),
}

impl TemplateRef {
    pub fn parse(raw: &str) -> AppResult<Self> {
        match raw {
            "welcome" => Ok(TemplateRef::System(SystemTemplateKind::Welcome)),
            "verification" => Ok(TemplateRef::System(SystemTemplateKind::Verification)),
            other => other
                .parse::<i64>()
                .map(TemplateRef::Custom)
                .map_err(|_| AppError::ValidationError(format!("Invalid template id: {other}"))),
        }
    }
}

/// Stored recipient filter for custom templates, also the shape of the
/// per-send overrides.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct RecipientFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emails: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zip_codes: Option<Vec<String>>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateTemplateRequest {
    #[schema(example = "Spring promo")]
    pub name: String,
    #[schema(example = "Your lawn is ready for spring")]
    pub subject: String,
    pub html_content: String,
    pub from_email: Option<String>,
    pub recipient_type: RecipientType,
    pub recipient_filter: Option<RecipientFilter>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UpdateTemplateRequest {
    pub subject: Option<String>,
    pub html_content: Option<String>,
    pub from_email: Option<String>,
    pub recipient_type: Option<RecipientType>,
    pub recipient_filter: Option<RecipientFilter>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TemplateResponse {
    /// "welcome" / "verification" for system templates, the row id otherwise.
    pub id: String,
    pub name: String,
    pub subject: String,
    pub html_content: String,
    pub from_email: Option<String>,
    pub recipient_type: RecipientType,
    pub recipient_filter: Option<RecipientFilter>,
    pub is_active: bool,
    pub system: bool,
    pub updated_at: Option<DateTime<Utc>>,
}

impl TryFrom<email_templates::Model> for TemplateResponse {
    type Error = AppError;

    fn try_from(model: email_templates::Model) -> AppResult<Self> {
        let recipient_filter = model
            .recipient_filter
            .map(serde_json::from_value)
            .transpose()?;
        Ok(Self {
            id: model.id.to_string(),
            name: model.name,
            subject: model.subject,
            html_content: model.html_content,
            from_email: model.from_email,
            recipient_type: model.recipient_type,
            recipient_filter,
            is_active: model.is_active,
            system: false,
            updated_at: Some(model.updated_at),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_ref_parse() {
        assert_eq!(
            TemplateRef::parse("welcome").unwrap(),
            TemplateRef::System(SystemTemplateKind::Welcome)
        );
        assert_eq!(
            TemplateRef::parse("verification").unwrap(),
            TemplateRef::System(SystemTemplateKind::Verification)
        );
        assert_eq!(TemplateRef::parse("42").unwrap(), TemplateRef::Custom(42));
        assert!(TemplateRef::parse("spring-promo").is_err());
        assert!(TemplateRef::parse("").is_err());
    }
}
