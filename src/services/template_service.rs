use crate::entities::{RecipientType, email_template_entity as email_templates};
use crate::error::{AppError, AppResult};
use crate::models::*;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryFilter,
    QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;

const DEFAULT_VERIFICATION_SUBJECT: &str = "Your Lawnly verification code";
const DEFAULT_VERIFICATION_HTML: &str = "<p>Hi there,</p>\
<p>Your verification code is <strong>{{code}}</strong>. It expires in 90 seconds.</p>\
<p>If you didn't sign up for the Lawnly waitlist, you can ignore this email.</p>";

const DEFAULT_WELCOME_SUBJECT: &str = "You're on the Lawnly waitlist!";
const DEFAULT_WELCOME_HTML: &str = "<p>Welcome aboard!</p>\
<p>You're confirmed for the Lawnly waitlist in the {{zip_code}} area. \
We'll email you as soon as service opens up near you.</p>";

/// Substitute `{{name}}` placeholders. Unknown placeholders are left as-is.
pub fn render_template(template: &str, vars: &[(&str, &str)]) -> String {
    let mut rendered = template.to_string();
    for (name, value) in vars {
        rendered = rendered.replace(&format!("{{{{{name}}}}}"), value);
    }
    rendered
}

/// Subject/body pair persisted for a system template.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemTemplate {
    pub subject: String,
    pub html_content: String,
}

impl SystemTemplate {
    pub fn default_for(kind: SystemTemplateKind) -> Self {
        match kind {
            SystemTemplateKind::Welcome => Self {
                subject: DEFAULT_WELCOME_SUBJECT.to_string(),
                html_content: DEFAULT_WELCOME_HTML.to_string(),
            },
            SystemTemplateKind::Verification => Self {
                subject: DEFAULT_VERIFICATION_SUBJECT.to_string(),
                html_content: DEFAULT_VERIFICATION_HTML.to_string(),
            },
        }
    }
}

/// File-backed storage for the two system templates. Falls back to the
/// compiled-in defaults until an admin edits one.
#[derive(Clone)]
pub struct TemplateStore {
    dir: PathBuf,
}

impl TemplateStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path(&self, kind: SystemTemplateKind) -> PathBuf {
        self.dir.join(format!("{}.json", kind.as_str()))
    }

    pub fn load(&self, kind: SystemTemplateKind) -> AppResult<SystemTemplate> {
        let path = self.path(kind);
        if path.exists() {
            let raw = std::fs::read_to_string(&path)?;
            Ok(serde_json::from_str(&raw)?)
        } else {
            Ok(SystemTemplate::default_for(kind))
        }
    }

    pub fn save(&self, kind: SystemTemplateKind, template: &SystemTemplate) -> AppResult<()> {
        std::fs::create_dir_all(&self.dir)?;
        std::fs::write(self.path(kind), serde_json::to_string_pretty(template)?)?;
        Ok(())
    }
}

/// A template ready for sending, custom or system.
#[derive(Debug, Clone)]
pub struct ResolvedTemplate {
    /// Row id for custom templates, None for system ones.
    pub id: Option<i64>,
    pub name: String,
    pub subject: String,
    pub html_content: String,
    pub from_email: Option<String>,
    pub recipient_type: RecipientType,
    pub recipient_filter: Option<RecipientFilter>,
    pub is_active: bool,
}

#[derive(Clone)]
pub struct TemplateService {
    pool: Arc<DatabaseConnection>,
    store: TemplateStore,
}

impl TemplateService {
    pub fn new(pool: Arc<DatabaseConnection>, store: TemplateStore) -> Self {
        Self { pool, store }
    }

    pub fn load_system(&self, kind: SystemTemplateKind) -> AppResult<SystemTemplate> {
        self.store.load(kind)
    }

    pub async fn resolve(&self, template_ref: &TemplateRef) -> AppResult<ResolvedTemplate> {
        match template_ref {
            TemplateRef::System(kind) => {
                let template = self.store.load(*kind)?;
                Ok(ResolvedTemplate {
                    id: None,
                    name: kind.as_str().to_string(),
                    subject: template.subject,
                    html_content: template.html_content,
                    from_email: None,
                    recipient_type: RecipientType::Waitlist,
                    recipient_filter: None,
                    is_active: true,
                })
            }
            TemplateRef::Custom(id) => {
                let model = email_templates::Entity::find_by_id(*id)
                    .one(self.pool.as_ref())
                    .await?
                    .ok_or_else(|| AppError::NotFound("Template not found".to_string()))?;
                let recipient_filter = model
                    .recipient_filter
                    .map(serde_json::from_value)
                    .transpose()?;
                Ok(ResolvedTemplate {
                    id: Some(model.id),
                    name: model.name,
                    subject: model.subject,
                    html_content: model.html_content,
                    from_email: model.from_email,
                    recipient_type: model.recipient_type,
                    recipient_filter,
                    is_active: model.is_active,
                })
            }
        }
    }

    pub async fn list(&self) -> AppResult<Vec<TemplateResponse>> {
        let mut templates = Vec::new();

        // system templates first
        for kind in [SystemTemplateKind::Welcome, SystemTemplateKind::Verification] {
            let template = self.store.load(kind)?;
            templates.push(TemplateResponse {
                id: kind.as_str().to_string(),
                name: kind.as_str().to_string(),
                subject: template.subject,
                html_content: template.html_content,
                from_email: None,
                recipient_type: RecipientType::Waitlist,
                recipient_filter: None,
                is_active: true,
                system: true,
                updated_at: None,
            });
        }

        let models = email_templates::Entity::find()
            .order_by_asc(email_templates::Column::Name)
            .all(self.pool.as_ref())
            .await?;
        for model in models {
            templates.push(TemplateResponse::try_from(model)?);
        }

        Ok(templates)
    }

    pub async fn get(&self, template_ref: &TemplateRef) -> AppResult<TemplateResponse> {
        match template_ref {
            TemplateRef::System(kind) => {
                let template = self.store.load(*kind)?;
                Ok(TemplateResponse {
                    id: kind.as_str().to_string(),
                    name: kind.as_str().to_string(),
                    subject: template.subject,
                    html_content: template.html_content,
                    from_email: None,
                    recipient_type: RecipientType::Waitlist,
                    recipient_filter: None,
                    is_active: true,
                    system: true,
                    updated_at: None,
                })
            }
            TemplateRef::Custom(id) => {
                let model = email_templates::Entity::find_by_id(*id)
                    .one(self.pool.as_ref())
                    .await?
                    .ok_or_else(|| AppError::NotFound("Template not found".to_string()))?;
                TemplateResponse::try_from(model)
            }
        }
    }

    pub async fn create(&self, request: CreateTemplateRequest) -> AppResult<TemplateResponse> {
        if matches!(
            TemplateRef::parse(&request.name),
            Ok(TemplateRef::System(_))
        ) {
            return Err(AppError::ValidationError(format!(
                "Template name '{}' is reserved",
                request.name
            )));
        }
        if request.name.trim().is_empty() {
            return Err(AppError::ValidationError(
                "Template name must not be empty".to_string(),
            ));
        }

        let existing = email_templates::Entity::find()
            .filter(email_templates::Column::Name.eq(request.name.as_str()))
            .one(self.pool.as_ref())
            .await?;
        if existing.is_some() {
            return Err(AppError::DuplicateEntry(format!(
                "Template '{}' already exists",
                request.name
            )));
        }

        let recipient_filter = request
            .recipient_filter
            .map(|f| serde_json::to_value(&f))
            .transpose()?;

        let now = Utc::now();
        let model = email_templates::ActiveModel {
            name: Set(request.name),
            subject: Set(request.subject),
            html_content: Set(request.html_content),
            from_email: Set(request.from_email),
            recipient_type: Set(request.recipient_type),
            recipient_filter: Set(recipient_filter),
            is_active: Set(request.is_active.unwrap_or(true)),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(self.pool.as_ref())
        .await?;

        TemplateResponse::try_from(model)
    }

    pub async fn update(
        &self,
        template_ref: &TemplateRef,
        request: UpdateTemplateRequest,
    ) -> AppResult<TemplateResponse> {
        match template_ref {
            TemplateRef::System(kind) => {
                // system templates only allow subject/body edits
                if request.from_email.is_some()
                    || request.recipient_type.is_some()
                    || request.recipient_filter.is_some()
                    || request.is_active.is_some()
                {
                    return Err(AppError::ValidationError(
                        "Only subject and html_content can be edited on system templates"
                            .to_string(),
                    ));
                }

                let mut template = self.store.load(*kind)?;
                if let Some(subject) = request.subject {
                    template.subject = subject;
                }
                if let Some(html_content) = request.html_content {
                    template.html_content = html_content;
                }
                self.store.save(*kind, &template)?;

                self.get(template_ref).await
            }
            TemplateRef::Custom(id) => {
                let model = email_templates::Entity::find_by_id(*id)
                    .one(self.pool.as_ref())
                    .await?
                    .ok_or_else(|| AppError::NotFound("Template not found".to_string()))?;

                let mut active = model.into_active_model();
                if let Some(subject) = request.subject {
                    active.subject = Set(subject);
                }
                if let Some(html_content) = request.html_content {
                    active.html_content = Set(html_content);
                }
                if let Some(from_email) = request.from_email {
                    active.from_email = Set(Some(from_email));
                }
                if let Some(recipient_type) = request.recipient_type {
                    active.recipient_type = Set(recipient_type);
                }
                if let Some(recipient_filter) = request.recipient_filter {
                    active.recipient_filter = Set(Some(serde_json::to_value(&recipient_filter)?));
                }
                if let Some(is_active) = request.is_active {
                    active.is_active = Set(is_active);
                }
                active.updated_at = Set(Utc::now());

                let updated = active.update(self.pool.as_ref()).await?;
                TemplateResponse::try_from(updated)
            }
        }
    }

    pub async fn delete(&self, template_ref: &TemplateRef) -> AppResult<()> {
        match template_ref {
            TemplateRef::System(_) => Err(AppError::ValidationError(
                "System templates cannot be deleted".to_string(),
            )),
            TemplateRef::Custom(id) => {
                let result = email_templates::Entity::delete_by_id(*id)
                    .exec(self.pool.as_ref())
                    .await?;
                if result.rows_affected == 0 {
                    return Err(AppError::NotFound("Template not found".to_string()));
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_template_substitutes_vars() {
        let rendered = render_template(
            "<p>Code: {{code}} for {{zip_code}}</p>",
            &[("code", "123456"), ("zip_code", "78701")],
        );
        assert_eq!(rendered, "<p>Code: 123456 for 78701</p>");
    }

    #[test]
    fn test_render_template_leaves_unknown_placeholders() {
        let rendered = render_template("Hello {{name}}", &[("code", "123456")]);
        assert_eq!(rendered, "Hello {{name}}");
    }

    #[test]
    fn test_system_defaults_have_placeholders() {
        let verification = SystemTemplate::default_for(SystemTemplateKind::Verification);
        assert!(verification.html_content.contains("{{code}}"));

        let welcome = SystemTemplate::default_for(SystemTemplateKind::Welcome);
        assert!(welcome.html_content.contains("{{zip_code}}"));
    }

    #[test]
    fn test_store_roundtrip_and_default_fallback() {
        let dir = std::env::temp_dir().join(format!(
            "lawnly-template-store-{}",
            std::process::id()
        ));
        let _ = std::fs::remove_dir_all(&dir);
        let store = TemplateStore::new(&dir);

        // nothing on disk yet: defaults
        let loaded = store.load(SystemTemplateKind::Welcome).unwrap();
        assert_eq!(loaded.subject, SystemTemplate::default_for(SystemTemplateKind::Welcome).subject);

        let edited = SystemTemplate {
            subject: "Howdy!".to_string(),
            html_content: "<p>Edited</p>".to_string(),
        };
        store.save(SystemTemplateKind::Welcome, &edited).unwrap();

        let reloaded = store.load(SystemTemplateKind::Welcome).unwrap();
        assert_eq!(reloaded.subject, "Howdy!");
        assert_eq!(reloaded.html_content, "<p>Edited</p>");

        // the other template is untouched
        let verification = store.load(SystemTemplateKind::Verification).unwrap();
        assert!(verification.html_content.contains("{{code}}"));

        let _ = std::fs::remove_dir_all(&dir);
    }
}
