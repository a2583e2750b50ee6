use crate::entities::{
    RecipientType, email_segment_entity as email_segments,
    waitlist_entry_entity as waitlist_entries,
};
use crate::error::{AppError, AppResult};
use crate::external::{Mailer, OutboundEmail};
use crate::models::*;
use crate::services::template_service::{ResolvedTemplate, TemplateService};
use crate::utils::{Clock, normalize_email, validate_email, validate_zip_code};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use std::sync::Arc;

/// Error detail is capped so a large broken batch cannot balloon the
/// response. Counts stay exact regardless.
pub const MAX_REPORTED_ERRORS: usize = 10;

#[derive(Clone)]
pub struct CampaignService {
    pool: Arc<DatabaseConnection>,
    templates: TemplateService,
    mailer: Arc<dyn Mailer>,
    default_from: String,
    clock: Clock,
}

impl CampaignService {
    pub fn new(
        pool: Arc<DatabaseConnection>,
        templates: TemplateService,
        mailer: Arc<dyn Mailer>,
        default_from: String,
        clock: Clock,
    ) -> Self {
        Self {
            pool,
            templates,
            mailer,
            default_from,
            clock,
        }
    }

    /// Send a template to its resolved audience, one recipient at a time.
    /// An audit row is written whatever the outcome of the sends.
    pub async fn send_campaign(
        &self,
        template_ref: &TemplateRef,
        request: SendCampaignRequest,
    ) -> AppResult<SendCampaignResponse> {
        let template = self.templates.resolve(template_ref).await?;
        if !template.is_active {
            return Err(AppError::ValidationError(format!(
                "Template '{}' is inactive",
                template.name
            )));
        }

        let recipients = self.resolve_recipients(&template, &request).await?;
        if recipients.is_empty() {
            return Err(AppError::ValidationError(
                "Campaign has no recipients".to_string(),
            ));
        }

        let from = request
            .from_email
            .clone()
            .or_else(|| template.from_email.clone())
            .unwrap_or_else(|| self.default_from.clone());

        let mut success_count: i64 = 0;
        let mut error_count: i64 = 0;
        let mut errors = Vec::new();

        for recipient in &recipients {
            let result = self
                .mailer
                .send(&OutboundEmail {
                    to: recipient.clone(),
                    to_name: None,
                    subject: template.subject.clone(),
                    html: template.html_content.clone(),
                    from: from.clone(),
                })
                .await;

            match result {
                Ok(()) => success_count += 1,
                Err(e) => {
                    error_count += 1;
                    if errors.len() < MAX_REPORTED_ERRORS {
                        // report the provider's message, not our error wrapper
                        let message = match e {
                            AppError::MailError(message) => message,
                            other => other.to_string(),
                        };
                        errors.push(format!("{recipient}: {message}"));
                    }
                }
            }
        }

        self.record_segment(&template, &request, recipients.len() as i64)
            .await?;

        log::info!(
            "Campaign '{}' sent: {} ok, {} failed, {} total",
            template.name,
            success_count,
            error_count,
            recipients.len()
        );

        Ok(SendCampaignResponse {
            success_count,
            error_count,
            total_recipients: recipients.len() as i64,
            errors,
        })
    }

    /// Single-recipient dry run. No audit row and no filter resolution.
    pub async fn send_test(&self, request: SendTestEmailRequest) -> AppResult<()> {
        let template_ref = TemplateRef::parse(&request.template_id)?;
        let template = self.templates.resolve(&template_ref).await?;

        let to = normalize_email(&request.test_email);
        validate_email(&to)?;

        let from = template
            .from_email
            .clone()
            .unwrap_or_else(|| self.default_from.clone());

        self.mailer
            .send(&OutboundEmail {
                to,
                to_name: None,
                subject: template.subject.clone(),
                html: template.html_content.clone(),
                from,
            })
            .await
    }

    /// Audience resolution, most specific source first: explicit list from
    /// the request, then request ZIP codes, then the template's stored
    /// filter, then the template's recipient type.
    async fn resolve_recipients(
        &self,
        template: &ResolvedTemplate,
        request: &SendCampaignRequest,
    ) -> AppResult<Vec<String>> {
        if let Some(custom) = &request.custom_recipients {
            let mut recipients = Vec::with_capacity(custom.len());
            for raw in custom {
                let email = normalize_email(raw);
                validate_email(&email)?;
                recipients.push(email);
            }
            return Ok(recipients);
        }

        if let Some(zip_codes) = &request.zip_codes {
            for zip in zip_codes {
                validate_zip_code(zip)?;
            }
            return self.verified_emails_in(Some(zip_codes)).await;
        }

        if let Some(filter) = &template.recipient_filter {
            if let Some(emails) = &filter.emails {
                return Ok(emails.iter().map(|e| normalize_email(e)).collect());
            }
            if let Some(zip_codes) = &filter.zip_codes {
                return self.verified_emails_in(Some(zip_codes)).await;
            }
        }

        match template.recipient_type {
            RecipientType::All => {
                let models = waitlist_entries::Entity::find()
                    .order_by_asc(waitlist_entries::Column::Id)
                    .all(self.pool.as_ref())
                    .await?;
                Ok(models.into_iter().map(|m| m.email).collect())
            }
            RecipientType::Waitlist => self.verified_emails_in(None).await,
            RecipientType::Custom => Err(AppError::ValidationError(
                "Custom-audience template has no recipient filter".to_string(),
            )),
        }
    }

    async fn verified_emails_in(&self, zip_codes: Option<&Vec<String>>) -> AppResult<Vec<String>> {
        let mut query = waitlist_entries::Entity::find()
            .filter(waitlist_entries::Column::Verified.eq(true));
        if let Some(zip_codes) = zip_codes {
            query = query.filter(waitlist_entries::Column::ZipCode.is_in(zip_codes.clone()));
        }
        let models = query
            .order_by_asc(waitlist_entries::Column::Id)
            .all(self.pool.as_ref())
            .await?;
        Ok(models.into_iter().map(|m| m.email).collect())
    }

    async fn record_segment(
        &self,
        template: &ResolvedTemplate,
        request: &SendCampaignRequest,
        total_recipients: i64,
    ) -> AppResult<()> {
        // record which ZIP filter actually applied, if any
        let zip_codes = if request.custom_recipients.is_some() {
            None
        } else {
            request.zip_codes.clone().or_else(|| {
                template
                    .recipient_filter
                    .as_ref()
                    .and_then(|f| f.zip_codes.clone())
            })
        };

        email_segments::ActiveModel {
            template_id: Set(template.id),
            template_name: Set(template.name.clone()),
            zip_codes: Set(zip_codes.map(|z| serde_json::json!(z))),
            sent_at: Set(self.clock.now()),
            total_recipients: Set(total_recipients),
            ..Default::default()
        }
        .insert(self.pool.as_ref())
        .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::external::mailer::testing::MockMailer;
    use crate::services::template_service::TemplateStore;
    use chrono::{TimeZone, Utc};
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn t0() -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 8, 1, 12, 0, 0).unwrap()
    }

    fn custom_template(id: i64, recipient_type: RecipientType) -> crate::entities::email_template_entity::Model {
        crate::entities::email_template_entity::Model {
            id,
            name: "spring-promo".to_string(),
            subject: "Spring is here".to_string(),
            html_content: "<p>Book your first mow.</p>".to_string(),
            from_email: None,
            recipient_type,
            recipient_filter: None,
            is_active: true,
            created_at: t0(),
            updated_at: t0(),
        }
    }

    fn segment(id: i64, total: i64) -> email_segments::Model {
        email_segments::Model {
            id,
            template_id: Some(1),
            template_name: "spring-promo".to_string(),
            zip_codes: None,
            sent_at: t0(),
            total_recipients: total,
        }
    }

    fn verified_entry(id: i64, email: &str, zip: &str) -> waitlist_entries::Model {
        waitlist_entries::Model {
            id,
            email: email.to_string(),
            zip_code: zip.to_string(),
            verified: true,
            created_at: t0(),
        }
    }

    // MockDatabase gives its statement log up only once every service
    // handle sharing the connection is gone.
    fn transaction_log(db: Arc<DatabaseConnection>) -> String {
        let db = Arc::try_unwrap(db).expect("a service still holds the connection");
        format!("{:?}", db.into_transaction_log())
    }

    fn service(
        db: &Arc<DatabaseConnection>,
        mailer: Arc<MockMailer>,
    ) -> CampaignService {
        let templates = TemplateService::new(
            db.clone(),
            TemplateStore::new("/nonexistent/lawnly-test-templates"),
        );
        CampaignService::new(
            db.clone(),
            templates,
            mailer,
            "hello@lawnly.example".to_string(),
            Clock::fixed(t0()),
        )
    }

    #[tokio::test]
    async fn test_partial_failure_reports_exact_counts_and_writes_audit_row() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![custom_template(1, RecipientType::Custom)]])
            .append_query_results([vec![segment(1, 2)]]) // audit insert
            .into_connection());
        let mailer = Arc::new(MockMailer::failing_for(&["a@x.com"]));
        let svc = service(&db, mailer.clone());

        let response = svc
            .send_campaign(
                &TemplateRef::Custom(1),
                SendCampaignRequest {
                    custom_recipients: Some(vec!["a@x.com".to_string(), "b@x.com".to_string()]),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(response.success_count, 1);
        assert_eq!(response.error_count, 1);
        assert_eq!(response.total_recipients, 2);
        assert_eq!(response.errors.len(), 1);
        assert_eq!(response.errors[0], "a@x.com: mailbox unavailable");
        assert_eq!(mailer.sent_count(), 1);

        drop(svc);
        let log = transaction_log(db);
        assert!(log.contains("INSERT INTO \\\"email_segments\\\""));
    }

    #[tokio::test]
    async fn test_zero_recipients_rejected_before_any_send() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![custom_template(1, RecipientType::Waitlist)]])
            .append_query_results([Vec::<waitlist_entries::Model>::new()]) // no verified entries
            .into_connection());
        let mailer = Arc::new(MockMailer::new());
        let svc = service(&db, mailer.clone());

        let result = svc
            .send_campaign(&TemplateRef::Custom(1), SendCampaignRequest::default())
            .await;

        assert!(matches!(result, Err(AppError::ValidationError(_))));
        assert_eq!(mailer.sent_count(), 0);

        // no audit row for a rejected campaign
        drop(svc);
        let log = transaction_log(db);
        assert!(!log.contains("INSERT INTO \\\"email_segments\\\""));
    }

    #[tokio::test]
    async fn test_zip_filter_targets_verified_entries() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![custom_template(1, RecipientType::Waitlist)]])
            .append_query_results([vec![
                verified_entry(1, "a@x.com", "78701"),
                verified_entry(2, "b@x.com", "78702"),
            ]])
            .append_query_results([vec![segment(1, 2)]])
            .into_connection());
        let mailer = Arc::new(MockMailer::new());
        let svc = service(&db, mailer.clone());

        let response = svc
            .send_campaign(
                &TemplateRef::Custom(1),
                SendCampaignRequest {
                    zip_codes: Some(vec!["78701".to_string(), "78702".to_string()]),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(response.success_count, 2);
        assert_eq!(response.error_count, 0);
        let sent = mailer.sent_emails();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].to, "a@x.com");
        assert_eq!(sent[1].to, "b@x.com");
    }

    #[tokio::test]
    async fn test_error_detail_capped_while_counts_stay_exact() {
        let addresses: Vec<String> = (0..12).map(|i| format!("user{i}@x.com")).collect();
        let refs: Vec<&str> = addresses.iter().map(|a| a.as_str()).collect();

        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![custom_template(1, RecipientType::Custom)]])
            .append_query_results([vec![segment(1, 12)]])
            .into_connection());
        let mailer = Arc::new(MockMailer::failing_for(&refs));
        let svc = service(&db, mailer.clone());

        let response = svc
            .send_campaign(
                &TemplateRef::Custom(1),
                SendCampaignRequest {
                    custom_recipients: Some(addresses),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(response.error_count, 12);
        assert_eq!(response.success_count, 0);
        assert_eq!(response.total_recipients, 12);
        assert_eq!(response.errors.len(), MAX_REPORTED_ERRORS);
    }

    #[tokio::test]
    async fn test_inactive_template_rejected() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![crate::entities::email_template_entity::Model {
                is_active: false,
                ..custom_template(1, RecipientType::All)
            }]])
            .into_connection());
        let mailer = Arc::new(MockMailer::new());
        let svc = service(&db, mailer.clone());

        let result = svc
            .send_campaign(&TemplateRef::Custom(1), SendCampaignRequest::default())
            .await;

        assert!(matches!(result, Err(AppError::ValidationError(_))));
        assert_eq!(mailer.sent_count(), 0);
    }

    #[tokio::test]
    async fn test_malformed_custom_recipient_rejects_whole_campaign() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![custom_template(1, RecipientType::Custom)]])
            .into_connection());
        let mailer = Arc::new(MockMailer::new());
        let svc = service(&db, mailer.clone());

        let result = svc
            .send_campaign(
                &TemplateRef::Custom(1),
                SendCampaignRequest {
                    custom_recipients: Some(vec![
                        "good@x.com".to_string(),
                        "not-an-email".to_string(),
                    ]),
                    ..Default::default()
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::ValidationError(_))));
        assert_eq!(mailer.sent_count(), 0);
    }

    #[tokio::test]
    async fn test_send_test_writes_no_audit_row() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![custom_template(1, RecipientType::All)]])
            .into_connection());
        let mailer = Arc::new(MockMailer::new());
        let svc = service(&db, mailer.clone());

        svc.send_test(SendTestEmailRequest {
            template_id: "1".to_string(),
            test_email: "Admin@Lawnly.example".to_string(),
        })
        .await
        .unwrap();

        let sent = mailer.sent_emails();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "admin@lawnly.example");

        drop(svc);
        let log = transaction_log(db);
        assert!(!log.contains("email_segments"));
    }
}
