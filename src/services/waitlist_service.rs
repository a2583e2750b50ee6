use crate::entities::{
    verification_token_entity as verification_tokens, waitlist_entry_entity as waitlist_entries,
};
use crate::error::{AppError, AppResult};
use crate::external::{Mailer, OutboundEmail};
use crate::models::*;
use crate::services::template_service::{TemplateService, render_template};
use crate::utils::{
    Clock, generate_six_digit_code, normalize_email, validate_code_shape, validate_email,
    validate_zip_code,
};
use chrono::Duration;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};
use std::sync::Arc;

/// How long an emailed code stays valid. Deliberately short to keep the
/// replay window small.
pub const VERIFICATION_CODE_TTL_SECS: i64 = 90;

#[derive(Clone)]
pub struct WaitlistService {
    pool: Arc<DatabaseConnection>,
    templates: TemplateService,
    mailer: Arc<dyn Mailer>,
    default_from: String,
    clock: Clock,
}

impl WaitlistService {
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

    /// Signup state machine per email: NONE -> PENDING -> VERIFIED, with a
    /// PENDING self-loop on resubmission. VERIFIED is terminal for this path.
    pub async fn join(&self, request: JoinWaitlistRequest) -> AppResult<JoinWaitlistResponse> {
        let email = normalize_email(&request.email);
        validate_email(&email)?;
        validate_zip_code(&request.zip_code)?;

        let existing = waitlist_entries::Entity::find()
            .filter(waitlist_entries::Column::Email.eq(email.as_str()))
            .one(self.pool.as_ref())
            .await?;

        if let Some(existing) = existing {
            if existing.verified {
                return Err(AppError::DuplicateEntry(
                    "This email is already on the waitlist".to_string(),
                ));
            }
            // pending resubmit: the old row is replaced wholesale
            waitlist_entries::Entity::delete_by_id(existing.id)
                .exec(self.pool.as_ref())
                .await?;
        }

        let code = self.issue_code(&email).await?;
        self.send_verification_email(&email, &request.zip_code, &code)
            .await?;

        // The pending row is only created once the code is in the user's
        // inbox; a failed send leaves no entry behind.
        waitlist_entries::ActiveModel {
            email: Set(email),
            zip_code: Set(request.zip_code),
            verified: Set(false),
            created_at: Set(self.clock.now()),
            ..Default::default()
        }
        .insert(self.pool.as_ref())
        .await?;

        Ok(JoinWaitlistResponse {
            status: "pending_verification".to_string(),
            expires_in: VERIFICATION_CODE_TTL_SECS,
        })
    }

    /// Issue a fresh one-time code for the email. Every prior token row for
    /// the address is purged first, consumed ones included.
    async fn issue_code(&self, email: &str) -> AppResult<String> {
        verification_tokens::Entity::delete_many()
            .filter(verification_tokens::Column::Email.eq(email))
            .exec(self.pool.as_ref())
            .await?;

        let code = generate_six_digit_code();
        let now = self.clock.now();
        verification_tokens::ActiveModel {
            email: Set(email.to_string()),
            code: Set(code.clone()),
            expires_at: Set(now + Duration::seconds(VERIFICATION_CODE_TTL_SECS)),
            used: Set(false),
            created_at: Set(now),
            ..Default::default()
        }
        .insert(self.pool.as_ref())
        .await?;

        Ok(code)
    }

    /// Check a submitted code. Fails closed: a wrong code, a consumed code
    /// and an expired code all produce the same error.
    pub async fn verify(&self, request: VerifyWaitlistRequest) -> AppResult<WaitlistEntryResponse> {
        let email = normalize_email(&request.email);
        validate_email(&email)?;
        validate_code_shape(&request.code)?;

        let entry = waitlist_entries::Entity::find()
            .filter(waitlist_entries::Column::Email.eq(email.as_str()))
            .one(self.pool.as_ref())
            .await?
            .ok_or_else(|| {
                AppError::NotFound("No waitlist signup found for this email".to_string())
            })?;

        let token = verification_tokens::Entity::find()
            .filter(verification_tokens::Column::Email.eq(email.as_str()))
            .filter(verification_tokens::Column::Code.eq(request.code.as_str()))
            .filter(verification_tokens::Column::Used.eq(false))
            .order_by_desc(verification_tokens::Column::CreatedAt)
            .one(self.pool.as_ref())
            .await?
            .ok_or_else(invalid_code)?;

        if token.expires_at <= self.clock.now() {
            return Err(invalid_code());
        }

        // single-use: flag the token rather than deleting it
        let mut token_active = token.into_active_model();
        token_active.used = Set(true);
        token_active.update(self.pool.as_ref()).await?;

        let mut entry_active = entry.into_active_model();
        entry_active.verified = Set(true);
        let verified_entry = entry_active.update(self.pool.as_ref()).await?;

        // best effort; verification stands even if the welcome mail fails
        if let Err(e) = self
            .send_welcome_email(&verified_entry.email, &verified_entry.zip_code)
            .await
        {
            log::warn!(
                "Failed to send welcome email to {}: {e}",
                verified_entry.email
            );
        }

        Ok(WaitlistEntryResponse::from(verified_entry))
    }

    pub async fn list(
        &self,
        params: &PaginationParams,
    ) -> AppResult<PaginatedResponse<WaitlistEntryResponse>> {
        let total = waitlist_entries::Entity::find().count(self.pool.as_ref()).await? as i64;

        let models = waitlist_entries::Entity::find()
            .order_by_desc(waitlist_entries::Column::CreatedAt)
            .limit(params.get_limit() as u64)
            .offset(params.get_offset() as u64)
            .all(self.pool.as_ref())
            .await?;
        let items: Vec<WaitlistEntryResponse> = models
            .into_iter()
            .map(WaitlistEntryResponse::from)
            .collect();

        Ok(PaginatedResponse::new(
            items,
            params.get_page(),
            params.get_page_size(),
            total,
        ))
    }

    pub async fn delete_entry(&self, id: i64) -> AppResult<()> {
        let result = waitlist_entries::Entity::delete_by_id(id)
            .exec(self.pool.as_ref())
            .await?;
        if result.rows_affected == 0 {
            return Err(AppError::NotFound("Waitlist entry not found".to_string()));
        }
        Ok(())
    }

    async fn send_verification_email(
        &self,
        email: &str,
        zip_code: &str,
        code: &str,
    ) -> AppResult<()> {
        let template = self.templates.load_system(SystemTemplateKind::Verification)?;
        let vars = [("code", code), ("zip_code", zip_code)];

        self.mailer
            .send(&OutboundEmail {
                to: email.to_string(),
                to_name: None,
                subject: render_template(&template.subject, &vars),
                html: render_template(&template.html_content, &vars),
                from: self.default_from.clone(),
            })
            .await
    }

    async fn send_welcome_email(&self, email: &str, zip_code: &str) -> AppResult<()> {
        let template = self.templates.load_system(SystemTemplateKind::Welcome)?;
        let vars = [("zip_code", zip_code)];

        self.mailer
            .send(&OutboundEmail {
                to: email.to_string(),
                to_name: None,
                subject: render_template(&template.subject, &vars),
                html: render_template(&template.html_content, &vars),
                from: self.default_from.clone(),
            })
            .await
    }
}

fn invalid_code() -> AppError {
    AppError::ValidationError("Invalid or expired verification code".to_string())
}
