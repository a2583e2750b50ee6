use crate::config::AdminConfig;
use crate::entities::admin_user_entity as admin_users;
use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::utils::{JwtService, hash_password, normalize_email, verify_password};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use std::sync::Arc;

#[derive(Clone)]
pub struct AuthService {
    pool: Arc<DatabaseConnection>,
    jwt_service: JwtService,
}

impl AuthService {
    pub fn new(pool: Arc<DatabaseConnection>, jwt_service: JwtService) -> Self {
        Self { pool, jwt_service }
    }

    /// Seed the admin account from config at boot. Does nothing when the
    /// account already exists or no credentials are configured.
    pub async fn ensure_admin(&self, config: &AdminConfig) -> AppResult<()> {
        if config.email.is_empty() || config.password.is_empty() {
            log::warn!("No admin credentials configured, skipping admin seeding");
            return Ok(());
        }

        let email = normalize_email(&config.email);
        let existing = admin_users::Entity::find()
            .filter(admin_users::Column::Email.eq(email.as_str()))
            .one(self.pool.as_ref())
            .await?;
        if existing.is_some() {
            return Ok(());
        }

        let password_hash = hash_password(&config.password)?;
        admin_users::ActiveModel {
            email: Set(email.clone()),
            password_hash: Set(password_hash),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(self.pool.as_ref())
        .await?;

        log::info!("Seeded admin account: {email}");
        Ok(())
    }

    pub async fn login(&self, request: AdminLoginRequest) -> AppResult<AdminAuthResponse> {
        let email = normalize_email(&request.email);

        let admin = admin_users::Entity::find()
            .filter(admin_users::Column::Email.eq(email.as_str()))
            .one(self.pool.as_ref())
            .await?
            .ok_or_else(invalid_credentials)?;

        if !verify_password(&request.password, &admin.password_hash)? {
            return Err(invalid_credentials());
        }

        let access_token = self.jwt_service.generate_access_token(admin.id, &admin.email)?;
        let refresh_token = self
            .jwt_service
            .generate_refresh_token(admin.id, &admin.email)?;

        Ok(AdminAuthResponse {
            email: admin.email,
            access_token,
            refresh_token,
            expires_in: self.jwt_service.get_access_token_expires_in(),
        })
    }

    pub async fn refresh_token(&self, refresh_token: &str) -> AppResult<AdminAuthResponse> {
        let claims = self.jwt_service.verify_refresh_token(refresh_token)?;
        let admin_id: i64 = claims
            .sub
            .parse()
            .map_err(|_| AppError::AuthError("Invalid token".to_string()))?;

        // the account must still exist for the refresh to succeed
        let admin = admin_users::Entity::find_by_id(admin_id)
            .one(self.pool.as_ref())
            .await?
            .ok_or_else(|| AppError::AuthError("Account no longer exists".to_string()))?;

        let access_token = self.jwt_service.generate_access_token(admin.id, &admin.email)?;

        Ok(AdminAuthResponse {
            email: admin.email,
            access_token,
            refresh_token: refresh_token.to_string(),
            expires_in: self.jwt_service.get_access_token_expires_in(),
        })
    }
}

/// Same message for unknown email and wrong password.
fn invalid_credentials() -> AppError {
    AppError::AuthError("Invalid email or password".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn admin(id: i64, email: &str, password: &str) -> admin_users::Model {
        admin_users::Model {
            id,
            email: email.to_string(),
            password_hash: hash_password(password).unwrap(),
            created_at: Utc.with_ymd_and_hms(2025, 8, 1, 12, 0, 0).unwrap(),
        }
    }

    fn service(db: &Arc<DatabaseConnection>) -> AuthService {
        AuthService::new(db.clone(), JwtService::new("test-secret", 3600, 86400))
    }

    // MockDatabase gives its statement log up only once every service
    // handle sharing the connection is gone.
    fn transaction_log(db: Arc<DatabaseConnection>) -> String {
        let db = Arc::try_unwrap(db).expect("a service still holds the connection");
        format!("{:?}", db.into_transaction_log())
    }

    #[tokio::test]
    async fn test_login_round_trip() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![admin(1, "admin@lawnly.example", "hunter22")]])
            .into_connection());
        let svc = service(&db);

        let response = svc
            .login(AdminLoginRequest {
                email: "Admin@Lawnly.example".to_string(),
                password: "hunter22".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(response.email, "admin@lawnly.example");
        assert!(!response.access_token.is_empty());
        assert!(!response.refresh_token.is_empty());
        assert_eq!(response.expires_in, 3600);
    }

    #[tokio::test]
    async fn test_login_wrong_password_and_unknown_email_look_the_same() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![admin(1, "admin@lawnly.example", "hunter22")]])
            .append_query_results([Vec::<admin_users::Model>::new()])
            .into_connection());
        let svc = service(&db);

        let wrong_password = svc
            .login(AdminLoginRequest {
                email: "admin@lawnly.example".to_string(),
                password: "wrong".to_string(),
            })
            .await
            .unwrap_err();
        let unknown_email = svc
            .login(AdminLoginRequest {
                email: "nobody@lawnly.example".to_string(),
                password: "hunter22".to_string(),
            })
            .await
            .unwrap_err();

        assert_eq!(wrong_password.to_string(), unknown_email.to_string());
    }

    #[tokio::test]
    async fn test_refresh_issues_new_access_token() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![admin(1, "admin@lawnly.example", "hunter22")]])
            .into_connection());
        let svc = service(&db);

        let jwt = JwtService::new("test-secret", 3600, 86400);
        let refresh = jwt.generate_refresh_token(1, "admin@lawnly.example").unwrap();

        let response = svc.refresh_token(&refresh).await.unwrap();
        assert_eq!(response.refresh_token, refresh);
        assert!(jwt.verify_access_token(&response.access_token).is_ok());
    }

    #[tokio::test]
    async fn test_refresh_rejects_access_token() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let svc = service(&db);

        let jwt = JwtService::new("test-secret", 3600, 86400);
        let access = jwt.generate_access_token(1, "admin@lawnly.example").unwrap();

        assert!(matches!(
            svc.refresh_token(&access).await,
            Err(AppError::AuthError(_))
        ));
    }

    #[tokio::test]
    async fn test_ensure_admin_skips_existing_account() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![admin(1, "admin@lawnly.example", "hunter22")]])
            .into_connection());
        let svc = service(&db);

        svc.ensure_admin(&AdminConfig {
            email: "admin@lawnly.example".to_string(),
            password: "hunter22".to_string(),
        })
        .await
        .unwrap();

        drop(svc);
        let log = transaction_log(db);
        assert!(!log.contains("INSERT"));
    }

    #[tokio::test]
    async fn test_ensure_admin_noop_without_credentials() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let svc = service(&db);

        svc.ensure_admin(&AdminConfig::default()).await.unwrap();

        drop(svc);
        assert_eq!(transaction_log(db), "[]");
    }
}
