use actix_web::{App, HttpServer, middleware::Logger, web};
use chrono::Local;
use env_logger::{Env, Target};
use std::io::Write; // for env_logger custom formatter
use std::sync::Arc;

use lawnly_backend::{
    config::Config,
    database::{create_pool, run_migrations},
    external::{Mailer, ResendMailer},
    handlers,
    middlewares::{AuthMiddleware, create_cors},
    services::*,
    swagger::swagger_config,
    utils::{Clock, JwtService},
};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format(|buf, record| {
            let ts = Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z");
            let level = record.level().as_str().to_ascii_lowercase();
            let msg_json = serde_json::to_string(&format!("{}", record.args()))
                .unwrap_or_else(|_| "\"<invalid utf8>\"".to_string());
            writeln!(
                buf,
                "{{\"timestamp\":\"{}\",\"level\":\"{}\",\"message\":{},\"target\":\"{}\"}}",
                ts,
                level,
                msg_json,
                record.target(),
            )
        })
        .target(Target::Stdout)
        .init();

    let config = Config::from_toml().expect("Failed to load configuration file");

    let pool = create_pool(&config.database)
        .await
        .expect("Failed to create database connection pool");

    run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    let pool = Arc::new(pool);

    let jwt_service = JwtService::new(
        &config.jwt.secret,
        config.jwt.access_token_expires_in,
        config.jwt.refresh_token_expires_in,
    );

    let mailer: Arc<dyn Mailer> = Arc::new(ResendMailer::new(config.mail.clone()));
    let clock = Clock::system();

    let template_service = TemplateService::new(
        pool.clone(),
        TemplateStore::new(config.templates.dir.clone()),
    );
    let waitlist_service = WaitlistService::new(
        pool.clone(),
        template_service.clone(),
        mailer.clone(),
        config.mail.from_email.clone(),
        clock.clone(),
    );
    let campaign_service = CampaignService::new(
        pool.clone(),
        template_service.clone(),
        mailer.clone(),
        config.mail.from_email.clone(),
        clock.clone(),
    );
    let auth_service = AuthService::new(pool.clone(), jwt_service.clone());

    if let Err(e) = auth_service.ensure_admin(&config.admin).await {
        log::error!("Admin seeding failed: {e}");
    }

    log::info!(
        "Starting HTTP server at {}:{}",
        config.server.host,
        config.server.port
    );

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(create_cors())
            .wrap(AuthMiddleware::new(jwt_service.clone()))
            .app_data(web::Data::new(auth_service.clone()))
            .app_data(web::Data::new(waitlist_service.clone()))
            .app_data(web::Data::new(template_service.clone()))
            .app_data(web::Data::new(campaign_service.clone()))
            .configure(swagger_config)
            .service(
                web::scope("/api/v1")
                    .configure(handlers::waitlist_config)
                    .configure(handlers::email_template_config)
                    .configure(handlers::auth_config),
            )
    })
    .bind((config.server.host.as_str(), config.server.port))?
    .run()
    .await
}
