use actix_web::web;
use utoipa::OpenApi;
use utoipa::{
    Modify,
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
};
use utoipa_swagger_ui::SwaggerUi;

use crate::entities::RecipientType;
use crate::handlers;
use crate::models::*;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.as_mut().unwrap();
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        )
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::waitlist::join,
        handlers::waitlist::verify,
        handlers::waitlist::list,
        handlers::waitlist::delete,
        handlers::email_template::list,
        handlers::email_template::create,
        handlers::email_template::get,
        handlers::email_template::update,
        handlers::email_template::delete,
        handlers::email_template::send,
        handlers::email_template::send_test,
        handlers::auth::login,
        handlers::auth::refresh,
        handlers::auth::logout,
    ),
    components(
        schemas(
            JoinWaitlistRequest,
            JoinWaitlistResponse,
            VerifyWaitlistRequest,
            WaitlistEntryResponse,
            PaginationParams,
            CreateTemplateRequest,
            UpdateTemplateRequest,
            TemplateResponse,
            RecipientFilter,
            RecipientType,
            SystemTemplateKind,
            SendCampaignRequest,
            SendCampaignResponse,
            SendTestEmailRequest,
            AdminLoginRequest,
            AdminAuthResponse,
            ApiError,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "waitlist", description = "Waitlist signup and administration"),
        (name = "email-templates", description = "Email template and campaign API"),
        (name = "auth", description = "Admin authentication API"),
    ),
    info(
        title = "Lawnly Backend API",
        version = "1.0.0",
        description = "Lawnly waitlist and campaign REST API documentation"
    ),
    servers(
        (url = "/api/v1", description = "Local server")
    )
)]
pub struct ApiDoc;

pub fn swagger_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
    )
    .route(
        "/swagger-ui",
        web::get().to(|| async {
            actix_web::HttpResponse::Found()
                .append_header(("Location", "/swagger-ui/"))
                .finish()
        }),
    );
}
