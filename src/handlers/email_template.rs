use crate::error::AppResult;
use crate::models::*;
use crate::services::{CampaignService, TemplateService};
use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    get,
    path = "/email-templates",
    tag = "email-templates",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "System templates first, then custom templates by name"),
        (status = 401, description = "Missing or invalid token")
    )
)]
pub async fn list(template_service: web::Data<TemplateService>) -> Result<HttpResponse> {
    match template_service.list().await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/email-templates",
    tag = "email-templates",
    security(
        ("bearer_auth" = [])
    ),
    request_body = CreateTemplateRequest,
    responses(
        (status = 200, description = "Template created", body = TemplateResponse),
        (status = 400, description = "Reserved or duplicate name"),
        (status = 401, description = "Missing or invalid token")
    )
)]
pub async fn create(
    template_service: web::Data<TemplateService>,
    request: web::Json<CreateTemplateRequest>,
) -> Result<HttpResponse> {
    match template_service.create(request.into_inner()).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/email-templates/{id}",
    tag = "email-templates",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("id" = String, Path, description = "Custom template id, or \"welcome\" / \"verification\"")
    ),
    responses(
        (status = 200, description = "Template detail", body = TemplateResponse),
        (status = 404, description = "Template not found"),
        (status = 401, description = "Missing or invalid token")
    )
)]
pub async fn get(
    template_service: web::Data<TemplateService>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let result: AppResult<TemplateResponse> = async {
        let template_ref = TemplateRef::parse(&path)?;
        template_service.get(&template_ref).await
    }
    .await;

    match result {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/email-templates/{id}",
    tag = "email-templates",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("id" = String, Path, description = "Custom template id, or \"welcome\" / \"verification\"")
    ),
    request_body = UpdateTemplateRequest,
    responses(
        (status = 200, description = "Template updated", body = TemplateResponse),
        (status = 400, description = "Field not editable on system templates"),
        (status = 404, description = "Template not found"),
        (status = 401, description = "Missing or invalid token")
    )
)]
pub async fn update(
    template_service: web::Data<TemplateService>,
    path: web::Path<String>,
    request: web::Json<UpdateTemplateRequest>,
) -> Result<HttpResponse> {
    let result: AppResult<TemplateResponse> = async {
        let template_ref = TemplateRef::parse(&path)?;
        template_service
            .update(&template_ref, request.into_inner())
            .await
    }
    .await;

    match result {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/email-templates/{id}",
    tag = "email-templates",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("id" = String, Path, description = "Custom template id")
    ),
    responses(
        (status = 200, description = "Template deleted"),
        (status = 400, description = "System templates cannot be deleted"),
        (status = 404, description = "Template not found"),
        (status = 401, description = "Missing or invalid token")
    )
)]
pub async fn delete(
    template_service: web::Data<TemplateService>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let result: AppResult<()> = async {
        let template_ref = TemplateRef::parse(&path)?;
        template_service.delete(&template_ref).await
    }
    .await;

    match result {
        Ok(()) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Template deleted"
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/email-templates/{id}/send",
    tag = "email-templates",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("id" = String, Path, description = "Custom template id, or \"welcome\" / \"verification\"")
    ),
    request_body = SendCampaignRequest,
    responses(
        (status = 200, description = "Campaign sent, counts and capped error detail", body = SendCampaignResponse),
        (status = 400, description = "Inactive template or no recipients"),
        (status = 404, description = "Template not found"),
        (status = 401, description = "Missing or invalid token")
    )
)]
pub async fn send(
    campaign_service: web::Data<CampaignService>,
    path: web::Path<String>,
    request: web::Json<SendCampaignRequest>,
) -> Result<HttpResponse> {
    let result: AppResult<SendCampaignResponse> = async {
        let template_ref = TemplateRef::parse(&path)?;
        campaign_service
            .send_campaign(&template_ref, request.into_inner())
            .await
    }
    .await;

    match result {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/email-templates/test",
    tag = "email-templates",
    security(
        ("bearer_auth" = [])
    ),
    request_body = SendTestEmailRequest,
    responses(
        (status = 200, description = "Test email sent"),
        (status = 404, description = "Template not found"),
        (status = 401, description = "Missing or invalid token")
    )
)]
pub async fn send_test(
    campaign_service: web::Data<CampaignService>,
    request: web::Json<SendTestEmailRequest>,
) -> Result<HttpResponse> {
    match campaign_service.send_test(request.into_inner()).await {
        Ok(()) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Test email sent"
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn email_template_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/email-templates")
            .route("", web::get().to(list))
            .route("", web::post().to(create))
            // fixed segment before the {id} catch-all
            .route("/test", web::post().to(send_test))
            .route("/{id}", web::get().to(get))
            .route("/{id}", web::put().to(update))
            .route("/{id}", web::delete().to(delete))
            .route("/{id}/send", web::post().to(send)),
    );
}
