use crate::models::*;
use crate::services::WaitlistService;
use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    post,
    path = "/waitlist",
    tag = "waitlist",
    request_body = JoinWaitlistRequest,
    responses(
        (status = 200, description = "Signup accepted, verification code emailed", body = JoinWaitlistResponse),
        (status = 400, description = "Invalid input or email already on the waitlist"),
        (status = 500, description = "Verification email could not be sent")
    )
)]
pub async fn join(
    waitlist_service: web::Data<WaitlistService>,
    request: web::Json<JoinWaitlistRequest>,
) -> Result<HttpResponse> {
    match waitlist_service.join(request.into_inner()).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/waitlist/verify",
    tag = "waitlist",
    request_body = VerifyWaitlistRequest,
    responses(
        (status = 200, description = "Email verified", body = WaitlistEntryResponse),
        (status = 400, description = "Invalid or expired verification code"),
        (status = 404, description = "No signup for this email")
    )
)]
pub async fn verify(
    waitlist_service: web::Data<WaitlistService>,
    request: web::Json<VerifyWaitlistRequest>,
) -> Result<HttpResponse> {
    match waitlist_service.verify(request.into_inner()).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/waitlist",
    tag = "waitlist",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("page" = Option<i64>, Query, description = "Page number, 1-based"),
        ("page_size" = Option<i64>, Query, description = "Entries per page")
    ),
    responses(
        (status = 200, description = "Waitlist entries, newest first"),
        (status = 401, description = "Missing or invalid token")
    )
)]
pub async fn list(
    waitlist_service: web::Data<WaitlistService>,
    params: web::Query<PaginationParams>,
) -> Result<HttpResponse> {
    match waitlist_service.list(&params).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/waitlist/{id}",
    tag = "waitlist",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("id" = i64, Path, description = "Waitlist entry id")
    ),
    responses(
        (status = 200, description = "Entry deleted"),
        (status = 404, description = "Entry not found"),
        (status = 401, description = "Missing or invalid token")
    )
)]
pub async fn delete(
    waitlist_service: web::Data<WaitlistService>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match waitlist_service.delete_entry(path.into_inner()).await {
        Ok(()) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Waitlist entry deleted"
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn waitlist_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/waitlist")
            .route("", web::post().to(join))
            .route("", web::get().to(list))
            .route("/verify", web::post().to(verify))
            .route("/{id}", web::delete().to(delete)),
    );
}
