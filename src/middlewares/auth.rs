use crate::error::AppError;
use crate::utils::JwtService;
use actix_web::http::Method;
use actix_web::{
    Error, HttpMessage,
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
};
use futures_util::future::LocalBoxFuture;
use std::future::{Ready, ready};

// Public route table. Signup and verify are open but the admin listing on
// the same path is not, so matching is (method, path) rather than path only.
struct PublicPaths {
    exact_routes: Vec<(Method, &'static str)>,
    prefix_paths: Vec<&'static str>,
    excluded_paths: Vec<&'static str>,
}

impl PublicPaths {
    fn new() -> Self {
        Self {
            exact_routes: vec![
                (Method::POST, "/api/v1/waitlist"),
                (Method::POST, "/api/v1/waitlist/verify"),
                (Method::POST, "/api/v1/auth/login"),
            ],
            prefix_paths: vec!["/swagger-ui", "/api-docs/"],
            // authenticated even though they live under /auth
            excluded_paths: vec!["/api/v1/auth/refresh", "/api/v1/auth/logout"],
        }
    }

    fn is_public(&self, method: &Method, path: &str) -> bool {
        if self
            .excluded_paths
            .iter()
            .any(|&excluded| path.starts_with(excluded))
        {
            return false;
        }

        if self
            .exact_routes
            .iter()
            .any(|(m, p)| m == method && *p == path)
        {
            return true;
        }

        self.prefix_paths
            .iter()
            .any(|&prefix| path.starts_with(prefix))
    }
}

pub struct AuthMiddleware {
    jwt_service: JwtService,
}

impl AuthMiddleware {
    pub fn new(jwt_service: JwtService) -> Self {
        Self { jwt_service }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = AuthMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService {
            service,
            jwt_service: self.jwt_service.clone(),
            public_paths: PublicPaths::new(),
        }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: S,
    jwt_service: JwtService,
    public_paths: PublicPaths,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        // CORS preflight always passes
        if req.method() == Method::OPTIONS {
            let fut = self.service.call(req);
            return Box::pin(fut);
        }

        if self.public_paths.is_public(req.method(), req.path()) {
            let fut = self.service.call(req);
            return Box::pin(fut);
        }

        let token = req
            .headers()
            .get("Authorization")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "));

        if let Some(token) = token {
            match self.jwt_service.verify_access_token(token) {
                Ok(claims) => {
                    // make the admin id available to handlers
                    req.extensions_mut()
                        .insert(claims.sub.parse::<i64>().unwrap_or(0));
                    let fut = self.service.call(req);
                    Box::pin(fut)
                }
                Err(_) => {
                    let error = AppError::AuthError("Invalid access token".to_string());
                    Box::pin(async move { Err(error.into()) })
                }
            }
        } else {
            let error = AppError::AuthError("Missing access token".to_string());
            Box::pin(async move { Err(error.into()) })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signup_is_public_but_listing_is_not() {
        let paths = PublicPaths::new();

        assert!(paths.is_public(&Method::POST, "/api/v1/waitlist"));
        assert!(paths.is_public(&Method::POST, "/api/v1/waitlist/verify"));
        assert!(!paths.is_public(&Method::GET, "/api/v1/waitlist"));
        assert!(!paths.is_public(&Method::DELETE, "/api/v1/waitlist/3"));
    }

    #[test]
    fn test_login_is_public_but_refresh_and_logout_are_not() {
        let paths = PublicPaths::new();

        assert!(paths.is_public(&Method::POST, "/api/v1/auth/login"));
        assert!(!paths.is_public(&Method::POST, "/api/v1/auth/refresh"));
        assert!(!paths.is_public(&Method::POST, "/api/v1/auth/logout"));
    }

    #[test]
    fn test_template_routes_require_auth() {
        let paths = PublicPaths::new();

        assert!(!paths.is_public(&Method::GET, "/api/v1/email-templates"));
        assert!(!paths.is_public(&Method::POST, "/api/v1/email-templates/42/send"));
    }

    #[test]
    fn test_swagger_is_public() {
        let paths = PublicPaths::new();

        assert!(paths.is_public(&Method::GET, "/swagger-ui/index.html"));
        assert!(paths.is_public(&Method::GET, "/api-docs/openapi.json"));
    }
}
