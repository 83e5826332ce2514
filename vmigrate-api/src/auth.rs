use axum::{extract::Request, http::StatusCode, middleware::Next, response::Response};

#[derive(Clone, Debug)]
pub struct AuthenticatedUser {
    pub username: String,
    pub email: Option<String>,
}

/// Auth middleware - extracts the caller identity from reverse-proxy headers
///
/// In production an authenticating proxy sits in front of vmigrate-api and
/// sets X-Vmigrate-User after verifying the caller.
///
/// For local development without a proxy, we fall back to the x-user header.
pub async fn auth_middleware(mut req: Request, next: Next) -> Result<Response, StatusCode> {
    let username = req
        .headers()
        .get("x-vmigrate-user")
        .or_else(|| req.headers().get("x-forwarded-user")) // oauth2-proxy format
        .or_else(|| req.headers().get("x-user")) // fallback for dev
        .and_then(|h| h.to_str().ok())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string());

    let email = req
        .headers()
        .get("x-vmigrate-email")
        .or_else(|| req.headers().get("x-forwarded-email"))
        .and_then(|h| h.to_str().ok())
        .map(|s| s.to_string());

    // If no username, return 401
    let username = username.ok_or(StatusCode::UNAUTHORIZED)?;

    req.extensions_mut()
        .insert(AuthenticatedUser { username, email });

    Ok(next.run(req).await)
}
