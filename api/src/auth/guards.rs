use crate::auth::claims::AuthUser;
use crate::response::ApiResponse;
use axum::{
    Json,
    body::Body,
    extract::FromRequestParts,
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};

#[derive(serde::Serialize, Default)]
pub struct Empty;

/// Extracts and validates the caller from the request, then reinserts the
/// claims into the request extensions for downstream handlers.
async fn extract_and_insert_authuser(
    req: Request<Body>,
) -> Result<(Request<Body>, AuthUser), (StatusCode, Json<ApiResponse<Empty>>)> {
    let (mut parts, body) = req.into_parts();
    let user = AuthUser::from_request_parts(&mut parts, &())
        .await
        .map_err(|_| {
            (
                StatusCode::UNAUTHORIZED,
                Json(ApiResponse::error("Authentication required")),
            )
        })?;

    let mut req = Request::from_parts(parts, body);
    req.extensions_mut().insert(user.clone());
    Ok((req, user))
}

/// Route-layer guard for the admin-only route groups.
///
/// Rejects with `401` for missing/invalid tokens and `403` for a token
/// without the admin claim.
pub async fn allow_admin(req: Request<Body>, next: Next) -> Result<Response, Response> {
    let (req, AuthUser(claims)) = extract_and_insert_authuser(req)
        .await
        .map_err(|e| e.into_response())?;

    if !claims.admin {
        return Err((
            StatusCode::FORBIDDEN,
            Json(ApiResponse::<Empty>::error("Admin access required")),
        )
            .into_response());
    }

    Ok(next.run(req).await)
}
