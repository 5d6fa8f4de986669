use crate::auth::generate_jwt;
use crate::response::ApiResponse;
use axum::{Json, http::StatusCode, response::IntoResponse};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use services::admin_code;
use util::config;
use validator::Validate;

/// Accepted clock drift, in rotation windows on each side of now.
const CODE_TOLERANCE: i64 = 1;

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(equal = 6, message = "Access code must be 6 digits"))]
    pub code: String,
}

#[derive(Debug, Serialize, Default)]
pub struct LoginResponse {
    pub token: String,
    pub expires_at: String,
}

/// POST /auth/login
///
/// Exchanges the current rotating admin access code for a JWT. There are no
/// per-user accounts; a correct code grants the shared admin identity.
///
/// ### Request Body
/// ```json
/// { "code": "492031" }
/// ```
///
/// ### Responses
///
/// - `200 OK`
/// ```json
/// {
///   "success": true,
///   "data": { "token": "jwt_token_here", "expires_at": "2026-08-27T11:00:00Z" },
///   "message": "Login successful"
/// }
/// ```
///
/// - `400 Bad Request` (validation failure)
/// - `401 Unauthorized` (wrong or stale code)
pub async fn login(Json(req): Json<LoginRequest>) -> impl IntoResponse {
    if let Err(errors) = req.validate() {
        let message = errors
            .field_errors()
            .values()
            .flat_map(|errs| errs.iter())
            .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
            .next()
            .unwrap_or_else(|| "Invalid request".to_string());
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::<LoginResponse>::error(message)),
        );
    }

    let accepted = admin_code::verify_code(
        &config::admin_totp_secret(),
        &req.code,
        Utc::now().timestamp_millis(),
        config::admin_totp_step_seconds(),
        CODE_TOLERANCE,
    );

    if !accepted {
        tracing::warn!("rejected admin login attempt");
        return (
            StatusCode::UNAUTHORIZED,
            Json(ApiResponse::<LoginResponse>::error("Invalid access code")),
        );
    }

    let (token, expires_at) = generate_jwt();
    (
        StatusCode::OK,
        Json(ApiResponse::success(
            LoginResponse { token, expires_at },
            "Login successful",
        )),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use serde_json::Value;
    use util::config::AppConfig;

    static ENV_INIT: std::sync::Once = std::sync::Once::new();

    fn configure() {
        // The config singleton loads from the environment on first touch, so
        // the required variables must exist before any setter runs.
        ENV_INIT.call_once(|| unsafe {
            std::env::set_var("DATABASE_PATH", "data/test.db");
            std::env::set_var("JWT_SECRET", "test-jwt-secret");
            std::env::set_var("ADMIN_TOTP_SECRET", "test-admin-secret");
        });
        AppConfig::set_admin_totp_secret("test-admin-secret");
        AppConfig::set_admin_totp_step_seconds(30u64);
        AppConfig::set_jwt_secret("test-jwt-secret");
        AppConfig::set_jwt_duration_minutes(60u64);
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn correct_code_yields_a_token() {
        configure();
        let code = admin_code::current_code(
            "test-admin-secret",
            Utc::now().timestamp_millis(),
            30,
        );

        let response = login(Json(LoginRequest { code })).await.into_response();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["success"], true);
        assert!(!json["data"]["token"].as_str().unwrap().is_empty());
        assert!(!json["data"]["expires_at"].as_str().unwrap().is_empty());
    }

    #[tokio::test]
    async fn wrong_code_is_unauthorized() {
        configure();
        let good = admin_code::current_code(
            "test-admin-secret",
            Utc::now().timestamp_millis(),
            30,
        );
        // Flip the last digit so the code has valid shape but wrong value.
        let mut chars: Vec<char> = good.chars().collect();
        let d = chars[5].to_digit(10).unwrap();
        chars[5] = char::from_digit((d + 1) % 10, 10).unwrap();
        let bad: String = chars.into_iter().collect();

        let response = login(Json(LoginRequest { code: bad })).await.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let json = body_json(response).await;
        assert_eq!(json["success"], false);
    }

    #[tokio::test]
    async fn malformed_code_fails_validation() {
        configure();
        let response = login(Json(LoginRequest {
            code: "123".to_string(),
        }))
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
