use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use serde_json::json;
use tracing::{info, warn};

use crate::auth::identity::{expired_cookie, session_cookie};
use crate::auth::password::{hash_password_blocking, verify_password_blocking};
use crate::auth::principal::Principal;
use crate::errors::AppError;
use crate::extract::ApiJson;
use crate::models::user::{NewUser, Role, User};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub skills: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Validated registration, with role-specific fields dropped for the other role.
pub fn validate_registration(req: RegisterRequest) -> Result<(NewUser, String), AppError> {
    let (Some(name), Some(email), Some(password), Some(role)) = (
        non_blank(req.name),
        non_blank(req.email),
        req.password.filter(|p| !p.is_empty()),
        non_blank(req.role),
    ) else {
        return Err(AppError::Validation(
            "Please provide all required fields".to_string(),
        ));
    };
    let role = role.parse::<Role>()?;

    let user = NewUser {
        name,
        email: normalize_email(&email),
        password_hash: String::new(),
        role,
        phone: non_blank(req.phone),
        company: match role {
            Role::Employer => non_blank(req.company),
            Role::Seeker => None,
        },
        skills: match role {
            Role::Seeker => req.skills.unwrap_or_default(),
            Role::Employer => Vec::new(),
        },
    };
    Ok((user, password))
}

fn signed_in(
    state: &AppState,
    jar: CookieJar,
    user: &User,
    status: StatusCode,
    message: &str,
) -> Result<impl IntoResponse, AppError> {
    let token = state.tokens.issue(&Principal::new(user.id, user.role))?;
    let cookie = session_cookie(token, state.tokens.ttl(), state.config.cookie_secure);
    Ok((
        status,
        jar.add(cookie),
        Json(json!({
            "success": true,
            "message": message,
            "user": {
                "id": user.id,
                "name": user.name,
                "email": user.email,
                "role": user.role,
            }
        })),
    ))
}

/// POST /api/auth/register
pub async fn handle_register(
    State(state): State<AppState>,
    jar: CookieJar,
    ApiJson(req): ApiJson<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    let (mut new_user, password) = validate_registration(req)?;
    new_user.password_hash = hash_password_blocking(password).await?;

    let user = state.store.create_user(new_user).await?;
    info!("Registered {} account {}", user.role, user.id);
    signed_in(&state, jar, &user, StatusCode::CREATED, "User registered successfully")
}

/// POST /api/auth/login
pub async fn handle_login(
    State(state): State<AppState>,
    jar: CookieJar,
    ApiJson(req): ApiJson<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let (Some(email), Some(password)) = (non_blank(req.email), req.password) else {
        return Err(AppError::Validation(
            "Please provide email and password".to_string(),
        ));
    };

    let user = state
        .store
        .find_user_by_email(&normalize_email(&email))
        .await?;
    let verified = match &user {
        Some(user) => verify_password_blocking(password, user.password_hash.clone()).await,
        None => false,
    };
    let (Some(user), true) = (user, verified) else {
        warn!("Failed login attempt");
        return Err(AppError::Unauthorized("Invalid credentials".to_string()));
    };

    info!("User {} logged in", user.id);
    signed_in(&state, jar, &user, StatusCode::OK, "Login successful")
}

/// POST /api/auth/logout
pub async fn handle_logout(State(state): State<AppState>, jar: CookieJar) -> impl IntoResponse {
    (
        jar.add(expired_cookie(state.config.cookie_secure)),
        Json(json!({ "success": true, "message": "Logged out successfully" })),
    )
}
