use std::collections::HashMap;

use axum::{
    extract::{FromRef, Query, State},
    routing::{delete, get, post, put},
    Json, Router,
};
use tracing::{error, info, instrument, warn};

use super::{
    dto::{
        PasswordResetRequest, PasswordResetSubmitRequest, PublicUser, RegisterRequest,
        UpdateUserRequest,
    },
    repo_types::User,
    services::{normalize_email, validate_identity},
};
use crate::{
    auth::{hash_password, JwtKeys, TokenError},
    dto::MessageResponse,
    error::ApiError,
    extractors::{required_id, JsonBody},
    state::AppState,
};

const INVALID_RESET_TOKEN: &str = "invalid or expired token";

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users/register", post(register))
        .route("/users/get", get(get_user))
        .route("/users/update", put(update_user))
        .route("/users/delete", delete(delete_user))
        .route("/users/request_password_reset", post(request_password_reset))
        .route("/users/reset_password", put(reset_password))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<RegisterRequest>,
) -> Result<Json<PublicUser>, ApiError> {
    let username = payload.username.trim();
    let email = normalize_email(&payload.email);

    if let Err(e) = validate_identity(username, &email, payload.profile.as_ref()) {
        warn!(error = %e, "registration rejected");
        return Err(e);
    }
    if payload.password.is_empty() {
        warn!("registration without password");
        return Err(ApiError::bad_request("password is required"));
    }

    let hash = hash_password(&payload.password).map_err(|e| {
        error!(error = %e, "hash_password failed");
        ApiError::internal("failed to hash password")
    })?;

    let user = state
        .repo
        .create_user(username, &email, &hash, payload.profile)
        .await
        .map_err(|e| {
            error!(error = %e, "create user failed");
            ApiError::internal("failed to create user")
        })?;

    info!(user_id = user.id, username = %user.username, "user registered");
    Ok(Json(PublicUser::from(user)))
}

#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<User>, ApiError> {
    let id = required_id(&params, "id")?;

    match state.repo.get_user(id).await {
        Ok(Some(user)) => Ok(Json(user)),
        Ok(None) => {
            warn!(user_id = id, "user not found");
            Err(ApiError::not_found("user not found"))
        }
        Err(e) => {
            error!(error = %e, user_id = id, "get user failed");
            Err(ApiError::internal("failed to get user"))
        }
    }
}

#[instrument(skip(state, payload))]
pub async fn update_user(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<UpdateUserRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let username = payload.username.trim();
    let email = normalize_email(&payload.email);
    validate_identity(
        username,
        &email,
        payload.profile.as_ref().and_then(Option::as_ref),
    )?;

    let updated = state
        .repo
        .update_user(payload.id, username, &email, payload.profile)
        .await
        .map_err(|e| {
            error!(error = %e, user_id = payload.id, "update user failed");
            ApiError::internal("failed to update user")
        })?;
    if !updated {
        warn!(user_id = payload.id, "update of unknown user");
        return Err(ApiError::not_found("user not found"));
    }

    info!(user_id = payload.id, "user updated");
    Ok(Json(MessageResponse::new("success update user")))
}

#[instrument(skip(state))]
pub async fn delete_user(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<MessageResponse>, ApiError> {
    let id = required_id(&params, "id")?;

    let deleted = state.repo.delete_user(id).await.map_err(|e| {
        error!(error = %e, user_id = id, "delete user failed");
        ApiError::internal("failed to delete user")
    })?;
    if !deleted {
        warn!(user_id = id, "delete of unknown user");
        return Err(ApiError::not_found("user not found"));
    }

    info!(user_id = id, "user deleted");
    Ok(Json(MessageResponse::new("success dleted user")))
}

#[instrument(skip(state, payload))]
pub async fn request_password_reset(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<PasswordResetRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let email = normalize_email(&payload.email);
    if email.is_empty() {
        return Err(ApiError::bad_request("email is required"));
    }

    let user = match state.repo.get_user_by_email(&email).await {
        Ok(Some(u)) => u,
        Ok(None) => {
            warn!("password reset for unknown email");
            return Err(ApiError::not_found("email not found"));
        }
        Err(e) => {
            error!(error = %e, "get user by email failed");
            return Err(ApiError::internal("failed to look up email"));
        }
    };

    let keys = JwtKeys::from_ref(&state);
    let token = keys.issue(user.id).map_err(|e| {
        error!(error = %e, user_id = user.id, "reset token signing failed");
        ApiError::internal("failed to generate reset token")
    })?;

    state
        .repo
        .save_password_reset_token(user.id, &token)
        .await
        .map_err(|e| {
            error!(error = %e, user_id = user.id, "save reset token failed");
            ApiError::internal("failed to save reset token")
        })?;

    state
        .mailer
        .send_reset_email(&user.email, &token)
        .await
        .map_err(|e| {
            error!(error = %e, user_id = user.id, "send reset email failed");
            ApiError::internal("failed to send reset email")
        })?;

    info!(user_id = user.id, "password reset requested");
    Ok(Json(MessageResponse::new("success")))
}

#[instrument(skip(state, payload))]
pub async fn reset_password(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<PasswordResetSubmitRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    if payload.new_password.is_empty() {
        return Err(ApiError::bad_request("new password is required"));
    }

    let keys = JwtKeys::from_ref(&state);
    let claimed_user = match keys.verify(&payload.token) {
        Ok(id) => id,
        Err(e @ (TokenError::Invalid | TokenError::Expired)) => {
            warn!(error = %e, "reset token rejected");
            return Err(ApiError::bad_request(INVALID_RESET_TOKEN));
        }
        Err(e) => {
            error!(error = %e, "reset token verification failed");
            return Err(ApiError::internal("failed to verify token"));
        }
    };

    let stored = state
        .repo
        .get_password_reset_token(&payload.token)
        .await
        .map_err(|e| {
            error!(error = %e, "get reset token failed");
            ApiError::internal("failed to look up token")
        })?;
    let user_id = match stored {
        Some(t) if t.user_id == claimed_user => t.user_id,
        Some(t) => {
            warn!(stored = t.user_id, claimed = claimed_user, "reset token bound to another user");
            return Err(ApiError::bad_request(INVALID_RESET_TOKEN));
        }
        None => {
            warn!(user_id = claimed_user, "reset token unknown or already used");
            return Err(ApiError::bad_request(INVALID_RESET_TOKEN));
        }
    };

    let hash = hash_password(&payload.new_password).map_err(|e| {
        error!(error = %e, "hash_password failed");
        ApiError::internal("failed to hash password")
    })?;

    // Consume before writing so two concurrent redemptions cannot both succeed.
    let consumed = state
        .repo
        .consume_password_reset_token(&payload.token)
        .await
        .map_err(|e| {
            error!(error = %e, user_id, "consume reset token failed");
            ApiError::internal("failed to update password")
        })?;
    if !consumed {
        warn!(user_id, "reset token redeemed concurrently");
        return Err(ApiError::bad_request(INVALID_RESET_TOKEN));
    }

    let updated = state
        .repo
        .update_password(user_id, &hash)
        .await
        .map_err(|e| {
            error!(error = %e, user_id, "update password failed");
            ApiError::internal("failed to update password")
        })?;
    if !updated {
        warn!(user_id, "password reset for deleted user");
        return Err(ApiError::not_found("user not found"));
    }

    info!(user_id, "password reset");
    Ok(Json(MessageResponse::new("success")))
}
