/// User resource handlers
///
/// # Endpoints
///
/// ```text
/// POST   /users        create, 201 with {"id": n}
/// GET    /users        list with nested tasks
/// GET    /users/:id    get with nested tasks, 404 when absent
/// PATCH  /users/:id    partial update, 204; 400 on empty body
/// DELETE /users/:id    delete, 204; cascades to owned tasks
/// ```

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::CreatedResponse,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use questlog_shared::models::user::{CreateUser, UpdateUser, User};

/// Creates a user
///
/// The user layer is deliberately permissive: the body is taken as-is.
pub async fn create_user(
    State(state): State<AppState>,
    Json(body): Json<CreateUser>,
) -> ApiResult<(StatusCode, Json<CreatedResponse>)> {
    let id = User::create(&state.db, body).await?;
    Ok((StatusCode::CREATED, Json(CreatedResponse { id })))
}

/// Lists every user with nested tasks
pub async fn list_users(State(state): State<AppState>) -> ApiResult<Json<Vec<User>>> {
    let users = User::find_all(&state.db).await?;
    Ok(Json(users))
}

/// Gets a user by id with nested tasks
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<User>> {
    let user = User::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("user {} not found", id)))?;

    Ok(Json(user))
}

/// Partially updates a user
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<UpdateUser>,
) -> ApiResult<StatusCode> {
    if body.is_empty() {
        return Err(ApiError::BadRequest("no fields to update".to_string()));
    }

    let affected = User::update(&state.db, id, body).await?;
    if affected == 0 {
        return Err(ApiError::NotFound(format!("user {} not found", id)));
    }

    Ok(StatusCode::NO_CONTENT)
}

/// Deletes a user; the store cascade removes their tasks
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    let affected = User::delete(&state.db, id).await?;
    if affected == 0 {
        return Err(ApiError::NotFound(format!("user {} not found", id)));
    }

    Ok(StatusCode::NO_CONTENT)
}
