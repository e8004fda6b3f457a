/// Task resource handlers
///
/// # Endpoints
///
/// ```text
/// POST   /tasks                create, 201 with {"id": n}; 400 on invalid owner
/// GET    /tasks                list with resolved attributes
/// GET    /tasks/user/:user_id  a user's tasks as raw rows; 400 on unknown user
/// GET    /tasks/:id            get with resolved attributes, 404 when absent
/// PATCH  /tasks/:id            partial update, 204
/// DELETE /tasks/:id            delete, 204
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
use questlog_shared::models::task::{CreateTask, Task, TaskWithAttributes, UpdateTask};
use questlog_shared::models::user::User;

/// Creates a task, then appends its id to the owner's `task_ids`
///
/// Two independent store writes with no transaction between them: a crash
/// after the insert leaves the owner's denormalized list missing the new
/// id.
pub async fn create_task(
    State(state): State<AppState>,
    Json(body): Json<CreateTask>,
) -> ApiResult<(StatusCode, Json<CreatedResponse>)> {
    let user_id = body.user_id;
    let id = Task::create(&state.db, body).await?;

    User::add_task_to_user(&state.db, user_id, id).await?;

    Ok((StatusCode::CREATED, Json(CreatedResponse { id })))
}

/// Lists every task with resolved attributes
pub async fn list_tasks(State(state): State<AppState>) -> ApiResult<Json<Vec<TaskWithAttributes>>> {
    let tasks = Task::find_all(&state.db).await?;
    Ok(Json(tasks))
}

/// Lists a user's tasks as raw rows
pub async fn list_tasks_by_user(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> ApiResult<Json<Vec<Task>>> {
    let tasks = Task::find_by_user_id(&state.db, user_id).await?;
    Ok(Json(tasks))
}

/// Gets a task by id with resolved attributes
pub async fn get_task(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<TaskWithAttributes>> {
    let task = Task::find_by_id(&state.db, id).await?;
    Ok(Json(task))
}

/// Partially updates a task
pub async fn update_task(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<UpdateTask>,
) -> ApiResult<StatusCode> {
    Task::update(&state.db, id, body).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Deletes a task
///
/// The owner's `task_ids` keeps the stale id; see the model documentation.
pub async fn delete_task(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    Task::delete(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
