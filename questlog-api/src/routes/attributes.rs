/// Attribute resource handlers, served under `/atributos`
///
/// # Endpoints
///
/// ```text
/// POST   /atributos        create, 201 with {"id": n}; 400 on invalid input
/// GET    /atributos        list
/// GET    /atributos/:id    get, 404 when absent
/// PATCH  /atributos/:id    partial update, 204
/// DELETE /atributos/:id    delete, 204
/// ```

use crate::{app::AppState, error::ApiResult, routes::CreatedResponse};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use questlog_shared::models::attribute::{Attribute, CreateAttribute, UpdateAttribute};

/// Creates an attribute
pub async fn create_attribute(
    State(state): State<AppState>,
    Json(body): Json<CreateAttribute>,
) -> ApiResult<(StatusCode, Json<CreatedResponse>)> {
    let id = Attribute::create(&state.db, body).await?;
    Ok((StatusCode::CREATED, Json(CreatedResponse { id })))
}

/// Lists every attribute
pub async fn list_attributes(State(state): State<AppState>) -> ApiResult<Json<Vec<Attribute>>> {
    let attributes = Attribute::find_all(&state.db).await?;
    Ok(Json(attributes))
}

/// Gets an attribute by id
pub async fn get_attribute(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Attribute>> {
    let attribute = Attribute::find_by_id(&state.db, id).await?;
    Ok(Json(attribute))
}

/// Partially updates an attribute
pub async fn update_attribute(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<UpdateAttribute>,
) -> ApiResult<StatusCode> {
    Attribute::update(&state.db, id, body).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Deletes an attribute
pub async fn delete_attribute(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    Attribute::delete(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
