//! REST handlers for the dish collection.

use crate::error::ApiError;
use crate::state::AppState;
use axum::Json;
use axum::body::Bytes;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use chrono::Utc;
use dishboard_protocol::{
    CreateDish, DataResponse, Dish, DishPatch, Empty, HealthResponse, ListResponse,
};

type ApiResult<T> = Result<T, ApiError>;

pub async fn list_dishes(State(state): State<AppState>) -> ApiResult<Json<ListResponse>> {
    let dishes = state.service.list()?;
    Ok(Json(ListResponse::new(dishes)))
}

pub async fn create_dish(
    State(state): State<AppState>,
    body: Result<Json<CreateDish>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<DataResponse<Dish>>)> {
    let Json(request) = body.map_err(reject_body)?;
    let dish = state.service.create(request)?;
    Ok((
        StatusCode::CREATED,
        Json(DataResponse::new("Dish created successfully", dish)),
    ))
}

/// An absent or blank body is an empty patch; the dish is still looked up and
/// touched.
pub async fn update_dish(
    State(state): State<AppState>,
    Path(dish_id): Path<String>,
    body: Bytes,
) -> ApiResult<Json<DataResponse<Dish>>> {
    let patch = parse_patch(&body)?;
    let dish = state.service.update(&dish_id, patch)?;
    Ok(Json(DataResponse::new("Dish updated successfully", dish)))
}

pub async fn delete_dish(
    State(state): State<AppState>,
    Path(dish_id): Path<String>,
) -> ApiResult<Json<DataResponse<Empty>>> {
    state.service.delete(&dish_id)?;
    Ok(Json(DataResponse::new("Dish deleted successfully", Empty {})))
}

pub async fn toggle_dish(
    State(state): State<AppState>,
    Path(dish_id): Path<String>,
) -> ApiResult<Json<DataResponse<Dish>>> {
    let dish = state.service.toggle(&dish_id)?;
    let message = if dish.is_published {
        "Dish published successfully"
    } else {
        "Dish unpublished successfully"
    };
    Ok(Json(DataResponse::new(message, dish)))
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        success: true,
        message: "Server is running".to_string(),
        timestamp: Utc::now(),
    })
}

pub async fn route_not_found() -> ApiError {
    ApiError::RouteNotFound
}

fn reject_body(rejection: JsonRejection) -> ApiError {
    ApiError::BadRequest(rejection.body_text())
}

fn parse_patch(body: &[u8]) -> ApiResult<DishPatch> {
    if body.trim_ascii().is_empty() {
        return Ok(DishPatch::default());
    }
    serde_json::from_slice(body).map_err(|err| {
        ApiError::BadRequest(format!("Failed to parse the request body as JSON: {err}"))
    })
}
