//! Request handlers for `/habits` and `/calendar`

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::http::header::COOKIE;
use axum::http::HeaderMap;
use axum::Json;

use crate::domain::Caller;
use crate::http::errors::{ApiError, ApiResponse};
use crate::http::AppState;
use crate::service::{
    CalendarParams, CalendarResponse, CreateHabitParams, CreateHabitResponse, DeleteHabitParams,
    DeleteHabitResponse, ListHabitsResponse, ToggleParams, ToggleResponse,
};

/// Cookie carrying the opaque owner key set by the login flow
pub const SESSION_COOKIE: &str = "userId";

type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiError>;

pub async fn list_habits(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<ListHabitsResponse> {
    let caller = caller_from_headers(&headers);
    let response = state.service.list(&caller).await?;
    Ok(Json(ApiResponse::ok(response)))
}

pub async fn create_habit(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<CreateHabitParams>, JsonRejection>,
) -> ApiResult<CreateHabitResponse> {
    let Json(params) = payload.map_err(reject_body)?;
    let caller = caller_from_headers(&headers);
    let response = state.service.create(&caller, params).await?;
    Ok(Json(ApiResponse::ok(response)))
}

pub async fn toggle_completion(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<ToggleParams>, JsonRejection>,
) -> ApiResult<ToggleResponse> {
    let Json(params) = payload.map_err(reject_body)?;
    let caller = caller_from_headers(&headers);
    let response = state.service.toggle(&caller, params).await?;
    Ok(Json(ApiResponse::ok(response)))
}

pub async fn delete_habit(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<DeleteHabitParams>, JsonRejection>,
) -> ApiResult<DeleteHabitResponse> {
    let Json(params) = payload.map_err(reject_body)?;
    let caller = caller_from_headers(&headers);
    let response = state.service.delete(&caller, params).await?;
    Ok(Json(ApiResponse::ok(response)))
}

pub async fn month_calendar(
    State(state): State<AppState>,
    headers: HeaderMap,
    query: Result<Query<CalendarParams>, QueryRejection>,
) -> ApiResult<CalendarResponse> {
    let Query(params) = query.map_err(|e| ApiError::bad_request(e.body_text()))?;
    let caller = caller_from_headers(&headers);
    let response = state.service.calendar(&caller, params).await?;
    Ok(Json(ApiResponse::ok(response)))
}

fn reject_body(rejection: JsonRejection) -> ApiError {
    ApiError::bad_request(rejection.body_text())
}

/// Resolve the caller from the session cookie, if any
pub fn caller_from_headers(headers: &HeaderMap) -> Caller {
    let token = headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.trim());

    Caller::from_token(token)
}
