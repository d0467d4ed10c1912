use std::{net::SocketAddr, sync::Arc};

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::{Local, NaiveDate};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{MaintenancePlan, PlanMetadata, RefreshSummary, Task, recurrence};

#[derive(Clone)]
pub struct AppState {
    plan: Arc<RwLock<MaintenancePlan>>,
}

impl AppState {
    pub fn new(plan: MaintenancePlan) -> Self {
        Self {
            plan: Arc::new(RwLock::new(plan)),
        }
    }

    pub fn with_shared(plan: Arc<RwLock<MaintenancePlan>>) -> Self {
        Self { plan }
    }

    fn plan(&self) -> Arc<RwLock<MaintenancePlan>> {
        self.plan.clone()
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    message: String,
}

#[derive(Debug)]
enum ApiError {
    NotFound(String),
    Conflict(String),
    Invalid(String),
    Internal(String),
}

impl ApiError {
    fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    fn invalid(message: impl Into<String>) -> Self {
        ApiError::Invalid(message.into())
    }

    fn internal(message: impl Into<String>) -> Self {
        ApiError::Internal(message.into())
    }
}

impl From<polars::prelude::PolarsError> for ApiError {
    fn from(value: polars::prelude::PolarsError) -> Self {
        ApiError::Invalid(value.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::NotFound(message) => {
                let body = Json(ErrorBody {
                    error: "not_found",
                    message,
                });
                (StatusCode::NOT_FOUND, body).into_response()
            }
            ApiError::Conflict(message) => {
                let body = Json(ErrorBody {
                    error: "conflict",
                    message,
                });
                (StatusCode::CONFLICT, body).into_response()
            }
            ApiError::Invalid(message) => {
                let body = Json(ErrorBody {
                    error: "invalid_request",
                    message,
                });
                (StatusCode::BAD_REQUEST, body).into_response()
            }
            ApiError::Internal(message) => {
                let body = Json(ErrorBody {
                    error: "internal_error",
                    message,
                });
                (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct CompleteTaskPayload {
    completed_on: NaiveDate,
}

#[derive(Debug, Deserialize)]
struct RefreshParams {
    #[serde(default)]
    as_of: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
struct NextDateParams {
    base_date: String,
    period_type: String,
    period_value: i64,
}

#[derive(Debug, Serialize)]
struct NextDateBody {
    next_date: String,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/metadata", get(get_metadata).put(update_metadata))
        .route("/tasks", get(list_tasks).post(create_task))
        .route(
            "/tasks/:id",
            get(get_task).put(update_task).delete(delete_task),
        )
        .route("/tasks/:id/complete", post(complete_task))
        .route("/refresh", post(refresh_plan))
        .route("/next-date", get(next_date))
        .with_state(state)
}

pub async fn serve(addr: SocketAddr, plan: MaintenancePlan) -> std::io::Result<()> {
    let state = AppState::new(plan);
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

async fn get_metadata(State(state): State<AppState>) -> Json<PlanMetadata> {
    let plan = state.plan();
    let metadata = {
        let guard = plan.read();
        guard.metadata().clone()
    };
    Json(metadata)
}

async fn update_metadata(
    State(state): State<AppState>,
    Json(metadata): Json<PlanMetadata>,
) -> Result<Json<PlanMetadata>, ApiError> {
    let plan = state.plan();
    {
        let mut guard = plan.write();
        guard
            .set_metadata(metadata)
            .map_err(|err| ApiError::invalid(err.to_string()))?;
    }
    let current = {
        let guard = plan.read();
        guard.metadata().clone()
    };
    Ok(Json(current))
}

async fn list_tasks(State(state): State<AppState>) -> Result<Json<Vec<Task>>, ApiError> {
    let plan = state.plan();
    let tasks = {
        let guard = plan.read();
        guard.tasks()?
    };
    Ok(Json(tasks))
}

async fn get_task(
    State(state): State<AppState>,
    Path(task_id): Path<i32>,
) -> Result<Json<Task>, ApiError> {
    let plan = state.plan();
    let result = {
        let guard = plan.read();
        guard.find_task(task_id)?
    };
    match result {
        Some(task) => Ok(Json(task)),
        None => Err(ApiError::not_found(format!("task {task_id} not found"))),
    }
}

async fn create_task(
    State(state): State<AppState>,
    Json(task): Json<Task>,
) -> Result<(StatusCode, Json<Task>), ApiError> {
    let plan = state.plan();
    {
        let mut guard = plan.write();
        if guard.find_task(task.id)?.is_some() {
            return Err(ApiError::Conflict(format!(
                "task {} already exists",
                task.id
            )));
        }
        guard.upsert_task_record(task.clone()).map_err(ApiError::from)?;
        guard.recompute_next_due().map_err(ApiError::from)?;
    }
    let created = {
        let guard = plan.read();
        guard
            .find_task(task.id)?
            .ok_or_else(|| ApiError::internal("task not found after creation"))?
    };
    Ok((StatusCode::CREATED, Json(created)))
}

async fn update_task(
    State(state): State<AppState>,
    Path(task_id): Path<i32>,
    Json(task): Json<Task>,
) -> Result<Json<Task>, ApiError> {
    if task.id != task_id {
        return Err(ApiError::invalid(
            "task id in payload does not match path parameter",
        ));
    }
    let plan = state.plan();
    {
        let mut guard = plan.write();
        if guard.find_task(task_id)?.is_none() {
            return Err(ApiError::not_found(format!("task {task_id} not found")));
        }
        guard.upsert_task_record(task).map_err(ApiError::from)?;
        guard.recompute_next_due().map_err(ApiError::from)?;
    }
    let updated = {
        let guard = plan.read();
        guard
            .find_task(task_id)?
            .ok_or_else(|| ApiError::internal("task not found after update"))?
    };
    Ok(Json(updated))
}

async fn delete_task(
    State(state): State<AppState>,
    Path(task_id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    let plan = state.plan();
    let removed = {
        let mut guard = plan.write();
        guard.delete_task(task_id)?
    };
    if !removed {
        return Err(ApiError::not_found(format!("task {task_id} not found")));
    }
    Ok(StatusCode::NO_CONTENT)
}

async fn complete_task(
    State(state): State<AppState>,
    Path(task_id): Path<i32>,
    Json(payload): Json<CompleteTaskPayload>,
) -> Result<Json<Task>, ApiError> {
    let plan = state.plan();
    {
        let mut guard = plan.write();
        if guard.find_task(task_id)?.is_none() {
            return Err(ApiError::not_found(format!("task {task_id} not found")));
        }
        guard
            .complete_task(task_id, payload.completed_on)
            .map_err(ApiError::from)?;
    }
    let updated = {
        let guard = plan.read();
        guard
            .find_task(task_id)?
            .ok_or_else(|| ApiError::internal("task not found after completion"))?
    };
    Ok(Json(updated))
}

async fn refresh_plan(
    State(state): State<AppState>,
    Query(params): Query<RefreshParams>,
) -> Result<Json<RefreshSummary>, ApiError> {
    let as_of = params.as_of.unwrap_or_else(|| Local::now().date_naive());
    let plan = state.plan();
    let summary = {
        let mut guard = plan.write();
        guard.refresh_as_of(as_of).map_err(ApiError::from)?
    };
    Ok(Json(summary))
}

async fn next_date(Query(params): Query<NextDateParams>) -> Json<NextDateBody> {
    let next_date = recurrence::compute_next_date(
        &params.base_date,
        &params.period_type,
        params.period_value,
    );
    Json(NextDateBody { next_date })
}
