use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::errors::{AppError, AppJson, AppQuery};
use crate::jobs::{build_job, set_status, update_job, JobInput, JobPatch, JobQuery, StatusChange};
use crate::models::job::JobPosition;
use crate::pipeline::{ListParams, Page};
use crate::state::AppState;

/// GET /api/v1/jobs
pub async fn handle_list_jobs(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<JobQuery>,
    AppQuery(list): AppQuery<ListParams>,
) -> Result<Json<Page<JobPosition>>, AppError> {
    let filters = query.filters()?;
    let page = state
        .store
        .jobs
        .with_records(|records| list.run(records, &filters))?;
    Ok(Json(page))
}

/// GET /api/v1/jobs/:id
pub async fn handle_get_job(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<JobPosition>, AppError> {
    Ok(Json(state.store.jobs.get(&id)?))
}

/// POST /api/v1/jobs
pub async fn handle_create_job(
    State(state): State<AppState>,
    AppJson(input): AppJson<JobInput>,
) -> Result<(StatusCode, Json<JobPosition>), AppError> {
    let job = state.store.jobs.create(build_job(input)?)?;
    Ok((StatusCode::CREATED, Json(job)))
}

/// PUT /api/v1/jobs/:id
pub async fn handle_update_job(
    State(state): State<AppState>,
    Path(id): Path<String>,
    AppJson(patch): AppJson<JobPatch>,
) -> Result<Json<JobPosition>, AppError> {
    Ok(Json(update_job(&state.store.jobs, &id, patch)?))
}

/// DELETE /api/v1/jobs/:id
pub async fn handle_delete_job(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    state.store.jobs.delete(&id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /api/v1/jobs/:id/status
pub async fn handle_set_job_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    AppJson(change): AppJson<StatusChange>,
) -> Result<Json<JobPosition>, AppError> {
    Ok(Json(set_status(&state.store.jobs, &id, change.status)?))
}

/// POST /api/v1/jobs/:id/copy
pub async fn handle_copy_job(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<(StatusCode, Json<JobPosition>), AppError> {
    let copy = state.store.jobs.duplicate(&id)?;
    Ok((StatusCode::CREATED, Json(copy)))
}
