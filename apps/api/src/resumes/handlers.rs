use axum::{
    extract::{Path, State},
    Json,
};

use crate::errors::{AppError, AppQuery};
use crate::models::resume::IndexedResume;
use crate::pipeline::{ListParams, Page};
use crate::resumes::ResumeQuery;
use crate::state::AppState;

/// GET /api/v1/resumes
pub async fn handle_search_resumes(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<ResumeQuery>,
    AppQuery(list): AppQuery<ListParams>,
) -> Result<Json<Page<IndexedResume>>, AppError> {
    let filters = query.filters()?;
    let page = state
        .store
        .resumes
        .with_records(|records| list.run(records, &filters))?;
    Ok(Json(page))
}

/// GET /api/v1/resumes/:id
pub async fn handle_get_resume(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<IndexedResume>, AppError> {
    Ok(Json(state.store.resumes.get(&id)?))
}
