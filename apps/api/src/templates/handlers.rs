use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::errors::{AppError, AppJson, AppQuery};
use crate::pipeline::{ListParams, Page};
use crate::state::AppState;
use crate::templates::{
    build_template, set_default, update_template, TemplateInput, TemplatePatch, TemplateQuery,
    TemplateView,
};

/// GET /api/v1/templates
pub async fn handle_list_templates(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<TemplateQuery>,
    AppQuery(list): AppQuery<ListParams>,
) -> Result<Json<Page<TemplateView>>, AppError> {
    let filters = query.filters()?;
    let page = state
        .store
        .templates
        .with_records(|records| list.run(records, &filters))?;
    Ok(Json(page.map(TemplateView::from)))
}

/// GET /api/v1/templates/:id
pub async fn handle_get_template(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<TemplateView>, AppError> {
    Ok(Json(state.store.templates.get(&id)?.into()))
}

/// POST /api/v1/templates
pub async fn handle_create_template(
    State(state): State<AppState>,
    AppJson(input): AppJson<TemplateInput>,
) -> Result<(StatusCode, Json<TemplateView>), AppError> {
    let template = state.store.templates.create(build_template(input)?)?;
    Ok((StatusCode::CREATED, Json(template.into())))
}

/// PUT /api/v1/templates/:id
pub async fn handle_update_template(
    State(state): State<AppState>,
    Path(id): Path<String>,
    AppJson(patch): AppJson<TemplatePatch>,
) -> Result<Json<TemplateView>, AppError> {
    let template = update_template(&state.store.templates, &id, patch)?;
    Ok(Json(template.into()))
}

/// DELETE /api/v1/templates/:id
pub async fn handle_delete_template(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    state.store.templates.delete(&id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /api/v1/templates/:id/default
pub async fn handle_set_default_template(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<TemplateView>, AppError> {
    Ok(Json(set_default(&state.store.templates, &id)?.into()))
}

/// POST /api/v1/templates/:id/toggle
pub async fn handle_toggle_template(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<TemplateView>, AppError> {
    Ok(Json(state.store.templates.toggle(&id)?.into()))
}

/// POST /api/v1/templates/:id/copy
pub async fn handle_copy_template(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<(StatusCode, Json<TemplateView>), AppError> {
    let copy = state.store.templates.duplicate(&id)?;
    Ok((StatusCode::CREATED, Json(copy.into())))
}
