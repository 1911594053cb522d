use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use tracing::info;

use crate::errors::{AppError, AppJson, AppQuery};
use crate::models::provider::McpProvider;
use crate::pipeline::{ListParams, Page};
use crate::providers::probe::{ProbeResult, ProbeTarget};
use crate::providers::{
    build_provider, update_provider, ProbeRequest, ProviderInput, ProviderPatch, ProviderQuery,
};
use crate::state::AppState;

/// GET /api/v1/mcp-providers
pub async fn handle_list_providers(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<ProviderQuery>,
    AppQuery(list): AppQuery<ListParams>,
) -> Result<Json<Page<McpProvider>>, AppError> {
    let filters = query.filters()?;
    let page = state
        .store
        .providers
        .with_records(|records| list.run(records, &filters))?;
    Ok(Json(page))
}

/// GET /api/v1/mcp-providers/:id
pub async fn handle_get_provider(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<McpProvider>, AppError> {
    Ok(Json(state.store.providers.get(&id)?))
}

/// POST /api/v1/mcp-providers
pub async fn handle_create_provider(
    State(state): State<AppState>,
    AppJson(input): AppJson<ProviderInput>,
) -> Result<(StatusCode, Json<McpProvider>), AppError> {
    let provider = state.store.providers.create(build_provider(input)?)?;
    Ok((StatusCode::CREATED, Json(provider)))
}

/// PUT /api/v1/mcp-providers/:id
pub async fn handle_update_provider(
    State(state): State<AppState>,
    Path(id): Path<String>,
    AppJson(patch): AppJson<ProviderPatch>,
) -> Result<Json<McpProvider>, AppError> {
    Ok(Json(update_provider(&state.store.providers, &id, patch)?))
}

/// DELETE /api/v1/mcp-providers/:id
pub async fn handle_delete_provider(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    state.store.providers.delete(&id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/mcp-providers/:id/toggle
pub async fn handle_toggle_provider(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<McpProvider>, AppError> {
    Ok(Json(state.store.providers.toggle(&id)?))
}

/// POST /api/v1/mcp-providers/test
pub async fn handle_test_connection(
    State(state): State<AppState>,
    AppJson(req): AppJson<ProbeRequest>,
) -> Result<Json<ProbeResult>, AppError> {
    let target = ProbeTarget::from(req);
    target.validate()?;
    let result = state.prober.probe(&target).await;
    info!(
        "Connection test to {}: success={} in {}ms",
        target.endpoint_url, result.success, result.duration_ms
    );
    Ok(Json(result))
}

/// POST /api/v1/mcp-providers/:id/test
pub async fn handle_test_saved_provider(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ProbeResult>, AppError> {
    let provider = state.store.providers.get(&id)?;
    let target = ProbeTarget::from_provider(&provider);
    target.validate()?;
    let result = state.prober.probe(&target).await;
    info!(
        "Connection test for provider {}: success={} in {}ms",
        id, result.success, result.duration_ms
    );
    Ok(Json(result))
}
