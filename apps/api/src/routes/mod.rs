pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post, put},
    Router,
};

use crate::jobs::handlers as jobs;
use crate::providers::handlers as providers;
use crate::resumes::handlers as resumes;
use crate::state::AppState;
use crate::tasks::handlers as tasks;
use crate::templates::handlers as templates;

pub fn build_router(state: AppState) -> Router {
    let body_limit = DefaultBodyLimit::max(state.config.max_request_bytes());

    Router::new()
        .route("/health", get(health::health_handler))
        // Parse tasks
        .route(
            "/api/v1/tasks",
            get(tasks::handle_list_tasks).post(tasks::handle_create_task),
        )
        .route("/api/v1/tasks/:id", get(tasks::handle_get_task))
        .route("/api/v1/tasks/:id/retry", post(tasks::handle_retry_resume))
        .route("/api/v1/tasks/:id/export", post(tasks::handle_export_task))
        // Résumé repository
        .route("/api/v1/resumes", get(resumes::handle_search_resumes))
        .route("/api/v1/resumes/:id", get(resumes::handle_get_resume))
        // Job positions
        .route(
            "/api/v1/jobs",
            get(jobs::handle_list_jobs).post(jobs::handle_create_job),
        )
        .route(
            "/api/v1/jobs/:id",
            get(jobs::handle_get_job)
                .put(jobs::handle_update_job)
                .delete(jobs::handle_delete_job),
        )
        .route("/api/v1/jobs/:id/status", put(jobs::handle_set_job_status))
        .route("/api/v1/jobs/:id/copy", post(jobs::handle_copy_job))
        // Export templates
        .route(
            "/api/v1/templates",
            get(templates::handle_list_templates).post(templates::handle_create_template),
        )
        .route(
            "/api/v1/templates/:id",
            get(templates::handle_get_template)
                .put(templates::handle_update_template)
                .delete(templates::handle_delete_template),
        )
        .route(
            "/api/v1/templates/:id/default",
            put(templates::handle_set_default_template),
        )
        .route(
            "/api/v1/templates/:id/toggle",
            post(templates::handle_toggle_template),
        )
        .route(
            "/api/v1/templates/:id/copy",
            post(templates::handle_copy_template),
        )
        // MCP providers
        .route(
            "/api/v1/mcp-providers",
            get(providers::handle_list_providers).post(providers::handle_create_provider),
        )
        .route(
            "/api/v1/mcp-providers/test",
            post(providers::handle_test_connection),
        )
        .route(
            "/api/v1/mcp-providers/:id",
            get(providers::handle_get_provider)
                .put(providers::handle_update_provider)
                .delete(providers::handle_delete_provider),
        )
        .route(
            "/api/v1/mcp-providers/:id/toggle",
            post(providers::handle_toggle_provider),
        )
        .route(
            "/api/v1/mcp-providers/:id/test",
            post(providers::handle_test_saved_provider),
        )
        .layer(body_limit)
        .with_state(state)
}
