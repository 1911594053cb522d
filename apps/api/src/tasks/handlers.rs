use axum::{
    extract::{multipart::{Field, MultipartRejection}, Multipart, Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use bytes::BytesMut;
use serde::Deserialize;
use tracing::{info, warn};

use crate::errors::{AppError, AppJson, AppQuery};
use crate::models::task::{ParseTask, RecognitionType};
use crate::models::template::FormatType;
use crate::pipeline::{ListParams, Page};
use crate::state::AppState;
use crate::tasks::export::{export, ExportFormat, ExportRequest};
use crate::tasks::upload::{UploadPolicy, UploadedFile};
use crate::tasks::{NewTask, TaskQuery};
use crate::templates::default_for;

/// GET /api/v1/tasks
pub async fn handle_list_tasks(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<TaskQuery>,
    AppQuery(list): AppQuery<ListParams>,
) -> Result<Json<Page<ParseTask>>, AppError> {
    let filters = query.filters()?;
    let page = state
        .store
        .tasks
        .with_records(|records| list.run(records, &filters))?;
    Ok(Json(page))
}

/// GET /api/v1/tasks/:id
pub async fn handle_get_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ParseTask>, AppError> {
    Ok(Json(state.store.tasks.get(&id)?))
}

fn parse_recognition_type(raw: &str) -> Result<RecognitionType, AppError> {
    serde_json::from_value(serde_json::Value::String(raw.trim().to_string())).map_err(|_| {
        AppError::Validation(format!(
            "recognitionType must be 'system' or 'target', got '{raw}'"
        ))
    })
}

/// Streams one file part into memory, giving up as soon as it passes the
/// per-file limit so an oversized part is never buffered whole.
async fn read_file_part(
    mut field: Field<'_>,
    policy: &UploadPolicy,
) -> Result<UploadedFile, AppError> {
    let filename = field.file_name().unwrap_or_default().to_string();
    policy.check_format(&filename)?;
    let mut content = BytesMut::new();
    while let Some(chunk) = field.chunk().await? {
        if let Err(e) = policy.check_size(&filename, content.len().saturating_add(chunk.len())) {
            warn!("Rejected upload part '{}': {}", filename, e);
            return Err(e.into());
        }
        content.extend_from_slice(&chunk);
    }
    let file = UploadedFile::new(filename, content.freeze());
    policy.check_file(&file)?;
    Ok(file)
}

/// POST /api/v1/tasks
///
/// Multipart form: one or more `files` parts, `recognitionType` and, for
/// target recognition, `targetPosition`.
pub async fn handle_create_task(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<ParseTask>), AppError> {
    let mut multipart = multipart?;
    let policy = UploadPolicy::from_config(&state.config);
    let mut files = Vec::new();
    let mut recognition_type = RecognitionType::System;
    let mut target_position = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            // The first bad part fails the request; later parts are never read.
            Some("files") | Some("file") => files.push(read_file_part(field, &policy).await?),
            Some("recognitionType") => {
                recognition_type = parse_recognition_type(&field.text().await?)?;
            }
            Some("targetPosition") => target_position = Some(field.text().await?),
            _ => {}
        }
    }

    let new_task = NewTask::validate(files, recognition_type, target_position, &policy)?;
    let task = state.store.tasks.create(new_task.into_task())?;
    info!(
        "Queued task {} with {} file(s) for {:?} recognition",
        task.id, task.total_files, task.recognition_type
    );
    Ok((StatusCode::CREATED, Json(task)))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetryRequest {
    pub resume_id: String,
}

/// POST /api/v1/tasks/:id/retry
pub async fn handle_retry_resume(
    State(state): State<AppState>,
    Path(id): Path<String>,
    AppJson(req): AppJson<RetryRequest>,
) -> Result<StatusCode, AppError> {
    state
        .store
        .tasks
        .modify(&id, |task| task.retry_resume(&req.resume_id))?;
    info!("Re-queued résumé {} of task {}", req.resume_id, id);
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/tasks/:id/export
pub async fn handle_export_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
    AppJson(req): AppJson<ExportRequest>,
) -> Result<Response, AppError> {
    let task = state.store.tasks.get(&id)?;
    let template = match req.format {
        ExportFormat::Json => default_for(&state.store.templates, FormatType::Json),
        ExportFormat::Xml => default_for(&state.store.templates, FormatType::Xml),
        ExportFormat::Table => None,
    };
    let file = export(&task, &req, template.as_ref())?;
    info!(
        "Exported task {} as {} using {}",
        id,
        file.filename,
        template.as_ref().map_or("built-in layout", |t| t.name.as_str())
    );
    let disposition = format!("attachment; filename=\"{}\"", file.filename);
    Ok((
        [
            (header::CONTENT_TYPE, file.content_type.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        file.body,
    )
        .into_response())
}
