//! Parse tasks: creating a task from an upload, listing, retrying failed
//! résumés and exporting results.

pub mod export;
pub mod handlers;
pub mod upload;

use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::models::task::{ParseTask, ParsedResume, RecognitionType, TaskField, TaskStatus};
use crate::pipeline::{choice, parse_instant, Filter, FilterSet, QueryError};
use crate::tasks::upload::{UploadError, UploadPolicy, UploadedFile};

/// A validated upload, ready to become a task.
#[derive(Debug, Clone)]
pub struct NewTask {
    pub files: Vec<UploadedFile>,
    pub recognition_type: RecognitionType,
    pub target_position: Option<String>,
}

impl NewTask {
    /// Applies the upload policy to every file and checks that target-position
    /// recognition names its position.
    pub fn validate(
        files: Vec<UploadedFile>,
        recognition_type: RecognitionType,
        target_position: Option<String>,
        policy: &UploadPolicy,
    ) -> Result<Self, UploadError> {
        policy.check_batch(&files)?;
        let target_position = target_position
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty());
        let target_position = match recognition_type {
            RecognitionType::Target => {
                Some(target_position.ok_or(UploadError::MissingTargetPosition)?)
            }
            RecognitionType::System => None,
        };
        Ok(Self {
            files,
            recognition_type,
            target_position,
        })
    }

    /// Task display name: the file name, or "<first> +<rest>" for batches.
    pub fn task_name(&self) -> String {
        match self.files.as_slice() {
            [] => String::new(),
            [only] => only.filename.clone(),
            [first, rest @ ..] => format!("{} +{}", first.filename, rest.len()),
        }
    }

    /// A pending task with one pending résumé slot per file. The repository
    /// assigns the task id and timestamps.
    pub fn into_task(self) -> ParseTask {
        let name = self.task_name();
        let resumes: Vec<ParsedResume> = self
            .files
            .iter()
            .map(|f| {
                let slot_id = format!("res-{}", Uuid::new_v4().simple());
                ParsedResume::pending(slot_id, f.filename.clone())
            })
            .collect();
        let now = Utc::now();
        ParseTask {
            id: String::new(),
            name,
            status: TaskStatus::Pending,
            total_files: u32::try_from(resumes.len()).unwrap_or(u32::MAX),
            success_count: 0,
            failed_count: 0,
            recognition_type: self.recognition_type,
            target_position: self.target_position,
            resumes,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskQuery {
    pub keyword: Option<String>,
    pub status: Option<String>,
    pub created_from: Option<String>,
    pub created_to: Option<String>,
}

impl TaskQuery {
    pub fn filters(&self) -> Result<FilterSet<TaskField>, QueryError> {
        let mut filters = FilterSet::new()
            .with(Filter::keyword(
                self.keyword.clone().unwrap_or_default(),
                &[TaskField::Name],
            ))
            .with(Filter::single(
                TaskField::Status,
                choice::<TaskStatus>("status", self.status.as_deref())?,
            ));
        let from = parse_instant("createdFrom", self.created_from.as_deref(), false)?;
        let to = parse_instant("createdTo", self.created_to.as_deref(), true)?;
        if let (Some(start), Some(end)) = (from, to) {
            if start > end {
                return Err(QueryError::InvertedRange { param: "createdAt" });
            }
        }
        if from.is_some() || to.is_some() {
            filters.push(Filter::date_range(TaskField::CreatedAt, from, to));
        }
        Ok(filters)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::task::ResumeFileStatus;
    use crate::store::seed::sample_tasks;

    fn policy() -> UploadPolicy {
        UploadPolicy {
            max_file_bytes: 1024,
            max_files: 10,
        }
    }

    fn files(names: &[&str]) -> Vec<UploadedFile> {
        names.iter().map(|n| UploadedFile::new(*n, "content")).collect()
    }

    #[test]
    fn test_single_file_task() {
        let task = NewTask::validate(
            files(&["张三.pdf"]),
            RecognitionType::System,
            None,
            &policy(),
        )
        .unwrap()
        .into_task();
        assert_eq!(task.name, "张三.pdf");
        assert_eq!(task.status, TaskStatus::Pending);
        assert_eq!(task.total_files, 1);
        assert_eq!(task.resumes[0].status, ResumeFileStatus::Pending);
    }

    #[test]
    fn test_batch_task_name_and_slots() {
        let task = NewTask::validate(
            files(&["a.pdf", "b.docx", "c.png"]),
            RecognitionType::System,
            Some("ignored".to_string()),
            &policy(),
        )
        .unwrap()
        .into_task();
        assert_eq!(task.name, "a.pdf +2");
        assert_eq!(task.resumes.len(), 3);
        assert_eq!(task.target_position, None);
        assert_ne!(task.resumes[0].id, task.resumes[1].id);
    }

    #[test]
    fn test_target_recognition_needs_position() {
        let err = NewTask::validate(
            files(&["a.pdf"]),
            RecognitionType::Target,
            Some(" ".into()),
            &policy(),
        )
        .unwrap_err();
        assert_eq!(err, UploadError::MissingTargetPosition);

        let task = NewTask::validate(
            files(&["a.pdf"]),
            RecognitionType::Target,
            Some("AI产品经理".to_string()),
            &policy(),
        )
        .unwrap();
        assert_eq!(task.target_position.as_deref(), Some("AI产品经理"));
    }

    #[test]
    fn test_bad_file_rejects_whole_batch() {
        let err = NewTask::validate(
            files(&["a.pdf", "b.exe"]),
            RecognitionType::System,
            None,
            &policy(),
        )
        .unwrap_err();
        assert_eq!(err.code(), "UNSUPPORTED_FORMAT");
    }

    #[test]
    fn test_task_query_status_and_keyword() {
        let tasks = sample_tasks().unwrap();
        let query = TaskQuery {
            status: Some("done".to_string()),
            ..TaskQuery::default()
        };
        let ids: Vec<&str> = query
            .filters()
            .unwrap()
            .apply(&tasks)
            .into_iter()
            .map(|t| t.id.as_str())
            .collect();
        assert_eq!(ids, vec!["task-001", "task-003"]);

        let query = TaskQuery {
            keyword: Some("校招".to_string()),
            ..TaskQuery::default()
        };
        assert_eq!(query.filters().unwrap().apply(&tasks).len(), 1);

        let query = TaskQuery {
            status: Some("finished".to_string()),
            ..TaskQuery::default()
        };
        assert!(query.filters().is_err());
    }
}
