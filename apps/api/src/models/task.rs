use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::pipeline::{FieldValue, Filterable};
use crate::store::{Record, StoreError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    Processing,
    Done,
    PartialFail,
    Failed,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::Processing => "processing",
            TaskStatus::Done => "done",
            TaskStatus::PartialFail => "partial_fail",
            TaskStatus::Failed => "failed",
        }
    }

    /// Derives the task status from its file counters.
    pub fn from_counts(total: u32, success: u32, failed: u32) -> Self {
        let processed = success + failed;
        if processed == 0 {
            TaskStatus::Pending
        } else if processed < total {
            TaskStatus::Processing
        } else if failed == 0 {
            TaskStatus::Done
        } else if success == 0 {
            TaskStatus::Failed
        } else {
            TaskStatus::PartialFail
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecognitionType {
    /// The system proposes matching positions.
    System,
    /// Résumés are scored against one chosen position.
    Target,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResumeFileStatus {
    Pending,
    Processing,
    Success,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ParseErrorCode {
    FileTooLarge,
    UnsupportedFormat,
    EmptyFile,
    OcrFailed,
    CorruptedContent,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParseFailure {
    pub code: ParseErrorCode,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BasicInfo {
    pub name: String,
    pub phone: String,
    pub email: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Education {
    pub school: String,
    pub degree: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub major: Option<String>,
    pub start_date: String,
    pub end_date: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkExperience {
    pub company: String,
    pub position: String,
    pub start_date: String,
    pub end_date: String,
    pub responsibilities: Vec<String>,
    pub achievements: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Skills {
    pub hard_skills: Vec<String>,
    pub soft_skills: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobIntent {
    pub target_position: String,
    pub preferred_location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_salary: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionMatch {
    pub position: String,
    pub match_score: u8,
}

/// One uploaded file inside a parse task and whatever the parser extracted from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedResume {
    pub id: String,
    pub filename: String,
    pub status: ResumeFileStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ParseFailure>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub basic_info: Option<BasicInfo>,
    #[serde(default)]
    pub education: Vec<Education>,
    #[serde(default)]
    pub work_experience: Vec<WorkExperience>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skills: Option<Skills>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_intent: Option<JobIntent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub match_score: Option<u8>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub system_matched_positions: Vec<PositionMatch>,
    #[serde(default)]
    pub warnings: Vec<String>,
}

impl ParsedResume {
    /// A slot for a freshly uploaded file that the parser has not seen yet.
    pub fn pending(id: String, filename: String) -> Self {
        Self {
            id,
            filename,
            status: ResumeFileStatus::Pending,
            error: None,
            basic_info: None,
            education: Vec::new(),
            work_experience: Vec::new(),
            skills: None,
            job_intent: None,
            match_score: None,
            system_matched_positions: Vec::new(),
            warnings: Vec::new(),
        }
    }
}

/// A batch of uploaded résumé files and their parse progress.
/// Invariant: `success_count + failed_count <= total_files`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseTask {
    pub id: String,
    pub name: String,
    pub status: TaskStatus,
    pub total_files: u32,
    pub success_count: u32,
    pub failed_count: u32,
    pub recognition_type: RecognitionType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_position: Option<String>,
    #[serde(default)]
    pub resumes: Vec<ParsedResume>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ParseTask {
    /// Sends one failed résumé back to the parse queue.
    pub fn retry_resume(&mut self, resume_id: &str) -> Result<(), StoreError> {
        let task_id = self.id.clone();
        let slot = self
            .resumes
            .iter_mut()
            .find(|r| r.id == resume_id)
            .ok_or_else(|| StoreError::NotFound {
                kind: "resume",
                id: resume_id.to_string(),
            })?;
        if slot.status != ResumeFileStatus::Failed {
            return Err(StoreError::Protected {
                kind: "resume",
                id: resume_id.to_string(),
                reason: format!("only failed résumés in task {task_id} can be retried"),
            });
        }
        slot.status = ResumeFileStatus::Pending;
        slot.error = None;
        self.failed_count = self.failed_count.saturating_sub(1);
        self.status = TaskStatus::from_counts(self.total_files, self.success_count, self.failed_count);
        Ok(())
    }

    pub fn resume(&self, resume_id: &str) -> Option<&ParsedResume> {
        self.resumes.iter().find(|r| r.id == resume_id)
    }
}

impl Record for ParseTask {
    const KIND: &'static str = "task";
    const ID_PREFIX: &'static str = "task";

    fn id(&self) -> &str {
        &self.id
    }

    fn assign_id(&mut self, id: String) {
        self.id = id;
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }

    fn mark_created(&mut self, now: DateTime<Utc>) {
        self.created_at = now;
        self.updated_at = now;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskField {
    Name,
    Status,
    TotalFiles,
    CreatedAt,
}

impl FromStr for TaskField {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "name" => Ok(TaskField::Name),
            "status" => Ok(TaskField::Status),
            "totalFiles" => Ok(TaskField::TotalFiles),
            "createdAt" => Ok(TaskField::CreatedAt),
            _ => Err(()),
        }
    }
}

impl Filterable for ParseTask {
    type Field = TaskField;

    fn field(&self, field: TaskField) -> FieldValue<'_> {
        match field {
            TaskField::Name => FieldValue::Text(&self.name),
            TaskField::Status => FieldValue::Text(self.status.as_str()),
            TaskField::TotalFiles => FieldValue::Number(f64::from(self.total_files)),
            TaskField::CreatedAt => FieldValue::Instant(self.created_at),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slot(id: &str, status: ResumeFileStatus) -> ParsedResume {
        let mut r = ParsedResume::pending(id.to_string(), format!("{id}.pdf"));
        r.status = status;
        if status == ResumeFileStatus::Failed {
            r.error = Some(ParseFailure {
                code: ParseErrorCode::OcrFailed,
                message: "blurry scan".to_string(),
            });
        }
        r
    }

    fn task(slots: Vec<ParsedResume>) -> ParseTask {
        let count = |status| slots.iter().filter(|r| r.status == status).count() as u32;
        let success_count = count(ResumeFileStatus::Success);
        let failed_count = count(ResumeFileStatus::Failed);
        let total_files = slots.len() as u32;
        ParseTask {
            id: "task-x".to_string(),
            name: "batch".to_string(),
            status: TaskStatus::from_counts(total_files, success_count, failed_count),
            total_files,
            success_count,
            failed_count,
            recognition_type: RecognitionType::System,
            target_position: None,
            resumes: slots,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_status_from_counts() {
        assert_eq!(TaskStatus::from_counts(3, 0, 0), TaskStatus::Pending);
        assert_eq!(TaskStatus::from_counts(3, 1, 0), TaskStatus::Processing);
        assert_eq!(TaskStatus::from_counts(3, 3, 0), TaskStatus::Done);
        assert_eq!(TaskStatus::from_counts(3, 0, 3), TaskStatus::Failed);
        assert_eq!(TaskStatus::from_counts(50, 45, 5), TaskStatus::PartialFail);
    }

    #[test]
    fn test_retry_failed_resume() {
        let mut t = task(vec![
            slot("a", ResumeFileStatus::Success),
            slot("b", ResumeFileStatus::Failed),
        ]);
        assert_eq!(t.status, TaskStatus::PartialFail);

        t.retry_resume("b").unwrap();
        let b = t.resume("b").unwrap();
        assert_eq!(b.status, ResumeFileStatus::Pending);
        assert!(b.error.is_none());
        assert_eq!(t.failed_count, 0);
        assert!(t.success_count + t.failed_count <= t.total_files);
        assert_eq!(t.status, TaskStatus::Processing);
    }

    #[test]
    fn test_retry_rejects_successful_resume() {
        let mut t = task(vec![slot("a", ResumeFileStatus::Success)]);
        let err = t.retry_resume("a").unwrap_err();
        assert!(matches!(err, StoreError::Protected { .. }));
        assert_eq!(t.status, TaskStatus::Done);
    }

    #[test]
    fn test_retry_unknown_resume() {
        let mut t = task(vec![slot("a", ResumeFileStatus::Failed)]);
        assert!(matches!(
            t.retry_resume("zzz"),
            Err(StoreError::NotFound { kind: "resume", .. })
        ));
    }

    #[test]
    fn test_status_serializes_snake_case() {
        let json = serde_json::to_string(&TaskStatus::PartialFail).unwrap();
        assert_eq!(json, "\"partial_fail\"");
    }
}
