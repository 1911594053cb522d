//! Job positions: list filters, form inputs, salary validation and the
//! partial-update merge.

pub mod handlers;

use chrono::Utc;
use serde::Deserialize;

use crate::errors::AppError;
use crate::models::job::{EmploymentType, ExperienceLevel, JobField, JobPosition, JobStatus};
use crate::pipeline::{choice, split_list, Filter, FilterSet, QueryError};
use crate::store::Repository;

/// Filter parameters of `GET /jobs`. `skills` is comma-separated and matches
/// jobs requiring any of them.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobQuery {
    pub keyword: Option<String>,
    pub status: Option<String>,
    pub department: Option<String>,
    pub skills: Option<String>,
}

impl JobQuery {
    pub fn filters(&self) -> Result<FilterSet<JobField>, QueryError> {
        Ok(FilterSet::new()
            .with(Filter::keyword(
                self.keyword.clone().unwrap_or_default(),
                &[JobField::Name, JobField::Department],
            ))
            .with(Filter::single(
                JobField::Status,
                choice::<JobStatus>("status", self.status.as_deref())?,
            ))
            .with(Filter::single(
                JobField::Department,
                self.department.clone().filter(|d| !d.trim().is_empty()),
            ))
            .with(Filter::multi(
                JobField::RequiredSkills,
                split_list(self.skills.as_deref()),
            )))
    }
}

/// Body of `POST /jobs`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobInput {
    pub name: String,
    pub department: String,
    pub status: Option<JobStatus>,
    #[serde(default)]
    pub work_location: String,
    pub employment_type: EmploymentType,
    pub experience_level: ExperienceLevel,
    #[serde(default)]
    pub salary_range: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub responsibilities: Vec<String>,
    #[serde(default)]
    pub qualifications: Vec<String>,
    #[serde(default)]
    pub required_skills: Vec<String>,
    #[serde(default)]
    pub preferred_skills: Vec<String>,
    #[serde(default)]
    pub education_requirement: String,
    #[serde(default)]
    pub major_preference: String,
}

/// Body of `PUT /jobs/:id`; absent fields are left unchanged.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobPatch {
    pub name: Option<String>,
    pub department: Option<String>,
    pub status: Option<JobStatus>,
    pub work_location: Option<String>,
    pub employment_type: Option<EmploymentType>,
    pub experience_level: Option<ExperienceLevel>,
    pub salary_range: Option<String>,
    pub description: Option<String>,
    pub responsibilities: Option<Vec<String>>,
    pub qualifications: Option<Vec<String>>,
    pub required_skills: Option<Vec<String>>,
    pub preferred_skills: Option<Vec<String>>,
    pub education_requirement: Option<String>,
    pub major_preference: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StatusChange {
    pub status: JobStatus,
}

fn required(field: &str, value: &str) -> Result<String, AppError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation(format!("'{field}' is required")));
    }
    Ok(trimmed.to_string())
}

/// Accepts free text such as "面议", or a numeric "min-max" range whose
/// bounds must not be inverted.
pub fn validate_salary_range(raw: &str) -> Result<String, AppError> {
    let value = raw.trim();
    let Some((lo, hi)) = value.split_once('-') else {
        return Ok(value.to_string());
    };
    let (lo, hi) = (lo.trim(), hi.trim());
    let numeric = |s: &str| !s.is_empty() && s.chars().all(|c| c.is_ascii_digit());
    if !numeric(lo) || !numeric(hi) {
        return Ok(value.to_string());
    }
    let (min, max) = match (lo.parse::<u64>(), hi.parse::<u64>()) {
        (Ok(min), Ok(max)) => (min, max),
        _ => {
            return Err(AppError::Validation(format!(
                "salary range '{value}' is out of bounds"
            )))
        }
    };
    if min > max {
        return Err(AppError::Validation(format!(
            "salary range '{value}' has min greater than max"
        )));
    }
    Ok(format!("{min}-{max}"))
}

/// Validates a create request and builds the record; the repository assigns
/// the id and timestamps.
pub fn build_job(input: JobInput) -> Result<JobPosition, AppError> {
    let now = Utc::now();
    Ok(JobPosition {
        id: String::new(),
        name: required("name", &input.name)?,
        department: required("department", &input.department)?,
        status: input.status.unwrap_or(JobStatus::Draft),
        work_location: input.work_location.trim().to_string(),
        employment_type: input.employment_type,
        experience_level: input.experience_level,
        salary_range: validate_salary_range(&input.salary_range)?,
        description: input.description,
        responsibilities: input.responsibilities,
        qualifications: input.qualifications,
        required_skills: input.required_skills,
        preferred_skills: input.preferred_skills,
        education_requirement: input.education_requirement,
        major_preference: input.major_preference,
        created_at: now,
        updated_at: now,
    })
}

pub fn apply_patch(job: &mut JobPosition, patch: JobPatch) -> Result<(), AppError> {
    if let Some(name) = patch.name {
        job.name = required("name", &name)?;
    }
    if let Some(department) = patch.department {
        job.department = required("department", &department)?;
    }
    if let Some(salary) = patch.salary_range {
        job.salary_range = validate_salary_range(&salary)?;
    }
    if let Some(status) = patch.status {
        job.status = status;
    }
    if let Some(location) = patch.work_location {
        job.work_location = location.trim().to_string();
    }
    if let Some(employment_type) = patch.employment_type {
        job.employment_type = employment_type;
    }
    if let Some(level) = patch.experience_level {
        job.experience_level = level;
    }
    if let Some(description) = patch.description {
        job.description = description;
    }
    if let Some(items) = patch.responsibilities {
        job.responsibilities = items;
    }
    if let Some(items) = patch.qualifications {
        job.qualifications = items;
    }
    if let Some(items) = patch.required_skills {
        job.required_skills = items;
    }
    if let Some(items) = patch.preferred_skills {
        job.preferred_skills = items;
    }
    if let Some(education) = patch.education_requirement {
        job.education_requirement = education;
    }
    if let Some(major) = patch.major_preference {
        job.major_preference = major;
    }
    Ok(())
}

/// Merges `patch` into the stored job under the repository lock.
pub fn update_job(
    jobs: &Repository<JobPosition>,
    id: &str,
    patch: JobPatch,
) -> Result<JobPosition, AppError> {
    jobs.modify(id, |job| apply_patch(job, patch))
}

pub fn set_status(
    jobs: &Repository<JobPosition>,
    id: &str,
    status: JobStatus,
) -> Result<JobPosition, AppError> {
    jobs.modify(id, |job| {
        job.status = status;
        Ok(())
    })
}
