use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::pipeline::{FieldValue, Filterable};
use crate::store::{Duplicate, Record};

/// Suffix appended to the name of a copied record.
pub const COPY_SUFFIX: &str = "_副本";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Draft,
    Active,
    Paused,
    Closed,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Draft => "draft",
            JobStatus::Active => "active",
            JobStatus::Paused => "paused",
            JobStatus::Closed => "closed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmploymentType {
    FullTime,
    PartTime,
    Intern,
    Contract,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExperienceLevel {
    Entry,
    Mid,
    Senior,
    Expert,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobPosition {
    pub id: String,
    pub name: String,
    pub department: String,
    pub status: JobStatus,
    pub work_location: String,
    pub employment_type: EmploymentType,
    pub experience_level: ExperienceLevel,
    pub salary_range: String,
    pub description: String,
    pub responsibilities: Vec<String>,
    pub qualifications: Vec<String>,
    pub required_skills: Vec<String>,
    pub preferred_skills: Vec<String>,
    pub education_requirement: String,
    pub major_preference: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Record for JobPosition {
    const KIND: &'static str = "job";
    const ID_PREFIX: &'static str = "job";

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

    fn check_deletable(&self) -> Result<(), String> {
        if self.status == JobStatus::Active {
            return Err("an active job must be paused or closed before deletion".to_string());
        }
        Ok(())
    }
}

impl Duplicate for JobPosition {
    fn duplicate(&self) -> Self {
        JobPosition {
            id: String::new(),
            name: format!("{}{}", self.name, COPY_SUFFIX),
            status: JobStatus::Draft,
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobField {
    Name,
    Department,
    Status,
    RequiredSkills,
    CreatedAt,
    UpdatedAt,
}

impl FromStr for JobField {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "name" => Ok(JobField::Name),
            "department" => Ok(JobField::Department),
            "status" => Ok(JobField::Status),
            "createdAt" => Ok(JobField::CreatedAt),
            "updatedAt" => Ok(JobField::UpdatedAt),
            _ => Err(()),
        }
    }
}

impl Filterable for JobPosition {
    type Field = JobField;

    fn field(&self, field: JobField) -> FieldValue<'_> {
        match field {
            JobField::Name => FieldValue::Text(&self.name),
            JobField::Department => FieldValue::Text(&self.department),
            JobField::Status => FieldValue::Text(self.status.as_str()),
            JobField::RequiredSkills => FieldValue::List(&self.required_skills),
            JobField::CreatedAt => FieldValue::Instant(self.created_at),
            JobField::UpdatedAt => FieldValue::Instant(self.updated_at),
        }
    }
}
