use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::pipeline::{FieldValue, Filterable};
use crate::store::Record;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexStatus {
    Parsed,
    Failed,
}

/// A parsed résumé as indexed in the searchable repository.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexedResume {
    pub id: String,
    pub original_filename: String,
    pub parsed_at: DateTime<Utc>,
    pub source: String,
    pub status: IndexStatus,
    /// 0–100; absent until the résumé has been matched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub match_score: Option<u8>,

    pub name: String,
    pub phone: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    pub location: String,

    pub highest_degree: String,
    pub schools: Vec<String>,
    pub major: String,

    pub current_company: String,
    pub current_position: String,
    pub work_years: u32,
    pub companies: Vec<String>,

    pub hard_skills: Vec<String>,
    pub soft_skills: Vec<String>,
    pub languages: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_position: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matched_position: Option<String>,
}

impl Record for IndexedResume {
    const KIND: &'static str = "resume";
    const ID_PREFIX: &'static str = "resume";

    fn id(&self) -> &str {
        &self.id
    }

    fn assign_id(&mut self, id: String) {
        self.id = id;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResumeField {
    Name,
    Age,
    Location,
    HighestDegree,
    CurrentCompany,
    CurrentPosition,
    WorkYears,
    HardSkills,
    MatchScore,
    Source,
    ParsedAt,
    MatchedPosition,
}

impl FromStr for ResumeField {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "name" => Ok(ResumeField::Name),
            "age" => Ok(ResumeField::Age),
            "location" => Ok(ResumeField::Location),
            "highestDegree" => Ok(ResumeField::HighestDegree),
            "workYears" => Ok(ResumeField::WorkYears),
            "matchScore" => Ok(ResumeField::MatchScore),
            "source" => Ok(ResumeField::Source),
            "parsedAt" => Ok(ResumeField::ParsedAt),
            _ => Err(()),
        }
    }
}

impl Filterable for IndexedResume {
    type Field = ResumeField;

    fn field(&self, field: ResumeField) -> FieldValue<'_> {
        match field {
            ResumeField::Name => FieldValue::Text(&self.name),
            ResumeField::Age => self
                .age
                .map_or(FieldValue::Missing, |a| FieldValue::Number(f64::from(a))),
            ResumeField::Location => FieldValue::Text(&self.location),
            ResumeField::HighestDegree => FieldValue::Text(&self.highest_degree),
            ResumeField::CurrentCompany => FieldValue::Text(&self.current_company),
            ResumeField::CurrentPosition => FieldValue::Text(&self.current_position),
            ResumeField::WorkYears => FieldValue::Number(f64::from(self.work_years)),
            ResumeField::HardSkills => FieldValue::List(&self.hard_skills),
            ResumeField::MatchScore => self
                .match_score
                .map_or(FieldValue::Missing, |s| FieldValue::Number(f64::from(s))),
            ResumeField::Source => FieldValue::Text(&self.source),
            ResumeField::ParsedAt => FieldValue::Instant(self.parsed_at),
            ResumeField::MatchedPosition => self
                .matched_position
                .as_deref()
                .map_or(FieldValue::Missing, FieldValue::Text),
        }
    }
}
