//! Résumé repository search: the query parameters of `GET /resumes` and the
//! filter set they translate into.

pub mod handlers;

use serde::Deserialize;

use crate::models::resume::ResumeField;
use crate::pipeline::{check_range, parse_instant, split_list, Filter, FilterSet, QueryError};

const KEYWORD_FIELDS: [ResumeField; 4] = [
    ResumeField::Name,
    ResumeField::CurrentPosition,
    ResumeField::CurrentCompany,
    ResumeField::HardSkills,
];

/// Filter parameters of the résumé search. Multi-select values are
/// comma-separated.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeQuery {
    pub keyword: Option<String>,
    pub city: Option<String>,
    pub degree: Option<String>,
    pub work_years_min: Option<u32>,
    pub work_years_max: Option<u32>,
    pub skills: Option<String>,
    pub match_score_min: Option<u8>,
    pub match_score_max: Option<u8>,
    pub source: Option<String>,
    pub parsed_from: Option<String>,
    pub parsed_to: Option<String>,
    pub matched_position: Option<String>,
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

impl ResumeQuery {
    pub fn filters(&self) -> Result<FilterSet<ResumeField>, QueryError> {
        let mut filters = FilterSet::new()
            .with(Filter::keyword(
                self.keyword.clone().unwrap_or_default(),
                &KEYWORD_FIELDS,
            ))
            .with(Filter::multi(
                ResumeField::Location,
                split_list(self.city.as_deref()),
            ))
            .with(Filter::single(ResumeField::HighestDegree, non_blank(&self.degree)))
            .with(Filter::multi(
                ResumeField::HardSkills,
                split_list(self.skills.as_deref()),
            ))
            .with(Filter::single(ResumeField::Source, non_blank(&self.source)))
            .with(Filter::multi(
                ResumeField::MatchedPosition,
                split_list(self.matched_position.as_deref()),
            ));

        let years = (self.work_years_min.map(f64::from), self.work_years_max.map(f64::from));
        if years.0.is_some() || years.1.is_some() {
            check_range("workYears", years.0, years.1)?;
            filters.push(Filter::numeric_range(ResumeField::WorkYears, years.0, years.1));
        }

        let score = (self.match_score_min.map(f64::from), self.match_score_max.map(f64::from));
        if score.0.is_some() || score.1.is_some() {
            check_range("matchScore", score.0, score.1)?;
            filters.push(Filter::numeric_range(ResumeField::MatchScore, score.0, score.1));
        }

        let from = parse_instant("parsedFrom", self.parsed_from.as_deref(), false)?;
        let to = parse_instant("parsedTo", self.parsed_to.as_deref(), true)?;
        if let (Some(start), Some(end)) = (from, to) {
            if start > end {
                return Err(QueryError::InvertedRange { param: "parsedAt" });
            }
        }
        if from.is_some() || to.is_some() {
            filters.push(Filter::date_range(ResumeField::ParsedAt, from, to));
        }

        Ok(filters)
    }
}
