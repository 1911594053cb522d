//! List pipeline shared by every collection endpoint: filter, then sort, then page.

pub mod filter;
pub mod paginate;
pub mod sort;

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;

pub use filter::{FieldValue, Filter, FilterSet, Filterable};
pub use paginate::{Page, PageRequest};
pub use sort::{SortDirection, SortSpec, SortState};

#[derive(Debug, Error, PartialEq)]
pub enum QueryError {
    #[error("Unsupported page size {0} (allowed: 10, 20, 50)")]
    UnsupportedPageSize(usize),

    #[error("Unknown sort field '{0}'")]
    UnknownSortField(String),

    #[error("Invalid value '{value}' for '{param}'")]
    InvalidValue { param: &'static str, value: String },

    #[error("Range '{param}' has min greater than max")]
    InvertedRange { param: &'static str },
}

/// Runs filter → sort → paginate over a borrowed collection.
pub fn run<T>(
    records: &[T],
    filters: &FilterSet<T::Field>,
    sort: Option<&SortSpec<T::Field>>,
    page: PageRequest,
) -> Page<T>
where
    T: Filterable + Clone,
{
    let mut matched = if filters.is_empty() {
        records.iter().collect()
    } else {
        filters.apply(records)
    };
    if let Some(spec) = sort {
        sort::sort_records(&mut matched, spec);
    }
    Page::from_slice(&matched, page)
}

/// Sort and paging parameters shared by every list endpoint. Extracted as
/// its own `Query` next to the endpoint's filter parameters.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    pub sort_field: Option<String>,
    pub sort_order: Option<SortDirection>,
    pub page: Option<usize>,
    pub page_size: Option<usize>,
}

impl ListParams {
    pub fn sort<F: FromStr>(&self) -> Result<Option<SortSpec<F>>, QueryError> {
        sort_spec(self.sort_field.as_deref(), self.sort_order)
    }

    pub fn page_request(&self) -> Result<PageRequest, QueryError> {
        PageRequest::from_params(self.page, self.page_size)
    }

    /// Resolves sort and paging, then runs the pipeline.
    pub fn run<T>(
        &self,
        records: &[T],
        filters: &FilterSet<T::Field>,
    ) -> Result<Page<T>, QueryError>
    where
        T: Filterable + Clone,
        T::Field: FromStr,
    {
        let sort = self.sort::<T::Field>()?;
        let page = self.page_request()?;
        Ok(run(records, filters, sort.as_ref(), page))
    }
}

/// Resolves the sort query parameters. A field without a direction sorts
/// ascending; a direction without a field means no sort.
pub fn sort_spec<F>(
    field: Option<&str>,
    direction: Option<SortDirection>,
) -> Result<Option<SortSpec<F>>, QueryError>
where
    F: FromStr,
{
    let Some(name) = field.map(str::trim).filter(|f| !f.is_empty()) else {
        return Ok(None);
    };
    let field = name
        .parse::<F>()
        .map_err(|_| QueryError::UnknownSortField(name.to_string()))?;
    Ok(Some(match direction {
        Some(SortDirection::Descend) => SortSpec::descend(field),
        Some(SortDirection::Ascend) | None => SortSpec::ascend(field),
    }))
}

/// Splits a comma-separated multi-select parameter, dropping blanks.
pub fn split_list(raw: Option<&str>) -> Vec<String> {
    raw.map(|s| {
        s.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}

/// Validates a single-select parameter against the enum it names and returns
/// the canonical value. Blank means "no filter".
pub fn choice<T>(param: &'static str, raw: Option<&str>) -> Result<Option<String>, QueryError>
where
    T: DeserializeOwned,
{
    let Some(value) = raw.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };
    serde_json::from_value::<T>(serde_json::Value::String(value.to_string())).map_err(|_| {
        QueryError::InvalidValue {
            param,
            value: value.to_string(),
        }
    })?;
    Ok(Some(value.to_string()))
}

pub fn check_range(
    param: &'static str,
    min: Option<f64>,
    max: Option<f64>,
) -> Result<(), QueryError> {
    match (min, max) {
        (Some(lo), Some(hi)) if lo > hi => Err(QueryError::InvertedRange { param }),
        _ => Ok(()),
    }
}

/// Parses an RFC 3339 timestamp or a bare `YYYY-MM-DD` date. Bare dates
/// expand to the start of the day, or the end of the day for upper bounds.
pub fn parse_instant(
    param: &'static str,
    raw: Option<&str>,
    upper_bound: bool,
) -> Result<Option<DateTime<Utc>>, QueryError> {
    let Some(value) = raw.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };
    if let Ok(at) = DateTime::parse_from_rfc3339(value) {
        return Ok(Some(at.with_timezone(&Utc)));
    }
    let date = NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| {
        QueryError::InvalidValue {
            param,
            value: value.to_string(),
        }
    })?;
    let time = if upper_bound {
        NaiveTime::from_hms_milli_opt(23, 59, 59, 999)
    } else {
        NaiveTime::from_hms_opt(0, 0, 0)
    }
    .ok_or_else(|| QueryError::InvalidValue {
        param,
        value: value.to_string(),
    })?;
    Ok(Some(Utc.from_utc_datetime(&date.and_time(time))))
}
