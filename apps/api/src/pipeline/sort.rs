use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::pipeline::filter::{FieldValue, Filterable};

/// Sort direction as the list views send it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Ascend,
    Descend,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortSpec<F> {
    pub field: F,
    pub direction: SortDirection,
}

impl<F> SortSpec<F> {
    pub fn ascend(field: F) -> Self {
        Self {
            field,
            direction: SortDirection::Ascend,
        }
    }

    pub fn descend(field: F) -> Self {
        Self {
            field,
            direction: SortDirection::Descend,
        }
    }
}

/// Column-header sort state. Selecting the same field cycles
/// none → ascend → descend → none; selecting another field starts at ascend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortState<F> {
    current: Option<SortSpec<F>>,
}

impl<F> Default for SortState<F> {
    fn default() -> Self {
        Self { current: None }
    }
}

impl<F: Copy + Eq> SortState<F> {
    pub fn select(&mut self, field: F) -> Option<SortSpec<F>> {
        self.current = match self.current {
            Some(spec) if spec.field == field => match spec.direction {
                SortDirection::Ascend => Some(SortSpec::descend(field)),
                SortDirection::Descend => None,
            },
            _ => Some(SortSpec::ascend(field)),
        };
        self.current
    }

    pub fn current(&self) -> Option<SortSpec<F>> {
        self.current
    }
}

/// Orders two field values: strings lexicographically, numbers numerically,
/// instants chronologically. Absent values order before present ones.
pub fn compare_values(a: &FieldValue<'_>, b: &FieldValue<'_>) -> Ordering {
    match (a, b) {
        (FieldValue::Text(x), FieldValue::Text(y)) => x.cmp(y),
        (FieldValue::Number(x), FieldValue::Number(y)) => x.total_cmp(y),
        (FieldValue::Instant(x), FieldValue::Instant(y)) => x.cmp(y),
        (FieldValue::List(x), FieldValue::List(y)) => x.cmp(y),
        (FieldValue::Missing, FieldValue::Missing) => Ordering::Equal,
        (FieldValue::Missing, _) => Ordering::Less,
        (_, FieldValue::Missing) => Ordering::Greater,
        _ => Ordering::Equal,
    }
}

/// Stable sort: records with equal keys keep their input order in both directions.
pub fn sort_records<T: Filterable>(records: &mut [&T], spec: &SortSpec<T::Field>) {
    records.sort_by(|a, b| {
        let ord = compare_values(&a.field(spec.field), &b.field(spec.field));
        match spec.direction {
            SortDirection::Ascend => ord,
            SortDirection::Descend => ord.reverse(),
        }
    });
}
