use chrono::{DateTime, Utc};

/// A borrowed view of one record field, as seen by predicates and comparators.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue<'a> {
    Text(&'a str),
    List(&'a [String]),
    Number(f64),
    Instant(DateTime<Utc>),
    Missing,
}

/// Records that can be filtered and sorted by a closed set of field keys.
pub trait Filterable {
    type Field: Copy + Eq + std::fmt::Debug;

    fn field(&self, field: Self::Field) -> FieldValue<'_>;
}

/// One filter rule. Each kind has a fixed shape, so a numeric range can never
/// be applied with a string set and vice versa.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter<F> {
    /// Case-insensitive substring match, OR across `fields`. List fields match
    /// when any element contains the keyword.
    Keyword { text: String, fields: Vec<F> },
    /// Exact equality. `None` is the "no filter" sentinel.
    Single { field: F, value: Option<String> },
    /// Membership in `selected`. An empty selection passes every record.
    Multi { field: F, selected: Vec<String> },
    /// Closed interval `[min, max]`. Absent values never match.
    NumericRange { field: F, min: f64, max: f64 },
    /// Closed interval `[start, end]`. Absent timestamps never match.
    DateRange {
        field: F,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
}

impl<F: Copy + Eq + std::fmt::Debug> Filter<F> {
    pub fn keyword(text: impl Into<String>, fields: &[F]) -> Self {
        Filter::Keyword {
            text: text.into(),
            fields: fields.to_vec(),
        }
    }

    pub fn single(field: F, value: Option<String>) -> Self {
        Filter::Single { field, value }
    }

    pub fn multi(field: F, selected: Vec<String>) -> Self {
        Filter::Multi { field, selected }
    }

    /// Range with optional bounds; a missing bound is unbounded on that side.
    pub fn numeric_range(field: F, min: Option<f64>, max: Option<f64>) -> Self {
        Filter::NumericRange {
            field,
            min: min.unwrap_or(f64::NEG_INFINITY),
            max: max.unwrap_or(f64::INFINITY),
        }
    }

    pub fn date_range(
        field: F,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Self {
        Filter::DateRange {
            field,
            start: start.unwrap_or(DateTime::<Utc>::MIN_UTC),
            end: end.unwrap_or(DateTime::<Utc>::MAX_UTC),
        }
    }

    /// Whether this rule excludes nothing in its current state.
    pub fn is_pass_through(&self) -> bool {
        match self {
            Filter::Keyword { text, fields } => text.trim().is_empty() || fields.is_empty(),
            Filter::Single { value, .. } => value.as_deref().map_or(true, str::is_empty),
            Filter::Multi { selected, .. } => selected.is_empty(),
            Filter::NumericRange { .. } | Filter::DateRange { .. } => false,
        }
    }

    pub fn matches<T>(&self, record: &T) -> bool
    where
        T: Filterable<Field = F>,
    {
        if self.is_pass_through() {
            return true;
        }

        match self {
            Filter::Keyword { text, fields } => {
                let needle = text.trim().to_lowercase();
                fields
                    .iter()
                    .any(|f| contains_keyword(&record.field(*f), &needle))
            }
            Filter::Single { field, value } => {
                let wanted = value.as_deref().unwrap_or_default();
                match record.field(*field) {
                    FieldValue::Text(actual) => actual == wanted,
                    FieldValue::List(items) => items.iter().any(|i| i == wanted),
                    _ => false,
                }
            }
            Filter::Multi { field, selected } => match record.field(*field) {
                FieldValue::Text(actual) => selected.iter().any(|s| s == actual),
                FieldValue::List(items) => items.iter().any(|i| selected.contains(i)),
                _ => false,
            },
            Filter::NumericRange { field, min, max } => match record.field(*field) {
                FieldValue::Number(n) => *min <= n && n <= *max,
                _ => false,
            },
            Filter::DateRange { field, start, end } => match record.field(*field) {
                FieldValue::Instant(at) => *start <= at && at <= *end,
                _ => false,
            },
        }
    }
}

fn contains_keyword(value: &FieldValue<'_>, needle: &str) -> bool {
    match value {
        FieldValue::Text(s) => s.to_lowercase().contains(needle),
        FieldValue::List(items) => items.iter().any(|i| i.to_lowercase().contains(needle)),
        _ => false,
    }
}

/// The active filters of one list view, combined by logical AND.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterSet<F> {
    filters: Vec<Filter<F>>,
}

impl<F> Default for FilterSet<F> {
    fn default() -> Self {
        Self {
            filters: Vec::new(),
        }
    }
}

impl<F: Copy + Eq + std::fmt::Debug> FilterSet<F> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, filter: Filter<F>) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn push(&mut self, filter: Filter<F>) {
        self.filters.push(filter);
    }

    /// True when no rule in the set would exclude a record.
    pub fn is_empty(&self) -> bool {
        self.filters.iter().all(Filter::is_pass_through)
    }

    pub fn matches<T>(&self, record: &T) -> bool
    where
        T: Filterable<Field = F>,
    {
        self.filters.iter().all(|f| f.matches(record))
    }

    /// Returns the matching records as an order-preserving subsequence.
    pub fn apply<'a, T>(&self, records: &'a [T]) -> Vec<&'a T>
    where
        T: Filterable<Field = F>,
    {
        records.iter().filter(|r| self.matches(*r)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum PersonField {
        Name,
        City,
        Skills,
        Score,
        SeenAt,
    }

    #[derive(Debug, Clone, PartialEq)]
    struct Person {
        name: &'static str,
        city: &'static str,
        skills: Vec<String>,
        score: Option<f64>,
        seen_at: DateTime<Utc>,
    }

    impl Filterable for Person {
        type Field = PersonField;

        fn field(&self, field: PersonField) -> FieldValue<'_> {
            match field {
                PersonField::Name => FieldValue::Text(self.name),
                PersonField::City => FieldValue::Text(self.city),
                PersonField::Skills => FieldValue::List(&self.skills),
                PersonField::Score => self.score.map_or(FieldValue::Missing, FieldValue::Number),
                PersonField::SeenAt => FieldValue::Instant(self.seen_at),
            }
        }
    }

    fn day(d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, d, 12, 0, 0).unwrap()
    }

    fn people() -> Vec<Person> {
        vec![
            Person {
                name: "张三",
                city: "北京",
                skills: vec!["Python".to_string()],
                score: Some(85.0),
                seen_at: day(15),
            },
            Person {
                name: "李四",
                city: "上海",
                skills: vec!["Java".to_string()],
                score: Some(92.0),
                seen_at: day(14),
            },
            Person {
                name: "王五",
                city: "深圳",
                skills: vec!["Axure".to_string(), "SQL".to_string()],
                score: None,
                seen_at: day(13),
            },
        ]
    }

    fn names(found: &[&Person]) -> Vec<&'static str> {
        found.iter().map(|p| p.name).collect()
    }

    #[test]
    fn test_no_filters_is_identity() {
        let records = people();
        let found = FilterSet::new().apply(&records);
        assert_eq!(found, records.iter().collect::<Vec<_>>());
    }

    #[test]
    fn test_keyword_matches_list_field() {
        let records = people();
        let set = FilterSet::new().with(Filter::keyword(
            "Python",
            &[PersonField::Name, PersonField::Skills],
        ));
        assert_eq!(names(&set.apply(&records)), vec!["张三"]);
    }

    #[test]
    fn test_keyword_is_case_insensitive() {
        let records = people();
        let set = FilterSet::new().with(Filter::keyword("sql", &[PersonField::Skills]));
        assert_eq!(names(&set.apply(&records)), vec!["王五"]);
    }

    #[test]
    fn test_blank_keyword_passes_everything() {
        let records = people();
        let set = FilterSet::new().with(Filter::keyword("  ", &[PersonField::Name]));
        assert_eq!(set.apply(&records).len(), 3);
        assert!(set.is_empty());
    }

    #[test]
    fn test_empty_multi_select_is_pass_through() {
        let records = people();
        let set = FilterSet::new().with(Filter::multi(PersonField::City, vec![]));
        assert_eq!(set.apply(&records).len(), records.len());
    }

    #[test]
    fn test_multi_select_membership() {
        let records = people();
        let set = FilterSet::new().with(Filter::multi(
            PersonField::City,
            vec!["北京".to_string(), "深圳".to_string()],
        ));
        assert_eq!(names(&set.apply(&records)), vec!["张三", "王五"]);
    }

    #[test]
    fn test_multi_select_any_of_list() {
        let records = people();
        let set = FilterSet::new().with(Filter::multi(
            PersonField::Skills,
            vec!["SQL".to_string(), "Java".to_string()],
        ));
        assert_eq!(names(&set.apply(&records)), vec!["李四", "王五"]);
    }

    #[test]
    fn test_single_select_sentinel() {
        let records = people();
        let empty = FilterSet::new().with(Filter::single(PersonField::City, Some(String::new())));
        assert_eq!(empty.apply(&records).len(), 3);

        let none = FilterSet::new().with(Filter::single(PersonField::City, None));
        assert_eq!(none.apply(&records).len(), 3);

        let shanghai =
            FilterSet::new().with(Filter::single(PersonField::City, Some("上海".to_string())));
        assert_eq!(names(&shanghai.apply(&records)), vec!["李四"]);
    }

    #[test]
    fn test_numeric_range_is_closed_interval() {
        let records = people();
        let set = FilterSet::new().with(Filter::numeric_range(
            PersonField::Score,
            Some(85.0),
            Some(92.0),
        ));
        assert_eq!(names(&set.apply(&records)), vec!["张三", "李四"]);
    }

    #[test]
    fn test_numeric_range_excludes_missing_values() {
        let records = people();
        let set = FilterSet::new().with(Filter::numeric_range(PersonField::Score, None, None));
        assert_eq!(names(&set.apply(&records)), vec!["张三", "李四"]);
    }

    #[test]
    fn test_date_range_inclusive_bounds() {
        let records = people();
        let set = FilterSet::new().with(Filter::date_range(
            PersonField::SeenAt,
            Some(day(13)),
            Some(day(14)),
        ));
        assert_eq!(names(&set.apply(&records)), vec!["李四", "王五"]);
    }

    #[test]
    fn test_filters_combine_with_and() {
        let records = people();
        let set = FilterSet::new()
            .with(Filter::multi(
                PersonField::City,
                vec!["北京".to_string(), "上海".to_string()],
            ))
            .with(Filter::numeric_range(PersonField::Score, Some(90.0), None));
        assert_eq!(names(&set.apply(&records)), vec!["李四"]);
    }
}
