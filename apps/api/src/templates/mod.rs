//! Export templates: inputs, the one-default-per-format rule, and lookup of
//! the template an export renders through.

pub mod handlers;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::AppError;
use crate::models::template::{ExportTemplate, FormatType, TemplateField, ToggleStatus};
use crate::pipeline::{choice, Filter, FilterSet, QueryError};
use crate::store::{Record, Repository, StoreError};

const DEFAULT_CREATOR: &str = "admin";

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateQuery {
    pub keyword: Option<String>,
    pub status: Option<String>,
    pub format_type: Option<String>,
}

impl TemplateQuery {
    pub fn filters(&self) -> Result<FilterSet<TemplateField>, QueryError> {
        Ok(FilterSet::new()
            .with(Filter::keyword(
                self.keyword.clone().unwrap_or_default(),
                &[TemplateField::Name],
            ))
            .with(Filter::single(
                TemplateField::Status,
                choice::<ToggleStatus>("status", self.status.as_deref())?,
            ))
            .with(Filter::single(
                TemplateField::FormatType,
                choice::<FormatType>("formatType", self.format_type.as_deref())?,
            )))
    }
}

/// A template as the API returns it, with the placeholders its content uses.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateView {
    #[serde(flatten)]
    pub template: ExportTemplate,
    pub placeholders: Vec<String>,
}

impl From<ExportTemplate> for TemplateView {
    fn from(template: ExportTemplate) -> Self {
        let placeholders = template.placeholders();
        Self {
            template,
            placeholders,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateInput {
    pub name: String,
    pub format_type: FormatType,
    pub status: Option<ToggleStatus>,
    pub description: Option<String>,
    pub content: String,
    pub created_by: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplatePatch {
    pub name: Option<String>,
    pub format_type: Option<FormatType>,
    pub status: Option<ToggleStatus>,
    pub description: Option<String>,
    pub content: Option<String>,
}

fn required(field: &str, value: &str) -> Result<String, AppError> {
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("'{field}' is required")));
    }
    Ok(value.to_string())
}

/// New templates never start as the default of their format.
pub fn build_template(input: TemplateInput) -> Result<ExportTemplate, AppError> {
    let now = Utc::now();
    Ok(ExportTemplate {
        id: String::new(),
        name: required("name", &input.name)?.trim().to_string(),
        format_type: input.format_type,
        status: input.status.unwrap_or(ToggleStatus::Enabled),
        description: input.description.filter(|d| !d.trim().is_empty()),
        content: required("content", &input.content)?,
        is_default: false,
        created_by: input
            .created_by
            .filter(|c| !c.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_CREATOR.to_string()),
        created_at: now,
        updated_at: now,
    })
}

/// Merges `patch`. A template that is disabled or moved to another format
/// loses its default flag.
pub fn apply_patch(template: &mut ExportTemplate, patch: TemplatePatch) -> Result<(), AppError> {
    if let Some(name) = patch.name {
        template.name = required("name", &name)?.trim().to_string();
    }
    if let Some(content) = patch.content {
        template.content = required("content", &content)?;
    }
    if let Some(description) = patch.description {
        template.description = Some(description).filter(|d| !d.trim().is_empty());
    }
    if let Some(format_type) = patch.format_type {
        if format_type != template.format_type {
            template.is_default = false;
        }
        template.format_type = format_type;
    }
    if let Some(status) = patch.status {
        template.status = status;
        if status == ToggleStatus::Disabled {
            template.is_default = false;
        }
    }
    Ok(())
}

/// Merges `patch` into the stored template under the repository lock, so a
/// concurrent default change is never overwritten by a stale copy.
pub fn update_template(
    templates: &Repository<ExportTemplate>,
    id: &str,
    patch: TemplatePatch,
) -> Result<ExportTemplate, AppError> {
    templates.modify(id, |template| apply_patch(template, patch))
}

/// Makes `id` the default of its format and clears the flag on every other
/// template of that format, in one step.
pub fn set_default(
    templates: &Repository<ExportTemplate>,
    id: &str,
) -> Result<ExportTemplate, StoreError> {
    let updated = templates.transact(|records| {
        let target = records
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| StoreError::NotFound {
                kind: ExportTemplate::KIND,
                id: id.to_string(),
            })?;
        if target.status != ToggleStatus::Enabled {
            return Err(StoreError::Protected {
                kind: ExportTemplate::KIND,
                id: id.to_string(),
                reason: "only enabled templates can be the default".to_string(),
            });
        }
        let format = target.format_type;
        let now = Utc::now();
        for t in records.iter_mut().filter(|t| t.format_type == format) {
            let is_target = t.id == id;
            if t.is_default != is_target {
                t.is_default = is_target;
                t.touch(now);
            }
        }
        records
            .iter()
            .find(|t| t.id == id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound {
                kind: ExportTemplate::KIND,
                id: id.to_string(),
            })
    })?;
    info!(
        "Template {} is now the default {} template",
        id,
        updated.format_type.as_str()
    );
    Ok(updated)
}

/// The enabled default template for `format`, if any.
pub fn default_for(
    templates: &Repository<ExportTemplate>,
    format: FormatType,
) -> Option<ExportTemplate> {
    templates.with_records(|records| {
        records
            .iter()
            .find(|t| t.format_type == format && t.is_default && t.status == ToggleStatus::Enabled)
            .cloned()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn template(
        id: &str,
        format_type: FormatType,
        status: ToggleStatus,
        default: bool,
    ) -> ExportTemplate {
        let now = Utc::now();
        ExportTemplate {
            id: id.to_string(),
            name: id.to_string(),
            format_type,
            status,
            description: None,
            content: "{{name}}".to_string(),
            is_default: default,
            created_by: DEFAULT_CREATOR.to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    fn repo() -> Repository<ExportTemplate> {
        Repository::from_records(vec![
            template("t1", FormatType::Json, ToggleStatus::Enabled, true),
            template("t2", FormatType::Json, ToggleStatus::Enabled, false),
            template("t3", FormatType::Xml, ToggleStatus::Enabled, true),
            template("t4", FormatType::Json, ToggleStatus::Disabled, false),
        ])
        .unwrap()
    }

    fn defaults(repo: &Repository<ExportTemplate>) -> Vec<String> {
        repo.with_records(|records| {
            records
                .iter()
                .filter(|t| t.is_default)
                .map(|t| t.id.clone())
                .collect()
        })
    }

    #[test]
    fn test_set_default_is_exclusive_per_format() {
        let repo = repo();
        let updated = set_default(&repo, "t2").unwrap();
        assert!(updated.is_default);
        assert_eq!(defaults(&repo), vec!["t2", "t3"]);
    }

    #[test]
    fn test_disabled_template_cannot_be_default() {
        let repo = repo();
        let err = set_default(&repo, "t4").unwrap_err();
        assert!(matches!(err, StoreError::Protected { .. }));
        assert_eq!(defaults(&repo), vec!["t1", "t3"]);
    }

    #[test]
    fn test_edit_after_default_moved_keeps_one_default() {
        let repo = repo();
        let seen_by_editor = repo.get("t1").unwrap();
        set_default(&repo, "t2").unwrap();

        let patch = TemplatePatch {
            name: Some("renamed".to_string()),
            ..TemplatePatch::default()
        };
        let updated = update_template(&repo, "t1", patch).unwrap();

        assert!(seen_by_editor.is_default);
        assert!(!updated.is_default);
        assert_eq!(updated.name, "renamed");
        assert_eq!(defaults(&repo), vec!["t2", "t3"]);
    }

    #[test]
    fn test_concurrent_edits_and_default_changes() {
        let repo = std::sync::Arc::new(repo());
        let editor = {
            let repo = repo.clone();
            std::thread::spawn(move || {
                for i in 0..200 {
                    let patch = TemplatePatch {
                        description: Some(format!("rev {i}")),
                        ..TemplatePatch::default()
                    };
                    update_template(&repo, "t1", patch).unwrap();
                }
            })
        };
        for i in 0..200 {
            set_default(&repo, if i % 2 == 0 { "t2" } else { "t1" }).unwrap();
        }
        editor.join().unwrap();

        let json_defaults = repo.with_records(|records| {
            records
                .iter()
                .filter(|t| t.format_type == FormatType::Json && t.is_default)
                .count()
        });
        assert_eq!(json_defaults, 1);
    }

    #[test]
    fn test_view_lists_placeholders() {
        let view = TemplateView::from(template("t9", FormatType::Json, ToggleStatus::Enabled, false));
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["placeholders"], serde_json::json!(["name"]));
        assert_eq!(json["id"], "t9");
        assert_eq!(json["formatType"], "json");
    }

    #[test]
    fn test_unknown_format_filter_is_a_query_error() {
        let query = TemplateQuery {
            format_type: Some("yaml".to_string()),
            ..TemplateQuery::default()
        };
        assert!(matches!(
            query.filters(),
            Err(QueryError::InvalidValue { param: "formatType", .. })
        ));
    }

    #[test]
    fn test_set_default_unknown_id() {
        let err = set_default(&repo(), "nope").unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[test]
    fn test_delete_guard() {
        let repo = Repository::from_records(vec![template(
            "t1",
            FormatType::Json,
            ToggleStatus::Enabled,
            false,
        )])
        .unwrap();
        assert!(repo.delete("t1").is_err());
        assert_eq!(repo.len(), 1);

        repo.toggle("t1").unwrap();
        repo.delete("t1").unwrap();
        assert!(repo.is_empty());
    }

    #[test]
    fn test_default_for_skips_disabled() {
        let repo = repo();
        assert_eq!(default_for(&repo, FormatType::Json).unwrap().id, "t1");
        repo.toggle("t1").unwrap();
        assert!(default_for(&repo, FormatType::Json).is_none());
    }

    #[test]
    fn test_patch_to_other_format_drops_default() {
        let mut t = template("t1", FormatType::Json, ToggleStatus::Enabled, true);
        let patch = TemplatePatch {
            format_type: Some(FormatType::Xml),
            ..TemplatePatch::default()
        };
        apply_patch(&mut t, patch).unwrap();
        assert_eq!(t.format_type, FormatType::Xml);
        assert!(!t.is_default);
    }

    #[test]
    fn test_build_requires_content() {
        let input = TemplateInput {
            name: "空模板".to_string(),
            format_type: FormatType::Json,
            status: None,
            description: None,
            content: "  ".to_string(),
            created_by: None,
        };
        assert!(matches!(build_template(input), Err(AppError::Validation(_))));
    }
}
