use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::job::COPY_SUFFIX;
use crate::pipeline::{FieldValue, Filterable};
use crate::store::{Duplicate, Record, StatusToggle};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormatType {
    Json,
    Xml,
}

impl FormatType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FormatType::Json => "json",
            FormatType::Xml => "xml",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToggleStatus {
    Enabled,
    Disabled,
}

impl ToggleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ToggleStatus::Enabled => "enabled",
            ToggleStatus::Disabled => "disabled",
        }
    }

    pub fn flipped(self) -> Self {
        match self {
            ToggleStatus::Enabled => ToggleStatus::Disabled,
            ToggleStatus::Disabled => ToggleStatus::Enabled,
        }
    }
}

/// Export template: text with `{{placeholder}}` tokens rendered per résumé.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportTemplate {
    pub id: String,
    pub name: String,
    pub format_type: FormatType,
    pub status: ToggleStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub content: String,
    /// At most one template per format carries this flag.
    #[serde(default)]
    pub is_default: bool,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ExportTemplate {
    /// Placeholder tokens in order of first appearance.
    pub fn placeholders(&self) -> Vec<String> {
        let mut found = Vec::new();
        let mut rest = self.content.as_str();
        while let Some(start) = rest.find("{{") {
            let after = &rest[start + 2..];
            let Some(end) = after.find("}}") else {
                break;
            };
            let token = after[..end].trim().to_string();
            if !token.is_empty() && !found.contains(&token) {
                found.push(token);
            }
            rest = &after[end + 2..];
        }
        found
    }
}

impl Record for ExportTemplate {
    const KIND: &'static str = "template";
    const ID_PREFIX: &'static str = "temp";

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
        if self.status == ToggleStatus::Enabled {
            return Err("only disabled templates can be deleted".to_string());
        }
        Ok(())
    }
}

impl StatusToggle for ExportTemplate {
    fn toggle_status(&mut self) {
        self.status = self.status.flipped();
        if self.status == ToggleStatus::Disabled {
            self.is_default = false;
        }
    }
}

impl Duplicate for ExportTemplate {
    fn duplicate(&self) -> Self {
        ExportTemplate {
            id: String::new(),
            name: format!("{}{}", self.name, COPY_SUFFIX),
            status: ToggleStatus::Disabled,
            is_default: false,
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateField {
    Name,
    Status,
    FormatType,
    CreatedAt,
    UpdatedAt,
}

impl FromStr for TemplateField {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "name" => Ok(TemplateField::Name),
            "status" => Ok(TemplateField::Status),
            "formatType" => Ok(TemplateField::FormatType),
            "createdAt" => Ok(TemplateField::CreatedAt),
            "updatedAt" => Ok(TemplateField::UpdatedAt),
            _ => Err(()),
        }
    }
}

impl Filterable for ExportTemplate {
    type Field = TemplateField;

    fn field(&self, field: TemplateField) -> FieldValue<'_> {
        match field {
            TemplateField::Name => FieldValue::Text(&self.name),
            TemplateField::Status => FieldValue::Text(self.status.as_str()),
            TemplateField::FormatType => FieldValue::Text(self.format_type.as_str()),
            TemplateField::CreatedAt => FieldValue::Instant(self.created_at),
            TemplateField::UpdatedAt => FieldValue::Instant(self.updated_at),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn template(content: &str, status: ToggleStatus) -> ExportTemplate {
        ExportTemplate {
            id: "t1".to_string(),
            name: "标准JSON格式模板".to_string(),
            format_type: FormatType::Json,
            status,
            description: None,
            content: content.to_string(),
            is_default: true,
            created_by: "admin".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_placeholders_in_order_without_duplicates() {
        let t = template(
            r#"{"name": "{{name}}", "a": "{{ startDate }}", "b": "{{startDate}}", "c": "{{email}}"}"#,
            ToggleStatus::Enabled,
        );
        assert_eq!(t.placeholders(), vec!["name", "startDate", "email"]);
    }

    #[test]
    fn test_unterminated_placeholder_ignored() {
        let t = template("{{name}} and {{broken", ToggleStatus::Enabled);
        assert_eq!(t.placeholders(), vec!["name"]);
    }

    #[test]
    fn test_enabled_template_not_deletable() {
        assert!(template("x", ToggleStatus::Enabled).check_deletable().is_err());
        assert!(template("x", ToggleStatus::Disabled).check_deletable().is_ok());
    }

    #[test]
    fn test_disabling_clears_default_flag() {
        let mut t = template("x", ToggleStatus::Enabled);
        t.toggle_status();
        assert_eq!(t.status, ToggleStatus::Disabled);
        assert!(!t.is_default);
        t.toggle_status();
        assert_eq!(t.status, ToggleStatus::Enabled);
        assert!(!t.is_default);
    }

    #[test]
    fn test_copy_starts_disabled_and_not_default() {
        let copy = template("x", ToggleStatus::Enabled).duplicate();
        assert_eq!(copy.name, "标准JSON格式模板_副本");
        assert_eq!(copy.status, ToggleStatus::Disabled);
        assert!(!copy.is_default);
        assert_eq!(copy.content, "x");
    }
}
