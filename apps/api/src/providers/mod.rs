//! MCP provider registry: write-side inputs and the rules applied to them.

pub mod handlers;
pub mod probe;

use chrono::Utc;
use secrecy::SecretString;
use serde::Deserialize;

use crate::errors::AppError;
use crate::models::provider::{
    AuthType, McpProvider, ProviderCategory, ProviderField, DEFAULT_RETRY_COUNT,
    DEFAULT_TIMEOUT_MS,
};
use crate::models::template::ToggleStatus;
use crate::pipeline::{choice, Filter, FilterSet, QueryError};
use crate::providers::probe::ProbeTarget;
use crate::store::Repository;

const DEFAULT_CREATOR: &str = "admin";

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderQuery {
    pub keyword: Option<String>,
    pub status: Option<String>,
    pub category: Option<String>,
}

impl ProviderQuery {
    pub fn filters(&self) -> Result<FilterSet<ProviderField>, QueryError> {
        Ok(FilterSet::new()
            .with(Filter::keyword(
                self.keyword.clone().unwrap_or_default(),
                &[ProviderField::Name, ProviderField::EndpointUrl],
            ))
            .with(Filter::single(
                ProviderField::Status,
                choice::<ToggleStatus>("status", self.status.as_deref())?,
            ))
            .with(Filter::single(
                ProviderField::Category,
                choice::<ProviderCategory>("category", self.category.as_deref())?,
            )))
    }
}

/// Body of `POST /mcp-providers`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderInput {
    pub name: String,
    pub category: ProviderCategory,
    pub endpoint_url: String,
    pub auth_type: AuthType,
    pub api_key: Option<String>,
    pub description: Option<String>,
    pub timeout_ms: Option<u32>,
    pub retry_count: Option<u32>,
    pub status: Option<ToggleStatus>,
    pub is_enabled_by_default: Option<bool>,
    pub created_by: Option<String>,
}

/// Body of `PUT /mcp-providers/:id`. Absent fields keep their stored value,
/// including the API key.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderPatch {
    pub name: Option<String>,
    pub category: Option<ProviderCategory>,
    pub endpoint_url: Option<String>,
    pub auth_type: Option<AuthType>,
    pub api_key: Option<String>,
    pub description: Option<String>,
    pub timeout_ms: Option<u32>,
    pub retry_count: Option<u32>,
    pub status: Option<ToggleStatus>,
    pub is_enabled_by_default: Option<bool>,
}

/// Body of `POST /mcp-providers/test`: an unsaved provider form.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProbeRequest {
    pub endpoint_url: String,
    pub auth_type: AuthType,
    pub api_key: Option<String>,
    pub timeout_ms: Option<u32>,
    pub retry_count: Option<u32>,
}

impl From<ProbeRequest> for ProbeTarget {
    fn from(req: ProbeRequest) -> Self {
        ProbeTarget {
            endpoint_url: req.endpoint_url,
            auth_type: req.auth_type,
            api_key: secret(req.api_key),
            timeout_ms: req.timeout_ms.unwrap_or(DEFAULT_TIMEOUT_MS),
            retry_count: req.retry_count.unwrap_or(DEFAULT_RETRY_COUNT),
        }
    }
}

fn secret(raw: Option<String>) -> Option<SecretString> {
    raw.map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty())
        .map(SecretString::from)
}

fn required(field: &str, value: &str) -> Result<String, AppError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation(format!("'{field}' is required")));
    }
    Ok(trimmed.to_string())
}

/// Endpoint, timeout and retry bounds; a saved provider must be testable.
fn check_limits(provider: &McpProvider) -> Result<(), AppError> {
    ProbeTarget::from_provider(provider).validate()?;
    Ok(())
}

/// Validates a create request and builds the record. The repository assigns
/// the id and timestamps.
pub fn build_provider(input: ProviderInput) -> Result<McpProvider, AppError> {
    let api_key = secret(input.api_key)
        .ok_or_else(|| AppError::Validation("'apiKey' is required".to_string()))?;
    let now = Utc::now();
    let provider = McpProvider {
        id: String::new(),
        name: required("name", &input.name)?,
        category: input.category,
        status: input.status.unwrap_or(ToggleStatus::Enabled),
        endpoint_url: required("endpointUrl", &input.endpoint_url)?,
        auth_type: input.auth_type,
        api_key: Some(api_key),
        description: input.description.filter(|d| !d.trim().is_empty()),
        timeout_ms: input.timeout_ms.unwrap_or(DEFAULT_TIMEOUT_MS),
        retry_count: input.retry_count.unwrap_or(DEFAULT_RETRY_COUNT),
        is_enabled_by_default: input.is_enabled_by_default.unwrap_or(false),
        created_by: input
            .created_by
            .filter(|c| !c.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_CREATOR.to_string()),
        created_at: now,
        updated_at: now,
    };
    check_limits(&provider)?;
    Ok(provider)
}

/// Merges `patch` into `provider`, re-validating the result.
pub fn apply_patch(provider: &mut McpProvider, patch: ProviderPatch) -> Result<(), AppError> {
    if let Some(name) = patch.name {
        provider.name = required("name", &name)?;
    }
    if let Some(category) = patch.category {
        provider.category = category;
    }
    if let Some(url) = patch.endpoint_url {
        provider.endpoint_url = required("endpointUrl", &url)?;
    }
    if let Some(auth_type) = patch.auth_type {
        provider.auth_type = auth_type;
    }
    if let Some(key) = secret(patch.api_key) {
        provider.api_key = Some(key);
    }
    if let Some(description) = patch.description {
        provider.description = Some(description).filter(|d| !d.trim().is_empty());
    }
    if let Some(timeout_ms) = patch.timeout_ms {
        provider.timeout_ms = timeout_ms;
    }
    if let Some(retry_count) = patch.retry_count {
        provider.retry_count = retry_count;
    }
    if let Some(status) = patch.status {
        provider.status = status;
    }
    if let Some(flag) = patch.is_enabled_by_default {
        provider.is_enabled_by_default = flag;
    }
    check_limits(provider)
}

/// Merges `patch` into the stored provider under the repository lock.
pub fn update_provider(
    providers: &Repository<McpProvider>,
    id: &str,
    patch: ProviderPatch,
) -> Result<McpProvider, AppError> {
    providers.modify(id, |provider| apply_patch(provider, patch))
}

#[cfg(test)]
mod tests {
    use secrecy::ExposeSecret;

    use super::*;
    use crate::models::provider::{MAX_RETRY_COUNT, MAX_TIMEOUT_MS, MIN_TIMEOUT_MS};

    fn input() -> ProviderInput {
        ProviderInput {
            name: "学信网学历验证服务".to_string(),
            category: ProviderCategory::EducationVerification,
            endpoint_url: "https://api.chsi.com.cn/verify".to_string(),
            auth_type: AuthType::ApiKey,
            api_key: Some("key-1".to_string()),
            description: None,
            timeout_ms: None,
            retry_count: None,
            status: None,
            is_enabled_by_default: None,
            created_by: None,
        }
    }

    #[test]
    fn test_build_applies_defaults() {
        let provider = build_provider(input()).unwrap();
        assert_eq!(provider.timeout_ms, DEFAULT_TIMEOUT_MS);
        assert_eq!(provider.retry_count, DEFAULT_RETRY_COUNT);
        assert_eq!(provider.status, ToggleStatus::Enabled);
        assert_eq!(provider.created_by, DEFAULT_CREATOR);
    }

    #[test]
    fn test_build_requires_api_key() {
        let mut req = input();
        req.api_key = Some("   ".to_string());
        assert!(matches!(build_provider(req), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_build_rejects_bad_endpoint() {
        let mut req = input();
        req.endpoint_url = "chsi.com.cn".to_string();
        assert!(matches!(build_provider(req), Err(AppError::Probe(_))));
    }

    #[test]
    fn test_patch_without_key_keeps_stored_key() {
        let mut provider = build_provider(input()).unwrap();
        let patch = ProviderPatch {
            timeout_ms: Some(3000),
            ..ProviderPatch::default()
        };
        apply_patch(&mut provider, patch).unwrap();
        assert_eq!(provider.timeout_ms, 3000);
        assert_eq!(provider.api_key.as_ref().unwrap().expose_secret(), "key-1");

        let patch = ProviderPatch {
            api_key: Some("key-2".to_string()),
            ..ProviderPatch::default()
        };
        apply_patch(&mut provider, patch).unwrap();
        assert_eq!(provider.api_key.as_ref().unwrap().expose_secret(), "key-2");
    }

    #[test]
    fn test_patch_rejects_zero_timeout() {
        let mut provider = build_provider(input()).unwrap();
        let patch = ProviderPatch {
            timeout_ms: Some(0),
            ..ProviderPatch::default()
        };
        assert!(apply_patch(&mut provider, patch).is_err());
    }

    #[test]
    fn test_build_enforces_form_limits() {
        let mut req = input();
        req.timeout_ms = Some(4_000_000_000);
        req.retry_count = Some(4_000_000_000);
        assert!(matches!(build_provider(req), Err(AppError::Probe(_))));

        let mut req = input();
        req.timeout_ms = Some(MIN_TIMEOUT_MS);
        req.retry_count = Some(MAX_RETRY_COUNT);
        assert!(build_provider(req).is_ok());

        let mut req = input();
        req.timeout_ms = Some(MAX_TIMEOUT_MS + 1);
        assert!(build_provider(req).is_err());

        let mut req = input();
        req.retry_count = Some(MAX_RETRY_COUNT + 1);
        assert!(build_provider(req).is_err());
    }

    #[test]
    fn test_update_keeps_toggle_made_since_read() {
        let mut provider = build_provider(input()).unwrap();
        provider.id = "mcp-1".to_string();
        let repo = Repository::from_records(vec![provider]).unwrap();

        let seen_by_editor = repo.get("mcp-1").unwrap();
        repo.toggle("mcp-1").unwrap();
        let patch = ProviderPatch {
            retry_count: Some(5),
            ..ProviderPatch::default()
        };
        let updated = update_provider(&repo, "mcp-1", patch).unwrap();

        assert_eq!(seen_by_editor.status, ToggleStatus::Enabled);
        assert_eq!(updated.status, ToggleStatus::Disabled);
        assert_eq!(updated.retry_count, 5);
    }

    #[test]
    fn test_rejected_update_keeps_stored_provider() {
        let mut provider = build_provider(input()).unwrap();
        provider.id = "mcp-1".to_string();
        let repo = Repository::from_records(vec![provider]).unwrap();

        let patch = ProviderPatch {
            name: Some("改名".to_string()),
            timeout_ms: Some(MAX_TIMEOUT_MS + 1),
            ..ProviderPatch::default()
        };
        assert!(update_provider(&repo, "mcp-1", patch).is_err());
        let stored = repo.get("mcp-1").unwrap();
        assert_eq!(stored.name, "学信网学历验证服务");
        assert_eq!(stored.timeout_ms, DEFAULT_TIMEOUT_MS);
    }
}
