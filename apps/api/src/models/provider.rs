use std::str::FromStr;

use chrono::{DateTime, Utc};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use crate::models::template::ToggleStatus;
use crate::pipeline::{FieldValue, Filterable};
use crate::store::{Record, StatusToggle};

pub const DEFAULT_TIMEOUT_MS: u32 = 5000;
pub const DEFAULT_RETRY_COUNT: u32 = 2;
pub const MIN_TIMEOUT_MS: u32 = 100;
pub const MAX_TIMEOUT_MS: u32 = 30_000;
pub const MAX_RETRY_COUNT: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderCategory {
    EducationVerification,
    IdentityVerification,
    EmploymentVerification,
    Custom,
}

impl ProviderCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderCategory::EducationVerification => "education_verification",
            ProviderCategory::IdentityVerification => "identity_verification",
            ProviderCategory::EmploymentVerification => "employment_verification",
            ProviderCategory::Custom => "custom",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthType {
    ApiKey,
    BearerToken,
    BasicAuth,
}

/// A third-party verification service reached over MCP.
///
/// The API key is write-only: it is accepted on create/update and used by
/// connection tests, but never serialized.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct McpProvider {
    pub id: String,
    pub name: String,
    pub category: ProviderCategory,
    pub status: ToggleStatus,
    pub endpoint_url: String,
    pub auth_type: AuthType,
    #[serde(skip)]
    pub api_key: Option<SecretString>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub timeout_ms: u32,
    pub retry_count: u32,
    pub is_enabled_by_default: bool,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Record for McpProvider {
    const KIND: &'static str = "provider";
    const ID_PREFIX: &'static str = "mcp";

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
}

impl StatusToggle for McpProvider {
    fn toggle_status(&mut self) {
        self.status = self.status.flipped();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderField {
    Name,
    Status,
    Category,
    EndpointUrl,
    TimeoutMs,
    CreatedAt,
}

impl FromStr for ProviderField {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "name" => Ok(ProviderField::Name),
            "status" => Ok(ProviderField::Status),
            "category" => Ok(ProviderField::Category),
            "timeoutMs" => Ok(ProviderField::TimeoutMs),
            "createdAt" => Ok(ProviderField::CreatedAt),
            _ => Err(()),
        }
    }
}

impl Filterable for McpProvider {
    type Field = ProviderField;

    fn field(&self, field: ProviderField) -> FieldValue<'_> {
        match field {
            ProviderField::Name => FieldValue::Text(&self.name),
            ProviderField::Status => FieldValue::Text(self.status.as_str()),
            ProviderField::Category => FieldValue::Text(self.category.as_str()),
            ProviderField::EndpointUrl => FieldValue::Text(&self.endpoint_url),
            ProviderField::TimeoutMs => FieldValue::Number(f64::from(self.timeout_ms)),
            ProviderField::CreatedAt => FieldValue::Instant(self.created_at),
        }
    }
}
