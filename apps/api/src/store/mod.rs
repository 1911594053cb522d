pub mod repository;
pub mod seed;

pub use repository::{Duplicate, Record, Repository, StatusToggle, StoreError};

use crate::models::job::JobPosition;
use crate::models::provider::McpProvider;
use crate::models::resume::IndexedResume;
use crate::models::task::ParseTask;
use crate::models::template::ExportTemplate;

/// The in-memory back office: one repository per record kind.
/// Nothing here survives a restart.
#[derive(Debug, Default)]
pub struct Store {
    pub tasks: Repository<ParseTask>,
    pub resumes: Repository<IndexedResume>,
    pub jobs: Repository<JobPosition>,
    pub templates: Repository<ExportTemplate>,
    pub providers: Repository<McpProvider>,
}

impl Store {
    pub fn empty() -> Self {
        Self::default()
    }
}
