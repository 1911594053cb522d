pub mod job;
pub mod provider;
pub mod resume;
pub mod task;
pub mod template;
