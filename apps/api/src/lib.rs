//! Recruiting back office: résumé parse tasks, the résumé repository, job
//! postings, export templates and MCP providers behind one axum router.
//!
//! Every list endpoint runs [`pipeline`] (filter, then sort, then page) over
//! the in-memory [`store`]. The pipeline types also carry the list-view state
//! rules (column sort cycling, page-size changes) for embedders that keep
//! that state server-side.

pub mod config;
pub mod errors;
pub mod jobs;
pub mod models;
pub mod pipeline;
pub mod providers;
pub mod resumes;
pub mod routes;
pub mod state;
pub mod store;
pub mod tasks;
pub mod templates;
