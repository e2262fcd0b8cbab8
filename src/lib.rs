//! QA Notify: routes tabular QA reports to the curators responsible for them.

pub mod checks;
pub mod config;
pub mod error;
pub mod host;
pub mod identity;
pub mod notify;
pub mod pipeline;
pub mod render;
pub mod report;
pub mod routing;
pub mod summary;
