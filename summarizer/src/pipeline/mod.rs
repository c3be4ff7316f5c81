//! The summary pipeline: normalization, validation, warnings and orchestration.

pub mod normalizer;
pub mod service;
pub mod validator;
pub mod warnings;

pub use service::SummaryService;
