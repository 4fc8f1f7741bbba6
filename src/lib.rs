pub mod api;
pub mod config;
pub mod dataset;
pub mod error;
pub mod models;
pub mod service;

pub use config::AppConfig;
pub use dataset::{load_catalog, WasteCatalog};
pub use error::{AdvisorError, Result};
pub use service::AdvisorService;
