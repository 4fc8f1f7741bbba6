pub mod handlers;

pub use handlers::*;

use crate::service::AdvisorService;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;

/// 构建路由
pub fn router(service: Arc<AdvisorService>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/wastes", get(list_wastes).post(add_waste))
        .route("/api/advise", post(advise))
        .route("/api/report", post(download_report))
        .with_state(service)
        .layer(ServiceBuilder::new())
}
