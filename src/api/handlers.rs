use crate::error::AdvisorError;
use crate::models::{AdviceRequest, NewWasteEntry, WasteEntry};
use crate::service::AdvisorService;
use axum::{
    extract::{Json, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use std::sync::Arc;

/// 错误响应体
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
}

/// 新增条目响应体
#[derive(Debug, Serialize)]
pub struct AddWasteResponse {
    pub success: bool,
    pub message: String,
    pub entry: WasteEntry,
}

impl IntoResponse for AdvisorError {
    fn into_response(self) -> Response {
        let status = match &self {
            AdvisorError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AdvisorError::UnknownWasteType(_) | AdvisorError::NoMatch(_) => StatusCode::NOT_FOUND,
            AdvisorError::DuplicateWasteType(_) => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        }
        let body = ErrorResponse {
            success: false,
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// 健康检查
pub async fn health_check() -> &'static str {
    "OK"
}

/// 数据集列表
pub async fn list_wastes(State(service): State<Arc<AdvisorService>>) -> Json<Vec<WasteEntry>> {
    Json(service.catalog().entries().to_vec())
}

/// 匹配并返回建议
pub async fn advise(
    State(service): State<Arc<AdvisorService>>,
    Json(req): Json<AdviceRequest>,
) -> Response {
    match service.advise(&req) {
        Ok(advice) => (StatusCode::OK, Json(advice)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// 下载文本报告
pub async fn download_report(
    State(service): State<Arc<AdvisorService>>,
    Json(req): Json<AdviceRequest>,
) -> Response {
    match service.report(&req) {
        Ok(report) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{}\"", report.file_name),
                ),
            ],
            report.body,
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

/// 新增废弃物类型 (写入 CSV, 重启后生效)
pub async fn add_waste(
    State(service): State<Arc<AdvisorService>>,
    Json(new): Json<NewWasteEntry>,
) -> Response {
    match service.add_waste_type(new).await {
        Ok(entry) => {
            let response = AddWasteResponse {
                success: true,
                message: format!(
                    "Added '{}' to dataset. Restart the service to use it.",
                    entry.label
                ),
                entry,
            };
            (StatusCode::CREATED, Json(response)).into_response()
        }
        Err(e) => e.into_response(),
    }
}
