//! 统一错误处理
//!
//! 提供 HTTP 层错误类型和响应结构：
//! - [`AppError`] - 应用错误枚举
//! - [`AppResponse`] - API 响应结构
//!
//! 命令被业务规则拒绝不是 HTTP 错误：`POST /api/matches/commands` 始终返回
//! `CommandResponse`，`success=false` 时带 `CommandErrorCode`。这里只处理
//! 查询类接口的错误。
//!
//! # 错误码规范
//!
//! | 前缀 | 分类 | 示例 |
//! |------|------|------|
//! | E0xxx | 请求/资源错误 | E0003 比赛不存在 |
//! | E9xxx | 系统错误 | E9002 存储错误 |

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::error;

use crate::scoring::ManagerError;

/// API 统一响应结构
///
/// ```json
/// {
///   "code": "E0000",
///   "message": "Success",
///   "data": { ... }
/// }
/// ```
#[derive(Debug, Serialize)]
pub struct AppResponse<T> {
    /// 错误码 (E0000 表示成功)
    pub code: String,
    /// 消息
    pub message: String,
    /// 响应数据
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

/// 应用错误枚举
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // ========== 业务逻辑错误 (4xx) ==========
    #[error("Resource not found: {0}")]
    /// 资源不存在 (404)
    NotFound(String),

    #[error("Validation failed: {0}")]
    /// 验证失败 (400)
    Validation(String),

    // ========== 系统错误 (5xx) ==========
    #[error("Storage error: {0}")]
    /// 存储错误 (500)
    Storage(String),

    #[error("Internal server error: {0}")]
    /// 内部错误 (500)
    Internal(String),
}

impl AppError {
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    fn parts(&self) -> (StatusCode, &'static str, &str) {
        match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "E0003", msg.as_str()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "E0002", msg.as_str()),
            AppError::Storage(_) => (StatusCode::INTERNAL_SERVER_ERROR, "E9002", "Storage error"),
            AppError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "E9001",
                "Internal server error",
            ),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            AppError::Storage(msg) => {
                error!(target: "storage", error = %msg, "Storage error occurred");
            }
            AppError::Internal(msg) => {
                error!(target: "internal", error = %msg, "Internal error occurred");
            }
            _ => {}
        }

        let (status, code, message) = self.parts();
        let body = Json(AppResponse::<()> {
            code: code.to_string(),
            message: message.to_string(),
            data: None,
        });

        (status, body).into_response()
    }
}

impl From<ManagerError> for AppError {
    fn from(err: ManagerError) -> Self {
        match err {
            ManagerError::MatchNotFound(id) => AppError::NotFound(format!("Match {} not found", id)),
            ManagerError::Storage(e) => AppError::Storage(e.to_string()),
            ManagerError::Rejected(e) => AppError::Validation(e.to_string()),
            ManagerError::Internal(msg) => AppError::Internal(msg),
        }
    }
}
