//! 工具模块 - 通用工具函数和类型
//!
//! # 内容
//!
//! - [`AppError`] - HTTP 层错误类型
//! - [`AppResponse`] - API 响应结构
//! - 日志初始化与清理

pub mod error;
pub mod logger;
pub mod result;

pub use error::{AppError, AppResponse};
pub use result::AppResult;
