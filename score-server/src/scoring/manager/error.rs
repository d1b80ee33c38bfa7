use super::super::storage::StorageError;
use super::super::traits::MatchError;
use shared::scoring::{CommandError, CommandErrorCode};
use thiserror::Error;

/// Manager errors
#[derive(Debug, Error)]
pub enum ManagerError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Match not found: {0}")]
    MatchNotFound(String),

    /// Command rejected by a match invariant
    #[error(transparent)]
    Rejected(MatchError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ManagerError {
    /// Wire code without logging side effects
    pub fn code(&self) -> CommandErrorCode {
        match self {
            ManagerError::Storage(e) => classify_storage_error(e),
            ManagerError::MatchNotFound(_) => CommandErrorCode::MatchNotFound,
            ManagerError::Rejected(e) => e.code(),
            ManagerError::Internal(_) => CommandErrorCode::InternalError,
        }
    }
}

/// 将存储错误转换为错误码
fn classify_storage_error(e: &StorageError) -> CommandErrorCode {
    if let StorageError::Serialization(_) = e {
        return CommandErrorCode::InternalError;
    }

    // redb 错误通过字符串匹配分类
    let err_str = e.to_string().to_lowercase();

    if err_str.contains("no space") || err_str.contains("disk full") || err_str.contains("enospc")
    {
        return CommandErrorCode::StorageFull;
    }

    if err_str.contains("corrupt") || err_str.contains("invalid database") {
        return CommandErrorCode::StorageCorrupted;
    }

    // 默认：系统繁忙（redb 的 Database/Transaction/Table/Storage/Commit 错误）
    CommandErrorCode::SystemBusy
}

impl From<ManagerError> for CommandError {
    fn from(err: ManagerError) -> Self {
        let code = err.code();
        let message = match err {
            ManagerError::Storage(e) => {
                tracing::error!(error = %e, error_code = ?code, "Storage error occurred");
                e.to_string()
            }
            ManagerError::MatchNotFound(id) => format!("Match not found: {}", id),
            ManagerError::Rejected(e) => e.to_string(),
            ManagerError::Internal(msg) => msg,
        };
        CommandError::new(code, message)
    }
}

impl From<MatchError> for ManagerError {
    fn from(err: MatchError) -> Self {
        match err {
            MatchError::Storage(e) => ManagerError::Storage(e),
            MatchError::MatchNotFound(id) => ManagerError::MatchNotFound(id),
            other => ManagerError::Rejected(other),
        }
    }
}

pub type ManagerResult<T> = Result<T, ManagerError>;
