// ==========================================
// 灌装线排产系统 - API层错误类型
// ==========================================
// 职责: 定义API层错误类型，统一引擎/仓储/导入错误
// 要求: 所有错误信息必须包含显式原因
// ==========================================

use crate::engine::error::ScheduleError;
use crate::importer::error::ImportError;
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 排产领域错误（透传引擎错误）
    // ==========================================
    #[error(transparent)]
    Schedule(#[from] ScheduleError),

    // ==========================================
    // 业务输入错误
    // ==========================================
    #[error("无效输入: {0}")]
    InvalidInput(String),

    // ==========================================
    // 数据访问错误
    // ==========================================
    #[error("数据库错误: {0}")]
    DatabaseError(String),

    #[error("数据库连接失败: {0}")]
    DatabaseConnectionError(String),

    // ==========================================
    // 导入错误
    // ==========================================
    #[error("文件导入失败: {0}")]
    ImportError(String),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ApiError {
    /// 错误类别（对外响应的 errorKind）
    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::Schedule(e) => e.kind(),
            ApiError::InvalidInput(_) => "InvalidInput",
            ApiError::DatabaseError(_) | ApiError::DatabaseConnectionError(_) => "Database",
            ApiError::ImportError(_) => "ImportFailed",
            ApiError::InternalError(_) | ApiError::Other(_) => "Internal",
        }
    }
}

// ==========================================
// 从 RepositoryError 转换
// 目的: 将Repository层的技术错误转换为用户友好的错误
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::LockError(msg) => {
                ApiError::DatabaseConnectionError(format!("数据库锁获取失败: {}", msg))
            }
            RepositoryError::DatabaseConnectionError(msg) => ApiError::DatabaseConnectionError(msg),
            RepositoryError::DatabaseBusy(msg) => {
                ApiError::DatabaseConnectionError(format!("数据库繁忙，请稍后重试: {}", msg))
            }
            RepositoryError::SnapshotDecode { .. } => {
                ApiError::Schedule(ScheduleError::ImportMalformed(err.to_string()))
            }
            RepositoryError::SnapshotEncode(e) => {
                ApiError::InternalError(format!("快照序列化失败: {}", e))
            }
            RepositoryError::DatabaseQueryError(msg) => ApiError::DatabaseError(msg),
        }
    }
}

// ==========================================
// 从 ImportError 转换
// ==========================================
impl From<ImportError> for ApiError {
    fn from(err: ImportError) -> Self {
        ApiError::ImportError(err.to_string())
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;
