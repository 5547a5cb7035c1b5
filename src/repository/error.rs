// ==========================================
// 灌装线排产系统 - 仓储层错误类型
// ==========================================
// 覆盖: SQLite 访问 / 连接锁 / 快照编解码
// ==========================================

use rusqlite::ErrorCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RepositoryError {
    // ===== 数据库 =====
    #[error("数据库打开失败: {0}")]
    DatabaseConnectionError(String),

    /// busy_timeout 耗尽仍未拿到 SQLite 写锁
    #[error("数据库繁忙: {0}")]
    DatabaseBusy(String),

    #[error("数据库锁获取失败: {0}")]
    LockError(String),

    #[error("数据库查询失败: {0}")]
    DatabaseQueryError(String),

    // ===== 快照 =====
    #[error("快照解析失败 (format_version={format_version}): {message}")]
    SnapshotDecode { format_version: i64, message: String },

    #[error("快照序列化失败: {0}")]
    SnapshotEncode(#[from] serde_json::Error),
}

impl From<rusqlite::Error> for RepositoryError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(code, msg) => {
                let detail = msg.clone().unwrap_or_else(|| code.to_string());
                match code.code {
                    ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked => {
                        RepositoryError::DatabaseBusy(detail)
                    }
                    ErrorCode::CannotOpen | ErrorCode::NotADatabase => {
                        RepositoryError::DatabaseConnectionError(detail)
                    }
                    _ => RepositoryError::DatabaseQueryError(detail),
                }
            }
            _ => RepositoryError::DatabaseQueryError(err.to_string()),
        }
    }
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn sqlite_failure(code: i32, msg: Option<&str>) -> rusqlite::Error {
        rusqlite::Error::SqliteFailure(rusqlite::ffi::Error::new(code), msg.map(str::to_string))
    }

    #[test]
    fn test_sqlite_error_mapping() {
        // SQLITE_BUSY = 5, SQLITE_CANTOPEN = 14, SQLITE_ERROR = 1
        let err: RepositoryError = sqlite_failure(5, Some("database is locked")).into();
        assert!(matches!(err, RepositoryError::DatabaseBusy(ref m) if m == "database is locked"));

        let err: RepositoryError = sqlite_failure(14, None).into();
        assert!(matches!(err, RepositoryError::DatabaseConnectionError(_)));

        let err: RepositoryError = sqlite_failure(1, Some("no such table: app_snapshot")).into();
        assert!(matches!(err, RepositoryError::DatabaseQueryError(_)));

        let err: RepositoryError = rusqlite::Error::QueryReturnedNoRows.into();
        assert!(matches!(err, RepositoryError::DatabaseQueryError(_)));
    }
}
