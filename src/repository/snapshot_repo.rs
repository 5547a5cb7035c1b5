// ==========================================
// 灌装线排产系统 - 工作区快照仓储
// ==========================================
// 职责: 整体快照 JSON 的持久化（app_snapshot 表）
// 格式版本:
//   v1 - 已用订单号位于顶层 usedOrderNumbers
//   v2 - 已用订单号位于 meta.usedOrderNumbers（当前）
// 红线: Repository 不含业务逻辑
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::snapshot::SnapshotDocument;
use crate::domain::state::ScheduleState;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use serde_json::{json, Value as JsonValue};
use std::sync::{Arc, Mutex};

/// 当前快照格式版本
pub const CURRENT_SNAPSHOT_FORMAT: i64 = 2;

/// 默认快照键
pub const DEFAULT_SNAPSHOT_KEY: &str = "rms-light-state";

// ==========================================
// SnapshotRepository - 快照仓储
// ==========================================
pub struct SnapshotRepository {
    conn: Arc<Mutex<Connection>>,
    snapshot_key: String,
}

impl SnapshotRepository {
    /// 创建新的 SnapshotRepository 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        Ok(Self::from_connection(Arc::new(Mutex::new(conn))))
    }

    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self {
            conn,
            snapshot_key: DEFAULT_SNAPSHOT_KEY.to_string(),
        }
    }

    /// 使用自定义快照键（同一数据库保存多个工作区）
    pub fn with_key(mut self, snapshot_key: &str) -> Self {
        self.snapshot_key = snapshot_key.to_string();
        self
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 保存快照（INSERT OR REPLACE）
    pub fn save(&self, state: &ScheduleState) -> RepositoryResult<()> {
        let payload = serde_json::to_string(state)?;
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT OR REPLACE INTO app_snapshot (
                snapshot_key, format_version, payload_json, updated_at
            ) VALUES (?1, ?2, ?3, ?4)
            "#,
            params![
                self.snapshot_key,
                CURRENT_SNAPSHOT_FORMAT,
                payload,
                Utc::now().to_rfc3339(),
            ],
        )?;
        tracing::debug!(key = %self.snapshot_key, bytes = payload.len(), "快照已保存");
        Ok(())
    }

    /// 读取原始快照（格式版本 + JSON）
    pub fn load_raw(&self) -> RepositoryResult<Option<(i64, String)>> {
        let conn = self.get_conn()?;
        let row = conn
            .query_row(
                "SELECT format_version, payload_json FROM app_snapshot WHERE snapshot_key = ?1",
                params![self.snapshot_key],
                |row| Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?)),
            )
            .optional()?;
        Ok(row)
    }

    /// 读取并解析快照（必要时迁移旧格式）
    ///
    /// # 返回
    /// - Ok(None): 尚未保存过快照
    /// - Err(SnapshotDecode): 快照存在但无法解析
    pub fn load(&self) -> RepositoryResult<Option<ScheduleState>> {
        let Some((format_version, payload)) = self.load_raw()? else {
            return Ok(None);
        };

        let decode_err = |message: String| RepositoryError::SnapshotDecode {
            format_version,
            message,
        };

        if format_version > CURRENT_SNAPSHOT_FORMAT {
            return Err(decode_err(format!(
                "不支持的快照格式版本（当前支持 {}）",
                CURRENT_SNAPSHOT_FORMAT
            )));
        }

        let mut value: JsonValue =
            serde_json::from_str(&payload).map_err(|e| decode_err(e.to_string()))?;
        if format_version < CURRENT_SNAPSHOT_FORMAT {
            tracing::info!(from = format_version, to = CURRENT_SNAPSHOT_FORMAT, "迁移旧版快照");
            value = migrate_v1(value);
        }

        let (state, repairs) = SnapshotDocument::from_value(value)
            .map_err(decode_err)?
            .into_state();
        if !repairs.is_empty() {
            tracing::warn!(?repairs, "加载快照时修复了搅拌器分配");
        }
        Ok(Some(state))
    }

    /// 删除快照，返回是否存在
    pub fn delete(&self) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            "DELETE FROM app_snapshot WHERE snapshot_key = ?1",
            params![self.snapshot_key],
        )?;
        Ok(affected > 0)
    }
}

/// v1 → v2: 顶层 usedOrderNumbers 并入 meta.usedOrderNumbers
fn migrate_v1(mut value: JsonValue) -> JsonValue {
    let Some(root) = value.as_object_mut() else {
        return value;
    };
    let legacy = root.remove("usedOrderNumbers");
    let meta = root.entry("meta").or_insert_with(|| json!({}));
    if meta.is_null() {
        *meta = json!({});
    }
    if let (Some(meta), Some(legacy)) = (meta.as_object_mut(), legacy) {
        if !meta.contains_key("usedOrderNumbers") {
            meta.insert("usedOrderNumbers".to_string(), legacy);
        }
    }
    value
}
