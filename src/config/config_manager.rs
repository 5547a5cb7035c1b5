// ==========================================
// 灌装线排产系统 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: config_kv 表 (key-value + scope)
// ==========================================

use crate::db::open_sqlite_connection;
use crate::engine::EngineConfig;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension};
use serde_json::json;
use std::collections::BTreeMap;
use std::str::FromStr;
use std::sync::{Arc, Mutex};

pub use crate::i18n::DEFAULT_LOCALE;

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：为保证连接行为一致，会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> RepositoryResult<Self> {
        {
            let conn_guard = conn
                .lock()
                .map_err(|e| RepositoryError::LockError(e.to_string()))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 读取 global scope 的配置值
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    pub fn get_global_config_value(&self, key: &str) -> RepositoryResult<Option<String>> {
        let conn = self.get_conn()?;
        let value = conn
            .query_row(
                "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    /// 写入 global scope 的配置值（UPSERT）
    pub fn set_global_config_value(&self, key: &str, value: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value, updated_at) VALUES ('global', ?1, ?2, datetime('now'))
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2, updated_at = datetime('now')",
            params![key, value],
        )?;
        tracing::info!(key, value, "配置已更新");
        Ok(())
    }

    /// 读取配置值，带默认值
    fn get_config_or_default(&self, key: &str, default: &str) -> RepositoryResult<String> {
        Ok(self
            .get_global_config_value(key)?
            .unwrap_or_else(|| default.to_string()))
    }

    /// 读取并解析配置值；格式错误时告警并回退默认值
    fn get_parsed_or_default<T>(&self, key: &str, default: T) -> RepositoryResult<T>
    where
        T: FromStr + Copy + std::fmt::Display,
    {
        match self.get_global_config_value(key)? {
            None => Ok(default),
            Some(raw) => match raw.trim().parse::<T>() {
                Ok(v) => Ok(v),
                Err(_) => {
                    tracing::warn!(key, raw = %raw, default = %default, "配置值格式错误，使用默认值");
                    Ok(default)
                }
            },
        }
    }

    /// 获取所有配置的快照（JSON格式）
    pub fn get_config_snapshot(&self) -> RepositoryResult<String> {
        let conn = self.get_conn()?;

        let mut stmt =
            conn.prepare("SELECT key, value FROM config_kv WHERE scope_id = 'global' ORDER BY key")?;

        let mut config_map: BTreeMap<String, String> = BTreeMap::new();
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        for row in rows {
            let (key, value) = row?;
            config_map.insert(key, value);
        }

        Ok(serde_json::to_string(&json!(config_map))?)
    }

    // ===== 订单号 =====

    pub fn get_order_no_prefix(&self) -> RepositoryResult<String> {
        let prefix = self.get_config_or_default(
            config_keys::ORDER_NO_PREFIX,
            crate::engine::order_number::DEFAULT_ORDER_NO_PREFIX,
        )?;
        let prefix = prefix.trim();
        if prefix.is_empty() {
            tracing::warn!("订单号前缀为空，使用默认值");
            return Ok(crate::engine::order_number::DEFAULT_ORDER_NO_PREFIX.to_string());
        }
        Ok(prefix.to_string())
    }

    pub fn get_order_no_width(&self) -> RepositoryResult<usize> {
        let width = self.get_parsed_or_default(
            config_keys::ORDER_NO_WIDTH,
            crate::engine::order_number::DEFAULT_ORDER_NO_WIDTH,
        )?;
        Ok(width.clamp(1, 12))
    }

    // ===== 拆分 =====

    pub fn get_split_tolerance_l(&self) -> RepositoryResult<f64> {
        let tolerance = self.get_parsed_or_default(config_keys::SPLIT_TOLERANCE_L, 0.01_f64)?;
        if !tolerance.is_finite() || tolerance < 0.0 {
            tracing::warn!(tolerance, "拆分容差无效，使用默认值");
            return Ok(0.01);
        }
        Ok(tolerance)
    }

    // ===== 界面 =====

    pub fn get_locale(&self) -> RepositoryResult<String> {
        self.get_config_or_default(config_keys::LOCALE, DEFAULT_LOCALE)
    }

    /// 组装引擎配置
    pub fn load_engine_config(&self) -> RepositoryResult<EngineConfig> {
        Ok(EngineConfig {
            order_no_prefix: self.get_order_no_prefix()?,
            order_no_width: self.get_order_no_width()?,
            split_tolerance_l: self.get_split_tolerance_l()?,
        })
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 订单号
    pub const ORDER_NO_PREFIX: &str = "order_no_prefix";
    pub const ORDER_NO_WIDTH: &str = "order_no_width";

    // 拆分
    pub const SPLIT_TOLERANCE_L: &str = "split_tolerance_l";

    // 界面语言
    pub const LOCALE: &str = "locale";
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::ensure_schema;

    fn manager() -> ConfigManager {
        let conn = Connection::open_in_memory().unwrap();
        ensure_schema(&conn).unwrap();
        ConfigManager::from_connection(Arc::new(Mutex::new(conn))).unwrap()
    }

    #[test]
    fn test_defaults_without_rows() {
        let config = manager().load_engine_config().unwrap();
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn test_upsert_and_read() {
        let manager = manager();
        manager.set_global_config_value(config_keys::ORDER_NO_PREFIX, "FA").unwrap();
        manager.set_global_config_value(config_keys::ORDER_NO_WIDTH, "3").unwrap();
        manager.set_global_config_value(config_keys::ORDER_NO_WIDTH, "4").unwrap();

        let config = manager.load_engine_config().unwrap();
        assert_eq!(config.order_no_prefix, "FA");
        assert_eq!(config.order_no_width, 4);

        let snapshot: serde_json::Value =
            serde_json::from_str(&manager.get_config_snapshot().unwrap()).unwrap();
        assert_eq!(snapshot["order_no_width"], json!("4"));
    }

    #[test]
    fn test_malformed_values_fall_back() {
        let manager = manager();
        manager.set_global_config_value(config_keys::ORDER_NO_WIDTH, "abc").unwrap();
        manager.set_global_config_value(config_keys::SPLIT_TOLERANCE_L, "-1").unwrap();
        let config = manager.load_engine_config().unwrap();
        assert_eq!(config.order_no_width, 5);
        assert_eq!(config.split_tolerance_l, 0.01);
    }
}
