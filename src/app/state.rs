// ==========================================
// 灌装线排产系统 - 应用状态
// ==========================================
// 职责: 管理应用级别的共享资源（数据库连接、配置、排产API）
// ==========================================

use std::sync::{Arc, Mutex};

use crate::api::ScheduleApi;
use crate::config::config_manager::ConfigManager;
use crate::db::{ensure_schema, open_sqlite_connection};
use crate::domain::state::ScheduleState;
use crate::engine::context::{SystemClock, UuidGenerator};
use crate::engine::schedule::ScheduleEngine;
use crate::i18n;
use crate::repository::snapshot_repo::SnapshotRepository;

/// 应用状态
///
/// 启动时加载已保存的快照；没有快照时使用种子主数据
pub struct AppState {
    /// 数据库路径
    pub db_path: String,

    /// 系统配置
    pub config_manager: Arc<ConfigManager>,

    /// 快照仓储
    pub snapshot_repo: Arc<SnapshotRepository>,

    /// 排产API
    pub schedule_api: Arc<ScheduleApi>,
}

impl AppState {
    /// 创建新的AppState实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    ///
    /// # 返回
    /// - Ok(AppState): 初始化成功
    /// - Err(String): 初始化失败（错误信息）
    pub fn new(db_path: String) -> Result<Self, String> {
        tracing::info!("初始化AppState，数据库路径: {}", db_path);

        let conn = open_sqlite_connection(&db_path).map_err(|e| format!("无法打开数据库: {}", e))?;
        ensure_schema(&conn).map_err(|e| format!("数据库表结构初始化失败: {}", e))?;
        let conn = Arc::new(Mutex::new(conn));

        // ==========================================
        // 配置
        // ==========================================
        let config_manager = Arc::new(
            ConfigManager::from_connection(conn.clone())
                .map_err(|e| format!("无法创建ConfigManager: {}", e))?,
        );

        match config_manager.get_locale() {
            Ok(locale) => {
                let effective = i18n::set_locale(&locale);
                tracing::debug!(locale = effective, "界面语言已设置");
            }
            Err(e) => tracing::warn!("读取语言配置失败(使用默认语言): {}", e),
        }

        let engine_config = config_manager
            .load_engine_config()
            .map_err(|e| format!("读取引擎配置失败: {}", e))?;
        tracing::debug!(?engine_config, "引擎配置已加载");

        // ==========================================
        // 快照
        // ==========================================
        let snapshot_repo = Arc::new(SnapshotRepository::from_connection(conn));
        let initial_state = match snapshot_repo.load() {
            Ok(Some(state)) => {
                tracing::info!(orders = state.orders.len(), "已加载保存的排产快照");
                state
            }
            Ok(None) => {
                tracing::info!("未找到排产快照，使用初始主数据");
                ScheduleState::seeded()
            }
            Err(e) => return Err(format!("排产快照加载失败: {}", e)),
        };

        let engine = ScheduleEngine::new(
            Arc::new(SystemClock),
            Arc::new(UuidGenerator),
            engine_config,
        );
        let schedule_api = Arc::new(ScheduleApi::new(
            engine,
            initial_state,
            Some(snapshot_repo.clone()),
        ));

        tracing::info!("AppState初始化完成");

        Ok(Self {
            db_path,
            config_manager,
            snapshot_repo,
            schedule_api,
        })
    }
}

/// 获取默认数据库路径
///
/// 优先级: 环境变量 APP_DB_PATH > 用户数据目录 > 当前目录
pub fn get_default_db_path() -> String {
    use std::path::PathBuf;

    // 允许通过环境变量显式指定 DB 路径（便于调试/测试/CI）
    if let Ok(path) = std::env::var("APP_DB_PATH") {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./fill_line_aps.db");

    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join("fill-line-aps");
        // 目录创建失败时退回当前目录
        if std::fs::create_dir_all(&dir).is_ok() {
            path = dir.join("fill_line_aps.db");
        }
    }

    path.to_string_lossy().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order::CreateOrderInput;
    use crate::domain::types::PackSize;
    use chrono::{TimeZone, Utc};
    use tempfile::NamedTempFile;

    #[test]
    fn test_state_survives_restart() {
        let file = NamedTempFile::new().unwrap();
        let db_path = file.path().to_string_lossy().to_string();

        let app = AppState::new(db_path.clone()).unwrap();
        let created = app
            .schedule_api
            .create_order(CreateOrderInput {
                product_id: "P-100".to_string(),
                amount_l: 1000.0,
                pack_size_ml: PackSize::Ml1000,
                line_id: "L1".to_string(),
                fill_start: Utc.with_ymd_and_hms(2024, 3, 4, 8, 0, 0).unwrap(),
                order_no: None,
                optional_order_ref: None,
                parent_order_id: None,
            })
            .unwrap();
        drop(app);

        let reopened = AppState::new(db_path).unwrap();
        let state = reopened.schedule_api.current_state().unwrap();
        assert_eq!(state.orders.len(), 1);
        assert_eq!(state.orders[0].order_no, created.order.order_no);
        assert!(state.meta.used_order_numbers.contains(&created.order.order_no));
    }
}
