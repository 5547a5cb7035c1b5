// ==========================================
// 灌装线排产系统 - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: 灌装订单排产（计划员最终控制权）
// 形式: 排产状态为单一值，每个操作是一次显式状态转移
// ==========================================

// 初始化国际化系统
rust_i18n::i18n!("locales", fallback = "zh-CN");

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 快照持久化
pub mod repository;

// 引擎层 - 业务规则
pub mod engine;

// 导入层 - 主数据文件
pub mod importer;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// 国际化
pub mod i18n;

// API 层 - 业务接口
pub mod api;

// 应用层 - 资源组装
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{HistoryEntryType, MasterDataKind, PackSize, ProductionStatus};

// 领域实体
pub use domain::{
    HistoryEntry, MasterData, Order, ScheduleState, SnapshotDocument, StirrerAssignment,
};

// 引擎
pub use engine::{EngineConfig, ScheduleEngine, ScheduleError, Transition};

// API
pub use api::{ActionResponse, ApiError, ApiResult, ScheduleApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "灌装线排产系统";
