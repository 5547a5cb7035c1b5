// ==========================================
// 灌装线排产系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型、状态值
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod history;
pub mod master_data;
pub mod meta;
pub mod order;
pub mod snapshot;
pub mod state;
pub mod stirrer;
pub mod types;

// 重导出核心类型
pub use history::HistoryEntry;
pub use master_data::{Line, MasterData, Product, Stirrer};
pub use meta::{AppMeta, PlanningPreferences, TimelineSettings, TimelineSettingsPatch};
pub use order::{CreateOrderInput, Order, OrderPatch, SplitMode};
pub use snapshot::{ImportRepairs, SnapshotDocument};
pub use state::ScheduleState;
pub use stirrer::{ConflictNotice, IstUpdate, ProgressReport, StirrerAssignment, StirrerConflict};
pub use types::{HistoryEntryType, MasterDataKind, PackSize, ProductionStatus};
