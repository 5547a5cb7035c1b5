// ==========================================
// 灌装线排产系统 - 引擎层
// ==========================================
// 职责: 时间计算 / 订单号分配 / 冲突检测 / 排产状态转移
// 红线: Engine 不拼 SQL, 不读写文件
// ==========================================

pub mod conflict;
pub mod context;
pub mod error;
pub mod line_sequence;
pub mod order_number;
pub mod schedule;
pub mod timing;

// 重导出核心引擎
pub use conflict::{build_notice, find_blocking_assignment, find_stirrer_conflicts};
pub use context::{Clock, FixedClock, IdGenerator, SequenceIdGenerator, SystemClock, UuidGenerator};
pub use error::{EngineResult, ScheduleError};
pub use order_number::{next_order_number, next_order_number_with};
pub use schedule::{
    EngineConfig, ImportOutcome, MasterDataReplaced, OrderCreated, OrderUpdated,
    ProgressOutcome, ReflowOutcome, ScheduleEngine, SplitOutcome, Transition,
};
pub use timing::{compute_timing, effective_fill_rate, overlaps, OrderTiming};
