// ==========================================
// 灌装线排产系统 - 排产引擎
// ==========================================
// 职责: 订单登记 / 灌装线重排 / 搅拌器分配 / 订单拆分 / 快照导入
// 形式: (state, command) -> (state, result)
//   每个操作在状态副本上修改，成功才返回新状态；失败时原状态不变
// 红线: 派生时间窗只由 timing 模块写入
// 红线: 每个成功的写操作追加一条历史记录
// ==========================================

mod reflow;
mod registry;
mod snapshot;
mod split;
mod stirrer;
mod workspace;


pub use split::{split_shares, validate_shares, MAX_SPLIT_PARTS};
pub use workspace::MasterDataReplaced;

use crate::domain::history::HistoryEntry;
use crate::domain::order::Order;
use crate::domain::snapshot::ImportRepairs;
use crate::domain::state::ScheduleState;
use crate::domain::stirrer::{IstUpdate, StirrerAssignment, StirrerConflict};
use crate::domain::types::HistoryEntryType;
use crate::engine::conflict::{build_notice, find_stirrer_conflicts};
use crate::engine::context::{Clock, IdGenerator, SystemClock, UuidGenerator};
use crate::engine::order_number::{
    next_order_number_with, DEFAULT_ORDER_NO_PREFIX, DEFAULT_ORDER_NO_WIDTH,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

// ==========================================
// EngineConfig - 引擎配置
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub order_no_prefix: String,  // 订单号前缀: ORD
    pub order_no_width: usize,    // 序号位数: 5
    pub split_tolerance_l: f64,   // 拆分数量守恒容差: 0.01 升
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            order_no_prefix: DEFAULT_ORDER_NO_PREFIX.to_string(),
            order_no_width: DEFAULT_ORDER_NO_WIDTH,
            split_tolerance_l: 0.01,
        }
    }
}

// ==========================================
// Transition - 状态转移结果
// ==========================================
#[derive(Debug, Clone)]
pub struct Transition<T> {
    pub state: ScheduleState,
    pub output: T,
}

impl<T> Transition<T> {
    pub fn new(state: ScheduleState, output: T) -> Self {
        Self { state, output }
    }

    pub fn into_parts(self) -> (ScheduleState, T) {
        (self.state, self.output)
    }
}

// ==========================================
// 操作输出
// ==========================================

/// 新建订单结果
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderCreated {
    pub order: Order,
    /// 开启自动分配时绑定的搅拌器
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignment: Option<StirrerAssignment>,
}

/// 修改订单结果
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderUpdated {
    pub order: Order,
    /// 提示性冲突（不阻断）
    pub conflicts: Vec<StirrerConflict>,
}

/// 重排结果
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReflowOutcome {
    pub line_id: String,
    /// 重排后该线的完整序列
    pub order_ids: Vec<String>,
    /// 按链式规则重新计时的订单
    pub reflowed_order_ids: Vec<String>,
    /// 因主数据缺失或计时失败而跳过的订单
    pub skipped_order_ids: Vec<String>,
    pub conflicts: Vec<StirrerConflict>,
}

/// 拆分结果
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SplitOutcome {
    pub parent_order_id: String,
    pub children: Vec<Order>,
}

/// 实绩上报结果
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressOutcome {
    pub ist_update: IstUpdate,
    pub fill_end: DateTime<Utc>,
}

/// 导入结果
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportOutcome {
    pub order_count: usize,
    pub repairs: ImportRepairs,
}

// ==========================================
// ScheduleEngine - 排产引擎
// ==========================================
pub struct ScheduleEngine {
    clock: Arc<dyn Clock>,
    ids: Arc<dyn IdGenerator>,
    config: EngineConfig,
}

impl ScheduleEngine {
    /// 创建排产引擎
    ///
    /// # 参数
    /// - `clock`: 时钟（实绩上报、审计时间戳）
    /// - `ids`: 订单/历史/实绩ID生成器
    /// - `config`: 订单号格式与拆分容差
    pub fn new(clock: Arc<dyn Clock>, ids: Arc<dyn IdGenerator>, config: EngineConfig) -> Self {
        Self { clock, ids, config }
    }

    /// 系统时钟 + UUID + 默认配置
    pub fn with_defaults() -> Self {
        Self::new(
            Arc::new(SystemClock),
            Arc::new(UuidGenerator),
            EngineConfig::default(),
        )
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    // ==========================================
    // 内部辅助
    // ==========================================

    fn next_id(&self) -> String {
        self.ids.next_id()
    }

    fn allocate_order_number(&self, state: &ScheduleState) -> String {
        let mut used = state.meta.used_order_numbers.clone();
        used.extend(state.orders.iter().map(|o| o.order_no.clone()));
        next_order_number_with(&used, &self.config.order_no_prefix, self.config.order_no_width)
    }

    /// 追加历史记录
    fn record_history<P: Serialize>(
        &self,
        state: &mut ScheduleState,
        entry_type: HistoryEntryType,
        message: String,
        payload: &P,
    ) {
        let entry = HistoryEntry::new(self.next_id(), self.now(), entry_type, message)
            .with_payload(payload);
        // 最新在前，与快照文档顺序一致
        state.history.insert(0, entry);
    }

    /// 将订单的分配区间同步为 [make_start, fill_end)
    fn sync_assignment(state: &mut ScheduleState, order_id: &str) -> bool {
        let Some(order) = state.find_order(order_id) else {
            return false;
        };
        let (start, end) = order.stirrer_window();
        match state.assignments.iter_mut().find(|a| a.order_id == order_id) {
            Some(assignment) => {
                assignment.rw_start = start;
                assignment.rw_end = end;
                true
            }
            None => false,
        }
    }

    /// 重新扫描全部分配，刷新提示性冲突
    fn refresh_conflict_notice(&self, state: &mut ScheduleState) -> Vec<StirrerConflict> {
        let conflicts = find_stirrer_conflicts(&state.assignments, &state.orders);
        if !conflicts.is_empty() {
            tracing::warn!(count = conflicts.len(), "检测到搅拌器占用重叠");
        }
        state.conflict_notice = build_notice(conflicts.clone(), self.now());
        conflicts
    }
}
