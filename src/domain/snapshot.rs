// ==========================================
// 灌装线排产系统 - 快照文档（导入解析）
// ==========================================
// 职责: 解析外部快照 JSON，兼容旧版字段，修复派生数据
// 红线: masterData / orders 必须存在，其余键缺省为空
// 红线: 导入后灌装线序列一律由订单重新推导
// ==========================================

use crate::domain::history::HistoryEntry;
use crate::domain::master_data::MasterData;
use crate::domain::meta::AppMeta;
use crate::domain::order::Order;
use crate::domain::state::ScheduleState;
use crate::domain::stirrer::{IstUpdate, StirrerAssignment};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

// ==========================================
// SnapshotDocument - 快照文档
// ==========================================
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotDocument {
    pub master_data: MasterData,
    pub orders: Vec<Order>,
    #[serde(default)]
    pub assignments: Option<Vec<StirrerAssignment>>,
    #[serde(default)]
    pub ist_updates: Option<Vec<IstUpdate>>,
    #[serde(default)]
    pub history: Option<Vec<HistoryEntry>>,
    #[serde(default)]
    pub meta: Option<AppMeta>,
    #[serde(default)]
    pub line_order_map: Option<BTreeMap<String, Vec<String>>>,
    /// 旧版（v1）放在顶层的已用订单号
    #[serde(default)]
    pub used_order_numbers: Option<Vec<String>>,
}

// ==========================================
// ImportRepairs - 导入时的修复统计
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportRepairs {
    /// 指向不存在订单的分配（已丢弃）
    pub dropped_assignments: usize,
    /// 同一订单的重复分配（保留最后一条）
    pub duplicate_assignments: usize,
}

impl ImportRepairs {
    pub fn is_empty(&self) -> bool {
        self.dropped_assignments == 0 && self.duplicate_assignments == 0
    }
}

impl SnapshotDocument {
    /// 解析 JSON 文本
    ///
    /// 结构错误以 `Err(String)` 返回，由调用方转换为领域错误
    pub fn parse(json: &str) -> Result<Self, String> {
        let doc: SnapshotDocument =
            serde_json::from_str(json).map_err(|e| format!("快照JSON无效: {}", e))?;
        doc.validate()?;
        Ok(doc)
    }

    /// 从已解析的 JSON 值构造
    pub fn from_value(value: serde_json::Value) -> Result<Self, String> {
        let doc: SnapshotDocument =
            serde_json::from_value(value).map_err(|e| format!("快照结构无效: {}", e))?;
        doc.validate()?;
        Ok(doc)
    }

    /// 订单ID与订单号必须唯一
    fn validate(&self) -> Result<(), String> {
        let mut ids = HashSet::new();
        let mut numbers = HashSet::new();
        for order in &self.orders {
            if !ids.insert(order.id.as_str()) {
                return Err(format!("订单ID重复: {}", order.id));
            }
            if !numbers.insert(order.order_no.as_str()) {
                return Err(format!("订单号重复: {}", order.order_no));
            }
        }
        Ok(())
    }

    /// 转换为排产状态
    ///
    /// - 已用订单号 = meta ∪ 旧版顶层 ∪ 现存订单号
    /// - 丢弃指向不存在订单的分配；实绩记录原样保留
    /// - 重新推导灌装线序列（保留文档中的有效顺序）
    /// - 历史与实绩按时间排为最新在前（同一时刻保持文档顺序）
    pub fn into_state(self) -> (ScheduleState, ImportRepairs) {
        let mut meta = self.meta.unwrap_or_default();
        if let Some(legacy) = self.used_order_numbers {
            meta.used_order_numbers.extend(legacy);
        }
        meta.used_order_numbers
            .extend(self.orders.iter().map(|o| o.order_no.clone()));

        let mut repairs = ImportRepairs::default();
        let order_ids: HashSet<&str> = self.orders.iter().map(|o| o.id.as_str()).collect();

        let mut assignments: Vec<StirrerAssignment> = Vec::new();
        for assignment in self.assignments.unwrap_or_default() {
            if !order_ids.contains(assignment.order_id.as_str()) {
                repairs.dropped_assignments += 1;
                continue;
            }
            if let Some(pos) = assignments
                .iter()
                .position(|a| a.order_id == assignment.order_id)
            {
                repairs.duplicate_assignments += 1;
                assignments.remove(pos);
            }
            assignments.push(assignment);
        }

        let mut history = self.history.unwrap_or_default();
        history.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        let mut ist_updates = self.ist_updates.unwrap_or_default();
        ist_updates.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

        let mut state = ScheduleState {
            master_data: self.master_data,
            orders: self.orders,
            assignments,
            ist_updates,
            history,
            meta,
            line_order_map: self.line_order_map.unwrap_or_default(),
            conflict_notice: None,
        };
        state.rederive_line_order_map();

        (state, repairs)
    }
}
