// ==========================================
// 灌装线排产系统 - 排产状态（单一值）
// ==========================================
// 职责: 承载全部可变状态，序列化即为导出快照格式
// 红线: 每个订单ID在其所属灌装线序列中恰好出现一次
// 红线: 每个订单最多一条搅拌器分配
// ==========================================

use crate::domain::history::HistoryEntry;
use crate::domain::master_data::MasterData;
use crate::domain::meta::AppMeta;
use crate::domain::order::Order;
use crate::domain::stirrer::{ConflictNotice, IstUpdate, StirrerAssignment};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

// ==========================================
// ScheduleState - 排产状态
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleState {
    pub master_data: MasterData,
    pub orders: Vec<Order>,
    pub assignments: Vec<StirrerAssignment>,
    /// 最新在前
    pub ist_updates: Vec<IstUpdate>,
    /// 按时间追加（最早在前）
    /// 最新在前
    pub history: Vec<HistoryEntry>,
    pub meta: AppMeta,
    /// 灌装线ID → 订单ID序列
    pub line_order_map: BTreeMap<String, Vec<String>>,

    /// 提示性冲突（不进入快照）
    #[serde(skip)]
    pub conflict_notice: Option<ConflictNotice>,
}

impl ScheduleState {
    /// 使用初始主数据创建空工作区
    pub fn seeded() -> Self {
        Self {
            master_data: MasterData::seed(),
            ..Default::default()
        }
    }

    pub fn find_order(&self, order_id: &str) -> Option<&Order> {
        self.orders.iter().find(|o| o.id == order_id)
    }

    pub fn find_order_mut(&mut self, order_id: &str) -> Option<&mut Order> {
        self.orders.iter_mut().find(|o| o.id == order_id)
    }

    pub fn find_assignment(&self, order_id: &str) -> Option<&StirrerAssignment> {
        self.assignments.iter().find(|a| a.order_id == order_id)
    }

    /// 订单号是否已被使用（含已删除订单）
    pub fn is_order_number_used(&self, order_no: &str) -> bool {
        self.meta.used_order_numbers.contains(order_no)
            || self.orders.iter().any(|o| o.order_no == order_no)
    }

    /// 重新推导灌装线序列
    ///
    /// 保留原序列中仍属于该线的订单（去重），
    /// 再按订单集合顺序追加尚未出现的订单
    pub fn rederive_line_order_map(&mut self) {
        let mut rebuilt: BTreeMap<String, Vec<String>> = BTreeMap::new();
        let mut placed: HashSet<String> = HashSet::new();

        for (line_id, ids) in &self.line_order_map {
            for id in ids {
                let belongs = self
                    .orders
                    .iter()
                    .any(|o| &o.id == id && &o.line_id == line_id);
                if belongs && placed.insert(id.clone()) {
                    rebuilt.entry(line_id.clone()).or_default().push(id.clone());
                }
            }
        }

        for order in &self.orders {
            if placed.insert(order.id.clone()) {
                rebuilt
                    .entry(order.line_id.clone())
                    .or_default()
                    .push(order.id.clone());
            }
        }

        self.line_order_map = rebuilt;
    }

    /// 按序列顺序列出某条线上的订单
    pub fn orders_on_line(&self, line_id: &str) -> Vec<&Order> {
        self.line_order_map
            .get(line_id)
            .map(|ids| ids.iter().filter_map(|id| self.find_order(id)).collect())
            .unwrap_or_default()
    }

    /// 某台搅拌器的分配（按开始时间排序）
    pub fn assignments_for_stirrer(&self, rw_id: &str) -> Vec<&StirrerAssignment> {
        let mut list: Vec<&StirrerAssignment> =
            self.assignments.iter().filter(|a| a.rw_id == rw_id).collect();
        list.sort_by_key(|a| a.rw_start);
        list
    }

    /// 最近的历史记录（history 本身即最新在前）
    pub fn recent_history(&self, limit: usize) -> Vec<&HistoryEntry> {
        self.history.iter().take(limit).collect()
    }

    /// 某订单的实绩记录（最新在前）
    pub fn ist_updates_for_order(&self, order_id: &str) -> Vec<&IstUpdate> {
        self.ist_updates
            .iter()
            .filter(|u| u.order_id == order_id)
            .collect()
    }
}
