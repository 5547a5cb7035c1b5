// ==========================================
// 灌装线排产系统 - 搅拌器分配与实绩领域模型
// ==========================================
// 红线: 同一搅拌器的占用区间 [rw_start, rw_end) 不得重叠
// 红线: 实绩(IST)记录只新增（插在最前），不改写
// ==========================================

use crate::domain::types::ProductionStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// StirrerAssignment - 搅拌器分配
// ==========================================
// 每个订单最多一条有效分配
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StirrerAssignment {
    pub order_id: String,
    pub rw_id: String,
    pub rw_start: DateTime<Utc>, // = order.make_start
    pub rw_end: DateTime<Utc>,   // = order.fill_end
}

// ==========================================
// IstUpdate - 实绩上报记录
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IstUpdate {
    pub id: String,
    pub order_id: String,
    pub rw_id: String,
    pub status: ProductionStatus,
    pub remaining_l: f64,
    pub filled_l: f64,
    pub timestamp: DateTime<Utc>,
}

// ==========================================
// ProgressReport - 实绩上报输入
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressReport {
    pub rw_id: String,
    pub order_id: String,
    pub status: ProductionStatus,
    #[serde(default)]
    pub remaining_l: Option<f64>,
    #[serde(default)]
    pub filled_l: Option<f64>,
}

// ==========================================
// StirrerConflict - 搅拌器占用重叠
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StirrerConflict {
    pub rw_id: String,
    pub first_order_id: String,
    pub first_order_no: String,
    pub second_order_id: String,
    pub second_order_no: String,
}

// ==========================================
// ConflictNotice - 提示性冲突（不阻断操作）
// ==========================================
// 由重排/修改产生，需用户显式确认清除
// 与 assign_stirrer 的阻断性冲突是两条独立通道
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConflictNotice {
    pub message: String,
    pub conflicts: Vec<StirrerConflict>,
    pub raised_at: DateTime<Utc>,
}
