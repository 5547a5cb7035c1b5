// ==========================================
// 灌装线排产系统 - 灌装订单领域模型
// ==========================================
// 红线: 时间窗字段(fill_end/make_start/make_end)为派生值
//       只能由时间计算引擎写入，不接受人工修改
// ==========================================

use crate::domain::types::PackSize;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// Order - 灌装订单
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    // ===== 标识 =====
    pub id: String,                    // 系统ID（稳定不变）
    pub order_no: String,              // 订单号（全局唯一，创建后不可变）

    // ===== 输入字段 =====
    pub product_id: String,            // 产品
    pub amount_l: f64,                 // 数量（升）
    pub pack_size_ml: PackSize,        // 包装规格
    pub line_id: String,               // 灌装线
    pub fill_start: DateTime<Utc>,     // 灌装开始

    // ===== 派生时间窗 =====
    pub fill_end: DateTime<Utc>,       // 灌装结束
    pub make_start: DateTime<Utc>,     // 搅拌开始
    pub make_end: DateTime<Utc>,       // 搅拌结束（= 灌装开始）

    // ===== 谱系 =====
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_order_id: Option<String>,   // 拆分来源订单
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub optional_order_ref: Option<String>, // 外部参考号

    // ===== 审计 =====
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// 搅拌器占用区间 [make_start, fill_end)
    pub fn stirrer_window(&self) -> (DateTime<Utc>, DateTime<Utc>) {
        (self.make_start, self.fill_end)
    }
}

// ==========================================
// CreateOrderInput - 新建订单输入
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderInput {
    pub product_id: String,
    pub amount_l: f64,
    pub pack_size_ml: PackSize,
    /// 为空时使用工作区配置的默认灌装线
    #[serde(default)]
    pub line_id: String,
    pub fill_start: DateTime<Utc>,
    /// 为空时自动分配
    #[serde(default)]
    pub order_no: Option<String>,
    #[serde(default)]
    pub optional_order_ref: Option<String>,
    #[serde(default)]
    pub parent_order_id: Option<String>,
}

// ==========================================
// OrderPatch - 订单修改（仅覆盖给定字段）
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OrderPatch {
    pub product_id: Option<String>,
    pub line_id: Option<String>,
    pub amount_l: Option<f64>,
    pub pack_size_ml: Option<PackSize>,
    pub fill_start: Option<DateTime<Utc>>,
    /// 空字符串表示清除
    pub optional_order_ref: Option<String>,
    /// 订单号不可修改；仅允许与现值相同
    pub order_no: Option<String>,
}

impl OrderPatch {
    /// 是否包含任何会影响时间窗的字段
    pub fn touches_timing(&self) -> bool {
        self.product_id.is_some()
            || self.line_id.is_some()
            || self.amount_l.is_some()
            || self.pack_size_ml.is_some()
            || self.fill_start.is_some()
    }
}

// ==========================================
// SplitMode - 拆分方式
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SplitMode {
    /// 等分为 parts 份
    Parts { parts: u32 },
    /// 按给定数量拆分
    Amounts { amounts: Vec<f64> },
}
