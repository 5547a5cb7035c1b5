// ==========================================
// 灌装线排产系统 - 时间计算引擎
// ==========================================
// 职责: 数量 + 速率 → 时长 → 时间窗端点；区间重叠判定
// 公式:
//   fill_end   = fill_start + amount / (rate[pack] * fill_factor)
//   make_start = fill_start - amount * make_time_min_per_l
//   make_end   = fill_start
// 红线: 纯函数，不读时钟，不改状态
// ==========================================

use crate::domain::master_data::{Line, MasterData, Product};
use crate::domain::order::Order;
use crate::domain::types::PackSize;
use crate::engine::error::{EngineResult, ScheduleError};
use chrono::{DateTime, TimeDelta, Utc};

// ==========================================
// OrderTiming - 派生时间窗
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderTiming {
    pub fill_end: DateTime<Utc>,
    pub make_start: DateTime<Utc>,
    pub make_end: DateTime<Utc>,
}

impl OrderTiming {
    /// 写回订单的派生字段
    pub fn apply_to(&self, order: &mut Order) {
        order.fill_end = self.fill_end;
        order.make_start = self.make_start;
        order.make_end = self.make_end;
    }
}

/// 分钟数 → 时长（毫秒精度，四舍五入）
///
/// 负数、非有限值或溢出返回 None
pub fn minutes_to_duration(minutes: f64) -> Option<TimeDelta> {
    if !minutes.is_finite() || minutes < 0.0 {
        return None;
    }
    let ms = (minutes * 60_000.0).round();
    if ms > i64::MAX as f64 {
        return None;
    }
    TimeDelta::try_milliseconds(ms as i64)
}

/// 有效灌装速率（升/分钟）= 线速率 × 产品系数
pub fn effective_fill_rate(product: &Product, line: &Line, pack_size: PackSize) -> EngineResult<f64> {
    let rate = match line.fill_rate(pack_size) {
        Some(rate) if rate.is_finite() && rate > 0.0 => rate,
        _ => {
            return Err(ScheduleError::InvalidRate(format!(
                "灌装线 {} 未配置 {} 的有效速率",
                line.line_id, pack_size
            )))
        }
    };

    let effective = rate * product.effective_fill_factor();
    if !effective.is_finite() || effective <= 0.0 {
        return Err(ScheduleError::InvalidRate(format!(
            "产品 {} 在灌装线 {} 的有效速率非正: {}",
            product.product_id, line.line_id, effective
        )));
    }
    Ok(effective)
}

/// 计算订单时间窗
///
/// # 错误
/// - InvalidAmount: 数量非正/非有限，或灌装时长舍入为 0
/// - InvalidRate: 速率缺失/非正，或每升搅拌时间为负/非有限
pub fn compute_timing(
    product: &Product,
    line: &Line,
    amount_l: f64,
    pack_size: PackSize,
    fill_start: DateTime<Utc>,
) -> EngineResult<OrderTiming> {
    if !amount_l.is_finite() || amount_l <= 0.0 {
        return Err(ScheduleError::InvalidAmount(format!(
            "数量必须为正数: {}",
            amount_l
        )));
    }

    let rate = effective_fill_rate(product, line, pack_size)?;

    let make_time = product.make_time_min_per_l;
    if !make_time.is_finite() || make_time < 0.0 {
        return Err(ScheduleError::InvalidRate(format!(
            "产品 {} 的每升搅拌时间无效: {}",
            product.product_id, make_time
        )));
    }

    let fill_duration = minutes_to_duration(amount_l / rate)
        .filter(|d| *d > TimeDelta::zero())
        .ok_or_else(|| {
            ScheduleError::InvalidAmount(format!("数量 {} 无法得到有效灌装时长", amount_l))
        })?;
    let make_duration = minutes_to_duration(amount_l * make_time).ok_or_else(|| {
        ScheduleError::InvalidAmount(format!("数量 {} 的搅拌时长溢出", amount_l))
    })?;

    let fill_end = fill_start
        .checked_add_signed(fill_duration)
        .ok_or_else(|| ScheduleError::InvalidAmount("灌装结束时间溢出".to_string()))?;
    let make_start = fill_start
        .checked_sub_signed(make_duration)
        .ok_or_else(|| ScheduleError::InvalidAmount("搅拌开始时间溢出".to_string()))?;

    Ok(OrderTiming {
        fill_end,
        make_start,
        make_end: fill_start,
    })
}

/// 按当前主数据重新计算订单时间窗（以订单现有 fill_start 为起点）
pub fn retime_order(master_data: &MasterData, order: &mut Order) -> EngineResult<()> {
    let product = master_data
        .find_product(&order.product_id)
        .ok_or_else(|| ScheduleError::product_not_found(&order.product_id))?;
    let line = master_data
        .find_line(&order.line_id)
        .ok_or_else(|| ScheduleError::line_not_found(&order.line_id))?;

    compute_timing(product, line, order.amount_l, order.pack_size_ml, order.fill_start)?
        .apply_to(order);
    Ok(())
}

/// 半开区间重叠: [a_start, a_end) ∩ [b_start, b_end) ≠ ∅
pub fn overlaps(
    a_start: DateTime<Utc>,
    a_end: DateTime<Utc>,
    b_start: DateTime<Utc>,
    b_end: DateTime<Utc>,
) -> bool {
    a_start < b_end && b_start < a_end
}
