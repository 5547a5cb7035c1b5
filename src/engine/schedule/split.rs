// ==========================================
// 排产引擎 - 订单拆分
// ==========================================
// 红线: 子订单数量之和与父订单数量相差不超过容差
// 红线: 子订单原位替换父订单在灌装线序列中的位置
// ==========================================

use super::{ScheduleEngine, SplitOutcome, Transition};
use crate::domain::order::{Order, SplitMode};
use crate::domain::state::ScheduleState;
use crate::domain::types::HistoryEntryType;
use crate::engine::error::{EngineResult, ScheduleError};
use crate::engine::line_sequence::{remove_from_all, replace_in_line};
use crate::engine::timing::retime_order;
use crate::i18n::t_with_args;
use serde_json::json;
use tracing::instrument;

/// 单次拆分的份数上限
pub const MAX_SPLIT_PARTS: usize = 1000;

fn too_many_parts(count: usize) -> ScheduleError {
    ScheduleError::InvalidSplit(format!(
        "份数 {} 超过上限 {}",
        count, MAX_SPLIT_PARTS
    ))
}

/// 按拆分方式计算各份数量（先检查份数上限再分配）
pub fn split_shares(amount_l: f64, mode: &SplitMode) -> EngineResult<Vec<f64>> {
    match mode {
        SplitMode::Parts { parts } => {
            let count = *parts as usize;
            if count > MAX_SPLIT_PARTS {
                return Err(too_many_parts(count));
            }
            if count == 0 {
                return Ok(Vec::new());
            }
            Ok(vec![amount_l / f64::from(*parts); count])
        }
        SplitMode::Amounts { amounts } => Ok(amounts.clone()),
    }
}

/// 校验份额: 2 到 MAX_SPLIT_PARTS 份、每份为正、总和守恒
pub fn validate_shares(amount_l: f64, shares: &[f64], tolerance: f64) -> EngineResult<()> {
    if shares.len() < 2 {
        return Err(ScheduleError::InvalidSplit(format!(
            "至少需要 2 份，实际 {} 份",
            shares.len()
        )));
    }
    if shares.len() > MAX_SPLIT_PARTS {
        return Err(too_many_parts(shares.len()));
    }
    if let Some(bad) = shares.iter().find(|a| !a.is_finite() || **a <= 0.0) {
        return Err(ScheduleError::InvalidSplit(format!("份额必须为正数: {}", bad)));
    }
    let sum: f64 = shares.iter().sum();
    if (sum - amount_l).abs() > tolerance {
        return Err(ScheduleError::InvalidSplit(format!(
            "份额之和 {} 与订单数量 {} 不一致",
            sum, amount_l
        )));
    }
    Ok(())
}

impl ScheduleEngine {
    /// 拆分订单
    ///
    /// 删除父订单及其分配，按份额创建子订单（新订单号、继承线/产品/规格/开始时间/参考号）
    #[instrument(skip(self, state, mode), fields(order_id = %order_id))]
    pub fn split_order(
        &self,
        state: &ScheduleState,
        order_id: &str,
        mode: SplitMode,
    ) -> EngineResult<Transition<SplitOutcome>> {
        let parent = state
            .find_order(order_id)
            .ok_or_else(|| ScheduleError::OrderNotFound(order_id.to_string()))?;

        let shares = split_shares(parent.amount_l, &mode)?;
        validate_shares(parent.amount_l, &shares, self.config.split_tolerance_l)?;

        let mut next = state.clone();
        let now = self.now();
        let mut children = Vec::with_capacity(shares.len());
        for amount_l in shares {
            let order_no = self.allocate_order_number(&next);
            let mut child = Order {
                id: self.next_id(),
                order_no: order_no.clone(),
                product_id: parent.product_id.clone(),
                amount_l,
                pack_size_ml: parent.pack_size_ml,
                line_id: parent.line_id.clone(),
                fill_start: parent.fill_start,
                fill_end: parent.fill_start,
                make_start: parent.fill_start,
                make_end: parent.fill_start,
                parent_order_id: Some(parent.id.clone()),
                optional_order_ref: parent.optional_order_ref.clone(),
                created_at: now,
                updated_at: now,
            };
            retime_order(&next.master_data, &mut child)?;
            next.meta.used_order_numbers.insert(order_no);
            children.push(child);
        }

        let child_ids: Vec<String> = children.iter().map(|c| c.id.clone()).collect();
        next.orders.retain(|o| o.id != parent.id);
        next.assignments.retain(|a| a.order_id != parent.id);
        replace_in_line(&mut next.line_order_map, &parent.line_id, &parent.id, &child_ids);
        // 父订单可能残留在其他线的序列中
        remove_from_all(&mut next.line_order_map, &parent.id);
        next.orders.extend(children.iter().cloned());

        let count = children.len().to_string();
        self.record_history(
            &mut next,
            HistoryEntryType::Split,
            t_with_args(
                "history.split",
                &[("order_no", parent.order_no.as_str()), ("count", count.as_str())],
            ),
            &json!({
                "orderId": parent.id,
                "orderNo": parent.order_no,
                "childOrderIds": child_ids,
            }),
        );

        tracing::info!(order_no = %parent.order_no, children = children.len(), "订单已拆分");
        Ok(Transition::new(
            next,
            SplitOutcome {
                parent_order_id: parent.id.clone(),
                children,
            },
        ))
    }
}
