// ==========================================
// 排产引擎 - 搅拌器分配与实绩上报
// ==========================================
// 红线: 分配冲突为阻断性错误，不写入提示性冲突
// 红线: 实绩记录只新增（插在最前）
// ==========================================

use super::{ProgressOutcome, ScheduleEngine, Transition};
use crate::domain::state::ScheduleState;
use crate::domain::stirrer::{IstUpdate, ProgressReport, StirrerAssignment};
use crate::domain::types::HistoryEntryType;
use crate::engine::conflict::find_blocking_assignment;
use crate::engine::error::{EngineResult, ScheduleError};
use crate::engine::timing::{effective_fill_rate, minutes_to_duration};
use crate::i18n::t_with_args;
use serde_json::json;
use tracing::instrument;

fn check_quantity(label: &str, value: Option<f64>) -> EngineResult<()> {
    match value {
        Some(v) if !v.is_finite() || v < 0.0 => Err(ScheduleError::InvalidAmount(format!(
            "{} 必须为非负数: {}",
            label, v
        ))),
        _ => Ok(()),
    }
}

impl ScheduleEngine {
    /// 为订单分配搅拌器
    ///
    /// 占用区间为订单的 [make_start, fill_end)；成功时替换该订单原有分配并清除提示性冲突
    #[instrument(skip(self, state), fields(order_id = %order_id, rw_id = %rw_id))]
    pub fn assign_stirrer(
        &self,
        state: &ScheduleState,
        order_id: &str,
        rw_id: &str,
    ) -> EngineResult<Transition<StirrerAssignment>> {
        let order = state
            .find_order(order_id)
            .ok_or_else(|| ScheduleError::OrderNotFound(order_id.to_string()))?;
        if state.master_data.find_stirrer(rw_id).is_none() {
            return Err(ScheduleError::stirrer_not_found(rw_id));
        }

        let (start, end) = order.stirrer_window();
        if let Some(blocking) = find_blocking_assignment(&state.assignments, rw_id, order_id, start, end) {
            let conflicting_order_no = state
                .find_order(&blocking.order_id)
                .map(|o| o.order_no.clone())
                .unwrap_or_else(|| blocking.order_id.clone());
            tracing::warn!(conflicting = %conflicting_order_no, "搅拌器分配被阻断");
            return Err(ScheduleError::Conflict {
                rw_id: rw_id.to_string(),
                order_id: order_id.to_string(),
                conflicting_order_id: blocking.order_id.clone(),
                conflicting_order_no,
            });
        }

        let assignment = StirrerAssignment {
            order_id: order_id.to_string(),
            rw_id: rw_id.to_string(),
            rw_start: start,
            rw_end: end,
        };
        let order_no = order.order_no.clone();

        let mut next = state.clone();
        next.assignments.retain(|a| a.order_id != order_id);
        next.assignments.push(assignment.clone());
        next.conflict_notice = None;

        self.record_history(
            &mut next,
            HistoryEntryType::Assign,
            t_with_args(
                "history.assign",
                &[("order_no", order_no.as_str()), ("rw", rw_id)],
            ),
            &json!({ "orderId": order_id, "rwId": rw_id }),
        );

        tracing::info!(order_no = %order_no, "搅拌器已分配");
        Ok(Transition::new(next, assignment))
    }

    /// 撤销订单的搅拌器分配（不存在时为空操作）
    #[instrument(skip(self, state), fields(order_id = %order_id))]
    pub fn remove_assignment(&self, state: &ScheduleState, order_id: &str) -> Transition<bool> {
        let Some(existing) = state.find_assignment(order_id) else {
            tracing::debug!("无分配，撤销为空操作");
            return Transition::new(state.clone(), false);
        };
        let rw_id = existing.rw_id.clone();
        let order_no = state
            .find_order(order_id)
            .map(|o| o.order_no.clone())
            .unwrap_or_else(|| order_id.to_string());

        let mut next = state.clone();
        next.assignments.retain(|a| a.order_id != order_id);
        self.record_history(
            &mut next,
            HistoryEntryType::Assign,
            t_with_args(
                "history.unassign",
                &[("order_no", order_no.as_str()), ("rw", rw_id.as_str())],
            ),
            &json!({ "orderId": order_id, "rwId": rw_id, "removed": true }),
        );

        tracing::info!(order_no = %order_no, "搅拌器分配已撤销");
        Transition::new(next, true)
    }

    /// 实绩上报
    ///
    /// - filled    = filled_l ?? max(0, amount - (remaining_l ?? 0))
    /// - remaining = remaining_l ?? max(0, amount - filled)
    /// - 新 fill_end = now + remaining / 有效速率，同时写入订单与分配
    #[instrument(skip(self, state, report), fields(order_id = %report.order_id, rw_id = %report.rw_id, status = %report.status))]
    pub fn update_progress(
        &self,
        state: &ScheduleState,
        report: ProgressReport,
    ) -> EngineResult<Transition<ProgressOutcome>> {
        let ProgressReport {
            rw_id,
            order_id,
            status,
            remaining_l,
            filled_l,
        } = report;

        let order = state
            .find_order(&order_id)
            .ok_or_else(|| ScheduleError::OrderNotFound(order_id.clone()))?;
        if !state
            .assignments
            .iter()
            .any(|a| a.order_id == order_id && a.rw_id == rw_id)
        {
            return Err(ScheduleError::AssignmentNotFound { order_id, rw_id });
        }
        let product = state
            .master_data
            .find_product(&order.product_id)
            .ok_or_else(|| ScheduleError::product_not_found(&order.product_id))?;
        let line = state
            .master_data
            .find_line(&order.line_id)
            .ok_or_else(|| ScheduleError::line_not_found(&order.line_id))?;

        check_quantity("remainingL", remaining_l)?;
        check_quantity("filledL", filled_l)?;

        let rate = effective_fill_rate(product, line, order.pack_size_ml)?;
        let filled = filled_l.unwrap_or_else(|| (order.amount_l - remaining_l.unwrap_or(0.0)).max(0.0));
        let remaining = remaining_l.unwrap_or_else(|| (order.amount_l - filled).max(0.0));

        let now = self.now();
        let fill_end = minutes_to_duration(remaining / rate)
            .and_then(|d| now.checked_add_signed(d))
            .ok_or_else(|| ScheduleError::InvalidAmount(format!("剩余数量 {} 无法换算为时长", remaining)))?;
        let order_no = order.order_no.clone();

        let mut next = state.clone();
        if let Some(o) = next.find_order_mut(&order_id) {
            o.fill_end = fill_end;
            o.updated_at = now;
        }
        if let Some(a) = next
            .assignments
            .iter_mut()
            .find(|a| a.order_id == order_id && a.rw_id == rw_id)
        {
            a.rw_end = fill_end;
        }

        let ist_update = IstUpdate {
            id: self.next_id(),
            order_id: order_id.clone(),
            rw_id: rw_id.clone(),
            status,
            remaining_l: remaining,
            filled_l: filled,
            timestamp: now,
        };
        next.ist_updates.insert(0, ist_update.clone());
        self.refresh_conflict_notice(&mut next);

        self.record_history(
            &mut next,
            HistoryEntryType::IstUpdate,
            t_with_args(
                "history.ist_update",
                &[("order_no", order_no.as_str()), ("status", status.as_str())],
            ),
            &json!({
                "orderId": order_id,
                "rwId": rw_id,
                "status": status,
                "remaining": remaining,
                "filled": filled,
            }),
        );

        tracing::info!(order_no = %order_no, remaining, filled, %fill_end, "实绩已上报");
        Ok(Transition::new(next, ProgressOutcome { ist_update, fill_end }))
    }

    /// 确认并清除提示性冲突，返回是否存在过冲突
    pub fn clear_conflict(&self, state: &ScheduleState) -> Transition<bool> {
        let mut next = state.clone();
        let had_notice = next.conflict_notice.take().is_some();
        Transition::new(next, had_notice)
    }
}
