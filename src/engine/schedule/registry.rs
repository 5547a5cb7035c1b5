// ==========================================
// 排产引擎 - 订单登记（新建 / 修改 / 删除）
// ==========================================

use super::{OrderCreated, OrderUpdated, ScheduleEngine, Transition};
use crate::domain::order::{CreateOrderInput, Order, OrderPatch};
use crate::domain::state::ScheduleState;
use crate::domain::stirrer::StirrerAssignment;
use crate::domain::types::HistoryEntryType;
use crate::engine::conflict::find_blocking_assignment;
use crate::engine::error::{EngineResult, ScheduleError};
use crate::engine::line_sequence::{append_to_line, remove_from_all};
use crate::engine::timing::{compute_timing, retime_order};
use crate::i18n::t_with_args;
use serde_json::json;
use tracing::instrument;

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

impl ScheduleEngine {
    /// 新建订单
    ///
    /// # 错误
    /// - MasterDataNotFound: 产品或灌装线不存在
    /// - DuplicateOrderNumber: 指定的订单号已被使用（含已删除订单）
    /// - InvalidAmount / InvalidRate: 时间窗无法计算
    #[instrument(skip(self, state, input), fields(product_id = %input.product_id, line_id = %input.line_id))]
    pub fn create_order(
        &self,
        state: &ScheduleState,
        input: CreateOrderInput,
    ) -> EngineResult<Transition<OrderCreated>> {
        let line_id = non_blank(Some(&input.line_id))
            .or_else(|| non_blank(state.meta.config.default_line_id.as_deref()))
            .unwrap_or_default();

        let product = state
            .master_data
            .find_product(&input.product_id)
            .ok_or_else(|| ScheduleError::product_not_found(&input.product_id))?;
        let line = state
            .master_data
            .find_line(&line_id)
            .ok_or_else(|| ScheduleError::line_not_found(&line_id))?;

        let order_no = match non_blank(input.order_no.as_deref()) {
            Some(requested) => {
                if state.is_order_number_used(&requested) {
                    return Err(ScheduleError::DuplicateOrderNumber(requested));
                }
                requested
            }
            None => self.allocate_order_number(state),
        };

        let timing = compute_timing(
            product,
            line,
            input.amount_l,
            input.pack_size_ml,
            input.fill_start,
        )?;

        let now = self.now();
        let mut order = Order {
            id: self.next_id(),
            order_no: order_no.clone(),
            product_id: input.product_id,
            amount_l: input.amount_l,
            pack_size_ml: input.pack_size_ml,
            line_id: line_id.clone(),
            fill_start: input.fill_start,
            fill_end: input.fill_start,
            make_start: input.fill_start,
            make_end: input.fill_start,
            parent_order_id: non_blank(input.parent_order_id.as_deref()),
            optional_order_ref: non_blank(input.optional_order_ref.as_deref()),
            created_at: now,
            updated_at: now,
        };
        timing.apply_to(&mut order);

        let mut next = state.clone();
        next.meta.used_order_numbers.insert(order_no.clone());
        next.orders.push(order.clone());
        append_to_line(&mut next.line_order_map, &line_id, &order.id);
        self.record_history(
            &mut next,
            HistoryEntryType::Create,
            t_with_args("history.create", &[("order_no", order_no.as_str())]),
            &json!({ "orderId": order.id, "orderNo": order_no, "lineId": line_id }),
        );

        let assignment = if next.meta.config.auto_assign_enabled() {
            self.auto_assign(&mut next, &order)
        } else {
            None
        };

        tracing::info!(order_id = %order.id, order_no = %order.order_no, "订单已创建");
        Ok(Transition::new(next, OrderCreated { order, assignment }))
    }

    /// 绑定第一个无重叠的搅拌器；全部占用时仅告警
    fn auto_assign(&self, state: &mut ScheduleState, order: &Order) -> Option<StirrerAssignment> {
        let (start, end) = order.stirrer_window();
        let rw_id = state
            .master_data
            .stirrers
            .iter()
            .find(|s| {
                find_blocking_assignment(&state.assignments, &s.rw_id, &order.id, start, end)
                    .is_none()
            })
            .map(|s| s.rw_id.clone());

        let Some(rw_id) = rw_id else {
            tracing::warn!(order_no = %order.order_no, "自动分配失败: 无空闲搅拌器");
            return None;
        };

        let assignment = StirrerAssignment {
            order_id: order.id.clone(),
            rw_id: rw_id.clone(),
            rw_start: start,
            rw_end: end,
        };
        state.assignments.push(assignment.clone());
        self.record_history(
            state,
            HistoryEntryType::Assign,
            t_with_args(
                "history.assign",
                &[("order_no", order.order_no.as_str()), ("rw", rw_id.as_str())],
            ),
            &json!({ "orderId": order.id, "rwId": rw_id, "auto": true }),
        );
        Some(assignment)
    }

    /// 修改订单（仅覆盖补丁中给出的字段）
    ///
    /// 时间窗总是按合并后的字段重新计算；
    /// 涉及时间的修改会同步搅拌器分配并重新扫描冲突（提示性，不阻断）
    #[instrument(skip(self, state, patch), fields(order_id = %order_id))]
    pub fn update_order(
        &self,
        state: &ScheduleState,
        order_id: &str,
        patch: OrderPatch,
    ) -> EngineResult<Transition<OrderUpdated>> {
        let existing = state
            .find_order(order_id)
            .ok_or_else(|| ScheduleError::OrderNotFound(order_id.to_string()))?;

        if let Some(requested) = patch.order_no.as_deref().map(str::trim) {
            if requested != existing.order_no {
                return Err(ScheduleError::OrderNumberImmutable {
                    order_no: existing.order_no.clone(),
                    requested: requested.to_string(),
                });
            }
        }

        let mut updated = existing.clone();
        if let Some(product_id) = &patch.product_id {
            updated.product_id = product_id.clone();
        }
        if let Some(line_id) = &patch.line_id {
            updated.line_id = line_id.clone();
        }
        if let Some(amount_l) = patch.amount_l {
            updated.amount_l = amount_l;
        }
        if let Some(pack_size) = patch.pack_size_ml {
            updated.pack_size_ml = pack_size;
        }
        if let Some(fill_start) = patch.fill_start {
            updated.fill_start = fill_start;
        }
        if let Some(reference) = &patch.optional_order_ref {
            updated.optional_order_ref = non_blank(Some(reference));
        }

        retime_order(&state.master_data, &mut updated)?;
        updated.updated_at = self.now();

        let mut next = state.clone();
        if let Some(slot) = next.find_order_mut(order_id) {
            *slot = updated.clone();
        }
        next.rederive_line_order_map();

        let conflicts = if patch.touches_timing() && Self::sync_assignment(&mut next, order_id) {
            self.refresh_conflict_notice(&mut next)
        } else {
            Vec::new()
        };

        self.record_history(
            &mut next,
            HistoryEntryType::Edit,
            t_with_args("history.edit", &[("order_no", updated.order_no.as_str())]),
            &json!({ "orderId": order_id, "patch": patch, "conflicts": conflicts }),
        );

        tracing::info!(order_no = %updated.order_no, conflicts = conflicts.len(), "订单已修改");
        Ok(Transition::new(next, OrderUpdated { order: updated, conflicts }))
    }

    /// 删除订单（级联删除分配与灌装线序列成员）
    ///
    /// 订单不存在时为空操作，返回 false 且不写历史
    #[instrument(skip(self, state), fields(order_id = %order_id))]
    pub fn delete_order(&self, state: &ScheduleState, order_id: &str) -> Transition<bool> {
        let Some(order) = state.find_order(order_id) else {
            tracing::debug!("订单不存在，删除为空操作");
            return Transition::new(state.clone(), false);
        };
        let order_no = order.order_no.clone();

        let mut next = state.clone();
        next.orders.retain(|o| o.id != order_id);
        next.assignments.retain(|a| a.order_id != order_id);
        remove_from_all(&mut next.line_order_map, order_id);

        self.record_history(
            &mut next,
            HistoryEntryType::Delete,
            t_with_args("history.delete", &[("order_no", order_no.as_str())]),
            &json!({ "orderId": order_id, "orderNo": order_no }),
        );

        tracing::info!(order_no = %order_no, "订单已删除");
        Transition::new(next, true)
    }
}
