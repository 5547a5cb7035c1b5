// ==========================================
// 排产引擎 - 灌装线重排（链式重新计时）
// ==========================================
// 规则:
//   1. 清洗序列: 丢弃不存在或不属于该线的订单，去重
//   2. 游标 prev_fill_end 初始为空；已设置时覆盖订单的 fill_start
//   3. 重新计算派生时间窗，游标推进到新的 fill_end
//   4. 同步被重排订单的搅拌器分配，重新扫描全部分配（冲突为提示性）
// ==========================================

use super::{ReflowOutcome, ScheduleEngine, Transition};
use crate::domain::state::ScheduleState;
use crate::domain::types::HistoryEntryType;
use crate::engine::error::{EngineResult, ScheduleError};
use crate::engine::line_sequence::sanitize_sequence;
use crate::engine::timing::compute_timing;
use crate::i18n::t_with_args;
use chrono::{DateTime, Utc};
use serde_json::json;
use tracing::instrument;

impl ScheduleEngine {
    /// 按给定顺序重排某条灌装线并链式重新计时
    ///
    /// 主数据缺失或计时失败的订单保持原时间窗并跳过（不推进游标）；
    /// 调用方未列出的本线订单追加在序列末尾，不参与重新计时
    #[instrument(skip(self, state, order_ids), fields(line_id = %line_id, requested = order_ids.len()))]
    pub fn reorder_line_orders(
        &self,
        state: &ScheduleState,
        line_id: &str,
        order_ids: &[String],
    ) -> EngineResult<Transition<ReflowOutcome>> {
        let line = state
            .master_data
            .find_line(line_id)
            .ok_or_else(|| ScheduleError::line_not_found(line_id))?;

        let sequence = sanitize_sequence(&state.orders, line_id, order_ids);
        let now = self.now();

        let mut next = state.clone();
        let mut reflowed = Vec::new();
        let mut skipped = Vec::new();
        let mut prev_fill_end: Option<DateTime<Utc>> = None;

        for order_id in &sequence {
            let Some(order) = next.find_order_mut(order_id) else {
                continue;
            };
            let Some(product) = state.master_data.find_product(&order.product_id) else {
                tracing::warn!(order_no = %order.order_no, product_id = %order.product_id, "重排跳过: 产品不存在");
                skipped.push(order_id.clone());
                continue;
            };

            let fill_start = prev_fill_end.unwrap_or(order.fill_start);
            match compute_timing(product, line, order.amount_l, order.pack_size_ml, fill_start) {
                Ok(timing) => {
                    order.fill_start = fill_start;
                    timing.apply_to(order);
                    order.updated_at = now;
                    prev_fill_end = Some(timing.fill_end);
                    reflowed.push(order_id.clone());
                }
                Err(e) => {
                    tracing::warn!(order_no = %order.order_no, error = %e, "重排跳过: 时间窗无法计算");
                    skipped.push(order_id.clone());
                }
            }
        }

        // 调用方未列出的本线订单保持原相对顺序追加
        let mut full_sequence = sequence.clone();
        let leftovers: Vec<String> = state
            .line_order_map
            .get(line_id)
            .into_iter()
            .flatten()
            .chain(state.orders.iter().map(|o| &o.id))
            .filter(|id| {
                next.find_order(id)
                    .map(|o| o.line_id == line_id)
                    .unwrap_or(false)
            })
            .cloned()
            .collect();
        for id in leftovers {
            if !full_sequence.contains(&id) {
                full_sequence.push(id);
            }
        }
        next.line_order_map
            .insert(line_id.to_string(), full_sequence.clone());

        for order_id in &reflowed {
            Self::sync_assignment(&mut next, order_id);
        }
        let conflicts = self.refresh_conflict_notice(&mut next);

        let count = reflowed.len().to_string();
        self.record_history(
            &mut next,
            HistoryEntryType::Move,
            t_with_args(
                "history.move",
                &[("line", line_id), ("count", count.as_str())],
            ),
            &json!({
                "lineId": line_id,
                "orderIds": full_sequence,
                "reflowedOrderIds": reflowed,
                "skippedOrderIds": skipped,
                "conflicts": conflicts,
            }),
        );

        tracing::info!(
            reflowed = reflowed.len(),
            skipped = skipped.len(),
            conflicts = conflicts.len(),
            "灌装线重排完成"
        );

        Ok(Transition::new(
            next,
            ReflowOutcome {
                line_id: line_id.to_string(),
                order_ids: full_sequence,
                reflowed_order_ids: reflowed,
                skipped_order_ids: skipped,
                conflicts,
            },
        ))
    }
}
