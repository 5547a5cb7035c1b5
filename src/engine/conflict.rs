// ==========================================
// 灌装线排产系统 - 搅拌器冲突检测
// ==========================================
// 职责: 扫描全部分配，找出同一搅拌器上重叠的占用区间
// 规则: 按搅拌器分组 → 按开始时间排序 → 与当前最晚结束的区间比较
// ==========================================

use crate::domain::order::Order;
use crate::domain::stirrer::{ConflictNotice, StirrerAssignment, StirrerConflict};
use crate::engine::timing::overlaps;
use crate::i18n::t_with_args;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

/// 找出全部搅拌器重叠
pub fn find_stirrer_conflicts(
    assignments: &[StirrerAssignment],
    orders: &[Order],
) -> Vec<StirrerConflict> {
    let mut by_stirrer: BTreeMap<&str, Vec<&StirrerAssignment>> = BTreeMap::new();
    for a in assignments {
        by_stirrer.entry(a.rw_id.as_str()).or_default().push(a);
    }

    let order_no = |order_id: &str| -> String {
        orders
            .iter()
            .find(|o| o.id == order_id)
            .map(|o| o.order_no.clone())
            .unwrap_or_else(|| order_id.to_string())
    };

    let mut conflicts = Vec::new();
    for (rw_id, mut list) in by_stirrer {
        list.sort_by(|a, b| a.rw_start.cmp(&b.rw_start).then(a.rw_end.cmp(&b.rw_end)));

        let mut iter = list.into_iter();
        let Some(mut active) = iter.next() else {
            continue;
        };
        for next in iter {
            if overlaps(active.rw_start, active.rw_end, next.rw_start, next.rw_end) {
                conflicts.push(StirrerConflict {
                    rw_id: rw_id.to_string(),
                    first_order_id: active.order_id.clone(),
                    first_order_no: order_no(&active.order_id),
                    second_order_id: next.order_id.clone(),
                    second_order_no: order_no(&next.order_id),
                });
            }
            if next.rw_end > active.rw_end {
                active = next;
            }
        }
    }
    conflicts
}

/// 查找会阻断候选区间的已有分配（同一搅拌器、其他订单、区间重叠）
pub fn find_blocking_assignment<'a>(
    assignments: &'a [StirrerAssignment],
    rw_id: &str,
    order_id: &str,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Option<&'a StirrerAssignment> {
    assignments.iter().find(|a| {
        a.rw_id == rw_id && a.order_id != order_id && overlaps(a.rw_start, a.rw_end, start, end)
    })
}

/// 生成提示性冲突通知（无冲突时返回 None）
pub fn build_notice(conflicts: Vec<StirrerConflict>, raised_at: DateTime<Utc>) -> Option<ConflictNotice> {
    if conflicts.is_empty() {
        return None;
    }
    let message = conflicts
        .iter()
        .map(|c| {
            t_with_args(
                "conflict.overlap",
                &[
                    ("rw", c.rw_id.as_str()),
                    ("first", c.first_order_no.as_str()),
                    ("second", c.second_order_no.as_str()),
                ],
            )
        })
        .collect::<Vec<_>>()
        .join("; ");

    Some(ConflictNotice {
        message,
        conflicts,
        raised_at,
    })
}
