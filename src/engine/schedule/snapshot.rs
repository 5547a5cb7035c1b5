// ==========================================
// 排产引擎 - 快照导出/导入
// ==========================================
// 红线: 导入为整体替换；文档无效时原状态不变
// ==========================================

use super::{ImportOutcome, ScheduleEngine, Transition};
use crate::domain::snapshot::{ImportRepairs, SnapshotDocument};
use crate::domain::state::ScheduleState;
use crate::domain::types::HistoryEntryType;
use crate::engine::error::{EngineResult, ScheduleError};
use crate::i18n::t_with_args;
use serde_json::json;
use tracing::instrument;

impl ScheduleEngine {
    /// 导出为快照 JSON（缩进格式）
    pub fn export_snapshot(&self, state: &ScheduleState) -> serde_json::Result<String> {
        serde_json::to_string_pretty(state)
    }

    /// 解析快照为状态（不写历史）
    pub fn decode_snapshot(&self, json: &str) -> EngineResult<(ScheduleState, ImportRepairs)> {
        let doc = SnapshotDocument::parse(json).map_err(ScheduleError::ImportMalformed)?;
        Ok(doc.into_state())
    }

    /// 导入快照，整体替换当前状态
    ///
    /// 重新推导灌装线序列，丢弃孤立分配，重新扫描冲突，并追加一条导入历史
    #[instrument(skip(self, _state, json), fields(bytes = json.len()))]
    pub fn import_snapshot(
        &self,
        _state: &ScheduleState,
        json: &str,
    ) -> EngineResult<Transition<ImportOutcome>> {
        let (mut next, repairs) = self.decode_snapshot(json).map_err(|e| {
            tracing::warn!(error = %e, "快照导入失败，保持原状态");
            e
        })?;

        if !repairs.is_empty() {
            tracing::warn!(
                dropped = repairs.dropped_assignments,
                duplicates = repairs.duplicate_assignments,
                "导入时修复了搅拌器分配"
            );
        }
        self.refresh_conflict_notice(&mut next);

        let order_count = next.orders.len();
        let count = order_count.to_string();
        self.record_history(
            &mut next,
            HistoryEntryType::Import,
            t_with_args("history.import", &[("count", count.as_str())]),
            &json!({ "orderCount": order_count, "repairs": repairs }),
        );

        tracing::info!(order_count, "快照已导入");
        Ok(Transition::new(
            next,
            ImportOutcome {
                order_count,
                repairs,
            },
        ))
    }
}
