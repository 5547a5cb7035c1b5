// ==========================================
// 排产引擎 - 工作区级操作
// ==========================================
// 职责: 主数据整体替换 / 时间轴设置 / 计划偏好
// 说明: 主数据替换不会重新计时现有订单
// ==========================================

use super::{ScheduleEngine, Transition};
use crate::domain::master_data::MasterData;
use crate::domain::meta::{PlanningPreferences, TimelineSettings, TimelineSettingsPatch};
use crate::domain::state::ScheduleState;
use crate::domain::types::HistoryEntryType;
use crate::i18n::t_with_args;
use serde::Serialize;
use serde_json::json;
use tracing::instrument;

/// 主数据替换结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MasterDataReplaced {
    pub product_count: usize,
    pub line_count: usize,
    pub stirrer_count: usize,
}

impl ScheduleEngine {
    /// 整体替换主数据（视为已校验输入）
    #[instrument(skip_all)]
    pub fn replace_master_data(
        &self,
        state: &ScheduleState,
        master_data: MasterData,
    ) -> Transition<MasterDataReplaced> {
        let summary = MasterDataReplaced {
            product_count: master_data.products.len(),
            line_count: master_data.lines.len(),
            stirrer_count: master_data.stirrers.len(),
        };

        let mut next = state.clone();
        next.master_data = master_data;

        let products = summary.product_count.to_string();
        let lines = summary.line_count.to_string();
        let stirrers = summary.stirrer_count.to_string();
        self.record_history(
            &mut next,
            HistoryEntryType::MasterdataChange,
            t_with_args(
                "history.masterdata_change",
                &[
                    ("products", products.as_str()),
                    ("lines", lines.as_str()),
                    ("stirrers", stirrers.as_str()),
                ],
            ),
            &json!(summary),
        );

        tracing::info!(
            products = summary.product_count,
            lines = summary.line_count,
            stirrers = summary.stirrer_count,
            "主数据已替换"
        );
        Transition::new(next, summary)
    }

    /// 更新时间轴显示设置（叠加补丁后重新规范化）
    pub fn set_timeline_settings(
        &self,
        state: &ScheduleState,
        patch: TimelineSettingsPatch,
    ) -> Transition<TimelineSettings> {
        let mut next = state.clone();
        next.meta.ui = next.meta.ui.merged(&patch);
        tracing::debug!(ui = ?next.meta.ui, "时间轴设置已更新");
        let ui = next.meta.ui;
        Transition::new(next, ui)
    }

    /// 更新计划偏好（默认灌装线 / 自动分配搅拌器）
    pub fn set_planning_preferences(
        &self,
        state: &ScheduleState,
        preferences: PlanningPreferences,
    ) -> Transition<PlanningPreferences> {
        let mut next = state.clone();
        next.meta.config = preferences.clone();
        tracing::debug!(prefs = ?preferences, "计划偏好已更新");
        Transition::new(next, preferences)
    }
}
