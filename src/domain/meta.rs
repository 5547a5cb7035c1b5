// ==========================================
// 灌装线排产系统 - 工作区元数据
// ==========================================
// 职责: 已用订单号集合 / 时间轴显示设置 / 计划偏好
// ==========================================

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

// ==========================================
// AppMeta - 工作区元数据
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppMeta {
    /// 曾经使用过的订单号（只增不减，删除订单后也不回收）
    pub used_order_numbers: BTreeSet<String>,
    pub ui: TimelineSettings,
    pub config: PlanningPreferences,
}

// ==========================================
// PlanningPreferences - 计划偏好
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlanningPreferences {
    /// 新建订单未指定灌装线时使用
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_line_id: Option<String>,
    /// 新建订单后自动分配第一个空闲搅拌器
    #[serde(rename = "autoAssignRW", skip_serializing_if = "Option::is_none")]
    pub auto_assign_rw: Option<bool>,
}

impl PlanningPreferences {
    pub fn auto_assign_enabled(&self) -> bool {
        self.auto_assign_rw.unwrap_or(false)
    }
}

// ==========================================
// TimelineSettings - 时间轴显示设置（规范化后）
// ==========================================
// 不变量: 0 <= start_hour <= 23, start_hour < end_hour <= 24,
//         zoom_minutes ∈ {15, 30, 60}
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "TimelineSettingsPatch")]
pub struct TimelineSettings {
    pub start_hour: u8,
    pub end_hour: u8,
    pub zoom_minutes: u16,
    pub show_grid: bool,
}

impl Default for TimelineSettings {
    fn default() -> Self {
        TimelineSettingsPatch::default().into()
    }
}

impl TimelineSettings {
    /// 在当前设置上叠加补丁并重新规范化
    pub fn merged(&self, patch: &TimelineSettingsPatch) -> Self {
        TimelineSettingsPatch {
            start_hour: patch.start_hour.or(Some(i64::from(self.start_hour))),
            end_hour: patch.end_hour.or(Some(i64::from(self.end_hour))),
            zoom_minutes: patch.zoom_minutes.or(Some(i64::from(self.zoom_minutes))),
            show_grid: patch.show_grid.or(Some(self.show_grid)),
            zoom_level: patch.zoom_level,
            work_window_hours: patch.work_window_hours,
        }
        .into()
    }
}

// ==========================================
// TimelineSettingsPatch - 原始/部分设置
// ==========================================
// 兼容旧版字段 zoomLevel / workWindowHours
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TimelineSettingsPatch {
    pub start_hour: Option<i64>,
    pub end_hour: Option<i64>,
    pub zoom_minutes: Option<i64>,
    pub show_grid: Option<bool>,
    #[serde(skip_serializing)]
    pub zoom_level: Option<f64>,
    #[serde(skip_serializing)]
    pub work_window_hours: Option<f64>,
}

impl From<TimelineSettingsPatch> for TimelineSettings {
    fn from(raw: TimelineSettingsPatch) -> Self {
        let start_hour = raw.start_hour.unwrap_or(6).clamp(0, 23);
        let end_hour = raw.end_hour.unwrap_or(22).min(24).max(start_hour + 1);

        let zoom_minutes = match raw.zoom_minutes {
            Some(z @ (15 | 30 | 60)) => z,
            _ => match raw.zoom_level {
                Some(level) if level == 2.0 => 15,
                Some(level) if level == 0.5 => 60,
                _ => 30,
            },
        };

        Self {
            start_hour: start_hour as u8,
            end_hour: end_hour as u8,
            zoom_minutes: zoom_minutes as u16,
            show_grid: raw.show_grid.unwrap_or(true),
        }
    }
}
