// ==========================================
// 灌装线排产系统 - 历史/审计记录领域模型
// ==========================================
// 红线: 所有成功的写操作必须记录
// 红线: 只新增（插在最前），不修改、不删除
// ==========================================

use crate::domain::types::HistoryEntryType;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

// ==========================================
// HistoryEntry - 历史记录
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "type")]
    pub entry_type: HistoryEntryType,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<JsonValue>,
}

impl HistoryEntry {
    /// 创建新的历史记录
    ///
    /// # 参数
    /// - `id`: 记录ID
    /// - `timestamp`: 发生时间
    /// - `entry_type`: 记录类型
    /// - `message`: 面向用户的说明
    pub fn new(
        id: String,
        timestamp: DateTime<Utc>,
        entry_type: HistoryEntryType,
        message: String,
    ) -> Self {
        Self {
            id,
            timestamp,
            entry_type,
            message,
            payload: None,
        }
    }

    /// 设置结构化负载 (转换为JSON)
    pub fn with_payload<T: Serialize>(mut self, payload: &T) -> Self {
        self.payload = serde_json::to_value(payload).ok();
        self
    }

    /// 读取负载中的字符串字段
    pub fn payload_str(&self, key: &str) -> Option<&str> {
        self.payload.as_ref()?.get(key)?.as_str()
    }
}
