// ==========================================
// 灌装线排产系统 - 领域类型定义
// ==========================================
// 职责: 包装规格、生产状态、历史类型等枚举
// 序列化格式: 与导出快照 JSON 保持一致
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 包装规格 (Pack Size)
// ==========================================
// 快照中以毫升整数表示: 250 / 500 / 1000 / 5000
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum PackSize {
    Ml250,
    Ml500,
    Ml1000,
    Ml5000,
}

impl PackSize {
    /// 所有受支持的包装规格（升序）
    pub const ALL: [PackSize; 4] = [
        PackSize::Ml250,
        PackSize::Ml500,
        PackSize::Ml1000,
        PackSize::Ml5000,
    ];

    /// 包装容量（毫升）
    pub fn ml(self) -> u32 {
        match self {
            PackSize::Ml250 => 250,
            PackSize::Ml500 => 500,
            PackSize::Ml1000 => 1000,
            PackSize::Ml5000 => 5000,
        }
    }

    /// 从毫升数解析
    pub fn from_ml(ml: u32) -> Option<Self> {
        match ml {
            250 => Some(PackSize::Ml250),
            500 => Some(PackSize::Ml500),
            1000 => Some(PackSize::Ml1000),
            5000 => Some(PackSize::Ml5000),
            _ => None,
        }
    }
}

impl TryFrom<u32> for PackSize {
    type Error = String;

    fn try_from(ml: u32) -> Result<Self, Self::Error> {
        PackSize::from_ml(ml).ok_or_else(|| format!("不支持的包装规格: {}ml", ml))
    }
}

impl From<PackSize> for u32 {
    fn from(size: PackSize) -> Self {
        size.ml()
    }
}

impl fmt::Display for PackSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ml", self.ml())
    }
}

// ==========================================
// 生产状态 (Production Status)
// ==========================================
// 实绩(IST)上报时的现场状态，沿用现场德语标识
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProductionStatus {
    #[serde(rename = "läuft", alias = "running")]
    Running, // 运行中
    #[serde(rename = "pausiert", alias = "paused")]
    Paused, // 暂停
    #[serde(rename = "fertig", alias = "finished")]
    Finished, // 完成
}

impl ProductionStatus {
    /// 从字符串解析（兼容德语与英文写法）
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "läuft" | "running" => Some(ProductionStatus::Running),
            "pausiert" | "paused" => Some(ProductionStatus::Paused),
            "fertig" | "finished" => Some(ProductionStatus::Finished),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProductionStatus::Running => "läuft",
            ProductionStatus::Paused => "pausiert",
            ProductionStatus::Finished => "fertig",
        }
    }
}

impl fmt::Display for ProductionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ==========================================
// 历史记录类型 (History Entry Type)
// ==========================================
// 别名兼容旧版快照中的 "ist" / "masterdata"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HistoryEntryType {
    Create,
    Edit,
    Move,
    Split,
    Assign,
    #[serde(alias = "ist")]
    IstUpdate,
    #[serde(alias = "masterdata")]
    MasterdataChange,
    Import,
    Delete,
}

impl HistoryEntryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            HistoryEntryType::Create => "create",
            HistoryEntryType::Edit => "edit",
            HistoryEntryType::Move => "move",
            HistoryEntryType::Split => "split",
            HistoryEntryType::Assign => "assign",
            HistoryEntryType::IstUpdate => "ist-update",
            HistoryEntryType::MasterdataChange => "masterdata-change",
            HistoryEntryType::Import => "import",
            HistoryEntryType::Delete => "delete",
        }
    }
}

impl fmt::Display for HistoryEntryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ==========================================
// 主数据类别 (用于 NotFound 错误定位)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MasterDataKind {
    Product,
    Line,
    Stirrer,
}

impl fmt::Display for MasterDataKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MasterDataKind::Product => write!(f, "product"),
            MasterDataKind::Line => write!(f, "line"),
            MasterDataKind::Stirrer => write!(f, "stirrer"),
        }
    }
}
