// ==========================================
// 灌装线排产系统 - 引擎层错误类型
// ==========================================
// 工具: thiserror 派生宏
// 红线: 领域失败一律以 Err 返回，不 panic
// ==========================================

use crate::domain::types::MasterDataKind;
use thiserror::Error;

/// 排产引擎错误类型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScheduleError {
    // ===== 未找到 =====
    #[error("订单不存在: {0}")]
    OrderNotFound(String),

    #[error("搅拌器分配不存在: order_id={order_id}, rw_id={rw_id}")]
    AssignmentNotFound { order_id: String, rw_id: String },

    #[error("主数据不存在: {kind}={id}")]
    MasterDataNotFound { kind: MasterDataKind, id: String },

    // ===== 输入校验 =====
    #[error("数量无效: {0}")]
    InvalidAmount(String),

    #[error("灌装速率无效: {0}")]
    InvalidRate(String),

    #[error("订单号已被使用: {0}")]
    DuplicateOrderNumber(String),

    #[error("订单号不可修改: {order_no} -> {requested}")]
    OrderNumberImmutable { order_no: String, requested: String },

    #[error("拆分无效: {0}")]
    InvalidSplit(String),

    // ===== 资源冲突（阻断） =====
    #[error("搅拌器占用冲突: {rw_id} 已被订单 {conflicting_order_no} 占用")]
    Conflict {
        rw_id: String,
        order_id: String,
        conflicting_order_id: String,
        conflicting_order_no: String,
    },

    // ===== 导入 =====
    #[error("快照格式错误: {0}")]
    ImportMalformed(String),
}

impl ScheduleError {
    /// 对外暴露的错误类别（三类未找到统一为 NotFound）
    pub fn kind(&self) -> &'static str {
        match self {
            ScheduleError::OrderNotFound(_)
            | ScheduleError::AssignmentNotFound { .. }
            | ScheduleError::MasterDataNotFound { .. } => "NotFound",
            ScheduleError::InvalidAmount(_) => "InvalidAmount",
            ScheduleError::InvalidRate(_) => "InvalidRate",
            ScheduleError::DuplicateOrderNumber(_) => "DuplicateOrderNumber",
            ScheduleError::OrderNumberImmutable { .. } => "OrderNumberImmutable",
            ScheduleError::InvalidSplit(_) => "InvalidSplit",
            ScheduleError::Conflict { .. } => "Conflict",
            ScheduleError::ImportMalformed(_) => "ImportMalformed",
        }
    }

    pub(crate) fn product_not_found(id: &str) -> Self {
        ScheduleError::MasterDataNotFound {
            kind: MasterDataKind::Product,
            id: id.to_string(),
        }
    }

    pub(crate) fn line_not_found(id: &str) -> Self {
        ScheduleError::MasterDataNotFound {
            kind: MasterDataKind::Line,
            id: id.to_string(),
        }
    }

    pub(crate) fn stirrer_not_found(id: &str) -> Self {
        ScheduleError::MasterDataNotFound {
            kind: MasterDataKind::Stirrer,
            id: id.to_string(),
        }
    }
}

/// Result 类型别名
pub type EngineResult<T> = Result<T, ScheduleError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_kinds_collapse() {
        assert_eq!(ScheduleError::OrderNotFound("o".into()).kind(), "NotFound");
        assert_eq!(ScheduleError::stirrer_not_found("RW9").kind(), "NotFound");
        assert_eq!(
            ScheduleError::stirrer_not_found("RW9").to_string(),
            "主数据不存在: stirrer=RW9"
        );
        assert_eq!(ScheduleError::InvalidSplit("x".into()).kind(), "InvalidSplit");
    }
}
