// ==========================================
// 灌装线排产系统 - API 层
// ==========================================
// 职责: 提供业务 API 接口，供命令行与嵌入方调用
// ==========================================

pub mod error;
pub mod response;
pub mod schedule_api;

// 重导出核心类型
pub use error::{ApiError, ApiResult};
pub use response::{ActionResponse, Cleared, Exported, Removed};
pub use schedule_api::ScheduleApi;
