// ==========================================
// 灌装线排产系统 - 导入层
// ==========================================
// 职责: 外部主数据文件 → 领域主数据
// 红线: 导入层只做解析与格式校验，不改排产状态
// ==========================================

pub mod error;
pub mod master_data_csv;

pub use error::{ImportError, ImportResult};
pub use master_data_csv::MasterDataCsvLoader;
