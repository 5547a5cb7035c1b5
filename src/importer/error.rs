// ==========================================
// 灌装线排产系统 - 主数据导入错误
// ==========================================
// 行号从 1 起算（第 1 行为表头）
// table 取值: products / lines / stirrers
// ==========================================

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ImportError {
    // ===== 文件 =====
    #[error("文件不存在: {0}")]
    FileNotFound(String),

    #[error("文件格式不支持: .{0}（仅支持 .csv）")]
    UnsupportedFormat(String),

    #[error("文件读取失败: {0}")]
    FileReadError(#[from] std::io::Error),

    #[error("CSV 解析失败: {0}")]
    CsvParseError(#[from] csv::Error),

    // ===== 表头 =====
    #[error("[{table}] 缺少必需列: {column}")]
    MissingColumn { table: &'static str, column: String },

    // ===== 行 =====
    #[error("[{table}] 第 {row} 行: {field} 不能为空")]
    MissingValue {
        table: &'static str,
        row: usize,
        field: String,
    },

    #[error("[{table}] 第 {row} 行: {field}={value} 重复")]
    DuplicateKey {
        table: &'static str,
        row: usize,
        field: String,
        value: String,
    },

    #[error("[{table}] 第 {row} 行: {field} 无法解析为数字: {raw}")]
    InvalidNumber {
        table: &'static str,
        row: usize,
        field: String,
        raw: String,
    },

    #[error("[{table}] 第 {row} 行: {field}={value} {constraint}")]
    OutOfRange {
        table: &'static str,
        row: usize,
        field: String,
        value: f64,
        constraint: &'static str,
    },
}

pub type ImportResult<T> = Result<T, ImportError>;
