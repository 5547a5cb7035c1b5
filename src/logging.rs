// ==========================================
// 日志系统初始化
// ==========================================
// 输出: stderr（stdout 留给命令输出，例如导出的快照 JSON）
// 级别: RUST_LOG，默认 info
// 格式: LOG_FORMAT=json 输出 JSON 行，其余为文本
// ==========================================

use tracing_subscriber::{fmt, EnvFilter};

/// 日志输出格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

impl LogFormat {
    pub fn parse(raw: &str) -> Self {
        if raw.trim().eq_ignore_ascii_case("json") {
            LogFormat::Json
        } else {
            LogFormat::Text
        }
    }

    /// 读取 LOG_FORMAT
    pub fn from_env() -> Self {
        std::env::var("LOG_FORMAT")
            .map(|v| Self::parse(&v))
            .unwrap_or(LogFormat::Text)
    }
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// 按环境变量初始化日志系统
///
/// # 环境变量
/// - RUST_LOG: 例如 RUST_LOG=debug 或 RUST_LOG=fill_line_aps::engine=trace
/// - LOG_FORMAT: text（默认）/ json
///
/// # 示例
/// ```no_run
/// use fill_line_aps::logging;
/// logging::init();
/// ```
pub fn init() {
    init_with(LogFormat::from_env());
}

pub fn init_with(format: LogFormat) {
    let builder = fmt().with_env_filter(env_filter()).with_writer(std::io::stderr);
    match format {
        LogFormat::Text => builder
            .with_target(true)
            .with_line_number(true)
            .init(),
        // 引擎入口的 #[instrument] 字段随 span 一起输出
        LogFormat::Json => builder.json().with_current_span(true).init(),
    }
}

/// 测试环境日志（debug 级别，重复初始化忽略）
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_format_parse() {
        assert_eq!(LogFormat::parse("json"), LogFormat::Json);
        assert_eq!(LogFormat::parse(" JSON "), LogFormat::Json);
        assert_eq!(LogFormat::parse("text"), LogFormat::Text);
        assert_eq!(LogFormat::parse(""), LogFormat::Text);
    }
}
