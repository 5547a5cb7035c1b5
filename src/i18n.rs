// ==========================================
// 国际化 (i18n) 模块
// ==========================================
// 使用 rust-i18n 库，词条见 locales/*.yml
// 支持: zh-CN（默认）/ en / de
// 用途: 历史记录与冲突提示的文案
// ==========================================
// 注意: rust_i18n::i18n! 宏已在 lib.rs 中初始化
// ==========================================

use std::sync::Once;

/// 默认语言
pub const DEFAULT_LOCALE: &str = "zh-CN";

/// 已提供词条的语言
pub const SUPPORTED_LOCALES: [&str; 3] = ["zh-CN", "en", "de"];

// rust-i18n 自身的初始语言为 en；首次使用前若未显式设置，切换为 DEFAULT_LOCALE
static LOCALE_INIT: Once = Once::new();

fn ensure_default_locale() {
    LOCALE_INIT.call_once(|| rust_i18n::set_locale(DEFAULT_LOCALE));
}

/// 获取当前语言
pub fn current_locale() -> String {
    ensure_default_locale();
    rust_i18n::locale().to_string()
}

/// 规范化语言代码: "de-DE" → "de"，"zh" / "zh_CN" → "zh-CN"
///
/// 无法识别时返回 None
pub fn normalize_locale(raw: &str) -> Option<&'static str> {
    let raw = raw.trim().replace('_', "-");
    if let Some(exact) = SUPPORTED_LOCALES
        .iter()
        .copied()
        .find(|l| l.eq_ignore_ascii_case(&raw))
    {
        return Some(exact);
    }
    let primary = raw.split('-').next().unwrap_or_default().to_ascii_lowercase();
    match primary.as_str() {
        "zh" => Some("zh-CN"),
        "en" => Some("en"),
        "de" => Some("de"),
        _ => None,
    }
}

/// 设置语言；不支持的语言回退为默认语言
///
/// # 返回
/// 实际生效的语言代码
pub fn set_locale(locale: &str) -> &'static str {
    let effective = normalize_locale(locale).unwrap_or_else(|| {
        tracing::warn!(locale, fallback = DEFAULT_LOCALE, "不支持的语言，使用默认语言");
        DEFAULT_LOCALE
    });
    ensure_default_locale();
    rust_i18n::set_locale(effective);
    effective
}

/// 翻译消息，替换 `%{name}` 占位符
///
/// # 示例
/// ```no_run
/// use fill_line_aps::i18n::t_with_args;
/// let msg = t_with_args("history.delete", &[("order_no", "ORD-00001")]);
/// ```
pub fn t_with_args(key: &str, args: &[(&str, &str)]) -> String {
    ensure_default_locale();
    let mut result = rust_i18n::t!(key).to_string();
    for (k, v) in args {
        let placeholder = format!("%{{{}}}", k);
        result = result.replace(&placeholder, v);
    }
    result
}
