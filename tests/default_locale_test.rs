// ==========================================
// 默认语言集成测试
// ==========================================
// 测试范围:
// 1. 未经 AppState 初始化、直接构造引擎时，历史文案为 zh-CN
// 2. 显式设置语言后按新语言输出
// ==========================================
// 注意: locale 为进程级全局状态，本文件只放一个测试函数
// ==========================================


use fill_line_aps::api::ScheduleApi;
use fill_line_aps::i18n;
use test_helpers::*;

#[test]
fn test_直接构造引擎使用默认语言() {
    let api = ScheduleApi::in_memory(test_engine());
    api.create_order(order_input(100.0, "L1", t0())).unwrap();

    let history = api.recent_history(1).unwrap();
    assert_eq!(history[0].message, "创建订单 ORD-00001");
    assert_eq!(i18n::current_locale(), i18n::DEFAULT_LOCALE);

    assert_eq!(i18n::set_locale("en"), "en");
    api.create_order(order_input(100.0, "L1", t0())).unwrap();
    let history = api.recent_history(1).unwrap();
    assert_eq!(history[0].message, "Order ORD-00002 created");

    i18n::set_locale(i18n::DEFAULT_LOCALE);
}
