// ==========================================
// 灌装线排产系统 - 订单号分配
// ==========================================
// 规则: 从 1 开始顺序扫描 `{prefix}-{序号补零}`，返回第一个未使用的号码
// 红线: 纯函数；调用方负责在创建订单的同一步中登记为已用
// ==========================================

use std::collections::BTreeSet;

pub const DEFAULT_ORDER_NO_PREFIX: &str = "ORD";
pub const DEFAULT_ORDER_NO_WIDTH: usize = 5;

/// 按默认格式 `ORD-00001` 分配
pub fn next_order_number(used: &BTreeSet<String>) -> String {
    next_order_number_with(used, DEFAULT_ORDER_NO_PREFIX, DEFAULT_ORDER_NO_WIDTH)
}

/// 按给定前缀与宽度分配
pub fn next_order_number_with(used: &BTreeSet<String>, prefix: &str, width: usize) -> String {
    let mut n: u64 = 1;
    loop {
        let candidate = format!("{}-{:0width$}", prefix, n, width = width);
        if !used.contains(&candidate) {
            return candidate;
        }
        n += 1;
    }
}
