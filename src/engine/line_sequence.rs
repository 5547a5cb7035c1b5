// ==========================================
// 灌装线排产系统 - 灌装线序列维护
// ==========================================
// 职责: 灌装线ID → 订单ID序列 的增删改
// 红线: 每个订单ID在其所属灌装线序列中恰好出现一次
// ==========================================

use crate::domain::order::Order;
use std::collections::{BTreeMap, HashSet};

pub type LineOrderMap = BTreeMap<String, Vec<String>>;

/// 追加到某条线末尾（已存在则不变）
pub fn append_to_line(map: &mut LineOrderMap, line_id: &str, order_id: &str) {
    let seq = map.entry(line_id.to_string()).or_default();
    if !seq.iter().any(|id| id == order_id) {
        seq.push(order_id.to_string());
    }
}

/// 从所有线上移除，返回是否有移除
pub fn remove_from_all(map: &mut LineOrderMap, order_id: &str) -> bool {
    let mut removed = false;
    for seq in map.values_mut() {
        let before = seq.len();
        seq.retain(|id| id != order_id);
        removed |= seq.len() != before;
    }
    removed
}

/// 用 replacements 原位替换 order_id；不在序列中则追加到末尾
pub fn replace_in_line(
    map: &mut LineOrderMap,
    line_id: &str,
    order_id: &str,
    replacements: &[String],
) {
    let seq = map.entry(line_id.to_string()).or_default();
    match seq.iter().position(|id| id == order_id) {
        Some(pos) => {
            seq.splice(pos..=pos, replacements.iter().cloned());
        }
        None => seq.extend(replacements.iter().cloned()),
    }
}

/// 清洗调用方给出的序列: 丢弃不存在或不属于该线的订单，去重
pub fn sanitize_sequence(orders: &[Order], line_id: &str, requested: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    requested
        .iter()
        .filter(|id| {
            orders
                .iter()
                .any(|o| &o.id == *id && o.line_id == line_id)
        })
        .filter(|id| seen.insert(id.as_str()))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_replace_in_place() {
        let mut map = LineOrderMap::new();
        map.insert("L1".into(), ids(&["a", "p", "b"]));
        replace_in_line(&mut map, "L1", "p", &ids(&["c1", "c2"]));
        assert_eq!(map["L1"], ids(&["a", "c1", "c2", "b"]));
    }

    #[test]
    fn test_replace_missing_appends() {
        let mut map = LineOrderMap::new();
        replace_in_line(&mut map, "L2", "p", &ids(&["c1"]));
        assert_eq!(map["L2"], ids(&["c1"]));
    }

    #[test]
    fn test_remove_and_append() {
        let mut map = LineOrderMap::new();
        append_to_line(&mut map, "L1", "a");
        append_to_line(&mut map, "L1", "a");
        assert_eq!(map["L1"].len(), 1);
        assert!(remove_from_all(&mut map, "a"));
        assert!(!remove_from_all(&mut map, "a"));
    }
}
