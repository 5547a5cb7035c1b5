// ==========================================
// 灌装线重排集成测试
// ==========================================
// 测试范围:
// 1. 链式计时: 后一单 fill_start = 前一单 fill_end
// 2. 序列清洗: 未知/外线订单丢弃，未列出订单追加
// 3. 提示性冲突: 提交但生成冲突通知，需显式清除
// 4. 跳过: 主数据缺失的订单保持原时间窗
// ==========================================


use chrono::TimeDelta;
use fill_line_aps::domain::master_data::{MasterData, Product};
use fill_line_aps::domain::order::CreateOrderInput;
use fill_line_aps::domain::types::HistoryEntryType;
use test_helpers::*;

fn ids_of(ids: &[&String]) -> Vec<String> {
    ids.iter().map(|s| s.to_string()).collect()
}

#[test]
fn test_reorder_链式计时() {
    let engine = test_engine();
    let (state, ids) = with_orders(
        &engine,
        seeded_state(),
        vec![
            order_input(100.0, "L1", t0()),
            order_input(200.0, "L1", t0() + TimeDelta::hours(5)),
            order_input(300.0, "L1", t0() + TimeDelta::hours(2)),
        ],
    );
    let (a, b, c) = (&ids[0], &ids[1], &ids[2]);

    let sequence = ids_of(&[c, a, b]);
    let (state, outcome) = engine
        .reorder_line_orders(&state, "L1", &sequence)
        .expect("重排失败")
        .into_parts();

    assert_eq!(outcome.order_ids, sequence);
    assert_eq!(outcome.reflowed_order_ids, sequence);
    assert!(outcome.skipped_order_ids.is_empty());
    assert_eq!(state.line_order_map["L1"], sequence);

    let oc = state.find_order(c).unwrap();
    let oa = state.find_order(a).unwrap();
    let ob = state.find_order(b).unwrap();

    // 首单保持自身开始时间
    assert_eq!(oc.fill_start, t0() + TimeDelta::hours(2));
    assert_eq!(oc.fill_end, oc.fill_start + TimeDelta::minutes(30));
    assert_eq!(oa.fill_start, oc.fill_end);
    assert_eq!(oa.fill_end, oa.fill_start + TimeDelta::minutes(10));
    assert_eq!(ob.fill_start, oa.fill_end);
    assert_eq!(ob.make_end, ob.fill_start);
    assert_eq!(ob.make_start, ob.fill_start - TimeDelta::minutes(160));

    let latest = &state.history[0];
    assert_eq!(latest.entry_type, HistoryEntryType::Move);
    assert_eq!(latest.payload_str("lineId"), Some("L1"));
}

#[test]
fn test_reorder_幂等() {
    let engine = test_engine();
    let (state, ids) = with_orders(
        &engine,
        seeded_state(),
        vec![
            order_input(100.0, "L1", t0()),
            order_input(250.0, "L1", t0() + TimeDelta::hours(3)),
        ],
    );

    let first = engine.reorder_line_orders(&state, "L1", &ids).unwrap().state;
    let second = engine.reorder_line_orders(&first, "L1", &ids).unwrap().state;

    for id in &ids {
        let a = first.find_order(id).unwrap();
        let b = second.find_order(id).unwrap();
        assert_eq!(a.fill_start, b.fill_start);
        assert_eq!(a.fill_end, b.fill_end);
        assert_eq!(a.make_start, b.make_start);
    }
}

#[test]
fn test_reorder_清洗序列() {
    let engine = test_engine();
    let (state, ids) = with_orders(
        &engine,
        seeded_state(),
        vec![
            order_input(100.0, "L1", t0()),
            order_input(100.0, "L1", t0()),
            order_input(100.0, "L2", t0()),
        ],
    );
    let (a, b, foreign) = (&ids[0], &ids[1], &ids[2]);

    // 外线订单、未知ID、重复ID被丢弃；未列出的 a 追加在末尾
    let requested = vec![
        b.clone(),
        foreign.clone(),
        "ghost".to_string(),
        b.clone(),
    ];
    let (state, outcome) = engine
        .reorder_line_orders(&state, "L1", &requested)
        .unwrap()
        .into_parts();

    assert_eq!(outcome.reflowed_order_ids, vec![b.clone()]);
    assert_eq!(outcome.order_ids, vec![b.clone(), a.clone()]);
    assert_eq!(state.line_order_map["L1"], vec![b.clone(), a.clone()]);
    assert_eq!(state.line_order_map["L2"], vec![foreign.clone()]);
}

#[test]
fn test_reorder_未知灌装线() {
    let engine = test_engine();
    let err = engine
        .reorder_line_orders(&seeded_state(), "L9", &[])
        .unwrap_err();
    assert_eq!(err.kind(), "NotFound");
}

#[test]
fn test_reorder_冲突为提示性() {
    let engine = test_engine();
    let (state, ids) = with_orders(
        &engine,
        seeded_state(),
        vec![
            order_input(100.0, "L1", t0()),
            order_input(100.0, "L1", t0() + TimeDelta::minutes(200)),
        ],
    );
    let state = engine.assign_stirrer(&state, &ids[0], "RW1").unwrap().state;
    let state = engine.assign_stirrer(&state, &ids[1], "RW1").unwrap().state;
    assert!(state.conflict_notice.is_none());

    // 第二单被拉到 T+10min，搅拌窗口 [T-70, T+20) 与第一单 [T-80, T+10) 重叠
    let (state, outcome) = engine
        .reorder_line_orders(&state, "L1", &ids)
        .expect("提示性冲突不应阻断重排")
        .into_parts();

    assert_eq!(outcome.conflicts.len(), 1);
    assert_eq!(outcome.conflicts[0].rw_id, "RW1");
    assert_eq!(outcome.conflicts[0].first_order_id, ids[0]);
    assert_eq!(outcome.conflicts[0].second_order_id, ids[1]);

    let moved = state.find_order(&ids[1]).unwrap();
    assert_eq!(moved.fill_start, t0() + TimeDelta::minutes(10));
    let assignment = state.find_assignment(&ids[1]).unwrap();
    assert_eq!(assignment.rw_start, moved.make_start);
    assert_eq!(assignment.rw_end, moved.fill_end);

    let notice = state.conflict_notice.clone().expect("应生成冲突通知");
    assert!(notice.message.contains("RW1"));
    assert!(notice.message.contains("ORD-00002"));

    let (state, cleared) = engine.clear_conflict(&state).into_parts();
    assert!(cleared);
    assert!(state.conflict_notice.is_none());
    // 清除通知不改变分配
    assert_eq!(state.assignments.len(), 2);
}

#[test]
fn test_reorder_跳过主数据缺失的订单() {
    let engine = test_engine();
    let mut master_data = MasterData::seed();
    master_data.products.push(Product {
        product_id: "P-200".to_string(),
        name: "Glasreiniger".to_string(),
        article_no: "GR-200".to_string(),
        viscosity: None,
        make_time_min_per_l: 0.5,
        fill_factor: None,
    });
    let state = engine.replace_master_data(&seeded_state(), master_data).state;

    let orphan_input = CreateOrderInput {
        product_id: "P-200".to_string(),
        ..order_input(100.0, "L1", t0() + TimeDelta::hours(1))
    };
    let (state, ids) = with_orders(
        &engine,
        state,
        vec![
            order_input(100.0, "L1", t0()),
            orphan_input,
            order_input(100.0, "L1", t0() + TimeDelta::hours(8)),
        ],
    );
    let orphan_before = state.find_order(&ids[1]).unwrap().clone();

    // 移除 P-200 后重排
    let state = engine.replace_master_data(&state, MasterData::seed()).state;
    let (state, outcome) = engine
        .reorder_line_orders(&state, "L1", &ids)
        .unwrap()
        .into_parts();

    assert_eq!(outcome.skipped_order_ids, vec![ids[1].clone()]);
    assert_eq!(outcome.reflowed_order_ids, vec![ids[0].clone(), ids[2].clone()]);

    let orphan_after = state.find_order(&ids[1]).unwrap();
    assert_eq!(orphan_after.fill_start, orphan_before.fill_start);
    assert_eq!(orphan_after.fill_end, orphan_before.fill_end);

    // 游标未被跳过的订单推进
    let first = state.find_order(&ids[0]).unwrap();
    let third = state.find_order(&ids[2]).unwrap();
    assert_eq!(third.fill_start, first.fill_end);
}
