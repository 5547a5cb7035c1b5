// ==========================================
// 订单拆分集成测试
// ==========================================
// 测试范围:
// 1. 等分/按数量拆分: 数量守恒、谱系、继承字段
// 2. 原位替换灌装线序列中的父订单
// 3. 非法拆分: 少于 2 份、非正份额、总和不守恒
// ==========================================


use chrono::TimeDelta;
use fill_line_aps::domain::order::SplitMode;
use fill_line_aps::domain::types::HistoryEntryType;
use test_helpers::*;

#[test]
fn test_split_等分两份() {
    let engine = test_engine();
    let mut input = order_input(1000.0, "L1", t0());
    input.optional_order_ref = Some("KD-77".to_string());
    let (state, ids) = with_orders(&engine, seeded_state(), vec![input]);
    let state = engine.assign_stirrer(&state, &ids[0], "RW1").unwrap().state;

    let (state, outcome) = engine
        .split_order(&state, &ids[0], SplitMode::Parts { parts: 2 })
        .expect("拆分失败")
        .into_parts();

    assert_eq!(outcome.parent_order_id, ids[0]);
    assert_eq!(outcome.children.len(), 2);
    assert!(state.find_order(&ids[0]).is_none());
    assert!(state.find_assignment(&ids[0]).is_none());

    for child in &outcome.children {
        assert_eq!(child.amount_l, 500.0);
        assert_eq!(child.parent_order_id.as_deref(), Some(ids[0].as_str()));
        assert_eq!(child.line_id, "L1");
        assert_eq!(child.product_id, "P-100");
        assert_eq!(child.optional_order_ref.as_deref(), Some("KD-77"));
        assert_eq!(child.fill_start, t0());
        assert_eq!(child.fill_end, t0() + TimeDelta::minutes(50));
        assert_eq!(child.make_start, t0() - TimeDelta::minutes(400));
    }

    // 子订单使用新订单号，父订单号保持已用
    let numbers: Vec<&str> = outcome.children.iter().map(|c| c.order_no.as_str()).collect();
    assert_eq!(numbers, vec!["ORD-00002", "ORD-00003"]);
    assert!(state.is_order_number_used("ORD-00001"));

    let latest = &state.history[0];
    assert_eq!(latest.entry_type, HistoryEntryType::Split);
    assert_eq!(latest.payload_str("orderNo"), Some("ORD-00001"));
}

#[test]
fn test_split_按数量并保持序列位置() {
    let engine = test_engine();
    let (state, ids) = with_orders(
        &engine,
        seeded_state(),
        vec![
            order_input(100.0, "L1", t0()),
            order_input(900.0, "L1", t0() + TimeDelta::hours(1)),
            order_input(100.0, "L1", t0() + TimeDelta::hours(4)),
        ],
    );

    let (state, outcome) = engine
        .split_order(
            &state,
            &ids[1],
            SplitMode::Amounts {
                amounts: vec![200.0, 300.0, 400.0],
            },
        )
        .expect("拆分失败")
        .into_parts();

    let child_ids: Vec<String> = outcome.children.iter().map(|c| c.id.clone()).collect();
    let amounts: Vec<f64> = outcome.children.iter().map(|c| c.amount_l).collect();
    assert_eq!(amounts, vec![200.0, 300.0, 400.0]);

    let mut expected = vec![ids[0].clone()];
    expected.extend(child_ids);
    expected.push(ids[2].clone());
    assert_eq!(state.line_order_map["L1"], expected);
}

#[test]
fn test_split_容差内守恒() {
    let engine = test_engine();
    let (state, ids) = with_orders(&engine, seeded_state(), vec![order_input(100.0, "L1", t0())]);

    let ok = engine.split_order(
        &state,
        &ids[0],
        SplitMode::Amounts {
            amounts: vec![33.33, 33.33, 33.335],
        },
    );
    assert!(ok.is_ok());

    // 等分三份时的浮点误差同样在容差内
    let ok = engine.split_order(&state, &ids[0], SplitMode::Parts { parts: 3 });
    assert!(ok.is_ok());
}

#[test]
fn test_split_非法拆分() {
    let engine = test_engine();
    let (state, ids) = with_orders(&engine, seeded_state(), vec![order_input(1000.0, "L1", t0())]);

    let cases = vec![
        SplitMode::Parts { parts: 0 },
        SplitMode::Parts { parts: 1 },
        // 超过份数上限，不应先分配份额
        SplitMode::Parts { parts: 1001 },
        SplitMode::Parts { parts: u32::MAX },
        SplitMode::Amounts { amounts: vec![1000.0] },
        SplitMode::Amounts { amounts: vec![] },
        SplitMode::Amounts {
            amounts: vec![600.0, 300.0],
        },
        SplitMode::Amounts {
            amounts: vec![1200.0, -200.0],
        },
        SplitMode::Amounts {
            amounts: vec![1000.0, 0.0],
        },
    ];
    for mode in cases {
        let err = engine
            .split_order(&state, &ids[0], mode.clone())
            .unwrap_err();
        assert_eq!(err.kind(), "InvalidSplit", "mode={:?}", mode);
    }

    // 失败不改变原状态
    assert_eq!(state.orders.len(), 1);
    assert_eq!(state.line_order_map["L1"], vec![ids[0].clone()]);

    let err = engine
        .split_order(&state, "missing", SplitMode::Parts { parts: 2 })
        .unwrap_err();
    assert_eq!(err.kind(), "NotFound");
}
