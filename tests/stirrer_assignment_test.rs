// ==========================================
// 搅拌器分配与实绩上报集成测试
// ==========================================
// 测试范围:
// 1. 分配: 成功/替换/阻断性冲突/半开区间
// 2. 撤销: 幂等
// 3. 实绩上报: 剩余量换算、分配同步、IST 记录
// ==========================================


use chrono::TimeDelta;
use fill_line_aps::domain::stirrer::ProgressReport;
use fill_line_aps::domain::types::{HistoryEntryType, ProductionStatus};
use fill_line_aps::engine::error::ScheduleError;
use test_helpers::*;

fn report(order_id: &str, rw_id: &str, remaining_l: Option<f64>, filled_l: Option<f64>) -> ProgressReport {
    ProgressReport {
        rw_id: rw_id.to_string(),
        order_id: order_id.to_string(),
        status: ProductionStatus::Running,
        remaining_l,
        filled_l,
    }
}

// ==========================================
// 分配
// ==========================================

#[test]
fn test_assign_stirrer_成功并替换原分配() {
    let engine = test_engine();
    let (state, ids) = with_orders(&engine, seeded_state(), vec![order_input(100.0, "L1", t0())]);

    let (state, assignment) = engine
        .assign_stirrer(&state, &ids[0], "RW1")
        .expect("分配失败")
        .into_parts();
    let order = state.find_order(&ids[0]).unwrap();
    assert_eq!(assignment.rw_start, order.make_start);
    assert_eq!(assignment.rw_end, order.fill_end);

    let state = engine.assign_stirrer(&state, &ids[0], "RW2").unwrap().state;
    assert_eq!(state.assignments.len(), 1);
    assert_eq!(state.find_assignment(&ids[0]).unwrap().rw_id, "RW2");
    assert_eq!(state.assignments_for_stirrer("RW1").len(), 0);
}

#[test]
fn test_assign_stirrer_冲突阻断且对称() {
    let engine = test_engine();
    let (state, ids) = with_orders(
        &engine,
        seeded_state(),
        vec![
            order_input(100.0, "L1", t0()),
            order_input(100.0, "L2", t0() + TimeDelta::minutes(5)),
        ],
    );

    for (first, second) in [(&ids[0], &ids[1]), (&ids[1], &ids[0])] {
        let assigned = engine.assign_stirrer(&state, first, "RW1").unwrap().state;
        let err = engine.assign_stirrer(&assigned, second, "RW1").unwrap_err();
        match err {
            ScheduleError::Conflict {
                rw_id,
                order_id,
                conflicting_order_id,
                ..
            } => {
                assert_eq!(rw_id, "RW1");
                assert_eq!(&order_id, second);
                assert_eq!(&conflicting_order_id, first);
            }
            other => panic!("期望 Conflict，实际 {:?}", other),
        }
        // 阻断性冲突不写提示通知
        assert!(assigned.conflict_notice.is_none());
        assert_eq!(assigned.assignments.len(), 1);
    }
}

#[test]
fn test_assign_stirrer_首尾相接不算重叠() {
    let engine = test_engine();
    // a: [T-80, T+10)  b: [T+10, T+100)
    let (state, ids) = with_orders(
        &engine,
        seeded_state(),
        vec![
            order_input(100.0, "L1", t0()),
            order_input(100.0, "L2", t0() + TimeDelta::minutes(90)),
        ],
    );
    let state = engine.assign_stirrer(&state, &ids[0], "RW1").unwrap().state;
    let state = engine
        .assign_stirrer(&state, &ids[1], "RW1")
        .expect("相接区间不应冲突")
        .state;
    assert_eq!(state.assignments_for_stirrer("RW1").len(), 2);
}

#[test]
fn test_assign_stirrer_不存在() {
    let engine = test_engine();
    let (state, ids) = with_orders(&engine, seeded_state(), vec![order_input(100.0, "L1", t0())]);

    let err = engine.assign_stirrer(&state, "missing", "RW1").unwrap_err();
    assert_eq!(err, ScheduleError::OrderNotFound("missing".to_string()));

    let err = engine.assign_stirrer(&state, &ids[0], "RW9").unwrap_err();
    assert_eq!(err.kind(), "NotFound");
}

#[test]
fn test_assign_stirrer_成功时清除提示通知() {
    let engine = test_engine();
    let (state, ids) = with_orders(
        &engine,
        seeded_state(),
        vec![
            order_input(100.0, "L1", t0()),
            order_input(100.0, "L1", t0() + TimeDelta::minutes(200)),
            order_input(100.0, "L3", t0() + TimeDelta::hours(10)),
        ],
    );
    let state = engine.assign_stirrer(&state, &ids[0], "RW1").unwrap().state;
    let state = engine.assign_stirrer(&state, &ids[1], "RW1").unwrap().state;
    let order_ids = vec![ids[0].clone(), ids[1].clone()];
    let state = engine.reorder_line_orders(&state, "L1", &order_ids).unwrap().state;
    assert!(state.conflict_notice.is_some());

    let state = engine.assign_stirrer(&state, &ids[2], "RW2").unwrap().state;
    assert!(state.conflict_notice.is_none());
}

// ==========================================
// 撤销
// ==========================================

#[test]
fn test_remove_assignment_幂等() {
    let engine = test_engine();
    let (state, ids) = with_orders(&engine, seeded_state(), vec![order_input(100.0, "L1", t0())]);
    let state = engine.assign_stirrer(&state, &ids[0], "RW1").unwrap().state;

    let (state, removed) = engine.remove_assignment(&state, &ids[0]).into_parts();
    assert!(removed);
    assert!(state.assignments.is_empty());
    let latest = &state.history[0];
    assert_eq!(latest.entry_type, HistoryEntryType::Assign);
    assert_eq!(latest.payload_str("rwId"), Some("RW1"));

    let history_len = state.history.len();
    let (state, removed) = engine.remove_assignment(&state, &ids[0]).into_parts();
    assert!(!removed);
    assert_eq!(state.history.len(), history_len);
}

// ==========================================
// 实绩上报
// ==========================================

#[test]
fn test_update_progress_按剩余量重算结束时间() {
    let (engine, clock) = test_engine_with_clock();
    let (state, ids) = with_orders(&engine, seeded_state(), vec![order_input(1000.0, "L1", t0())]);
    let state = engine.assign_stirrer(&state, &ids[0], "RW1").unwrap().state;

    clock.advance(TimeDelta::minutes(30));
    let now = t0() + TimeDelta::minutes(30);

    let (state, outcome) = engine
        .update_progress(&state, report(&ids[0], "RW1", Some(400.0), None))
        .expect("上报失败")
        .into_parts();

    // 剩余 400 L / 10 L/min = 40 分钟
    assert_eq!(outcome.fill_end, now + TimeDelta::minutes(40));
    assert_eq!(outcome.ist_update.filled_l, 600.0);
    assert_eq!(outcome.ist_update.remaining_l, 400.0);
    assert_eq!(outcome.ist_update.timestamp, now);

    let order = state.find_order(&ids[0]).unwrap();
    assert_eq!(order.fill_end, outcome.fill_end);
    assert_eq!(state.find_assignment(&ids[0]).unwrap().rw_end, outcome.fill_end);
    assert_eq!(state.ist_updates_for_order(&ids[0]).len(), 1);
    assert_eq!(state.history[0].entry_type, HistoryEntryType::IstUpdate);
}

#[test]
fn test_update_progress_实绩记录最新在前() {
    let (engine, clock) = test_engine_with_clock();
    let (state, ids) = with_orders(&engine, seeded_state(), vec![order_input(1000.0, "L1", t0())]);
    let state = engine.assign_stirrer(&state, &ids[0], "RW1").unwrap().state;

    clock.advance(TimeDelta::minutes(10));
    let state = engine
        .update_progress(&state, report(&ids[0], "RW1", Some(900.0), None))
        .unwrap()
        .state;
    clock.advance(TimeDelta::minutes(10));
    let state = engine
        .update_progress(&state, report(&ids[0], "RW1", Some(800.0), None))
        .unwrap()
        .state;

    let remaining: Vec<f64> = state
        .ist_updates_for_order(&ids[0])
        .iter()
        .map(|u| u.remaining_l)
        .collect();
    assert_eq!(remaining, vec![800.0, 900.0]);

    let recent = state.recent_history(2);
    assert!(recent[0].timestamp > recent[1].timestamp);
    assert_eq!(recent[0].entry_type, HistoryEntryType::IstUpdate);
}

#[test]
fn test_update_progress_推导缺省数量() {
    let engine = test_engine();
    let (state, ids) = with_orders(&engine, seeded_state(), vec![order_input(1000.0, "L1", t0())]);
    let state = engine.assign_stirrer(&state, &ids[0], "RW1").unwrap().state;

    // 只给已灌装量: 剩余 = 1000 - 250
    let outcome = engine
        .update_progress(&state, report(&ids[0], "RW1", None, Some(250.0)))
        .unwrap()
        .output;
    assert_eq!(outcome.ist_update.remaining_l, 750.0);
    assert_eq!(outcome.fill_end, t0() + TimeDelta::minutes(75));

    // 都不给: 视为已完成
    let outcome = engine
        .update_progress(&state, report(&ids[0], "RW1", None, None))
        .unwrap()
        .output;
    assert_eq!(outcome.ist_update.filled_l, 1000.0);
    assert_eq!(outcome.ist_update.remaining_l, 0.0);
    assert_eq!(outcome.fill_end, t0());
}

#[test]
fn test_update_progress_错误() {
    let engine = test_engine();
    let (state, ids) = with_orders(&engine, seeded_state(), vec![order_input(1000.0, "L1", t0())]);

    let err = engine
        .update_progress(&state, report("missing", "RW1", Some(1.0), None))
        .unwrap_err();
    assert!(matches!(err, ScheduleError::OrderNotFound(_)));

    let err = engine
        .update_progress(&state, report(&ids[0], "RW1", Some(1.0), None))
        .unwrap_err();
    assert!(matches!(err, ScheduleError::AssignmentNotFound { .. }));
    assert_eq!(err.kind(), "NotFound");

    let state = engine.assign_stirrer(&state, &ids[0], "RW1").unwrap().state;
    let err = engine
        .update_progress(&state, report(&ids[0], "RW2", Some(1.0), None))
        .unwrap_err();
    assert!(matches!(err, ScheduleError::AssignmentNotFound { .. }));

    let err = engine
        .update_progress(&state, report(&ids[0], "RW1", Some(-1.0), None))
        .unwrap_err();
    assert_eq!(err.kind(), "InvalidAmount");
    assert!(state.ist_updates.is_empty());
}

#[test]
fn test_update_progress_延长后产生提示冲突() {
    let (engine, clock) = test_engine_with_clock();
    // a: [T-80, T+10)  b: [T+10, T+100)，同一搅拌器首尾相接
    let (state, ids) = with_orders(
        &engine,
        seeded_state(),
        vec![
            order_input(100.0, "L1", t0()),
            order_input(100.0, "L2", t0() + TimeDelta::minutes(90)),
        ],
    );
    let state = engine.assign_stirrer(&state, &ids[0], "RW1").unwrap().state;
    let state = engine.assign_stirrer(&state, &ids[1], "RW1").unwrap().state;

    // T+5 时仍剩 100 L: 结束推迟到 T+15
    clock.advance(TimeDelta::minutes(5));
    let mut progress = report(&ids[0], "RW1", Some(100.0), None);
    progress.status = ProductionStatus::Paused;
    let state = engine.update_progress(&state, progress).unwrap().state;

    let notice = state.conflict_notice.expect("应生成冲突通知");
    assert_eq!(notice.conflicts.len(), 1);
    assert_eq!(notice.conflicts[0].first_order_id, ids[0]);
}
