// ==========================================
// 灌装线排产系统 - 排产 API
// ==========================================
// 职责: 持有当前排产状态，串行执行引擎状态转移并自动保存快照
// 红线: 状态只在转移成功且保存成功后替换（整体提交）
// ==========================================

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::api::error::{ApiError, ApiResult};
use crate::api::response::{Cleared, Exported, Removed};
use crate::domain::history::HistoryEntry;
use crate::domain::master_data::MasterData;
use crate::domain::meta::{PlanningPreferences, TimelineSettings, TimelineSettingsPatch};
use crate::domain::order::{CreateOrderInput, Order, OrderPatch, SplitMode};
use crate::domain::state::ScheduleState;
use crate::domain::stirrer::{ConflictNotice, IstUpdate, ProgressReport, StirrerAssignment};
use crate::engine::schedule::{
    ImportOutcome, MasterDataReplaced, OrderCreated, OrderUpdated, ProgressOutcome,
    ReflowOutcome, ScheduleEngine, SplitOutcome, Transition,
};
use crate::importer::MasterDataCsvLoader;
use crate::repository::snapshot_repo::SnapshotRepository;

// ==========================================
// ScheduleApi - 排产 API
// ==========================================

/// 排产API
///
/// 职责：
/// 1. 订单登记、修改、删除、拆分
/// 2. 灌装线重排与搅拌器分配
/// 3. 快照导入导出、主数据替换
/// 4. 每次提交后自动保存快照（配置了仓储时）
pub struct ScheduleApi {
    engine: ScheduleEngine,
    state: Mutex<ScheduleState>,
    snapshot_repo: Option<Arc<SnapshotRepository>>,
}

impl ScheduleApi {
    /// 创建新的ScheduleApi实例
    ///
    /// # 参数
    /// - engine: 排产引擎
    /// - initial_state: 初始状态（通常为已保存的快照或种子主数据）
    /// - snapshot_repo: 快照仓储；为 None 时不持久化
    pub fn new(
        engine: ScheduleEngine,
        initial_state: ScheduleState,
        snapshot_repo: Option<Arc<SnapshotRepository>>,
    ) -> Self {
        Self {
            engine,
            state: Mutex::new(initial_state),
            snapshot_repo,
        }
    }

    /// 仅内存状态（测试/一次性脚本）
    pub fn in_memory(engine: ScheduleEngine) -> Self {
        Self::new(engine, ScheduleState::seeded(), None)
    }

    fn lock_state(&self) -> ApiResult<MutexGuard<'_, ScheduleState>> {
        self.state
            .lock()
            .map_err(|e| ApiError::InternalError(format!("状态锁获取失败: {}", e)))
    }

    /// 执行一次状态转移并提交
    ///
    /// 引擎失败或保存失败时保持原状态
    fn commit<T, F>(&self, action: &str, op: F) -> ApiResult<T>
    where
        F: FnOnce(&ScheduleEngine, &ScheduleState) -> ApiResult<Transition<T>>,
    {
        let mut guard = self.lock_state()?;
        let (next, output) = op(&self.engine, &guard)?.into_parts();

        if let Some(repo) = &self.snapshot_repo {
            repo.save(&next).map_err(|e| {
                tracing::error!(action, error = %e, "快照保存失败，放弃本次提交");
                ApiError::from(e)
            })?;
        }

        *guard = next;
        tracing::debug!(action, orders = guard.orders.len(), "状态已提交");
        Ok(output)
    }

    // ==========================================
    // 只读视图
    // ==========================================

    /// 当前状态的完整副本
    pub fn current_state(&self) -> ApiResult<ScheduleState> {
        Ok(self.lock_state()?.clone())
    }

    /// 查询灌装线上的订单（按序列顺序）
    ///
    /// # 参数
    /// - line_id: 灌装线ID
    pub fn list_line_orders(&self, line_id: &str) -> ApiResult<Vec<Order>> {
        if line_id.trim().is_empty() {
            return Err(ApiError::InvalidInput("灌装线ID不能为空".to_string()));
        }
        let state = self.lock_state()?;
        Ok(state.orders_on_line(line_id).into_iter().cloned().collect())
    }

    /// 查询搅拌器的分配（按开始时间排序）
    pub fn list_stirrer_assignments(&self, rw_id: &str) -> ApiResult<Vec<StirrerAssignment>> {
        if rw_id.trim().is_empty() {
            return Err(ApiError::InvalidInput("搅拌器ID不能为空".to_string()));
        }
        let state = self.lock_state()?;
        Ok(state
            .assignments_for_stirrer(rw_id)
            .into_iter()
            .cloned()
            .collect())
    }

    /// 最近的历史记录（最新在前）
    pub fn recent_history(&self, limit: usize) -> ApiResult<Vec<HistoryEntry>> {
        let state = self.lock_state()?;
        Ok(state.recent_history(limit).into_iter().cloned().collect())
    }

    /// 订单的实绩上报记录
    pub fn list_ist_updates(&self, order_id: &str) -> ApiResult<Vec<IstUpdate>> {
        let state = self.lock_state()?;
        Ok(state
            .ist_updates_for_order(order_id)
            .into_iter()
            .cloned()
            .collect())
    }

    /// 当前提示性冲突
    pub fn conflict_notice(&self) -> ApiResult<Option<ConflictNotice>> {
        Ok(self.lock_state()?.conflict_notice.clone())
    }

    // ==========================================
    // 订单登记
    // ==========================================

    pub fn create_order(&self, input: CreateOrderInput) -> ApiResult<OrderCreated> {
        let created = self.commit("create_order", |engine, state| {
            Ok(engine.create_order(state, input)?)
        })?;
        tracing::info!(order_no = %created.order.order_no, order_id = %created.order.id, "订单已创建");
        Ok(created)
    }

    pub fn update_order(&self, order_id: &str, patch: OrderPatch) -> ApiResult<OrderUpdated> {
        self.commit("update_order", |engine, state| {
            Ok(engine.update_order(state, order_id, patch)?)
        })
    }

    /// 删除订单（幂等）
    pub fn delete_order(&self, order_id: &str) -> ApiResult<Removed> {
        let removed = self.commit("delete_order", |engine, state| {
            Ok(engine.delete_order(state, order_id))
        })?;
        Ok(Removed { removed })
    }

    pub fn split_order(&self, order_id: &str, mode: SplitMode) -> ApiResult<SplitOutcome> {
        self.commit("split_order", |engine, state| {
            Ok(engine.split_order(state, order_id, mode)?)
        })
    }

    // ==========================================
    // 灌装线重排
    // ==========================================

    pub fn reorder_line_orders(
        &self,
        line_id: &str,
        order_ids: &[String],
    ) -> ApiResult<ReflowOutcome> {
        self.commit("reorder_line_orders", |engine, state| {
            Ok(engine.reorder_line_orders(state, line_id, order_ids)?)
        })
    }

    // ==========================================
    // 搅拌器
    // ==========================================

    pub fn assign_stirrer(&self, order_id: &str, rw_id: &str) -> ApiResult<StirrerAssignment> {
        self.commit("assign_stirrer", |engine, state| {
            Ok(engine.assign_stirrer(state, order_id, rw_id)?)
        })
    }

    /// 取消分配（幂等）
    pub fn remove_assignment(&self, order_id: &str) -> ApiResult<Removed> {
        let removed = self.commit("remove_assignment", |engine, state| {
            Ok(engine.remove_assignment(state, order_id))
        })?;
        Ok(Removed { removed })
    }

    pub fn update_progress(&self, report: ProgressReport) -> ApiResult<ProgressOutcome> {
        self.commit("update_progress", |engine, state| {
            Ok(engine.update_progress(state, report)?)
        })
    }

    pub fn clear_conflict(&self) -> ApiResult<Cleared> {
        let cleared = self.commit("clear_conflict", |engine, state| {
            Ok(engine.clear_conflict(state))
        })?;
        Ok(Cleared { cleared })
    }

    // ==========================================
    // 快照
    // ==========================================

    pub fn export_snapshot(&self) -> ApiResult<Exported> {
        let state = self.lock_state()?;
        let json = self
            .engine
            .export_snapshot(&state)
            .map_err(|e| ApiError::InternalError(format!("快照序列化失败: {}", e)))?;
        Ok(Exported { json })
    }

    /// 导入快照（整体替换；失败时保持原状态）
    pub fn import_snapshot(&self, json: &str) -> ApiResult<ImportOutcome> {
        if json.trim().is_empty() {
            return Err(ApiError::InvalidInput("快照内容不能为空".to_string()));
        }
        let outcome = self.commit("import_snapshot", |engine, state| {
            Ok(engine.import_snapshot(state, json)?)
        })?;
        tracing::info!(orders = outcome.order_count, "快照已导入");
        Ok(outcome)
    }

    // ==========================================
    // 主数据与工作区设置
    // ==========================================

    pub fn replace_master_data(&self, master_data: MasterData) -> ApiResult<MasterDataReplaced> {
        self.commit("replace_master_data", |engine, state| {
            Ok(engine.replace_master_data(state, master_data))
        })
    }

    /// 从三个 CSV 文件读取主数据并整体替换
    ///
    /// # 参数
    /// - products_path / lines_path / stirrers_path: CSV 文件路径
    pub fn load_master_data_csv(
        &self,
        products_path: &Path,
        lines_path: &Path,
        stirrers_path: &Path,
    ) -> ApiResult<MasterDataReplaced> {
        let master_data = MasterDataCsvLoader.load(products_path, lines_path, stirrers_path)?;
        self.replace_master_data(master_data)
    }

    pub fn set_timeline_settings(
        &self,
        patch: TimelineSettingsPatch,
    ) -> ApiResult<TimelineSettings> {
        self.commit("set_timeline_settings", |engine, state| {
            Ok(engine.set_timeline_settings(state, patch))
        })
    }

    pub fn set_planning_preferences(
        &self,
        preferences: PlanningPreferences,
    ) -> ApiResult<PlanningPreferences> {
        // 校验与写入在同一把锁内完成
        self.commit("set_planning_preferences", |engine, state| {
            if let Some(line_id) = preferences.default_line_id.as_deref() {
                if !line_id.trim().is_empty() && state.master_data.find_line(line_id).is_none() {
                    return Err(ApiError::InvalidInput(format!("默认灌装线不存在: {}", line_id)));
                }
            }
            Ok(engine.set_planning_preferences(state, preferences))
        })
    }
}
