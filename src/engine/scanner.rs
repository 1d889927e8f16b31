// ==========================================
// 班组排程系统 - 冲突扫描器
// ==========================================
// 用途: 协调五个规则评估器跑全量工作集, 去重、排序并写穿缓存
// 红线: 只读存储适配器; 要么返回完整结果, 要么整体失败
// ==========================================

use crate::api::error::ApiResult;
use crate::config::EngineConfig;
use crate::domain::Conflict;
use crate::engine::cache::ConflictCache;
use crate::engine::clock::Clock;
use crate::engine::rules::{
    CapacityOverflowRule, DateRangeRule, DoubleBookingRule, OverallocationRule, SkillMismatchRule,
};
use crate::engine::time_window::TimeWindow;
use crate::engine::working_set::{ScanScope, WorkingSet};
use crate::repository::assignment_store::AssignmentStore;
use crate::repository::error::StoreError;
use chrono::Duration;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

// ==========================================
// ConflictScanner - 冲突扫描器
// ==========================================
pub struct ConflictScanner {
    store: Arc<dyn AssignmentStore>,
    cache: Arc<ConflictCache>,
    clock: Arc<dyn Clock>,
    config: EngineConfig,
    double_booking: DoubleBookingRule,
    overallocation: OverallocationRule,
    skill_mismatch: SkillMismatchRule,
    capacity_overflow: CapacityOverflowRule,
    date_range: DateRangeRule,
}

impl ConflictScanner {
    /// 创建扫描器实例
    ///
    /// 缓存实例由外部构造后注入, 与校验器互不共享状态
    pub fn new(
        store: Arc<dyn AssignmentStore>,
        cache: Arc<ConflictCache>,
        config: EngineConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            cache,
            clock,
            config,
            double_booking: DoubleBookingRule::new(),
            overallocation: OverallocationRule::new(),
            skill_mismatch: SkillMismatchRule::new(),
            capacity_overflow: CapacityOverflowRule::new(),
            date_range: DateRangeRule::new(),
        }
    }

    /// 默认扫描范围: [today - 回溯天数, today + 前瞻天数], 无工种过滤
    pub fn default_scope(&self) -> ScanScope {
        let today = self.clock.today();
        ScanScope::all(TimeWindow {
            start: today - Duration::days(self.config.look_back_days),
            end: today + Duration::days(self.config.look_ahead_days),
        })
    }

    /// 全量冲突审计
    pub async fn scan_all_conflicts(&self) -> ApiResult<Vec<Conflict>> {
        self.scan_conflicts(&self.default_scope()).await
    }

    /// 按范围扫描冲突
    ///
    /// # 流程
    /// 1. 按范围指纹查缓存, 命中且未失效则直接返回
    /// 2. 装配工作集 (一次回源, 评估期间不再读存储)
    /// 3. 依次运行五个评估器
    /// 4. 去重 (同键保留更高严重等级, 合并关联实体)
    /// 5. 排序 (严重等级降序 -> 检出时间降序 -> 实体ID升序)
    /// 6. 写穿缓存
    #[instrument(skip(self), fields(fingerprint = %scope.fingerprint()))]
    pub async fn scan_conflicts(&self, scope: &ScanScope) -> ApiResult<Vec<Conflict>> {
        let fingerprint = scope.fingerprint();

        if let Some(entry) = self.cache.get(&fingerprint)? {
            debug!(computed_at = %entry.computed_at, "返回缓存的扫描结果");
            return Ok(entry.conflicts);
        }

        let set = self.load_working_set(scope).await?;
        let now = self.clock.now();

        info!(
            assignments = set.assignments.len(),
            employees = set.employees.len(),
            phases = set.phases.len(),
            "工作集装配完成, 开始评估"
        );

        let mut raw = Vec::new();
        raw.extend(self.date_range.evaluate(&set, &self.config, now));
        raw.extend(self.double_booking.evaluate(&set, &self.config, now));
        raw.extend(self.overallocation.evaluate(&set, &self.config, now));
        raw.extend(self.skill_mismatch.evaluate(&set, &self.config, now));
        raw.extend(self.capacity_overflow.evaluate(&set, &self.config, now));

        let mut conflicts = Self::deduplicate(raw);
        Self::sort_for_output(&mut conflicts);

        info!(conflicts = conflicts.len(), "扫描完成");
        self.cache.put(&fingerprint, conflicts.clone())?;

        Ok(conflicts)
    }

    /// 装配扫描工作集
    ///
    /// 窗口内指派 + 其引用的员工/阶段快照 + 未取消项目的当期/未来阶段
    /// (零指派的缺员阶段必须进集合, 不能只从指派反推)
    async fn load_working_set(&self, scope: &ScanScope) -> ApiResult<WorkingSet> {
        let assignments = self.store.list_active_assignments(scope).await?;

        let mut phases = HashMap::new();
        for detail in self.store.list_active_phases(&scope.window).await? {
            phases.insert(detail.phase.phase_id.clone(), detail);
        }

        // 指派引用、但不在活跃阶段集合内的阶段 (已取消项目/历史阶段) 单独补取;
        // 悬空ID留空, 由日期规则标记
        let mut missing_phase_ids: Vec<&str> = assignments
            .iter()
            .map(|a| a.phase_id.as_str())
            .filter(|id| !phases.contains_key(*id))
            .collect();
        missing_phase_ids.sort_unstable();
        missing_phase_ids.dedup();
        for phase_id in missing_phase_ids {
            match self.store.get_phase(phase_id).await {
                Ok(detail) => {
                    phases.insert(detail.phase.phase_id.clone(), detail);
                }
                Err(StoreError::NotFound { .. }) => {
                    warn!(phase_id, "指派引用的阶段不存在, 保留待标记");
                }
                Err(e) => return Err(e.into()),
            }
        }

        let mut employee_ids: Vec<String> = assignments
            .iter()
            .map(|a| a.employee_id.clone())
            .collect();
        employee_ids.sort_unstable();
        employee_ids.dedup();
        let employees = self
            .store
            .list_employees(&employee_ids)
            .await?
            .into_iter()
            .map(|e| (e.employee_id.clone(), e))
            .collect();

        Ok(WorkingSet {
            assignments,
            employees,
            phases,
        })
    }

    /// 去重: 键为 (类型, 排序后的实体ID集合)
    ///
    /// 同键保留严重等级更高的一条 (等级相同保留先出现的), 关联实体取并集
    pub fn deduplicate(raw: Vec<Conflict>) -> Vec<Conflict> {
        let mut order: Vec<(ConflictKey, Conflict)> = Vec::new();
        let mut index: HashMap<ConflictKey, usize> = HashMap::new();

        for conflict in raw {
            let key = conflict.dedup_key();
            match index.get(&key) {
                None => {
                    index.insert(key.clone(), order.len());
                    order.push((key, conflict));
                }
                Some(&pos) => {
                    let kept = &mut order[pos].1;
                    let merged: Vec<String> =
                        conflict.related_entities.iter().cloned().collect();
                    if conflict.severity > kept.severity {
                        let mut replacement = conflict;
                        replacement
                            .related_entities
                            .extend(kept.related_entities.iter().cloned());
                        *kept = replacement;
                    } else {
                        kept.related_entities.extend(merged);
                    }
                }
            }
        }

        order.into_iter().map(|(_, c)| c).collect()
    }

    /// 输出排序: 严重等级降序, 检出时间降序, 最后按实体ID/描述升序兜底
    /// (同一次扫描共享同一检出时刻, 需要末位确定性键保证可复现)
    pub fn sort_for_output(conflicts: &mut [Conflict]) {
        conflicts.sort_by(|a, b| {
            b.severity
                .cmp(&a.severity)
                .then_with(|| b.detected_at.cmp(&a.detected_at))
                .then_with(|| a.entity_id.cmp(&b.entity_id))
                .then_with(|| a.description.cmp(&b.description))
        });
    }
}

type ConflictKey = (crate::domain::ConflictType, Vec<String>);
