// ==========================================
// 班组排程系统 - 指派预提交校验器
// ==========================================
// 职责: 新指派落库前的同步校验, 范围只限单个员工/阶段对
// 红线: 永不触碰缓存 (每次现算); 遇首个阻断性冲突即短路
// 阻断策略: 日期越界/重复派工恒阻断, 超员仅硬上限阻断;
//           工种不匹配/周超配/软超员为警告, 不随调用方角色升级
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::config::EngineConfig;
use crate::domain::{Assignment, Conflict, ConflictSeverity, ValidationResult};
use crate::engine::clock::Clock;
use crate::engine::rules::{
    CapacityOverflowRule, DateRangeRule, DoubleBookingRule, OverallocationRule, SkillMismatchRule,
};
use crate::engine::time_window::TimeWindow;
use crate::engine::working_set::WorkingSet;
use crate::repository::assignment_store::AssignmentStore;
use chrono::{Duration, NaiveDate, Weekday};
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tracing::{debug, instrument};
use uuid::Uuid;

// ==========================================
// AssignmentValidator - 指派预提交校验器
// ==========================================
pub struct AssignmentValidator {
    store: Arc<dyn AssignmentStore>,
    clock: Arc<dyn Clock>,
    config: EngineConfig,
    date_range: DateRangeRule,
    double_booking: DoubleBookingRule,
    capacity_overflow: CapacityOverflowRule,
    skill_mismatch: SkillMismatchRule,
    overallocation: OverallocationRule,
}

impl AssignmentValidator {
    /// 创建校验器实例
    pub fn new(
        store: Arc<dyn AssignmentStore>,
        config: EngineConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            clock,
            config,
            date_range: DateRangeRule::new(),
            double_booking: DoubleBookingRule::new(),
            capacity_overflow: CapacityOverflowRule::new(),
            skill_mismatch: SkillMismatchRule::new(),
            overallocation: OverallocationRule::new(),
        }
    }

    /// 校验一条拟新增指派
    ///
    /// # 参数
    /// - phase_id: 目标阶段
    /// - employee_id: 拟派员工
    /// - date: 派工日期
    /// - hours: 当日工时
    ///
    /// # 返回
    /// - Ok(ValidationResult): 校验结论 (含阻断冲突与警告)
    /// - Err(ApiError::InvalidInput): 工时越界, 在任何评估器运行前拒绝
    /// - Err(ApiError::NotFound): 阶段或员工ID无法解析
    #[instrument(skip(self))]
    pub async fn validate_assignment(
        &self,
        phase_id: &str,
        employee_id: &str,
        date: NaiveDate,
        hours: f64,
    ) -> ApiResult<ValidationResult> {
        if !Assignment::hours_in_range(hours) {
            return Err(ApiError::InvalidInput(format!(
                "工时必须在 (0, 24] 区间内, 实际为 {hours}"
            )));
        }

        let phase_detail = self.store.get_phase(phase_id).await?;
        let employee = self.store.get_employee(employee_id).await?;

        // 检索窗口: 覆盖派工日所在自然周, 外扩一天以覆盖邻日背靠背组合
        let week_start = date.week(Weekday::Mon).first_day();
        let window = TimeWindow {
            start: week_start - Duration::days(1),
            end: week_start + Duration::days(7),
        };

        let candidate = Assignment {
            assignment_id: Uuid::new_v4().to_string(),
            employee_id: employee_id.to_string(),
            phase_id: phase_id.to_string(),
            assignment_date: date,
            hours_allocated: hours,
            created_by: "pre-commit-validation".to_string(),
            created_at: self.clock.now().naive_utc(),
        };
        let candidate_id = candidate.assignment_id.clone();

        let set = self
            .build_scoped_set(&candidate, employee, phase_detail, &window)
            .await?;
        let now = self.clock.now();

        // 超员/缺员只能二选一, 预先算出方向: 缺员时本次新增是在补人,
        // 人力冲突不进校验结论
        let required = set.phases[phase_id].phase.labor.required_headcount();
        let assigned_after: BTreeSet<&str> = set
            .assignments
            .iter()
            .filter(|a| a.phase_id == phase_id)
            .map(|a| a.employee_id.as_str())
            .collect();
        let overstaffed = assigned_after.len() as u32 > required && required > 0;

        let relevant = |c: &Conflict| {
            c.entity_id == candidate_id || c.related_entities.contains(&candidate_id)
        };

        let mut warnings: Vec<Conflict> = Vec::new();

        // === 阻断规则 1: 日期越界/生命周期失效 ===
        let blocking: Vec<Conflict> = self
            .date_range
            .evaluate(&set, &self.config, now)
            .into_iter()
            .filter(relevant)
            .collect();
        if !blocking.is_empty() {
            debug!("短路: 日期/生命周期违规");
            return Ok(ValidationResult::invalid(blocking, warnings));
        }

        // === 阻断规则 2: 重复派工 ===
        let blocking: Vec<Conflict> = self
            .double_booking
            .evaluate(&set, &self.config, now)
            .into_iter()
            .filter(relevant)
            .collect();
        if !blocking.is_empty() {
            debug!("短路: 重复派工");
            return Ok(ValidationResult::invalid(blocking, warnings));
        }

        // === 阻断规则 3: 超员硬上限 (软超员转警告) ===
        if overstaffed {
            let (blocking, soft): (Vec<Conflict>, Vec<Conflict>) = self
                .capacity_overflow
                .evaluate(&set, &self.config, now)
                .into_iter()
                .filter(|c| c.entity_id == phase_id)
                .partition(|c| c.severity >= ConflictSeverity::High);
            warnings.extend(soft);
            if !blocking.is_empty() {
                debug!("短路: 超员突破硬上限");
                return Ok(ValidationResult::invalid(blocking, warnings));
            }
        }

        // === 警告规则: 工种不匹配 / 周工时超配 ===
        warnings.extend(
            self.skill_mismatch
                .evaluate(&set, &self.config, now)
                .into_iter()
                .filter(relevant),
        );
        warnings.extend(
            self.overallocation
                .evaluate(&set, &self.config, now)
                .into_iter()
                .filter(relevant),
        );

        Ok(ValidationResult::valid(warnings))
    }

    /// 装配单员工/单阶段的局部工作集 (候选指派已并入)
    async fn build_scoped_set(
        &self,
        candidate: &Assignment,
        employee: crate::domain::Employee,
        phase_detail: crate::domain::PhaseWithProject,
        window: &TimeWindow,
    ) -> ApiResult<WorkingSet> {
        let employee_assignments = self
            .store
            .list_assignments_for_employee(&candidate.employee_id, window)
            .await?;
        let phase_assignments = self
            .store
            .list_assignments_for_phase(&candidate.phase_id)
            .await?;

        // 两路检索可能重叠, 按指派ID去重
        let mut merged: HashMap<String, Assignment> = HashMap::new();
        for a in employee_assignments.into_iter().chain(phase_assignments) {
            merged.insert(a.assignment_id.clone(), a);
        }
        merged.insert(candidate.assignment_id.clone(), candidate.clone());

        let mut employees = HashMap::new();
        employees.insert(employee.employee_id.clone(), employee);
        let mut phases = HashMap::new();
        phases.insert(phase_detail.phase.phase_id.clone(), phase_detail);

        Ok(WorkingSet {
            assignments: merged.into_values().collect(),
            employees,
            phases,
        })
    }
}
