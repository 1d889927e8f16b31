// ==========================================
// 班组排程系统 - 工种匹配规则
// ==========================================
// 职责: 校验员工工种与阶段所属项目工种的兼容性
// 判定: 不兼容 => MEDIUM (非阻断警告, 不随调用方角色升级)
// ==========================================

use crate::config::EngineConfig;
use crate::domain::{Conflict, ConflictSeverity, ConflictType, EntityType};
use crate::engine::working_set::WorkingSet;
use chrono::{DateTime, Utc};

// ==========================================
// SkillMismatchRule - 工种匹配规则
// ==========================================
pub struct SkillMismatchRule;

impl SkillMismatchRule {
    pub fn new() -> Self {
        Self
    }

    /// 评估工作集内全部指派的工种兼容性
    pub fn evaluate(
        &self,
        set: &WorkingSet,
        _config: &EngineConfig,
        now: DateTime<Utc>,
    ) -> Vec<Conflict> {
        let mut conflicts = Vec::new();

        for a in &set.assignments {
            let Some(employee) = set.employee(&a.employee_id) else {
                continue;
            };
            let Some(detail) = set.phase(&a.phase_id) else {
                continue;
            };

            if employee.division.is_compatible_with(detail.project.division) {
                continue;
            }

            conflicts.push(Conflict::new(
                ConflictType::SkillMismatch,
                ConflictSeverity::Medium,
                EntityType::Assignment,
                a.assignment_id.clone(),
                [a.employee_id.clone(), a.phase_id.clone()],
                now,
                format!(
                    "员工 {} (工种 {}) 被派往 {} 工种项目 {} 的阶段 {}",
                    employee.employee_id,
                    employee.division,
                    detail.project.division,
                    detail.project.project_id,
                    a.phase_id
                ),
            ));
        }

        conflicts
    }
}

impl Default for SkillMismatchRule {
    fn default() -> Self {
        Self::new()
    }
}
