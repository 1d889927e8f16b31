// ==========================================
// 班组排程系统 - 日期与生命周期规则
// ==========================================
// 职责: 检测日期越界与失效引用 (取消项目/停用员工/悬空ID)
// 判定: 一律 CRITICAL, 预提交时恒为阻断
// 红线: 失效引用必须标记, 不得静默丢弃
// ==========================================

use crate::config::EngineConfig;
use crate::domain::{Conflict, ConflictSeverity, ConflictType, EntityType};
use crate::engine::time_window::TimeWindow;
use crate::engine::working_set::WorkingSet;
use chrono::{DateTime, Utc};

// ==========================================
// DateRangeRule - 日期与生命周期规则
// ==========================================
pub struct DateRangeRule;

impl DateRangeRule {
    pub fn new() -> Self {
        Self
    }

    /// 评估工作集内全部指派的日期合法性与引用有效性
    ///
    /// 同一指派的多个失效原因合并为一条冲突（合并描述）
    pub fn evaluate(
        &self,
        set: &WorkingSet,
        _config: &EngineConfig,
        now: DateTime<Utc>,
    ) -> Vec<Conflict> {
        let mut conflicts = Vec::new();

        for a in &set.assignments {
            let mut reasons: Vec<String> = Vec::new();

            match set.phase(&a.phase_id) {
                None => {
                    reasons.push(format!("引用的阶段 {} 不存在", a.phase_id));
                }
                Some(detail) => {
                    let window = TimeWindow {
                        start: detail.phase.start_date,
                        end: detail.phase.end_date,
                    };
                    if !window.contains(a.assignment_date) {
                        reasons.push(format!(
                            "派工日期 {} 越出阶段窗口 {}..{}",
                            a.assignment_date, window.start, window.end
                        ));
                    }
                    if !detail.project.status.accepts_assignments() {
                        reasons.push(format!(
                            "所属项目 {} 状态为 {}, 不再承接指派",
                            detail.project.project_id, detail.project.status
                        ));
                    }
                }
            }

            match set.employee(&a.employee_id) {
                None => {
                    reasons.push(format!("引用的员工 {} 不存在", a.employee_id));
                }
                Some(employee) if !employee.is_active => {
                    reasons.push(format!("员工 {} 已停用", a.employee_id));
                }
                Some(_) => {}
            }

            if reasons.is_empty() {
                continue;
            }

            conflicts.push(Conflict::new(
                ConflictType::DateRangeViolation,
                ConflictSeverity::Critical,
                EntityType::Assignment,
                a.assignment_id.clone(),
                [a.employee_id.clone(), a.phase_id.clone()],
                now,
                format!("指派 {} 失效: {}", a.assignment_id, reasons.join("; ")),
            ));
        }

        conflicts
    }
}

impl Default for DateRangeRule {
    fn default() -> Self {
        Self::new()
    }
}
